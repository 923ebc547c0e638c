//! Screen reading: capture, text recognition and histogram signatures

pub mod hist_service;
pub mod ocr_service;
pub mod screen_service;

pub use hist_service::HistService;
pub use ocr_service::OcrService;
pub use screen_service::{Region, ScreenService};
