//! Shared utilities

pub mod settings;

pub use settings::{get_data_dir, get_settings, Settings};
