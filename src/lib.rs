//! bf2-spectator - auto spectator bot for Battlefield 2
//!
//! Drives an uninstrumented BF2 client through captured screen pixels and
//! synthetic input. OCR substring checks and histogram-baseline matching
//! decide what screen the game is showing; bounded-retry interaction flows
//! move it between states (menu navigation, server connection, spawn
//! selection, round transitions).

pub mod classifier;
pub mod controller;
pub mod error;
pub mod input;
pub mod log_main;
pub mod profile;
pub mod screen_reader;
pub mod state;
pub mod utils;
pub mod window;

// Re-exports for convenience
pub use classifier::ClassifyService;
pub use controller::{poll_until, FindInstanceReport, InstanceService};
pub use error::{Error, Result};
pub use profile::{ProfileService, ResolutionProfile, SpawnTable};
pub use screen_reader::{HistService, OcrService, ScreenService};
pub use state::GameInstanceState;
pub use window::Window;
