//! Resolution profiles and spawn coordinate tables
//!
//! The large per-resolution coordinate dictionaries are shipped as JSON
//! configuration and deserialized into strongly-typed lookup structures
//! validated at load time. Missing-key access is a typed error, never a
//! panic.

pub mod base;
pub mod profile_service;
pub mod spawn_table;

pub use base::{OcrRegion, Point, Rect, ResolutionProfile};
pub use profile_service::ProfileService;
pub use spawn_table::SpawnTable;
