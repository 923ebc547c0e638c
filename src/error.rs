//! Error types for the spectator core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by classification, configuration lookup and interaction flows.
///
/// Detection timeouts are not errors: bounded polls report exhaustion as
/// `Ok(false)` and callers retry or fall back.
#[derive(Debug, Error)]
pub enum Error {
    /// The spawn table has no entry for the current map/size combination.
    /// Fatal to the spawn attempt; never silently defaulted.
    #[error("no spawn coordinates for map '{map}' (size {size})")]
    UnsupportedMapSize { map: String, size: i32 },

    #[error("unknown resolution profile '{0}'")]
    UnknownResolution(String),

    #[error("unknown {kind} region '{name}'")]
    UnknownRegion { kind: &'static str, name: String },

    #[error("no histogram baseline for {resolution}/{category}/{label}")]
    MissingBaseline {
        resolution: String,
        category: String,
        label: String,
    },

    #[error("no game window attached")]
    NoWindow,

    #[error("screen capture failed: {0}")]
    Capture(String),

    #[error("text recognition failed: {0}")]
    Ocr(String),

    #[error(transparent)]
    OpenCv(#[from] opencv::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}
