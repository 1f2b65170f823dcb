//! Error types for rompack

use std::fmt;
use std::path::PathBuf;

/// Main error type for rompack operations
#[derive(Debug)]
pub enum RomPackError {
    /// Bad configuration: unknown compression method, bad cover
    /// dimensions, missing or corrupt BIOS files, archives in roms/
    Config(String),

    /// Compression or container framing failed on a published image
    Codec(String),

    /// Combined ROM + save + cover-art bytes exceed the storage device
    StorageOverflow {
        /// Bytes the packed output needs
        needed: u64,
        /// Declared device capacity in bytes
        capacity: u64,
    },

    /// No images were found in any family folder
    NoImages,

    /// External tool invocation failed (objcopy, ar)
    Tool(String),

    /// Cover art source exists but could not be encoded
    Artwork(PathBuf, String),

    /// IO error
    IoError(std::io::Error),

    /// JSON parsing error
    JsonError(serde_json::Error),

    /// Generic error with message
    Generic(String),
}

impl fmt::Display for RomPackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RomPackError::Config(msg) => write!(f, "Configuration error: {msg}"),
            RomPackError::Codec(msg) => write!(f, "Codec error: {msg}"),
            RomPackError::StorageOverflow { needed, capacity } => write!(
                f,
                "External flash will overflow: need {:.2} MB, capacity {:.2} MB",
                *needed as f64 / 1_048_576.0,
                *capacity as f64 / 1_048_576.0
            ),
            RomPackError::NoImages => write!(
                f,
                "No roms found! Please add at least one rom to one of the directories in roms/"
            ),
            RomPackError::Tool(msg) => write!(f, "Tool error: {msg}"),
            RomPackError::Artwork(path, msg) => {
                write!(f, "Artwork error for {}: {msg}", path.display())
            }
            RomPackError::IoError(err) => write!(f, "IO error: {err}"),
            RomPackError::JsonError(err) => write!(f, "JSON error: {err}"),
            RomPackError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for RomPackError {}

impl From<std::io::Error> for RomPackError {
    fn from(err: std::io::Error) -> Self {
        RomPackError::IoError(err)
    }
}

impl From<serde_json::Error> for RomPackError {
    fn from(err: serde_json::Error) -> Self {
        RomPackError::JsonError(err)
    }
}

impl From<anyhow::Error> for RomPackError {
    fn from(err: anyhow::Error) -> Self {
        RomPackError::Generic(err.to_string())
    }
}

/// Result type for rompack operations
pub type Result<T> = std::result::Result<T, RomPackError>;
