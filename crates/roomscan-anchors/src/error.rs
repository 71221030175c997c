//! Error types for reading and writing LRAW recordings.

use thiserror::Error;

/// Errors that can occur while decoding or encoding a recording.
#[derive(Error, Debug)]
pub enum LrawError {
    /// Underlying reader or writer failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with `LRAW`.
    #[error("invalid LRAW magic: {0:?}")]
    InvalidMagic([u8; 4]),

    /// Compressed recordings must be inflated before decoding.
    #[error("compressed LRAW recordings are not supported")]
    Compressed,

    /// Data ended in the middle of a record.
    #[error("truncated LRAW data in {section} (anchor {index})")]
    Truncated {
        /// Section being decoded.
        section: &'static str,
        /// Index of the anchor record being decoded.
        index: usize,
    },

    /// An anchor declares more elements than a recording can hold.
    #[error("anchor {index} declares {count} {what}, limit is {limit}")]
    Oversized {
        /// Index of the anchor record.
        index: usize,
        /// Element kind ("vertices" or "faces").
        what: &'static str,
        /// Declared count.
        count: u32,
        /// Maximum accepted count.
        limit: u32,
    },
}

/// Result type for recording operations.
pub type Result<T> = std::result::Result<T, LrawError>;
