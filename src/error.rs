//! Error types for the drum library

use std::io;

/// Library error type for pattern decoding and encoding
#[derive(Debug, thiserror::Error)]
pub enum DrumError {
    /// Input ended before a fixed-size or length-prefixed field was complete
    #[error("truncated input: {0}")]
    TruncatedInput(String),

    /// Input is not a SPLICE pattern
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Note mask byte outside of {0x00, 0x01}
    #[error("invalid note byte 0x{value:02X} at offset {offset}")]
    InvalidNoteByte { offset: usize, value: u8 },

    /// Pattern cannot be represented in the binary layout
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// I/O error from the underlying byte source
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}
