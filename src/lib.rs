//! Drum - SPLICE drum machine pattern decoder
//!
//! This library provides:
//! - Decoding of `.splice` pattern files into a [`Pattern`] of [`Track`]s
//! - Encoding of patterns back to the binary layout
//! - A text rendering of patterns through `Display`
//!
//! # Example
//!
//! ```no_run
//! use drum::decode_file;
//!
//! let pattern = decode_file("pattern_1.splice").unwrap();
//! println!("{pattern}");
//! ```

pub mod display;
pub mod error;
pub mod parser;
pub mod writer;

// Re-export main types for convenience
pub use error::DrumError;
pub use parser::pattern_parser::{decode, decode_file, decode_pattern_data, Pattern, Track};
pub use parser::primitive_parser::NOTES_PER_TRACK;
pub use writer::encode_pattern;
