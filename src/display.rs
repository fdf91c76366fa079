//! Text rendering of decoded patterns
//!
//! ```text
//! Saved with HW Version: 0.808-alpha
//! Tempo: 120
//! (0) kick	|x---|x---|x---|x---|
//! ```

use crate::parser::pattern_parser::{Pattern, Track};
use std::fmt;

/// Steps per beat, one `|` delimited group.
const STEPS_PER_GROUP: usize = 4;

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Saved with HW Version: {}", self.hardware_version())?;
        writeln!(f, "Tempo: {}", self.tempo())?;
        for track in self.tracks() {
            writeln!(f, "{track}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}\t", self.id(), self.name())?;
        for group in self.notes().chunks(STEPS_PER_GROUP) {
            f.write_str("|")?;
            for &on in group {
                f.write_str(if on { "x" } else { "-" })?;
            }
        }
        f.write_str("|")
    }
}
