//! Encoding of patterns back to the `.splice` layout

use crate::parser::pattern_parser::{
    Pattern, Track, HEADER_SIZE, HW_VERSION_SIZE, METADATA_SIZE, SPLICE_MAGIC, TRACK_PADDING_SIZE,
};
use crate::DrumError;
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

/// Encode text with the single byte encoding used by the decoder.
fn encode_text<'a>(text: &'a str, field: &str) -> Result<Cow<'a, [u8]>, DrumError> {
    let (bytes, _encoding, had_unmappable) = WINDOWS_1252.encode(text);
    if had_unmappable {
        return Err(DrumError::EncodingError(format!(
            "{field} {text:?} is not single byte text"
        )));
    }
    Ok(bytes)
}

/// [1 id][3 padding][1 name length][name][16 steps]
fn encode_track(track: &Track, buf: &mut Vec<u8>) -> Result<(), DrumError> {
    let name = encode_text(track.name(), "track name")?;
    let name_len = u8::try_from(name.len()).map_err(|_| {
        DrumError::EncodingError(format!(
            "track name {:?} is longer than {} bytes",
            track.name(),
            u8::MAX
        ))
    })?;
    buf.push(track.id());
    buf.extend_from_slice(&[0u8; TRACK_PADDING_SIZE]);
    buf.push(name_len);
    buf.extend_from_slice(&name);
    buf.extend(track.notes().iter().map(|&on| u8::from(on)));
    Ok(())
}

/// Encode `pattern` with a payload length matching its content.
pub fn encode_pattern(pattern: &Pattern) -> Result<Vec<u8>, DrumError> {
    let hardware_version = encode_text(pattern.hardware_version(), "hardware version")?;
    if hardware_version.len() > HW_VERSION_SIZE {
        return Err(DrumError::EncodingError(format!(
            "hardware version {:?} is longer than {HW_VERSION_SIZE} bytes",
            pattern.hardware_version()
        )));
    }
    // nulls are padding for the decoder
    if hardware_version.contains(&0) {
        return Err(DrumError::EncodingError(
            "hardware version contains null bytes".to_string(),
        ));
    }

    let mut tracks = Vec::new();
    for track in pattern.tracks() {
        encode_track(track, &mut tracks)?;
    }
    let payload_length = METADATA_SIZE + tracks.len();
    log::debug!(
        "Encoding {} tracks with payload length {payload_length}",
        pattern.tracks().len()
    );

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload_length);
    buf.extend_from_slice(SPLICE_MAGIC);
    buf.extend_from_slice(&(payload_length as u64).to_be_bytes());
    buf.extend_from_slice(&hardware_version);
    buf.resize(HEADER_SIZE + HW_VERSION_SIZE, 0);
    buf.extend_from_slice(&pattern.tempo().to_le_bytes());
    buf.extend_from_slice(&tracks);
    Ok(buf)
}
