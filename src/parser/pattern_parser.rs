use crate::parser::primitive_parser::{
    parse_be_u64, parse_byte_sized_string, parse_le_f32, parse_note_mask,
    parse_null_stripped_string, parse_u8, skip_bytes, NOTES_PER_TRACK,
};
use crate::DrumError;
use nom::bytes::complete::take;
use nom::combinator::map;
use nom::error::{Error, ErrorKind};
use nom::{IResult, Offset, Parser};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

// .splice layout, all integers big-endian except the tempo
//
// [6 "SPLICE"][8 payload length]
// payload: [32 hardware version][4 tempo f32 LE][track records...]
// track:   [1 id][3 padding][1 name length N][N name][16 steps]

pub const SPLICE_MAGIC: &[u8] = b"SPLICE";
pub const PAYLOAD_LENGTH_SIZE: usize = 8;
pub const HEADER_SIZE: usize = SPLICE_MAGIC.len() + PAYLOAD_LENGTH_SIZE;

pub const HW_VERSION_SIZE: usize = 32;
pub const TEMPO_SIZE: usize = 4;
pub const METADATA_SIZE: usize = HW_VERSION_SIZE + TEMPO_SIZE;

pub const TRACK_PADDING_SIZE: usize = 3;

/// A decoded drum pattern, frozen once returned by the decoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    hardware_version: String,
    tempo: f32,
    tracks: Vec<Track>,
}

impl Pattern {
    pub const fn new(hardware_version: String, tempo: f32, tracks: Vec<Track>) -> Self {
        Self {
            hardware_version,
            tempo,
            tracks,
        }
    }

    pub fn hardware_version(&self) -> &str {
        &self.hardware_version
    }

    /// Beats per minute
    pub const fn tempo(&self) -> f32 {
        self.tempo
    }

    /// Tracks in file order, duplicated ids included
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

/// One instrument and its bar of sixteenth-note steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    id: u8,
    name: String,
    notes: [bool; NOTES_PER_TRACK],
}

impl Track {
    pub const fn new(id: u8, name: String, notes: [bool; NOTES_PER_TRACK]) -> Self {
        Self { id, name, notes }
    }

    pub const fn id(&self) -> u8 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn notes(&self) -> &[bool; NOTES_PER_TRACK] {
        &self.notes
    }

    /// Indices of the steps which trigger the instrument
    pub fn active_steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.notes
            .iter()
            .enumerate()
            .filter_map(|(step, &on)| on.then_some(step))
    }
}

/// Parse the "SPLICE" marker.
pub fn parse_magic(i: &[u8]) -> IResult<&[u8], ()> {
    let (rest, marker) = take(SPLICE_MAGIC.len())(i)?;
    if marker != SPLICE_MAGIC {
        log::debug!("Bad marker {marker:02X?}");
        return Err(nom::Err::Failure(Error::new(i, ErrorKind::Tag)));
    }
    Ok((rest, ()))
}

/// Parse the fixed header and return the payload length.
pub fn parse_header(i: &[u8]) -> IResult<&[u8], u64> {
    let (i, ()) = parse_magic(i)?;
    let (i, payload_length) = parse_be_u64(i)?;
    log::debug!("Payload length: {payload_length}");
    Ok((i, payload_length))
}

/// Parse hardware version and tempo.
pub fn parse_metadata(i: &[u8]) -> IResult<&[u8], (String, f32)> {
    let (i, (hardware_version, tempo)) = (
        parse_null_stripped_string(HW_VERSION_SIZE), // Hardware version
        parse_le_f32,                                // Tempo
    )
        .parse(i)?;
    log::debug!("Hardware version:{hardware_version} tempo:{tempo}");
    Ok((i, (hardware_version, tempo)))
}

pub fn parse_track(i: &[u8]) -> IResult<&[u8], Track> {
    map(
        (
            parse_u8,                       // Id
            skip_bytes(TRACK_PADDING_SIZE), // Padding
            parse_byte_sized_string,        // Name
            parse_note_mask,                // Steps
        ),
        |(id, (), name, notes)| {
            log::debug!("Track ({id}) {name}");
            Track { id, name, notes }
        },
    )
    .parse(i)
}

/// Parse track records filling exactly `remaining_bytes`.
///
/// Bytes after the region are left untouched for the caller.
pub fn parse_tracks(remaining_bytes: usize) -> impl FnMut(&[u8]) -> IResult<&[u8], Vec<Track>> {
    move |i: &[u8]| {
        let (rest, mut region) = take(remaining_bytes)(i)?;
        let mut tracks = Vec::new();
        while !region.is_empty() {
            log::debug!(
                "Parsing track {} with {} bytes left",
                tracks.len(),
                region.len()
            );
            let (inner, track) = parse_track(region)?;
            region = inner;
            tracks.push(track);
        }
        Ok((rest, tracks))
    }
}

/// Parse a payload of `payload_length` bytes following the header.
pub fn parse_payload(payload_length: u64) -> impl FnMut(&[u8]) -> IResult<&[u8], Pattern> {
    move |i: &[u8]| {
        // larger than memory, cannot be present
        let Ok(payload_length) = usize::try_from(payload_length) else {
            return Err(nom::Err::Failure(Error::new(i, ErrorKind::Eof)));
        };
        let (rest, payload) = take(payload_length)(i)?;
        let (payload, (hardware_version, tempo)) = parse_metadata(payload)?;
        // metadata fit in the payload so the subtraction holds
        let (_, tracks) = parse_tracks(payload_length - METADATA_SIZE)(payload)?;
        let pattern = Pattern {
            hardware_version,
            tempo,
            tracks,
        };
        Ok((rest, pattern))
    }
}

/// Parse a full pattern, returns the bytes following it.
pub fn parse_pattern(i: &[u8]) -> IResult<&[u8], Pattern> {
    let (i, payload_length) = parse_header(i)?;
    parse_payload(payload_length)(i)
}

/// Classify a nom error raised while parsing `data`.
///
/// `base_offset` is the position of `data` within the whole file.
fn to_drum_error(data: &[u8], base_offset: usize, err: nom::Err<Error<&[u8]>>) -> DrumError {
    match err {
        nom::Err::Incomplete(needed) => {
            DrumError::TruncatedInput(format!("more input needed: {needed:?}"))
        }
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = base_offset + data.offset(e.input);
            match e.code {
                ErrorKind::Tag => DrumError::InvalidFormat(format!(
                    "missing SPLICE marker at offset {offset}"
                )),
                ErrorKind::Verify => DrumError::InvalidNoteByte {
                    offset,
                    value: e.input.first().copied().unwrap_or_default(),
                },
                _ => DrumError::TruncatedInput(format!(
                    "unexpected end of input at offset {offset}"
                )),
            }
        }
    }
}

/// Decode a pattern held in memory.
///
/// Bytes after the declared payload are ignored.
pub fn decode_pattern_data(data: &[u8]) -> Result<Pattern, DrumError> {
    let (rest, pattern) = parse_pattern(data)
        .map_err(|err| to_drum_error(data, 0, err))
        .inspect_err(|err| log::error!("Failed to parse pattern data: {err}"))?;
    if !rest.is_empty() {
        log::debug!("Ignoring {} trailing bytes", rest.len());
    }
    Ok(pattern)
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], field: &str) -> Result<(), DrumError> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => {
            DrumError::TruncatedInput(format!("input ended while reading {field}"))
        }
        _ => DrumError::IoError(err),
    })
}

fn decode_stream<R: Read>(reader: &mut R) -> Result<Pattern, DrumError> {
    let mut header = [0u8; HEADER_SIZE];
    read_field(reader, &mut header[..SPLICE_MAGIC.len()], "marker")?;
    parse_magic(&header).map_err(|err| to_drum_error(&header, 0, err))?;
    read_field(reader, &mut header[SPLICE_MAGIC.len()..], "payload length")?;
    let (_, payload_length) = parse_header(&header).map_err(|err| to_drum_error(&header, 0, err))?;

    // never read past the pattern, the source may carry more data
    let mut payload = Vec::new();
    let read = reader.take(payload_length).read_to_end(&mut payload)?;
    if (read as u64) < payload_length {
        return Err(DrumError::TruncatedInput(format!(
            "payload declares {payload_length} bytes but only {read} are available"
        )));
    }

    let (_, pattern) = parse_payload(payload_length)(payload.as_slice())
        .map_err(|err| to_drum_error(&payload, HEADER_SIZE, err))?;
    Ok(pattern)
}

/// Decode a pattern from a byte source.
///
/// Consumes exactly the header and the declared payload, the reader is left
/// on the first byte following the pattern.
pub fn decode<R: Read>(mut reader: R) -> Result<Pattern, DrumError> {
    decode_stream(&mut reader).inspect_err(|err| log::error!("Failed to decode pattern: {err}"))
}

/// Decode the pattern file at `path`.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Pattern, DrumError> {
    let path = path.as_ref();
    log::debug!("Decoding pattern file {path:?}");
    let file = File::open(path)?;
    decode(BufReader::new(file))
}
