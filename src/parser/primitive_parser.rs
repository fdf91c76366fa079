use encoding_rs::WINDOWS_1252;
use nom::combinator::{map, verify};
use nom::{bytes, number, IResult, Parser};

/// Number of steps in a track, one bar of sixteenth notes.
pub const NOTES_PER_TRACK: usize = 16;

/// Parse unsigned byte
pub fn parse_u8(i: &[u8]) -> IResult<&[u8], u8> {
    number::complete::be_u8(i)
}

/// Parse unsigned 64 big-endian
pub fn parse_be_u64(i: &[u8]) -> IResult<&[u8], u64> {
    number::complete::be_u64(i)
}

/// Parse float 32 little-endian
pub fn parse_le_f32(i: &[u8]) -> IResult<&[u8], f32> {
    number::complete::le_f32(i)
}

/// Skip exactly `n` bytes, failing on short input.
pub fn skip_bytes(n: usize) -> impl FnMut(&[u8]) -> IResult<&[u8], ()> {
    move |i: &[u8]| {
        log::debug!("skip: {n}");
        let (rest, _) = bytes::complete::take(n)(i)?;
        Ok((rest, ()))
    }
}

/// Materialize an owned String, one char per byte.
///
/// Windows-1252 maps every byte value, so nothing is rejected or replaced.
pub fn make_string(i: &[u8]) -> String {
    let (cow, _had_errors) = WINDOWS_1252.decode_without_bom_handling(i);
    cow.into_owned()
}

/// Parse fixed field of `field_size` bytes with every null byte filtered out.
pub fn parse_null_stripped_string(
    field_size: usize,
) -> impl FnMut(&[u8]) -> IResult<&[u8], String> {
    move |i: &[u8]| {
        let (rest, field) = bytes::complete::take(field_size)(i)?;
        log::debug!("Raw field raw={field:02X?}");
        let stripped: Vec<u8> = field.iter().copied().filter(|&b| b != 0).collect();
        Ok((rest, make_string(&stripped)))
    }
}

/// Size of string encoded as a byte.
/// [u8 string_len][string_len bytes]
pub fn parse_byte_sized_string(i: &[u8]) -> IResult<&[u8], String> {
    let (i, length) = parse_u8(i)?;
    log::debug!("Parsing byte sized string of length {length}");
    map(bytes::complete::take(length), make_string).parse(i)
}

/// Parse a single step, strictly 0x00 or 0x01.
///
/// Any other value fails with `ErrorKind::Verify` positioned on the offending byte.
pub fn parse_note(i: &[u8]) -> IResult<&[u8], bool> {
    map(verify(parse_u8, |b: &u8| *b <= 1), |b| b == 1).parse(i)
}

/// Parse the 16 steps of a track in order.
pub fn parse_note_mask(i: &[u8]) -> IResult<&[u8], [bool; NOTES_PER_TRACK]> {
    let mut notes = [false; NOTES_PER_TRACK];
    let mut i = i;
    for note in &mut notes {
        let (rest, on) = parse_note(i)?;
        *note = on;
        i = rest;
    }
    Ok((i, notes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::error::ErrorKind;

    #[test]
    fn test_parse_be_u64() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC5, 0xFF];
        let (rest, res) = parse_be_u64(&data).unwrap();
        assert_eq!(res, 197);
        assert_eq!(rest, &[0xFF]);
    }

    #[test]
    fn test_parse_le_f32() {
        let data = [0x00, 0x00, 0xF0, 0x42];
        let (rest, res) = parse_le_f32(&data).unwrap();
        assert_eq!(res, 120.0);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_parse_le_f32_short() {
        let err = parse_le_f32(&[0x00, 0x00, 0xF0]).unwrap_err();
        let nom::Err::Error(e) = err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(e.code, ErrorKind::Eof);
    }

    #[test]
    fn test_skip_bytes() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let (rest, ()) = skip_bytes(3)(&data[..]).unwrap();
        assert_eq!(rest, &[0x04]);
        assert!(skip_bytes(5)(&data[..]).is_err());
    }

    #[test]
    fn test_read_null_stripped_string_trailing_pad() {
        let mut data = b"0.808-alpha".to_vec();
        data.resize(32, 0x00);
        data.push(0xAA);
        let (rest, res) = parse_null_stripped_string(32)(&data[..]).unwrap();
        assert_eq!(res, "0.808-alpha");
        assert_eq!(rest, &[0xAA]);
    }

    #[test]
    fn test_read_null_stripped_string_interspersed() {
        let data = b"0\x008\x000\x00";
        let (_rest, res) = parse_null_stripped_string(6)(&data[..]).unwrap();
        assert_eq!(res, "080");
    }

    #[test]
    fn test_read_null_stripped_string_keeps_control_bytes() {
        let data = [0x41, 0x07, 0x00, 0x42];
        let (_rest, res) = parse_null_stripped_string(4)(&data[..]).unwrap();
        assert_eq!(res, "A\u{7}B");
    }

    #[test]
    fn test_read_byte_sized_string() {
        let data = [0x04, 0x6B, 0x69, 0x63, 0x6B, 0x01];
        let (rest, res) = parse_byte_sized_string(&data).unwrap();
        assert_eq!(res, "kick");
        assert_eq!(rest, &[0x01]);
    }

    #[test]
    fn test_read_byte_sized_string_empty() {
        let (rest, res) = parse_byte_sized_string(&[0x00]).unwrap();
        assert_eq!(res, "");
        assert!(rest.is_empty());
    }

    #[test]
    fn test_read_byte_sized_string_short() {
        assert!(parse_byte_sized_string(&[0x05, 0x6B, 0x69]).is_err());
    }

    #[test]
    fn test_parse_note_mask() {
        let data = [1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1];
        let (rest, notes) = parse_note_mask(&data).unwrap();
        assert!(rest.is_empty());
        let active: Vec<usize> = (0..NOTES_PER_TRACK).filter(|&n| notes[n]).collect();
        assert_eq!(active, vec![0, 4, 8, 12, 15]);
    }

    #[test]
    fn test_parse_note_mask_rejects_non_boolean() {
        let data = [1, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0];
        let err = parse_note_mask(&data).unwrap_err();
        let nom::Err::Error(e) = err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(e.code, ErrorKind::Verify);
        assert_eq!(e.input.len(), 12);
        assert_eq!(e.input[0], 2);
    }
}
