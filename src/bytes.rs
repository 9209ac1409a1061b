//! Byte-level decoding primitives shared by the WIN and SEISAN decoders.
//!
//! Covers BCD timestamps, signed integers of 2/3/4/8 bytes in either
//! endianness, and fixed-width ASCII numeric header fields where an
//! all-blank field means "absent", not zero.

use std::str::FromStr;

use crate::types::ByteOrder;
use crate::{Result, SeisError};

/// Decode a packed BCD digit sequence into an unsigned integer.
///
/// Each byte contributes two decimal digits, high nibble first. A low
/// nibble of `0xA` terminates the sequence early (variable-length BCD
/// fields); any other non-decimal nibble is an error.
///
/// # Examples
///
/// ```
/// use seiswave::bytes::decode_bcd;
///
/// assert_eq!(decode_bcd(&[0x12]).unwrap(), 12);
/// assert_eq!(decode_bcd(&[0x20, 0x07]).unwrap(), 2007);
/// ```
pub fn decode_bcd(bytes: &[u8]) -> Result<u32> {
    let mut value: u32 = 0;
    for &b in bytes {
        let hi = b >> 4;
        let lo = b & 0x0F;
        if hi > 9 {
            return Err(SeisError::BadBcd(b));
        }
        value = value * 10 + u32::from(hi);
        if lo == 0x0A {
            return Ok(value);
        }
        if lo > 9 {
            return Err(SeisError::BadBcd(b));
        }
        value = value * 10 + u32::from(lo);
    }
    Ok(value)
}

/// Read a signed integer of `width` bytes (2, 3, 4, or 8) from the start
/// of `data`.
///
/// 3-byte values are sign-extended: a 4th byte of `0x00` or `0xFF` is
/// padded on the most-significant side depending on the sign bit, then the
/// value is widened through `i32`.
pub fn read_int(data: &[u8], byte_order: ByteOrder, width: u8) -> Result<i64> {
    let w = width as usize;
    if data.len() < w {
        return Err(SeisError::Truncated {
            expected: w,
            actual: data.len(),
        });
    }
    let val = match (width, byte_order) {
        (2, ByteOrder::Big) => i64::from(i16::from_be_bytes([data[0], data[1]])),
        (2, ByteOrder::Little) => i64::from(i16::from_le_bytes([data[0], data[1]])),
        (3, ByteOrder::Big) => {
            let ext = if data[0] & 0x80 != 0 { 0xFF } else { 0x00 };
            i64::from(i32::from_be_bytes([ext, data[0], data[1], data[2]]))
        }
        (3, ByteOrder::Little) => {
            let ext = if data[2] & 0x80 != 0 { 0xFF } else { 0x00 };
            i64::from(i32::from_le_bytes([data[0], data[1], data[2], ext]))
        }
        (4, ByteOrder::Big) => i64::from(i32::from_be_bytes([data[0], data[1], data[2], data[3]])),
        (4, ByteOrder::Little) => i64::from(i32::from_le_bytes([data[0], data[1], data[2], data[3]])),
        (8, ByteOrder::Big) => i64::from_be_bytes(data[..8].try_into().unwrap()),
        (8, ByteOrder::Little) => i64::from_le_bytes(data[..8].try_into().unwrap()),
        _ => return Err(SeisError::UnsupportedWidth(width)),
    };
    Ok(val)
}

/// Parse a trimmed fixed-width ASCII numeric field.
///
/// An all-blank field yields `Ok(None)`: absence, never zero. Non-blank
/// content that fails to parse is a format error carrying `offset` (the
/// field's position in its record, for diagnostics).
pub fn parse_ascii_field<T: FromStr>(field: &[u8], offset: usize) -> Result<Option<T>> {
    let text = std::str::from_utf8(field).map_err(|_| SeisError::BadField {
        offset,
        reason: "not ASCII".into(),
    })?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| SeisError::BadField {
            offset,
            reason: format!("unparsable numeric field {trimmed:?}"),
        })
}
