//! CompactSize integers and the length-prefixed byte fields built on them.
//!
//! Every variable-size field in the protocol is prefixed with a CompactSize
//! count:
//!
//! ```text
//! value                      encoding
//! 0x00 ..= 0xFC              1 byte  (the value itself)
//! 0xFD ..= 0xFFFF            0xFD + u16 LE
//! 0x1_0000 ..= 0xFFFF_FFFF   0xFE + u32 LE
//! above                      0xFF + u64 LE
//! ```
//!
//! Reference:
//! https://developer.bitcoin.org/reference/transactions.html#compactsize-unsigned-integers

use crate::wire::error::{Error, Result};
use crate::wire::stream;
use byteorder::{ByteOrder, LittleEndian};
use std::io::{Read, Write};

/// Reads a CompactSize integer.
///
/// Encodings that use a wider form than the value requires are rejected,
/// so every value has exactly one accepted byte representation.
pub fn read_var_int<R: Read + ?Sized>(r: &mut R) -> Result<u64> {
    let mut discriminant = [0u8; 1];
    stream::read_exact(r, &mut discriminant)?;
    let discriminant = discriminant[0];

    let mut buf = [0u8; 8];
    let (value, min) = match discriminant {
        0xFF => {
            stream::read_exact(r, &mut buf)?;
            (LittleEndian::read_u64(&buf), 0x1_0000_0000)
        }
        0xFE => {
            stream::read_exact(r, &mut buf[..4])?;
            (u64::from(LittleEndian::read_u32(&buf[..4])), 0x1_0000)
        }
        0xFD => {
            stream::read_exact(r, &mut buf[..2])?;
            (u64::from(LittleEndian::read_u16(&buf[..2])), 0xFD)
        }
        n => return Ok(u64::from(n)),
    };

    if value < min {
        return Err(Error::NonCanonicalVarInt {
            discriminant,
            value,
            min,
        });
    }

    Ok(value)
}

/// Writes `value` using the smallest CompactSize form.
pub fn write_var_int<W: Write + ?Sized>(w: &mut W, value: u64) -> Result<()> {
    let mut buf = [0u8; 9];
    let len = match value {
        0..=0xFC => {
            buf[0] = value as u8;
            1
        }
        0xFD..=0xFFFF => {
            buf[0] = 0xFD;
            LittleEndian::write_u16(&mut buf[1..3], value as u16);
            3
        }
        0x1_0000..=0xFFFF_FFFF => {
            buf[0] = 0xFE;
            LittleEndian::write_u32(&mut buf[1..5], value as u32);
            5
        }
        _ => {
            buf[0] = 0xFF;
            LittleEndian::write_u64(&mut buf[1..9], value);
            9
        }
    };

    stream::write_all(w, &buf[..len])
}

/// Number of bytes [`write_var_int`] uses for `value`: 1, 3, 5 or 9.
pub const fn var_int_serialize_size(value: u64) -> usize {
    if value < 0xFD {
        1
    } else if value <= 0xFFFF {
        3
    } else if value <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}

/// Reads a CompactSize byte count followed by that many bytes.
///
/// The count is checked against `max` before anything is allocated, so a
/// hostile prefix cannot force a large allocation. `field` names the value
/// in the resulting error.
pub fn read_var_bytes<R: Read + ?Sized>(
    r: &mut R,
    max: u64,
    field: &'static str,
) -> Result<Vec<u8>> {
    let count = read_var_int(r)?;
    if count > max {
        return Err(Error::FieldTooLarge {
            field,
            actual: count,
            max,
        });
    }

    let len = usize::try_from(count).map_err(|_| Error::FieldTooLarge {
        field,
        actual: count,
        max: usize::MAX as u64,
    })?;

    let mut bytes = vec![0u8; len];
    stream::read_exact(r, &mut bytes)?;
    Ok(bytes)
}

/// Writes `bytes` as a CompactSize count followed by the raw bytes.
pub fn write_var_bytes<W: Write + ?Sized>(w: &mut W, bytes: &[u8]) -> Result<()> {
    write_var_int(w, bytes.len() as u64)?;
    stream::write_all(w, bytes)
}
