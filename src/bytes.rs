//! # Byte-Format Primitives
//!
//! Typed reads and writes of fixed-width numbers at arbitrary byte offsets,
//! plus the hex and base64 text forms used to move byte buffers around as
//! strings.
//!
//! Every access is bounds-checked and reports [`FontError::Truncated`]
//! instead of panicking, so a short or corrupt buffer surfaces to the caller.

use crate::error::{FontError, Result};
use base64::Engine;

/// Width, signedness and byte order of a number stored in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Int8LE,
    UInt8LE,
    Int16LE,
    UInt16LE,
    Int32LE,
    UInt32LE,
    Int8BE,
    UInt8BE,
    Int16BE,
    UInt16BE,
    Int32BE,
    UInt32BE,
    Float32LE,
    Float64LE,
    Float32BE,
    Float64BE,
}

impl NumberFormat {
    /// Size of the stored value in bytes.
    pub fn size(self) -> usize {
        use NumberFormat::*;
        match self {
            Int8LE | UInt8LE | Int8BE | UInt8BE => 1,
            Int16LE | UInt16LE | Int16BE | UInt16BE => 2,
            Int32LE | UInt32LE | Int32BE | UInt32BE | Float32LE | Float32BE => 4,
            Float64LE | Float64BE => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        use NumberFormat::*;
        matches!(self, Int8LE | Int16LE | Int32LE | Int8BE | Int16BE | Int32BE) || self.is_float()
    }

    pub fn is_big_endian(self) -> bool {
        use NumberFormat::*;
        matches!(
            self,
            Int8BE | UInt8BE | Int16BE | UInt16BE | Int32BE | UInt32BE | Float32BE | Float64BE
        )
    }

    pub fn is_float(self) -> bool {
        use NumberFormat::*;
        matches!(self, Float32LE | Float64LE | Float32BE | Float64BE)
    }
}

fn checked_range(len: usize, offset: usize, size: usize) -> Result<std::ops::Range<usize>> {
    match offset.checked_add(size) {
        Some(end) if end <= len => Ok(offset..end),
        _ => Err(FontError::Truncated {
            offset,
            needed: size,
            len,
        }),
    }
}

/// Read bytes in little-endian order into a fixed array, whatever the
/// stored byte order.
fn read_le<const N: usize>(buf: &[u8], offset: usize, big_endian: bool) -> Result<[u8; N]> {
    let range = checked_range(buf.len(), offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[range]);
    if big_endian {
        out.reverse();
    }
    Ok(out)
}

/// Borrow `len` bytes starting at `offset`.
pub fn get_slice(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let range = checked_range(buf.len(), offset, len)?;
    Ok(&buf[range])
}

/// Read an integer-format value. Float formats are read and truncated
/// toward zero.
pub fn get_int(buf: &[u8], fmt: NumberFormat, offset: usize) -> Result<i64> {
    if fmt.is_float() {
        return get_number(buf, fmt, offset).map(|v| v as i64);
    }
    let size = fmt.size();
    let range = checked_range(buf.len(), offset, size)?;
    let bytes = &buf[range];

    let mut raw: u64 = 0;
    for i in 0..size {
        let b = if fmt.is_big_endian() {
            bytes[i]
        } else {
            bytes[size - 1 - i]
        };
        raw = (raw << 8) | b as u64;
    }

    if fmt.is_signed() {
        // Sign-extend from the stored width
        let shift = 64 - size * 8;
        Ok(((raw << shift) as i64) >> shift)
    } else {
        Ok(raw as i64)
    }
}

/// Read any number format as an `f64`.
pub fn get_number(buf: &[u8], fmt: NumberFormat, offset: usize) -> Result<f64> {
    match fmt.size() {
        4 if fmt.is_float() => {
            let bytes = read_le::<4>(buf, offset, fmt.is_big_endian())?;
            Ok(f32::from_le_bytes(bytes) as f64)
        }
        8 => {
            let bytes = read_le::<8>(buf, offset, fmt.is_big_endian())?;
            Ok(f64::from_le_bytes(bytes))
        }
        _ => get_int(buf, fmt, offset).map(|v| v as f64),
    }
}

/// Write an integer at `offset`. The value is truncated to the format's
/// width (two's complement), so `-1` written as `UInt8LE` stores `0xff`.
pub fn set_int(buf: &mut [u8], fmt: NumberFormat, offset: usize, value: i64) -> Result<()> {
    if fmt.is_float() {
        return set_number(buf, fmt, offset, value as f64);
    }
    let size = fmt.size();
    let range = checked_range(buf.len(), offset, size)?;
    let le = value.to_le_bytes();
    let dst = &mut buf[range];
    for i in 0..size {
        let at = if fmt.is_big_endian() { size - 1 - i } else { i };
        dst[at] = le[i];
    }
    Ok(())
}

/// Write any number format from an `f64`. Integer formats truncate the
/// fractional part first.
pub fn set_number(buf: &mut [u8], fmt: NumberFormat, offset: usize, value: f64) -> Result<()> {
    if !fmt.is_float() {
        return set_int(buf, fmt, offset, value as i64);
    }
    let mut bytes = if fmt.size() == 4 {
        (value as f32).to_le_bytes().to_vec()
    } else {
        value.to_le_bytes().to_vec()
    };
    if fmt.is_big_endian() {
        bytes.reverse();
    }
    let range = checked_range(buf.len(), offset, bytes.len())?;
    buf[range].copy_from_slice(&bytes);
    Ok(())
}

/// Append-only buffer builder. Output is produced by value once complete.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append a number in the given format.
    pub fn put(&mut self, fmt: NumberFormat, value: i64) {
        let at = self.buf.len();
        self.buf.resize(at + fmt.size(), 0);
        // The slot was just reserved, so the write cannot run out of bounds.
        let _ = set_int(&mut self.buf, fmt, at, value);
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ─── Text codecs ────────────────────────────────────────────────

/// Lowercase hex, two digits per byte, no separators.
pub fn to_hex(data: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(data.len() * 2);
    for &b in data {
        out.push(DIGITS[(b >> 4) as usize] as char);
        out.push(DIGITS[(b & 0xf) as usize] as char);
    }
    out
}

/// Parse hex text (either case). Surrounding whitespace is ignored.
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return Err(FontError::InvalidHex(format!(
            "odd number of digits ({})",
            text.len()
        )));
    }
    text.as_bytes()
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let hi = hex_digit(pair[0]);
            let lo = hex_digit(pair[1]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
                _ => Err(FontError::InvalidHex(format!(
                    "non-hex digit at position {}",
                    i * 2
                ))),
            }
        })
        .collect()
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

pub fn to_base64(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

pub fn from_base64(text: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(text.trim())
        .map_err(|e| FontError::InvalidBase64(e.to_string()))
}
