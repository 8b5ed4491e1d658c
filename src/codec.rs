//! # Binary Font Format
//!
//! Serializes a font's trimmed glyphs and kern tables into one compact,
//! self-describing byte buffer for constrained runtimes, and parses such
//! buffers back. Externally the buffer travels as lowercase hex.
//!
//! ## Layout (all multi-byte values little-endian)
//!
//! ```text
//! Header (13 bytes)
//!   [0..4]   magic (format version, single- or two-tone)
//!   [4..6]   glyph count
//!   [6]      line height (ascender + default + descender)
//!   [7]      baseline offset (ascender + default)
//!   [8]      letter spacing
//!   [9]      word spacing
//!   [10]     line spacing
//!   [11..13] longest bitmap entry in bytes
//! Lookup table (4 bytes per glyph, ascending character code)
//!   [0..2]   character code
//!   [2..4]   entry offset, relative to the bitmap section
//! Bitmap entry (per glyph)
//!   [0]      advance width (width + x offset)
//!   [1]      bitmap width
//!   [2]      bitmap height
//!   [3]      x offset (signed, from the left guide)
//!   [4]      y offset (signed, from the baseline)
//!   [5]      kern entry count
//!   kern entries, 3 bytes each: [char code:2][signed offset:1]
//!   layer 0 column-major pixels, then layer 1 when two-tone
//! ```
//!
//! The legacy single-tone format is decoded but never written. It indexes
//! glyphs by a contiguous character range instead of a lookup table:
//!
//! ```text
//! Header (12 bytes)
//!   [0..4]   magic
//!   [4..6]   first character code
//!   [6..8]   last character code
//!   [8]      line height
//!   [9]      baseline offset
//!   [10]     letter spacing
//!   [11]     word spacing
//! Glyph table (7 bytes per code in first..=last, all zero when undrawn)
//!   [0]      advance width
//!   [1]      bitmap width
//!   [2]      bitmap height
//!   [3]      x offset (signed)
//!   [4]      y offset (signed)
//!   [5..7]   pixel offset, relative to the bitmap section
//! Bitmaps: one column-major layer per drawn glyph, no kerning
//! ```

use crate::bytes::{from_hex, get_int, get_slice, to_hex, ByteWriter, NumberFormat};
use crate::error::{FontError, Result};
use crate::font::Font;
use crate::glyph::KernEntry;
use crate::trim::{column_major_len, LineMetrics, TrimmedFont, TrimmedGlyph};

pub const LEGACY_MAGIC: u32 = 0x68f1_19db;
pub const SINGLE_TONE_MAGIC: u32 = 0x68f1_19dc;
pub const TWO_TONE_MAGIC: u32 = 0x68f1_19dd;

pub const HEADER_LEN: usize = 13;
pub const LEGACY_HEADER_LEN: usize = 12;
pub const LOOKUP_ENTRY_LEN: usize = 4;
pub const LEGACY_ENTRY_LEN: usize = 7;
pub const KERN_ENTRY_LEN: usize = 3;

/// Bytes in a bitmap entry before the kern entries.
const ENTRY_HEAD_LEN: usize = 6;

/// Which generation and tone of the format a buffer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    Legacy,
    SingleTone,
    TwoTone,
}

impl FormatVersion {
    pub fn from_magic(magic: u32) -> Result<Self> {
        match magic {
            LEGACY_MAGIC => Ok(FormatVersion::Legacy),
            SINGLE_TONE_MAGIC => Ok(FormatVersion::SingleTone),
            TWO_TONE_MAGIC => Ok(FormatVersion::TwoTone),
            other => Err(FontError::BadMagic(other)),
        }
    }

    pub fn magic(self) -> u32 {
        match self {
            FormatVersion::Legacy => LEGACY_MAGIC,
            FormatVersion::SingleTone => SINGLE_TONE_MAGIC,
            FormatVersion::TwoTone => TWO_TONE_MAGIC,
        }
    }

    pub fn layer_count(self) -> usize {
        match self {
            FormatVersion::TwoTone => 2,
            _ => 1,
        }
    }
}

/// The decoded fixed-size header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontHeader {
    pub version: FormatVersion,
    /// Lookup-table slots. For the legacy format this is the size of the
    /// character range, drawn or not.
    pub glyph_count: u32,
    pub line_height: u8,
    pub baseline: u8,
    pub letter_spacing: u8,
    pub word_spacing: u8,
    /// Always 0 for the legacy format.
    pub line_spacing: u8,
    /// Always 0 for the legacy format.
    pub max_entry_len: u16,
}

impl FontHeader {
    pub fn metrics(&self) -> LineMetrics {
        LineMetrics {
            line_height: self.line_height as u32,
            baseline: self.baseline as u32,
            letter_spacing: self.letter_spacing as u32,
            word_spacing: self.word_spacing as u32,
            line_spacing: self.line_spacing as u32,
            two_tone: self.version == FormatVersion::TwoTone,
        }
    }
}

/// An encoded font buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFont {
    bytes: Vec<u8>,
}

impl EncodedFont {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The transport form: lowercase hex, no separators.
    pub fn to_hex(&self) -> String {
        to_hex(&self.bytes)
    }
}

fn fit_u8(field: &'static str, value: i64) -> Result<i64> {
    if (0..=u8::MAX as i64).contains(&value) {
        Ok(value)
    } else {
        Err(FontError::FieldOverflow { field, value })
    }
}

fn fit_i8(field: &'static str, value: i64) -> Result<i64> {
    if (i8::MIN as i64..=i8::MAX as i64).contains(&value) {
        Ok(value)
    } else {
        Err(FontError::FieldOverflow { field, value })
    }
}

fn fit_u16(field: &'static str, value: i64) -> Result<i64> {
    if (0..=u16::MAX as i64).contains(&value) {
        Ok(value)
    } else {
        Err(FontError::FieldOverflow { field, value })
    }
}

/// Character code in the 16-bit wire field, if it fits.
fn wire_code(ch: char) -> Option<u16> {
    u16::try_from(ch as u32).ok()
}

/// Trim, sort and (when enabled) auto-kern `font`, then encode it.
pub fn encode_font(font: &Font) -> Result<EncodedFont> {
    encode_trimmed(&TrimmedFont::from_font(font))
}

/// Encode `font` and return the hex transport text.
pub fn hex_encode_font(font: &Font) -> Result<String> {
    encode_font(font).map(|e| e.to_hex())
}

/// Encode already-trimmed glyphs in the current format.
pub fn encode_trimmed(font: &TrimmedFont) -> Result<EncodedFont> {
    let metrics = font.metrics;
    let version = if metrics.two_tone {
        FormatVersion::TwoTone
    } else {
        FormatVersion::SingleTone
    };

    let line_height = fit_u8("line height", metrics.line_height as i64)?;
    let baseline = fit_u8("baseline", metrics.baseline as i64)?;
    let letter_spacing = fit_u8("letter spacing", metrics.letter_spacing as i64)?;
    let word_spacing = fit_u8("word spacing", metrics.word_spacing as i64)?;
    let line_spacing = fit_u8("line spacing", metrics.line_spacing as i64)?;

    let glyphs: Vec<&TrimmedGlyph> = font
        .glyphs()
        .iter()
        .filter(|g| {
            let ok = wire_code(g.character).is_some();
            if !ok {
                log::warn!("{:?} is outside the 16-bit code range, not encoded", g.character);
            }
            ok
        })
        .collect();

    let entries = glyphs
        .iter()
        .map(|g| encode_entry(g, version))
        .collect::<Result<Vec<_>>>()?;

    let count = fit_u16("glyph count", glyphs.len() as i64)?;
    let max_entry_len = entries.iter().map(Vec::len).max().unwrap_or(0);

    let mut out = ByteWriter::with_capacity(
        HEADER_LEN
            + LOOKUP_ENTRY_LEN * glyphs.len()
            + entries.iter().map(Vec::len).sum::<usize>(),
    );
    out.put(NumberFormat::UInt32LE, version.magic() as i64);
    out.put(NumberFormat::UInt16LE, count);
    out.put(NumberFormat::UInt8LE, line_height);
    out.put(NumberFormat::UInt8LE, baseline);
    out.put(NumberFormat::UInt8LE, letter_spacing);
    out.put(NumberFormat::UInt8LE, word_spacing);
    out.put(NumberFormat::UInt8LE, line_spacing);
    out.put(NumberFormat::UInt16LE, fit_u16("bitmap entry length", max_entry_len as i64)?);

    let mut offset = 0usize;
    for (glyph, entry) in glyphs.iter().zip(&entries) {
        let code = wire_code(glyph.character).unwrap_or_default();
        out.put(NumberFormat::UInt16LE, code as i64);
        out.put(NumberFormat::UInt16LE, fit_u16("bitmap offset", offset as i64)?);
        offset += entry.len();
    }
    for entry in &entries {
        out.put_bytes(entry);
    }

    let bytes = out.into_bytes();
    log::debug!(
        "encoded {} glyphs ({:?}) into {} bytes",
        glyphs.len(),
        version,
        bytes.len()
    );
    Ok(EncodedFont { bytes })
}

fn encode_entry(glyph: &TrimmedGlyph, version: FormatVersion) -> Result<Vec<u8>> {
    let kern: Vec<(u16, i64)> = glyph
        .kern_entries
        .iter()
        .filter_map(|e| {
            let code = wire_code(e.character)?;
            let offset = e.offset as i64;
            let clamped = offset.clamp(i8::MIN as i64, i8::MAX as i64);
            if clamped != offset {
                log::warn!(
                    "kern {:?}->{:?} offset {} clamped to {}",
                    glyph.character,
                    e.character,
                    offset,
                    clamped
                );
            }
            Some((code, clamped))
        })
        .collect();

    let advance = glyph.advance() as i64;
    if advance < 0 {
        log::warn!("{:?} has negative advance {}, writing 0", glyph.character, advance);
    }

    let layer_len = column_major_len(glyph.width, glyph.height);
    let mut out = ByteWriter::with_capacity(
        ENTRY_HEAD_LEN + KERN_ENTRY_LEN * kern.len() + layer_len * version.layer_count(),
    );
    out.put(NumberFormat::UInt8LE, fit_u8("advance width", advance.max(0))?);
    out.put(NumberFormat::UInt8LE, fit_u8("bitmap width", glyph.width as i64)?);
    out.put(NumberFormat::UInt8LE, fit_u8("bitmap height", glyph.height as i64)?);
    out.put(NumberFormat::Int8LE, fit_i8("x offset", glyph.x_offset as i64)?);
    out.put(NumberFormat::Int8LE, fit_i8("y offset", glyph.y_offset as i64)?);
    out.put(NumberFormat::UInt8LE, fit_u8("kern entry count", kern.len() as i64)?);
    for (code, offset) in kern {
        out.put(NumberFormat::UInt16LE, code as i64);
        out.put(NumberFormat::Int8LE, offset);
    }

    for layer in 0..version.layer_count() {
        match glyph.layers.get(layer) {
            Some(bits) if bits.len() == layer_len => out.put_bytes(bits),
            Some(bits) => {
                return Err(FontError::Corrupt(format!(
                    "layer {} of {:?} is {} bytes, expected {}",
                    layer,
                    glyph.character,
                    bits.len(),
                    layer_len
                )))
            }
            None => out.put_bytes(&vec![0; layer_len]),
        }
    }
    Ok(out.into_bytes())
}

// ─── Decoding ───────────────────────────────────────────────────

/// A parsed font buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFont {
    pub header: FontHeader,
    /// In lookup-table order.
    pub glyphs: Vec<TrimmedGlyph>,
}

impl DecodedFont {
    /// A layout-ready font built from the decoded metrics and glyphs.
    pub fn into_trimmed_font(self) -> TrimmedFont {
        TrimmedFont::from_glyphs(self.header.metrics(), self.glyphs)
    }
}

pub fn decode_hex(text: &str) -> Result<DecodedFont> {
    decode_font(&from_hex(text)?)
}

/// Parse a font buffer of any supported format generation.
pub fn decode_font(buf: &[u8]) -> Result<DecodedFont> {
    let magic = get_int(buf, NumberFormat::UInt32LE, 0)? as u32;
    let decoded = match FormatVersion::from_magic(magic)? {
        FormatVersion::Legacy => decode_legacy(buf)?,
        version => decode_current(buf, version)?,
    };
    log::debug!(
        "decoded {} glyphs ({:?})",
        decoded.glyphs.len(),
        decoded.header.version
    );
    Ok(decoded)
}

fn decode_char(code: u32, what: &str) -> Result<char> {
    char::from_u32(code)
        .ok_or_else(|| FontError::Corrupt(format!("invalid {} code 0x{:04x}", what, code)))
}

fn decode_current(buf: &[u8], version: FormatVersion) -> Result<DecodedFont> {
    let u8_at = |offset: usize| get_int(buf, NumberFormat::UInt8LE, offset).map(|v| v as u8);
    let header = FontHeader {
        version,
        glyph_count: get_int(buf, NumberFormat::UInt16LE, 4)? as u32,
        line_height: u8_at(6)?,
        baseline: u8_at(7)?,
        letter_spacing: u8_at(8)?,
        word_spacing: u8_at(9)?,
        line_spacing: u8_at(10)?,
        max_entry_len: get_int(buf, NumberFormat::UInt16LE, 11)? as u16,
    };

    let count = header.glyph_count as usize;
    let bitmap_start = HEADER_LEN + LOOKUP_ENTRY_LEN * count;

    let mut glyphs = Vec::with_capacity(count);
    for i in 0..count {
        let at = HEADER_LEN + LOOKUP_ENTRY_LEN * i;
        let code = get_int(buf, NumberFormat::UInt16LE, at)? as u32;
        let offset = get_int(buf, NumberFormat::UInt16LE, at + 2)? as usize;
        let character = decode_char(code, "character")?;
        glyphs.push(decode_entry(buf, bitmap_start + offset, character, version)?);
    }
    Ok(DecodedFont { header, glyphs })
}

fn decode_entry(
    buf: &[u8],
    start: usize,
    character: char,
    version: FormatVersion,
) -> Result<TrimmedGlyph> {
    let u8_at = |offset: usize| get_int(buf, NumberFormat::UInt8LE, start + offset);
    let i8_at = |offset: usize| get_int(buf, NumberFormat::Int8LE, start + offset);

    let width = u8_at(1)? as u32;
    let height = u8_at(2)? as u32;
    let x_offset = i8_at(3)? as i32;
    let y_offset = i8_at(4)? as i32;
    let kern_count = u8_at(5)? as usize;

    let mut cursor = start + ENTRY_HEAD_LEN;
    let mut kern_entries = Vec::with_capacity(kern_count);
    for _ in 0..kern_count {
        let code = get_int(buf, NumberFormat::UInt16LE, cursor)? as u32;
        let offset = get_int(buf, NumberFormat::Int8LE, cursor + 2)? as i32;
        kern_entries.push(KernEntry {
            character: decode_char(code, "kern character")?,
            offset,
        });
        cursor += KERN_ENTRY_LEN;
    }

    let layer_len = column_major_len(width, height);
    let mut layers = Vec::with_capacity(version.layer_count());
    for _ in 0..version.layer_count() {
        layers.push(get_slice(buf, cursor, layer_len)?.to_vec());
        cursor += layer_len;
    }

    Ok(TrimmedGlyph {
        character,
        width,
        height,
        x_offset,
        y_offset,
        layers,
        kern_entries,
    })
}

fn decode_legacy(buf: &[u8]) -> Result<DecodedFont> {
    let u8_at = |offset: usize| get_int(buf, NumberFormat::UInt8LE, offset).map(|v| v as u8);
    let first = get_int(buf, NumberFormat::UInt16LE, 4)? as u32;
    let last = get_int(buf, NumberFormat::UInt16LE, 6)? as u32;
    if last < first {
        return Err(FontError::Corrupt(format!(
            "character range 0x{:04x}..=0x{:04x} is empty",
            first, last
        )));
    }
    let count = (last - first + 1) as usize;
    let header = FontHeader {
        version: FormatVersion::Legacy,
        glyph_count: count as u32,
        line_height: u8_at(8)?,
        baseline: u8_at(9)?,
        letter_spacing: u8_at(10)?,
        word_spacing: u8_at(11)?,
        line_spacing: 0,
        max_entry_len: 0,
    };

    let bitmap_start = LEGACY_HEADER_LEN + LEGACY_ENTRY_LEN * count;
    let mut glyphs = Vec::new();
    for (i, code) in (first..=last).enumerate() {
        let at = LEGACY_HEADER_LEN + LEGACY_ENTRY_LEN * i;
        let entry = get_slice(buf, at, LEGACY_ENTRY_LEN)?;
        let (width, height) = (entry[1] as u32, entry[2] as u32);
        // Undrawn codes are all zero
        if width == 0 || height == 0 {
            continue;
        }
        let offset = get_int(entry, NumberFormat::UInt16LE, 5)? as usize;
        let layer = get_slice(buf, bitmap_start + offset, column_major_len(width, height))?;
        glyphs.push(TrimmedGlyph {
            character: decode_char(code, "character")?,
            width,
            height,
            x_offset: entry[3] as i8 as i32,
            y_offset: entry[4] as i8 as i32,
            layers: vec![layer.to_vec()],
            kern_entries: Vec::new(),
        });
    }
    Ok(DecodedFont { header, glyphs })
}
