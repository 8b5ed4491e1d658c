//! # Glyph Trimming
//!
//! Crops a glyph to the bounding box of its lit pixels and re-expresses its
//! position as signed offsets from the font's guide lines:
//!
//! - `x_offset = min_x - kern_width` (left edge relative to the left guide)
//! - `y_offset = min_y - baseline` (top edge relative to the baseline)
//!
//! The cropped pixels are packed **column-major**, one bit per pixel,
//! rows packed into bytes: pixel `(x, y)` is bit `y & 7` of byte
//! `x * ceil(height / 8) + (y >> 3)`. This is the scanout order of the
//! target display hardware and is unrelated to the row-major planes in
//! [`crate::glyph`].

use crate::font::{Font, FontMeta};
use crate::glyph::{Glyph, KernEntry};

/// Bytes per column of a column-major bitmap `height` pixels tall.
pub fn column_bytes(height: u32) -> usize {
    (height as usize).div_ceil(8)
}

/// Total bytes of a column-major bitmap.
pub fn column_major_len(width: u32, height: u32) -> usize {
    width as usize * column_bytes(height)
}

/// Byte index and bit mask of pixel `(x, y)` in a column-major bitmap.
pub fn column_major_bit(height: u32, x: u32, y: u32) -> (usize, u8) {
    (
        x as usize * column_bytes(height) + (y as usize >> 3),
        1 << (y & 7),
    )
}

/// Pack a `width × height` image column-major.
pub fn encode_column_major(width: u32, height: u32, lit: impl Fn(u32, u32) -> bool) -> Vec<u8> {
    let mut out = vec![0u8; column_major_len(width, height)];
    for x in 0..width {
        for y in 0..height {
            if lit(x, y) {
                let (byte, mask) = column_major_bit(height, x, y);
                out[byte] |= mask;
            }
        }
    }
    out
}

/// A cropped glyph as stored in the wire format and consumed by layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedGlyph {
    pub character: char,
    pub width: u32,
    pub height: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    /// Column-major bitmaps, one per encoded layer, each
    /// [`column_major_len`] bytes.
    pub layers: Vec<Vec<u8>>,
    pub kern_entries: Vec<KernEntry>,
}

impl TrimmedGlyph {
    /// A zero-size stand-in for characters the font lacks.
    pub fn placeholder(character: char) -> Self {
        Self {
            character,
            width: 0,
            height: 0,
            x_offset: 0,
            y_offset: 0,
            layers: Vec::new(),
            kern_entries: Vec::new(),
        }
    }

    /// Horizontal distance from the left guide to the right edge.
    pub fn advance(&self) -> i32 {
        self.width as i32 + self.x_offset
    }

    pub fn get_pixel(&self, x: i32, y: i32, layer: usize) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return false;
        }
        let (byte, mask) = column_major_bit(self.height, x as u32, y as u32);
        self.layers
            .get(layer)
            .and_then(|l| l.get(byte))
            .is_some_and(|b| b & mask != 0)
    }

    pub fn is_lit(&self, x: i32, y: i32) -> bool {
        (0..self.layers.len()).any(|layer| self.get_pixel(x, y, layer))
    }

    pub fn kern_offset(&self, next: char) -> Option<i32> {
        self.kern_entries
            .iter()
            .find(|e| e.character == next)
            .map(|e| e.offset)
    }
}

/// Crop `glyph` to its lit pixels. Only the layers the font encodes
/// (one, or two when two-tone) are considered. Returns `None` for a glyph
/// with nothing drawn.
pub fn trim_glyph(glyph: &Glyph, meta: &FontMeta) -> Option<TrimmedGlyph> {
    let layer_count = meta.layer_count().min(glyph.layers.len());
    let lit = |x: i32, y: i32| (0..layer_count).any(|l| glyph.get_pixel(x, y, l));

    let mut bounds: Option<(i32, i32, i32, i32)> = None;
    for y in 0..glyph.height as i32 {
        for x in 0..glyph.width as i32 {
            if lit(x, y) {
                bounds = Some(match bounds {
                    None => (x, x, y, y),
                    Some((min_x, max_x, min_y, max_y)) => {
                        (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
                    }
                });
            }
        }
    }
    let (min_x, max_x, min_y, max_y) = bounds?;

    let width = (max_x - min_x + 1) as u32;
    let height = (max_y - min_y + 1) as u32;
    let layers = (0..layer_count)
        .map(|l| {
            encode_column_major(width, height, |x, y| {
                glyph.get_pixel(min_x + x as i32, min_y + y as i32, l)
            })
        })
        .collect();

    Some(TrimmedGlyph {
        character: glyph.character,
        width,
        height,
        x_offset: min_x - meta.kern_width as i32,
        y_offset: min_y - meta.baseline() as i32,
        layers,
        kern_entries: glyph.kern_entries.clone(),
    })
}

/// Line-level metrics shared by the codec header and the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMetrics {
    pub line_height: u32,
    /// Rows from the top of a line to the baseline.
    pub baseline: u32,
    pub letter_spacing: u32,
    pub word_spacing: u32,
    pub line_spacing: u32,
    pub two_tone: bool,
}

impl From<&FontMeta> for LineMetrics {
    fn from(meta: &FontMeta) -> Self {
        Self {
            line_height: meta.grid_height(),
            baseline: meta.baseline(),
            letter_spacing: meta.letter_spacing,
            word_spacing: meta.word_spacing,
            line_spacing: meta.line_spacing,
            two_tone: meta.two_tone,
        }
    }
}

/// Every drawn glyph of a font, trimmed and sorted by character code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedFont {
    pub metrics: LineMetrics,
    glyphs: Vec<TrimmedGlyph>,
}

impl TrimmedFont {
    /// Trim every glyph of `font`, dropping blank ones. When the font has
    /// auto-kerning enabled the kern tables are recomputed from the trimmed
    /// bitmaps; otherwise each glyph keeps its own table.
    pub fn from_font(font: &Font) -> Self {
        let meta = font.meta();
        let mut glyphs: Vec<TrimmedGlyph> = Vec::with_capacity(font.glyphs().len());
        for glyph in font.glyphs() {
            match trim_glyph(glyph, meta) {
                Some(trimmed) => glyphs.push(trimmed),
                None => log::trace!("skipping empty glyph {:?}", glyph.character),
            }
        }
        log::debug!(
            "trimmed {} of {} glyphs",
            glyphs.len(),
            font.glyphs().len()
        );

        let trimmed = Self::from_glyphs(LineMetrics::from(meta), glyphs);
        if meta.auto_kern {
            trimmed.auto_kerned(meta.default_height)
        } else {
            trimmed
        }
    }

    /// Wrap already-trimmed glyphs, sorting them by character code.
    pub fn from_glyphs(metrics: LineMetrics, mut glyphs: Vec<TrimmedGlyph>) -> Self {
        glyphs.sort_by_key(|g| g.character);
        glyphs.dedup_by_key(|g| g.character);
        Self { metrics, glyphs }
    }

    pub fn glyphs(&self) -> &[TrimmedGlyph] {
        &self.glyphs
    }

    pub fn glyph(&self, character: char) -> Option<&TrimmedGlyph> {
        self.glyphs
            .binary_search_by_key(&character, |g| g.character)
            .ok()
            .map(|i| &self.glyphs[i])
    }

    /// A copy with each glyph's kern table replaced by `tables[i]`.
    pub(crate) fn with_kern_tables(&self, tables: Vec<Vec<KernEntry>>) -> Self {
        let glyphs = self
            .glyphs
            .iter()
            .zip(tables)
            .map(|(g, kern_entries)| TrimmedGlyph {
                kern_entries,
                ..g.clone()
            })
            .collect();
        Self {
            metrics: self.metrics,
            glyphs,
        }
    }
}
