//! # Pixel Plane
//!
//! The editable glyph: a grid of `width × height` cells with one bit-packed
//! plane per ink layer.
//!
//! Planes are stored **row-major**: cell `(x, y)` lives at index
//! `x + width * y`, in byte `index >> 3`, bit `index & 7`. The wire format
//! uses a different, column-major packing (see [`crate::trim`]); the two
//! never share code.

use crate::font::FontMeta;
use serde::{Deserialize, Serialize};

/// Number of ink planes every glyph carries. Layer 1 is only encoded and
/// drawn when the font is two-tone.
pub const LAYER_COUNT: usize = 2;

/// A pair-kerning adjustment: when `character` follows the owning glyph,
/// move it by `offset` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernEntry {
    pub character: char,
    pub offset: i32,
}

/// The pixel representation and metrics for one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub character: char,
    pub width: u32,
    pub height: u32,
    /// Only meaningful on trimmed glyphs; zero on editing grids.
    pub x_offset: i32,
    pub y_offset: i32,
    pub layers: Vec<Vec<u8>>,
    pub kern_entries: Vec<KernEntry>,
}

/// Bytes needed to hold a row-major plane of `width × height` cells.
pub fn plane_len(width: u32, height: u32) -> usize {
    (width as usize * height as usize).div_ceil(8)
}

/// Byte index and bit mask of cell `(x, y)` in a row-major plane.
///
/// Callers must have bounds-checked `x` and `y`.
pub fn row_major_bit(width: u32, x: u32, y: u32) -> (usize, u8) {
    let cell = x as usize + width as usize * y as usize;
    (cell >> 3, 1 << (cell & 7))
}

impl Glyph {
    /// A blank glyph sized to the font's editing grid.
    pub fn new(meta: &FontMeta, character: char) -> Self {
        Self::blank(character, meta.grid_width(), meta.grid_height())
    }

    pub fn blank(character: char, width: u32, height: u32) -> Self {
        Self {
            character,
            width,
            height,
            x_offset: 0,
            y_offset: 0,
            layers: vec![vec![0; plane_len(width, height)]; LAYER_COUNT],
            kern_entries: Vec::new(),
        }
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Whether the cell is lit on `layer`. Out-of-range cells and missing
    /// layers read as unlit.
    pub fn get_pixel(&self, x: i32, y: i32, layer: usize) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let (byte, mask) = row_major_bit(self.width, x as u32, y as u32);
        self.layers
            .get(layer)
            .and_then(|plane| plane.get(byte))
            .is_some_and(|b| b & mask != 0)
    }

    /// Whether the cell is lit on any layer.
    pub fn is_lit(&self, x: i32, y: i32) -> bool {
        (0..self.layers.len()).any(|layer| self.get_pixel(x, y, layer))
    }

    /// Set or clear a cell. Writes outside the grid are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, layer: usize, on: bool) {
        if !self.in_bounds(x, y) {
            return;
        }
        let (byte, mask) = row_major_bit(self.width, x as u32, y as u32);
        let Some(slot) = self.layers.get_mut(layer).and_then(|p| p.get_mut(byte)) else {
            return;
        };
        if on {
            *slot |= mask;
        } else {
            *slot &= !mask;
        }
    }

    /// A copy of this glyph with one cell changed.
    pub fn with_pixel(&self, x: i32, y: i32, layer: usize, on: bool) -> Self {
        let mut out = self.clone();
        out.set_pixel(x, y, layer, on);
        out
    }

    /// Fresh zeroed planes with the same shape as this glyph's.
    pub fn clear_layers(&self) -> Vec<Vec<u8>> {
        self.layers.iter().map(|plane| vec![0; plane.len()]).collect()
    }

    pub fn cleared(&self) -> Self {
        Self {
            layers: self.clear_layers(),
            ..self.clone()
        }
    }

    /// A copy with every lit pixel moved by `(dx, dy)`. Pixels pushed off
    /// the grid are dropped.
    pub fn shift(&self, dx: i32, dy: i32) -> Self {
        let mut out = self.cleared();
        for layer in 0..self.layers.len() {
            for y in 0..self.height as i32 {
                for x in 0..self.width as i32 {
                    if self.get_pixel(x, y, layer) {
                        out.set_pixel(x + dx, y + dy, layer, true);
                    }
                }
            }
        }
        out
    }

    /// This glyph's pixels relabelled as another character, for paste.
    pub fn pasted_as(&self, character: char) -> Self {
        Self {
            character,
            ..self.clone()
        }
    }

    /// True when no layer has a lit pixel.
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|plane| plane.iter().all(|&b| b == 0))
    }

    /// The kern adjustment for `next` following this glyph, if any.
    pub fn kern_offset(&self, next: char) -> Option<i32> {
        self.kern_entries
            .iter()
            .find(|e| e.character == next)
            .map(|e| e.offset)
    }
}
