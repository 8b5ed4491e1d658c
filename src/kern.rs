//! # Auto-Kerning
//!
//! Computes pair kerning from pixel collisions. For every ordered pair
//! `(a, b)`, `b` is placed right after `a` and slid left one pixel at a time
//! until one of its row-leading pixels would touch a pixel of `a` in the
//! same row or the row above or below. The closest safe position, floored
//! at `-(b.width + 1)`, is the pair's raw offset.
//!
//! Only pairs that pull tighter than normal letter spacing are stored. The
//! tolerance is 0 for fonts shorter than 9 rows and 1 otherwise; a raw
//! offset `k < -tolerance` is stored as `k + tolerance`.
//!
//! Each glyph's table depends only on the shared, read-only glyph set, so
//! the outer loop runs in parallel on the rayon pool.

use crate::font::Font;
use crate::glyph::{Glyph, KernEntry};
use crate::trim::{TrimmedFont, TrimmedGlyph};
use rayon::prelude::*;

/// What the kerning pass needs to know about a glyph.
pub trait KernShape {
    fn character(&self) -> char;
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn x_offset(&self) -> i32;
    fn y_offset(&self) -> i32;
    /// Whether `(x, y)` is lit on any layer; `false` outside the bitmap.
    fn is_lit(&self, x: i32, y: i32) -> bool;
}

impl KernShape for Glyph {
    fn character(&self) -> char {
        self.character
    }
    fn width(&self) -> i32 {
        self.width as i32
    }
    fn height(&self) -> i32 {
        self.height as i32
    }
    fn x_offset(&self) -> i32 {
        self.x_offset
    }
    fn y_offset(&self) -> i32 {
        self.y_offset
    }
    fn is_lit(&self, x: i32, y: i32) -> bool {
        Glyph::is_lit(self, x, y)
    }
}

impl KernShape for TrimmedGlyph {
    fn character(&self) -> char {
        self.character
    }
    fn width(&self) -> i32 {
        self.width as i32
    }
    fn height(&self) -> i32 {
        self.height as i32
    }
    fn x_offset(&self) -> i32 {
        self.x_offset
    }
    fn y_offset(&self) -> i32 {
        self.y_offset
    }
    fn is_lit(&self, x: i32, y: i32) -> bool {
        TrimmedGlyph::is_lit(self, x, y)
    }
}

/// Offsets at or above `-kern_limit` are left to normal letter spacing.
pub fn kern_limit(default_height: u32) -> i32 {
    if default_height < 9 {
        0
    } else {
        1
    }
}

/// The most negative collision-free offset for `next` placed after
/// `glyph`. `None` when `next` has no lit pixel.
pub fn pair_offset<A: KernShape, B: KernShape>(glyph: &A, next: &B) -> Option<i32> {
    let floor = -(next.width() + 1);
    let mut best: Option<i32> = None;

    for y in 0..next.height() {
        let Some(x) = (0..next.width()).find(|&x| next.is_lit(x, y)) else {
            continue;
        };
        let screen_x = x + next.x_offset() + glyph.x_offset() + glyph.width();
        let screen_y = y + next.y_offset();
        let gy = screen_y - glyph.y_offset();

        let mut offset = 0;
        while screen_x + offset > 0 {
            offset -= 1;
            let gx = screen_x + offset - glyph.x_offset();
            if (-1..=1).any(|dy| glyph.is_lit(gx, gy + dy)) {
                break;
            }
        }

        let row = (offset + 1).max(floor);
        best = Some(best.map_or(row, |b| b.max(row)));
    }

    best
}

/// The kern table for `glyph` against every glyph in `all`, itself
/// included.
pub fn kern_table<G: KernShape>(glyph: &G, all: &[G], limit: i32) -> Vec<KernEntry> {
    all.iter()
        .filter_map(|next| {
            let offset = pair_offset(glyph, next)?;
            (offset < -limit).then(|| KernEntry {
                character: next.character(),
                offset: offset + limit,
            })
        })
        .collect()
}

/// Kern tables for every glyph, in input order.
pub fn auto_kern<G: KernShape + Sync>(glyphs: &[G], default_height: u32) -> Vec<Vec<KernEntry>> {
    let limit = kern_limit(default_height);
    let tables: Vec<Vec<KernEntry>> = glyphs
        .par_iter()
        .map(|glyph| kern_table(glyph, glyphs, limit))
        .collect();
    log::debug!(
        "auto-kern: {} glyphs, {} pair entries",
        glyphs.len(),
        tables.iter().map(Vec::len).sum::<usize>()
    );
    tables
}

/// A copy of `font` with every glyph's kern table recomputed from its
/// editing grid.
pub fn auto_kern_font(font: &Font) -> Font {
    let tables = auto_kern(font.glyphs(), font.meta().default_height);
    font.with_kern_tables(tables)
}

impl TrimmedFont {
    /// A copy with every kern table recomputed from the trimmed bitmaps.
    pub fn auto_kerned(&self, default_height: u32) -> TrimmedFont {
        let tables = auto_kern(self.glyphs(), default_height);
        self.with_kern_tables(tables)
    }
}
