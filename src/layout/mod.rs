//! # Text Layout
//!
//! Greedy word wrapping with trimmed glyph metrics and pair kerning.
//!
//! Each character advances the pen by `width + x_offset + letter_spacing`,
//! a space by `word_spacing`, plus the kern offset the previous glyph's
//! table holds for it. When a line grows past the maximum width it is
//! broken at its last space, or hard-broken before the current character
//! when the line has no space to break at.

pub mod raster;

use crate::trim::{TrimmedFont, TrimmedGlyph};

pub use raster::{preview_thumbnail, render_text, Ink, Palette, Raster};

/// Characters per line used to size a preview when no width is given.
pub const CHARACTERS_PER_LINE: u32 = 10;

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLine {
    pub chars: Vec<char>,
    pub text: String,
    /// Pen advance across the whole line.
    pub width: i32,
}

impl BrokenLine {
    fn new(font: &TrimmedFont, chars: &[char]) -> Self {
        Self {
            chars: chars.to_vec(),
            text: chars.iter().collect(),
            width: measure_chars(font, chars),
        }
    }
}

/// The glyph drawn for `ch`, or `None` for spaces and characters the font
/// lacks (both draw nothing).
pub fn resolve_glyph(font: &TrimmedFont, ch: char) -> Option<&TrimmedGlyph> {
    if ch == ' ' {
        return None;
    }
    font.glyph(ch)
}

/// Kern adjustment between two neighbouring characters.
pub fn kern_between(font: &TrimmedFont, prev: Option<char>, ch: char) -> i32 {
    prev.and_then(|p| resolve_glyph(font, p))
        .and_then(|g| g.kern_offset(ch))
        .unwrap_or(0)
}

/// Pen advance for `ch` following `prev`, kerning included. Unknown
/// characters advance by nothing.
pub fn char_advance(font: &TrimmedFont, prev: Option<char>, ch: char) -> i32 {
    let m = &font.metrics;
    if ch == ' ' {
        return m.word_spacing as i32;
    }
    match font.glyph(ch) {
        Some(g) => kern_between(font, prev, ch) + g.advance() + m.letter_spacing as i32,
        None => 0,
    }
}

fn measure_chars(font: &TrimmedFont, chars: &[char]) -> i32 {
    let mut prev = None;
    let mut width = 0;
    for &ch in chars {
        width += char_advance(font, prev, ch);
        prev = Some(ch);
    }
    width
}

/// Default preview width for a font: ten default-width characters.
pub fn default_line_width(default_width: u32, letter_spacing: u32) -> u32 {
    (default_width + letter_spacing) * CHARACTERS_PER_LINE
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Pen advance of `text` laid out on a single line.
    pub fn measure_width(&self, font: &TrimmedFont, text: &str) -> i32 {
        let chars: Vec<char> = text.chars().collect();
        measure_chars(font, &chars)
    }

    /// Break `text` into lines no wider than `max_width` where possible.
    /// `\n` always ends a line.
    pub fn break_into_lines(&self, font: &TrimmedFont, text: &str, max_width: i32) -> Vec<BrokenLine> {
        let chars: Vec<char> = text.chars().collect();
        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0;
        let mut last_space: Option<usize> = None;

        for i in 0..chars.len() {
            let ch = chars[i];
            if ch == '\n' {
                lines.push(BrokenLine::new(font, &chars[line_start..i]));
                line_start = i + 1;
                line_width = 0;
                last_space = None;
                continue;
            }
            if ch == ' ' {
                last_space = Some(i);
            }

            let prev = (i > line_start).then(|| chars[i - 1]);
            line_width += char_advance(font, prev, ch);

            if line_width > max_width && i > line_start {
                match last_space.filter(|&sp| sp > line_start) {
                    Some(sp) => {
                        lines.push(BrokenLine::new(font, &chars[line_start..sp]));
                        line_start = sp + 1;
                    }
                    None => {
                        // Unbreakable run wider than the line
                        lines.push(BrokenLine::new(font, &chars[line_start..i]));
                        line_start = i;
                    }
                }
                last_space = None;
                line_width = measure_chars(font, &chars[line_start..=i]);
            }
        }

        lines.push(BrokenLine::new(font, &chars[line_start..]));
        lines
    }
}
