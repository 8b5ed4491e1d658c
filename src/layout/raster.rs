//! # Rasterizer
//!
//! Draws broken lines of text into an ink buffer and turns it into RGBA
//! images, PNG bytes, or a `data:` URI preview thumbnail.
//!
//! Glyphs are placed with their bitmap origin at
//! `(pen_x + x_offset, line_top + baseline + y_offset)`. Lines are stacked
//! `line_height + line_spacing` apart. Pixels outside the buffer are
//! clipped.

use std::io::Cursor;

use image::{ImageEncoder, Rgba, RgbaImage};

use super::{char_advance, kern_between, resolve_glyph, BrokenLine, TextLayout};
use crate::bytes::to_base64;
use crate::error::Result;
use crate::font::Font;
use crate::trim::{TrimmedFont, TrimmedGlyph};

pub const THUMBNAIL_WIDTH: u32 = 160;
pub const THUMBNAIL_HEIGHT: u32 = 120;

/// What a raster pixel was painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ink {
    #[default]
    Blank,
    /// Layer 0.
    Primary,
    /// Layer 1 of a two-tone font.
    Secondary,
}

/// Colors used when converting ink to RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba<u8>,
    pub primary: Rgba<u8>,
    pub secondary: Rgba<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba([0, 0, 0, 0]),
            primary: Rgba([0, 0, 0, 255]),
            secondary: Rgba([255, 0, 0, 255]),
        }
    }
}

impl Palette {
    fn color(&self, ink: Ink) -> Rgba<u8> {
        match ink {
            Ink::Blank => self.background,
            Ink::Primary => self.primary,
            Ink::Secondary => self.secondary,
        }
    }
}

/// A fixed-size ink buffer, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Ink>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Ink::Blank; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(x as usize + self.width as usize * y as usize)
    }

    /// Ink at `(x, y)`; blank outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Ink {
        self.index(x, y).map_or(Ink::Blank, |i| self.pixels[i])
    }

    pub fn set(&mut self, x: i32, y: i32, ink: Ink) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = ink;
        }
    }

    /// Number of painted pixels.
    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != Ink::Blank).count()
    }

    /// Paint a glyph with its bitmap origin at `(left, top)`. The second
    /// layer wins where both are lit.
    pub fn draw_glyph(&mut self, glyph: &TrimmedGlyph, left: i32, top: i32, two_tone: bool) {
        let layers = if two_tone { glyph.layers.len().min(2) } else { 1 };
        for y in 0..glyph.height as i32 {
            for x in 0..glyph.width as i32 {
                let ink = if layers > 1 && glyph.get_pixel(x, y, 1) {
                    Ink::Secondary
                } else if glyph.get_pixel(x, y, 0) {
                    Ink::Primary
                } else {
                    continue;
                };
                self.set(left + x, top + y, ink);
            }
        }
    }

    pub fn to_rgba_image(&self, palette: &Palette) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            palette.color(self.pixels[x as usize + self.width as usize * y as usize])
        })
    }

    pub fn to_png(&self, palette: &Palette) -> Result<Vec<u8>> {
        let img = self.to_rgba_image(palette);
        let mut buf = Cursor::new(Vec::new());
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        encoder.write_image(img.as_raw(), self.width, self.height, image::ColorType::Rgba8)?;
        Ok(buf.into_inner())
    }

    pub fn to_data_uri(&self, palette: &Palette) -> Result<String> {
        let png = self.to_png(palette)?;
        Ok(format!("data:image/png;base64,{}", to_base64(&png)))
    }
}

/// Draw already broken lines onto `raster`, starting at the top-left.
pub fn draw_lines(raster: &mut Raster, font: &TrimmedFont, lines: &[BrokenLine]) {
    let m = font.metrics;
    let line_step = (m.line_height + m.line_spacing) as i32;

    for (row, line) in lines.iter().enumerate() {
        let line_top = row as i32 * line_step;
        let mut pen_x = 0;
        let mut prev = None;
        for &ch in &line.chars {
            if let Some(glyph) = resolve_glyph(font, ch) {
                let left = pen_x + kern_between(font, prev, ch) + glyph.x_offset;
                let top = line_top + m.baseline as i32 + glyph.y_offset;
                raster.draw_glyph(glyph, left, top, m.two_tone);
            }
            pen_x += char_advance(font, prev, ch);
            prev = Some(ch);
        }
    }
}

/// Height needed to stack `line_count` lines.
pub fn text_height(font: &TrimmedFont, line_count: usize) -> u32 {
    let m = font.metrics;
    match line_count {
        0 => 0,
        n => n as u32 * m.line_height + (n as u32 - 1) * m.line_spacing,
    }
}

/// Lay out and draw `text` wrapped at `max_width`. Without an explicit
/// height the raster is exactly as tall as the lines need.
pub fn render_text(font: &TrimmedFont, text: &str, max_width: u32, height: Option<u32>) -> Raster {
    let lines = TextLayout::new().break_into_lines(font, text, max_width as i32);
    let height = height.unwrap_or_else(|| text_height(font, lines.len()));
    let mut raster = Raster::new(max_width, height);
    draw_lines(&mut raster, font, &lines);
    log::trace!(
        "rendered {} lines into {}x{}",
        lines.len(),
        raster.width(),
        raster.height()
    );
    raster
}

/// A fixed-size PNG preview of `text` in `font`, as a `data:` URI.
pub fn preview_thumbnail(font: &Font, text: &str) -> Result<String> {
    let trimmed = TrimmedFont::from_font(font);
    let raster = render_text(&trimmed, text, THUMBNAIL_WIDTH, Some(THUMBNAIL_HEIGHT));
    let palette = Palette {
        background: Rgba([255, 255, 255, 255]),
        ..Palette::default()
    };
    raster.to_data_uri(&palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::from_base64;
    use crate::trim::{encode_column_major, LineMetrics};

    fn metrics(two_tone: bool) -> LineMetrics {
        LineMetrics {
            line_height: 6,
            baseline: 5,
            letter_spacing: 1,
            word_spacing: 3,
            line_spacing: 1,
            two_tone,
        }
    }

    fn square(ch: char) -> TrimmedGlyph {
        TrimmedGlyph {
            character: ch,
            width: 2,
            height: 2,
            x_offset: 0,
            y_offset: -2,
            layers: vec![
                encode_column_major(2, 2, |_, _| true),
                encode_column_major(2, 2, |x, y| x == 1 && y == 1),
            ],
            kern_entries: Vec::new(),
        }
    }

    #[test]
    fn test_set_clips_outside() {
        let mut raster = Raster::new(2, 2);
        raster.set(-1, 0, Ink::Primary);
        raster.set(2, 1, Ink::Primary);
        raster.set(1, 1, Ink::Primary);
        assert_eq!(raster.ink_count(), 1);
        assert_eq!(raster.get(5, 5), Ink::Blank);
    }

    #[test]
    fn test_glyph_sits_on_baseline() {
        let font = TrimmedFont::from_glyphs(metrics(false), vec![square('a')]);
        let raster = render_text(&font, "a", 10, None);
        assert_eq!(raster.height(), 6);
        // Baseline 5, glyph rises 2 rows
        assert_eq!(raster.get(0, 3), Ink::Primary);
        assert_eq!(raster.get(1, 4), Ink::Primary);
        assert_eq!(raster.get(0, 2), Ink::Blank);
        assert_eq!(raster.get(0, 5), Ink::Blank);
        assert_eq!(raster.ink_count(), 4);
    }

    #[test]
    fn test_two_tone_uses_secondary_ink() {
        let font = TrimmedFont::from_glyphs(metrics(true), vec![square('a')]);
        let raster = render_text(&font, "a", 10, None);
        assert_eq!(raster.get(1, 4), Ink::Secondary);
        assert_eq!(raster.get(0, 4), Ink::Primary);
    }

    #[test]
    fn test_pen_advances_with_spacing() {
        let font = TrimmedFont::from_glyphs(metrics(false), vec![square('a')]);
        let raster = render_text(&font, "a a", 20, None);
        // 'a' is 3 px with spacing, space adds 3
        assert_eq!(raster.get(6, 3), Ink::Primary);
        assert_eq!(raster.get(5, 3), Ink::Blank);
    }

    #[test]
    fn test_lines_stack_with_spacing() {
        let font = TrimmedFont::from_glyphs(metrics(false), vec![square('a')]);
        let raster = render_text(&font, "a\na", 10, None);
        assert_eq!(raster.height(), 13);
        assert_eq!(raster.get(0, 3 + 7), Ink::Primary);
    }

    #[test]
    fn test_png_and_data_uri() {
        let font = TrimmedFont::from_glyphs(metrics(false), vec![square('a')]);
        let raster = render_text(&font, "a", 4, Some(4));
        let png = raster.to_png(&Palette::default()).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);

        let uri = raster.to_data_uri(&Palette::default()).unwrap();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(from_base64(payload).unwrap(), png);
    }

    #[test]
    fn test_rgba_uses_palette() {
        let mut raster = Raster::new(2, 1);
        raster.set(1, 0, Ink::Secondary);
        let img = raster.to_rgba_image(&Palette::default());
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_thumbnail_size() {
        let uri = preview_thumbnail(&Font::default(), "Hello").unwrap();
        let png = from_base64(uri.strip_prefix("data:image/png;base64,").unwrap()).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), THUMBNAIL_WIDTH);
        assert_eq!(img.height(), THUMBNAIL_HEIGHT);
    }
}
