//! # Font Model
//!
//! A [`Font`] is a [`FontMeta`] plus one [`Glyph`] per character. Fonts are
//! values: every edit (a glyph commit, a settings change, clearing) returns
//! a new `Font` and leaves the receiver untouched, so callers can keep old
//! snapshots around for undo or share them freely between renders.

pub mod snapshot;

use crate::error::{FontError, Result};
use crate::glyph::Glyph;
use serde::{Deserialize, Serialize};

pub use snapshot::{deserialize_font, deserialize_glyph, serialize_font, serialize_glyph};

/// Characters that get a blank glyph in a brand new font.
pub const DEFAULT_CHARACTERS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,?!:;\"'*+-=<>()[]{}/\\#$%&@^_`|~";

/// Upper bound for every numeric font setting.
pub const MAX_SETTING: u32 = 100;

/// Font-wide dimensions, guide lines and spacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMeta {
    /// Width of a glyph's drawing area, excluding the left bleed.
    pub default_width: u32,
    /// Height from the top line to the baseline.
    pub default_height: u32,
    /// Rows a glyph may extend below the baseline.
    pub descender_height: u32,
    /// Rows a glyph may extend above the top line.
    pub ascender_height: u32,
    /// Columns a glyph may extend left of the left guide line.
    pub kern_width: u32,
    /// Height of lowercase letters; a drawing guide only.
    pub x_height: u32,
    pub letter_spacing: u32,
    /// Advance of the space character.
    pub word_spacing: u32,
    #[serde(default)]
    pub line_spacing: u32,
    #[serde(default)]
    pub two_tone: bool,
    #[serde(default)]
    pub monospace: bool,
    #[serde(default)]
    pub auto_kern: bool,
}

impl Default for FontMeta {
    fn default() -> Self {
        Self {
            default_width: 14,
            default_height: 12,
            descender_height: 4,
            ascender_height: 1,
            kern_width: 2,
            x_height: 6,
            letter_spacing: 1,
            word_spacing: 5,
            line_spacing: 1,
            two_tone: true,
            monospace: false,
            auto_kern: true,
        }
    }
}

impl FontMeta {
    /// Width of every glyph's editing grid.
    pub fn grid_width(&self) -> u32 {
        self.kern_width + self.default_width
    }

    /// Height of every glyph's editing grid; also the encoded line height.
    pub fn grid_height(&self) -> u32 {
        self.ascender_height + self.default_height + self.descender_height
    }

    /// Row of the baseline, counted from the top of the grid.
    pub fn baseline(&self) -> u32 {
        self.ascender_height + self.default_height
    }

    pub fn layer_count(&self) -> usize {
        if self.two_tone {
            2
        } else {
            1
        }
    }

    pub fn get(&self, field: MetaField) -> u32 {
        match field {
            MetaField::DefaultWidth => self.default_width,
            MetaField::DefaultHeight => self.default_height,
            MetaField::XHeight => self.x_height,
            MetaField::DescenderHeight => self.descender_height,
            MetaField::AscenderHeight => self.ascender_height,
            MetaField::KernWidth => self.kern_width,
            MetaField::LetterSpacing => self.letter_spacing,
            MetaField::WordSpacing => self.word_spacing,
            MetaField::LineSpacing => self.line_spacing,
        }
    }

    fn slot(&mut self, field: MetaField) -> &mut u32 {
        match field {
            MetaField::DefaultWidth => &mut self.default_width,
            MetaField::DefaultHeight => &mut self.default_height,
            MetaField::XHeight => &mut self.x_height,
            MetaField::DescenderHeight => &mut self.descender_height,
            MetaField::AscenderHeight => &mut self.ascender_height,
            MetaField::KernWidth => &mut self.kern_width,
            MetaField::LetterSpacing => &mut self.letter_spacing,
            MetaField::WordSpacing => &mut self.word_spacing,
            MetaField::LineSpacing => &mut self.line_spacing,
        }
    }

    /// Parse and validate one settings input, returning the updated meta.
    pub fn with_field(&self, field: MetaField, input: &str) -> Result<FontMeta> {
        let value = validate_setting(field, input)?;
        let mut meta = self.clone();
        *meta.slot(field) = value;
        Ok(meta)
    }

    /// Apply a batch of settings inputs. A rejected input keeps the field's
    /// previous value; the rejections are returned alongside the new meta.
    pub fn apply_settings(&self, inputs: &[(MetaField, &str)]) -> (FontMeta, Vec<FontError>) {
        let mut meta = self.clone();
        let mut rejected = Vec::new();
        for &(field, input) in inputs {
            match validate_setting(field, input) {
                Ok(value) => *meta.slot(field) = value,
                Err(e) => {
                    log::warn!("keeping {} = {}: {}", field.name(), meta.get(field), e);
                    rejected.push(e);
                }
            }
        }
        (meta, rejected)
    }
}

/// The numeric settings a user can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaField {
    DefaultWidth,
    DefaultHeight,
    XHeight,
    DescenderHeight,
    AscenderHeight,
    KernWidth,
    LetterSpacing,
    WordSpacing,
    LineSpacing,
}

impl MetaField {
    pub const ALL: [MetaField; 9] = [
        MetaField::DefaultWidth,
        MetaField::DefaultHeight,
        MetaField::XHeight,
        MetaField::DescenderHeight,
        MetaField::AscenderHeight,
        MetaField::KernWidth,
        MetaField::LetterSpacing,
        MetaField::WordSpacing,
        MetaField::LineSpacing,
    ];

    /// The field's snapshot key.
    pub fn name(self) -> &'static str {
        match self {
            MetaField::DefaultWidth => "defaultWidth",
            MetaField::DefaultHeight => "defaultHeight",
            MetaField::XHeight => "xHeight",
            MetaField::DescenderHeight => "descenderHeight",
            MetaField::AscenderHeight => "ascenderHeight",
            MetaField::KernWidth => "kernWidth",
            MetaField::LetterSpacing => "letterSpacing",
            MetaField::WordSpacing => "wordSpacing",
            MetaField::LineSpacing => "lineSpacing",
        }
    }
}

/// Parse a settings input as an integer in `0..=100`.
pub fn validate_setting(field: MetaField, input: &str) -> Result<u32> {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|v| *v <= MAX_SETTING)
        .ok_or_else(|| FontError::Validation {
            field: field.name(),
            input: input.to_string(),
        })
}

/// A bitmap font: settings plus glyphs with unique characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    meta: FontMeta,
    glyphs: Vec<Glyph>,
}

impl Font {
    /// A font with a blank glyph for each of [`DEFAULT_CHARACTERS`].
    pub fn new(meta: FontMeta) -> Self {
        let glyphs = DEFAULT_CHARACTERS
            .chars()
            .map(|ch| Glyph::new(&meta, ch))
            .collect();
        Self { meta, glyphs }
    }

    /// Build a font from existing glyphs. When a character appears more than
    /// once, the first glyph wins.
    pub fn with_glyphs(meta: FontMeta, glyphs: Vec<Glyph>) -> Self {
        let mut unique: Vec<Glyph> = Vec::with_capacity(glyphs.len());
        for glyph in glyphs {
            if unique.iter().any(|g| g.character == glyph.character) {
                log::warn!("dropping duplicate glyph for {:?}", glyph.character);
                continue;
            }
            unique.push(glyph);
        }
        Self {
            meta,
            glyphs: unique,
        }
    }

    pub fn meta(&self) -> &FontMeta {
        &self.meta
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn glyph(&self, character: char) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.character == character)
    }

    /// A new font with `glyph` replacing the glyph of the same character,
    /// or appended when the character is new.
    pub fn update_glyph(&self, glyph: Glyph) -> Font {
        let mut glyphs = self.glyphs.clone();
        match glyphs.iter_mut().find(|g| g.character == glyph.character) {
            Some(slot) => *slot = glyph,
            None => glyphs.push(glyph),
        }
        Font {
            meta: self.meta.clone(),
            glyphs,
        }
    }

    /// A new font with every glyph's pixels cleared.
    pub fn clear_all_glyphs(&self) -> Font {
        Font {
            meta: self.meta.clone(),
            glyphs: self.glyphs.iter().map(Glyph::cleared).collect(),
        }
    }

    /// A new font using `meta`. Every glyph is moved onto the new grid with
    /// its pixels anchored to the left guide line and the baseline; pixels
    /// that no longer fit are dropped.
    pub fn change_font_meta(&self, meta: FontMeta) -> Font {
        let glyphs = self
            .glyphs
            .iter()
            .map(|g| regrid(g, &self.meta, &meta))
            .collect();
        Font { meta, glyphs }
    }

    /// A new font with each glyph's kern table replaced by `tables[i]`.
    pub(crate) fn with_kern_tables(&self, tables: Vec<Vec<crate::glyph::KernEntry>>) -> Font {
        let glyphs = self
            .glyphs
            .iter()
            .zip(tables)
            .map(|(g, kern_entries)| Glyph {
                kern_entries,
                ..g.clone()
            })
            .collect();
        Font {
            meta: self.meta.clone(),
            glyphs,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::new(FontMeta::default())
    }
}

fn regrid(glyph: &Glyph, from: &FontMeta, to: &FontMeta) -> Glyph {
    let dx = to.kern_width as i32 - from.kern_width as i32;
    let dy = to.baseline() as i32 - from.baseline() as i32;

    let mut out = Glyph::new(to, glyph.character);
    out.kern_entries = glyph.kern_entries.clone();
    for layer in 0..glyph.layers.len() {
        for y in 0..glyph.height as i32 {
            for x in 0..glyph.width as i32 {
                if glyph.get_pixel(x, y, layer) {
                    out.set_pixel(x + dx, y + dy, layer, true);
                }
            }
        }
    }
    out
}
