//! # Pixfont
//!
//! A bitmap pixel-font toolkit: an editable glyph model, a trimmer that
//! crops glyphs to their ink, a pixel-collision auto-kerner, a compact
//! binary font format for small devices, and a kerning-aware text
//! rasterizer for previews.
//!
//! Fonts are edited on a fixed grid. Every glyph is as wide as the font's
//! default width plus a left bleed for kerning, and as tall as the ascender,
//! body and descender together. Before a font is laid out or encoded, each
//! glyph is trimmed to its bounding box and its position relative to the
//! left guide line and the baseline is kept as an offset.
//!
//! ## Architecture
//!
//! ```text
//! Font snapshot (JSON)
//!       ↓
//!   [font]      FontMeta + Glyph values, immutable edits
//!       ↓
//!   [trim]      Crop to ink, column-major bitmaps, TrimmedFont
//!       ↓
//!   [kern]      Pair offsets from pixel collisions (parallel)
//!       ↓                     ↓
//!   [codec]                 [layout]
//!   binary / hex font       line breaking, raster, PNG preview
//! ```
//!
//! [`bytes`] holds the little-endian number primitives the codec is built
//! on.

pub mod bytes;
pub mod codec;
pub mod error;
pub mod font;
pub mod glyph;
pub mod kern;
pub mod layout;
pub mod trim;

pub use codec::{decode_font, decode_hex, encode_font, hex_encode_font, EncodedFont};
pub use error::{FontError, Result};
pub use font::{Font, FontMeta, MetaField};
pub use glyph::{Glyph, KernEntry};
pub use layout::{preview_thumbnail, render_text, TextLayout};
pub use trim::{trim_glyph, TrimmedFont, TrimmedGlyph};

/// Trim, auto-kern (when the font asks for it) and encode a font snapshot
/// given as JSON, returning the binary font as hex text.
pub fn compile_snapshot(json: &str) -> Result<String> {
    let font = font::deserialize_font(json)?;
    hex_encode_font(&font)
}
