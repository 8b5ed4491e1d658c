//! Integration tests for the pixfont pipeline.
//!
//! These tests exercise the full path from an edited font to its outputs.
//! They verify:
//! - Snapshots survive a save/load cycle, including older snapshot shapes
//! - Trimming, kerning and encoding agree with each other
//! - Encoded fonts decode back to the same layout
//! - Line breaking and rasterizing follow the font metrics

use pixfont::codec::{decode_font, decode_hex, encode_font, FormatVersion, HEADER_LEN};
use pixfont::font::{deserialize_font, serialize_font, Font, FontMeta, MetaField};
use pixfont::glyph::Glyph;
use pixfont::kern::auto_kern_font;
use pixfont::layout::raster::{render_text, Ink};
use pixfont::layout::TextLayout;
use pixfont::trim::TrimmedFont;
use pixfont::FontError;

// ─── Helpers ────────────────────────────────────────────────────

fn plain_meta() -> FontMeta {
    FontMeta {
        two_tone: false,
        auto_kern: false,
        ..FontMeta::default()
    }
}

/// A glyph filling the whole body box: default width by default height,
/// standing on the baseline.
fn block_glyph(meta: &FontMeta, ch: char) -> Glyph {
    let mut glyph = Glyph::new(meta, ch);
    let left = meta.kern_width as i32;
    let top = meta.ascender_height as i32;
    for y in top..top + meta.default_height as i32 {
        for x in left..left + meta.default_width as i32 {
            glyph.set_pixel(x, y, 0, true);
        }
    }
    glyph
}

fn block_font(meta: FontMeta, chars: &str) -> Font {
    let glyphs = chars.chars().map(|c| block_glyph(&meta, c)).collect();
    Font::with_glyphs(meta, glyphs)
}

/// An "L" on the body box and an apostrophe-like tick at its top left.
fn kerning_font(meta: FontMeta) -> Font {
    let left = meta.kern_width as i32;
    let top = meta.ascender_height as i32;
    let bottom = top + meta.default_height as i32 - 1;

    let mut ell = Glyph::new(&meta, 'L');
    for y in top..=bottom {
        ell.set_pixel(left, y, 0, true);
    }
    for x in left..left + 6 {
        ell.set_pixel(x, bottom, 0, true);
    }

    let mut tick = Glyph::new(&meta, '\'');
    tick.set_pixel(left, top, 0, true);
    tick.set_pixel(left, top + 1, 0, true);

    Font::with_glyphs(meta, vec![ell, tick])
}

// ─── Snapshot Tests ─────────────────────────────────────────────

#[test]
fn test_snapshot_round_trip_preserves_font() {
    let meta = FontMeta::default();
    let font = Font::new(meta.clone())
        .update_glyph(block_glyph(&meta, 'A').with_pixel(0, 0, 1, true));
    let json = serialize_font(&font).unwrap();
    let loaded = deserialize_font(&json).unwrap();
    assert_eq!(loaded, font);
}

#[test]
fn test_legacy_snapshot_loads() {
    let json = r#"{
        "meta": {
            "defaultWidth": 3, "defaultHeight": 2, "descenderHeight": 0,
            "ascenderHeight": 0, "kernWidth": 0, "xHeight": 1,
            "letterSpacing": 1, "wordSpacing": 2
        },
        "glyphs": [
            "{\"character\":\"a\",\"width\":3,\"height\":2,\"pixels\":\"PwA=\"}"
        ]
    }"#;
    let font = deserialize_font(json).unwrap();
    assert_eq!(font.meta().line_spacing, 0);
    let glyph = font.glyph('a').unwrap();
    assert_eq!(glyph.layers.len(), 2);
    assert!(glyph.kern_entries.is_empty());
    assert!(glyph.get_pixel(2, 1, 0));
    assert!(!glyph.get_pixel(0, 0, 1));
}

#[test]
fn test_malformed_snapshot_is_an_error() {
    let err = deserialize_font("{\"meta\": {}, \"glyphs\": [").unwrap_err();
    assert!(matches!(err, FontError::MalformedSnapshot { .. }));
}

// ─── Settings Tests ─────────────────────────────────────────────

#[test]
fn test_settings_reject_out_of_range_and_keep_previous() {
    let meta = FontMeta::default();
    let (updated, errors) = meta.apply_settings(&[
        (MetaField::LetterSpacing, "3"),
        (MetaField::WordSpacing, "101"),
        (MetaField::LineSpacing, "abc"),
    ]);
    assert_eq!(updated.letter_spacing, 3);
    assert_eq!(updated.word_spacing, meta.word_spacing);
    assert_eq!(updated.line_spacing, meta.line_spacing);
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_meta_change_keeps_glyphs_on_baseline() {
    let meta = plain_meta();
    let font = block_font(meta.clone(), "A");
    let taller = FontMeta {
        ascender_height: 3,
        kern_width: 4,
        ..meta
    };
    let moved = font.change_font_meta(taller);
    let before = TrimmedFont::from_font(&font);
    let after = TrimmedFont::from_font(&moved);
    let (a, b) = (before.glyph('A').unwrap(), after.glyph('A').unwrap());
    assert_eq!((a.x_offset, a.y_offset), (b.x_offset, b.y_offset));
    assert_eq!((a.width, a.height), (b.width, b.height));
}

// ─── Encoding Tests ─────────────────────────────────────────────

#[test]
fn test_header_metrics_for_default_font() {
    let encoded = encode_font(&block_font(plain_meta(), "A")).unwrap();
    let bytes = encoded.as_bytes();
    assert_eq!(bytes[6], 17);
    assert_eq!(bytes[7], 13);
    assert_eq!(bytes[8], 1);
    assert_eq!(bytes[9], 5);
    assert_eq!(bytes[10], 1);
}

#[test]
fn test_blank_font_encodes_header_only() {
    let encoded = encode_font(&Font::new(plain_meta())).unwrap();
    assert_eq!(encoded.len(), HEADER_LEN);
    let decoded = decode_font(encoded.as_bytes()).unwrap();
    assert_eq!(decoded.header.glyph_count, 0);
}

#[test]
fn test_encode_decode_matches_trimmed_font() {
    let meta = FontMeta {
        auto_kern: true,
        ..FontMeta::default()
    };
    let font = kerning_font(meta).update_glyph(block_glyph(&FontMeta::default(), 'M'));
    let trimmed = TrimmedFont::from_font(&font);

    let hex = pixfont::hex_encode_font(&font).unwrap();
    let decoded = decode_hex(&hex).unwrap();
    assert_eq!(decoded.header.version, FormatVersion::TwoTone);
    assert_eq!(decoded.header.metrics(), trimmed.metrics);
    assert_eq!(decoded.into_trimmed_font(), trimmed);
}

#[test]
fn test_compile_snapshot() {
    let font = block_font(plain_meta(), "AB");
    let json = serialize_font(&font).unwrap();
    let hex = pixfont::compile_snapshot(&json).unwrap();
    assert!(hex.starts_with("dc19f168"));
    assert_eq!(decode_hex(&hex).unwrap().glyphs.len(), 2);
}

// ─── Kerning Tests ──────────────────────────────────────────────

#[test]
fn test_auto_kern_tucks_tick_after_ell() {
    let meta = FontMeta {
        auto_kern: true,
        ..plain_meta()
    };
    let trimmed = TrimmedFont::from_font(&kerning_font(meta));
    let offset = trimmed.glyph('L').unwrap().kern_offset('\'');
    assert!(offset.is_some_and(|o| o < 0));
    // The tick's own right side is flat, nothing tucks after it
    assert_eq!(trimmed.glyph('\'').unwrap().kern_offset('L'), None);
}

#[test]
fn test_auto_kern_disabled_leaves_tables_empty() {
    let trimmed = TrimmedFont::from_font(&kerning_font(plain_meta()));
    assert!(trimmed.glyphs().iter().all(|g| g.kern_entries.is_empty()));
}

#[test]
fn test_auto_kern_font_is_idempotent() {
    let font = kerning_font(plain_meta());
    let once = auto_kern_font(&font);
    assert_eq!(auto_kern_font(&once), once);
}

// ─── Layout Tests ───────────────────────────────────────────────

#[test]
fn test_quick_brown_fox_wraps_at_word() {
    let font = block_font(plain_meta(), "THEQUICKBROWNFX");
    let trimmed = TrimmedFont::from_font(&font);
    let lines = TextLayout::new().break_into_lines(&trimmed, "THE QUICK BROWN FOX", 150);
    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["THE QUICK", "BROWN FOX"]);
}

#[test]
fn test_decoded_font_lays_out_like_source() {
    let font = block_font(plain_meta(), "ABC");
    let trimmed = TrimmedFont::from_font(&font);
    let decoded = decode_font(encode_font(&font).unwrap().as_bytes())
        .unwrap()
        .into_trimmed_font();
    let layout = TextLayout::new();
    assert_eq!(
        layout.break_into_lines(&trimmed, "ABC CBA ABC", 60),
        layout.break_into_lines(&decoded, "ABC CBA ABC", 60)
    );
}

#[test]
fn test_render_block_text() {
    let font = block_font(plain_meta(), "A");
    let trimmed = TrimmedFont::from_font(&font);
    let raster = render_text(&trimmed, "AA", 40, None);
    assert_eq!(raster.height(), 17);
    // Body rows sit between the ascender and the baseline
    assert_eq!(raster.get(0, 1), Ink::Primary);
    assert_eq!(raster.get(13, 12), Ink::Primary);
    assert_eq!(raster.get(14, 5), Ink::Blank);
    assert_eq!(raster.get(15, 5), Ink::Primary);
    assert_eq!(raster.get(0, 13), Ink::Blank);
    assert_eq!(raster.ink_count(), 2 * 14 * 12);
}

#[test]
fn test_preview_thumbnail_is_png_data_uri() {
    let uri = pixfont::preview_thumbnail(&block_font(FontMeta::default(), "Hi"), "Hi").unwrap();
    assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
}
