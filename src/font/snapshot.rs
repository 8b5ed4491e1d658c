//! # Font Snapshots
//!
//! The structured text form of a font used for persistence, clipboard and
//! file import/export: JSON with the meta fields in camelCase and, per
//! glyph, its metrics, kern entries and each pixel layer as base64 of the
//! raw row-major plane bytes.
//!
//! Each glyph is itself stored as a JSON *string* inside the `glyphs` array,
//! which is the form previously written snapshots use. Glyph objects inline
//! in the array are accepted too.
//!
//! Older snapshots are still readable: a missing `lineSpacing` reads as 0,
//! missing `kernEntries` as an empty table, and a single-layer `pixels`
//! field is promoted to two layers with a blank second layer. Planes
//! shorter than their grid, as some older editors wrote them, are padded
//! with unlit pixels.

use super::{Font, FontMeta, MAX_SETTING};
use crate::bytes::{from_base64, to_base64};
use crate::error::{FontError, Result};
use crate::glyph::{plane_len, Glyph, KernEntry, LAYER_COUNT};
use serde::{Deserialize, Serialize};

/// Largest grid side a font can produce: three settings of at most 100.
const MAX_GRID_SIDE: u32 = 3 * MAX_SETTING;

#[derive(Debug, Serialize, Deserialize)]
struct FontSnapshot {
    meta: FontMeta,
    glyphs: Vec<GlyphRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GlyphRecord {
    Encoded(String),
    Inline(GlyphSnapshot),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlyphSnapshot {
    character: String,
    width: u32,
    height: u32,
    #[serde(default)]
    x_offset: i32,
    #[serde(default)]
    y_offset: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layers: Option<Vec<String>>,
    /// Single-layer field written by older editors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pixels: Option<String>,
    #[serde(default)]
    kern_entries: Vec<KernEntry>,
}

impl From<&Glyph> for GlyphSnapshot {
    fn from(glyph: &Glyph) -> Self {
        Self {
            character: glyph.character.to_string(),
            width: glyph.width,
            height: glyph.height,
            x_offset: glyph.x_offset,
            y_offset: glyph.y_offset,
            layers: Some(glyph.layers.iter().map(|l| to_base64(l)).collect()),
            pixels: None,
            kern_entries: glyph.kern_entries.clone(),
        }
    }
}

impl TryFrom<GlyphSnapshot> for Glyph {
    type Error = FontError;

    fn try_from(snap: GlyphSnapshot) -> Result<Glyph> {
        let mut chars = snap.character.chars();
        let character = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(FontError::InvalidSnapshotField(format!(
                    "glyph character {:?} is not a single code point",
                    snap.character
                )))
            }
        };

        let encoded = match (snap.layers, snap.pixels) {
            (Some(layers), _) => layers,
            (None, Some(pixels)) => vec![pixels],
            (None, None) => Vec::new(),
        };

        if snap.width > MAX_GRID_SIDE || snap.height > MAX_GRID_SIDE {
            return Err(FontError::InvalidSnapshotField(format!(
                "glyph {:?} grid {}x{} exceeds {} per side",
                character, snap.width, snap.height, MAX_GRID_SIDE
            )));
        }

        let needed = plane_len(snap.width, snap.height);
        let mut layers = Vec::with_capacity(LAYER_COUNT.max(encoded.len()));
        for text in &encoded {
            let mut plane = from_base64(text)?;
            plane.resize(needed, 0);
            layers.push(plane);
        }
        while layers.len() < LAYER_COUNT {
            layers.push(vec![0; needed]);
        }

        Ok(Glyph {
            character,
            width: snap.width,
            height: snap.height,
            x_offset: snap.x_offset,
            y_offset: snap.y_offset,
            layers,
            kern_entries: snap.kern_entries,
        })
    }
}

/// Serialize one glyph, e.g. for the clipboard.
pub fn serialize_glyph(glyph: &Glyph) -> Result<String> {
    Ok(serde_json::to_string(&GlyphSnapshot::from(glyph))?)
}

pub fn deserialize_glyph(data: &str) -> Result<Glyph> {
    let snap: GlyphSnapshot = serde_json::from_str(data)?;
    Glyph::try_from(snap)
}

pub fn serialize_font(font: &Font) -> Result<String> {
    let glyphs = font
        .glyphs()
        .iter()
        .map(|g| serialize_glyph(g).map(GlyphRecord::Encoded))
        .collect::<Result<Vec<_>>>()?;
    let snapshot = FontSnapshot {
        meta: font.meta().clone(),
        glyphs,
    };
    Ok(serde_json::to_string(&snapshot)?)
}

pub fn deserialize_font(data: &str) -> Result<Font> {
    let snapshot: FontSnapshot = serde_json::from_str(data)?;
    let glyphs = snapshot
        .glyphs
        .into_iter()
        .map(|record| match record {
            GlyphRecord::Encoded(text) => deserialize_glyph(&text),
            GlyphRecord::Inline(snap) => Glyph::try_from(snap),
        })
        .collect::<Result<Vec<_>>>()?;
    log::debug!("loaded font snapshot with {} glyphs", glyphs.len());
    Ok(Font::with_glyphs(snapshot.meta, glyphs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawn_font() -> Font {
        let font = Font::new(FontMeta::default());
        let a = font
            .glyph('A')
            .unwrap()
            .with_pixel(2, 3, 0, true)
            .with_pixel(7, 9, 1, true);
        let mut b = font.glyph('B').unwrap().clone();
        b.kern_entries.push(KernEntry {
            character: 'A',
            offset: -2,
        });
        font.update_glyph(a).update_glyph(b)
    }

    #[test]
    fn test_font_round_trip() {
        let font = drawn_font();
        let text = serialize_font(&font).unwrap();
        let back = deserialize_font(&text).unwrap();
        assert_eq!(back, font);
    }

    #[test]
    fn test_glyphs_are_stored_as_strings() {
        let text = serialize_font(&drawn_font()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["glyphs"][0].is_string());
        assert_eq!(value["meta"]["defaultWidth"], 14);
        assert_eq!(value["meta"]["twoTone"], true);
    }

    #[test]
    fn test_glyph_round_trip() {
        let glyph = drawn_font().glyph('A').unwrap().clone();
        let text = serialize_glyph(&glyph).unwrap();
        assert!(text.contains("\"kernEntries\""));
        assert_eq!(deserialize_glyph(&text).unwrap(), glyph);
    }

    #[test]
    fn test_legacy_snapshot_defaults() {
        // 3x3 grid, pixel (1, 1) lit: cell 4
        let glyph = r#"{"character":"x","width":3,"height":3,"xOffset":0,"yOffset":0,"pixels":"EAA="}"#;
        let text = format!(
            r#"{{"meta":{{"defaultWidth":3,"defaultHeight":3,"descenderHeight":0,"ascenderHeight":0,"kernWidth":0,"xHeight":2,"letterSpacing":1,"wordSpacing":2}},"glyphs":[{}]}}"#,
            serde_json::to_string(glyph).unwrap()
        );
        let font = deserialize_font(&text).unwrap();
        assert_eq!(font.meta().line_spacing, 0);
        assert!(!font.meta().two_tone);
        assert!(!font.meta().auto_kern);

        let g = font.glyph('x').unwrap();
        assert_eq!(g.layers.len(), 2);
        assert_eq!(g.layers[0], vec![0x10, 0x00]);
        assert_eq!(g.layers[1], vec![0x00, 0x00]);
        assert!(g.kern_entries.is_empty());
        assert!(g.get_pixel(1, 1, 0));
    }

    #[test]
    fn test_inline_glyph_objects_accepted() {
        let text = r#"{"meta":{"defaultWidth":3,"defaultHeight":3,"descenderHeight":0,"ascenderHeight":0,"kernWidth":0,"xHeight":2,"letterSpacing":1,"wordSpacing":2,"lineSpacing":4},
            "glyphs":[{"character":"y","width":3,"height":3,"layers":["AQA=","AAA="],"kernEntries":[{"character":"y","offset":-1}]}]}"#;
        let font = deserialize_font(text).unwrap();
        assert_eq!(font.meta().line_spacing, 4);
        let g = font.glyph('y').unwrap();
        assert!(g.get_pixel(0, 0, 0));
        assert_eq!(g.kern_offset('y'), Some(-1));
    }

    #[test]
    fn test_oversized_plane_is_trimmed() {
        // Editors used to allocate generous planes
        let text = r#"{"character":"z","width":2,"height":2,"layers":["DwAAAAA=","AAAAAAA="]}"#;
        let g = deserialize_glyph(text).unwrap();
        assert_eq!(g.layers[0], vec![0x0f]);
        assert!(g.get_pixel(1, 1, 0));
    }

    #[test]
    fn test_short_legacy_plane_is_padded() {
        // Fonts without descenders were saved with one-byte planes
        let text = r#"{"character":"a","width":4,"height":4,"pixels":"AQ=="}"#;
        let g = deserialize_glyph(text).unwrap();
        assert_eq!(g.layers, vec![vec![0x01, 0x00], vec![0x00, 0x00]]);
        assert!(g.get_pixel(0, 0, 0));
        assert!(!g.get_pixel(3, 3, 0));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let text = r#"{"character":"a","width":4294967295,"height":4294967295}"#;
        assert!(matches!(
            deserialize_glyph(text),
            Err(FontError::InvalidSnapshotField(_))
        ));
        let text = r#"{"character":"a","width":300,"height":301}"#;
        assert!(deserialize_glyph(text).is_err());
        let text = r#"{"character":"a","width":300,"height":300}"#;
        assert_eq!(deserialize_glyph(text).unwrap().layers[0].len(), 11250);
    }

    #[test]
    fn test_multi_char_glyph_rejected() {
        let text = r#"{"character":"ab","width":1,"height":1}"#;
        assert!(matches!(
            deserialize_glyph(text),
            Err(FontError::InvalidSnapshotField(_))
        ));
    }

    #[test]
    fn test_malformed_json_propagates() {
        assert!(matches!(
            deserialize_font("{\"meta\": "),
            Err(FontError::MalformedSnapshot { .. })
        ));
        assert!(matches!(
            deserialize_font("{\"glyphs\": []}"),
            Err(FontError::MalformedSnapshot { .. })
        ));
    }
}
