//! Structured error types for pixfont.
//!
//! Geometry and layout never fail. Errors come from settings validation,
//! the binary wire format and its hex/base64 text forms, structured font
//! snapshots, and PNG encoding of previews.

use thiserror::Error;

/// The unified error type returned by all fallible pixfont functions.
#[derive(Debug, Error)]
pub enum FontError {
    /// A font setting was outside `[0, 100]` or not a number. Callers keep
    /// the previous value.
    #[error("invalid value '{input}' for {field}: expected an integer in 0..=100")]
    Validation { field: &'static str, input: String },

    /// A read or write ran past the end of a byte buffer.
    #[error("buffer truncated: {needed} bytes needed at offset {offset}, buffer is {len} bytes")]
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// The buffer does not start with a known font format magic.
    #[error("unrecognized font format magic 0x{0:08x}")]
    BadMagic(u32),

    #[error("invalid hex text: {0}")]
    InvalidHex(String),

    #[error("invalid base64 text: {0}")]
    InvalidBase64(String),

    /// The buffer has a known magic but its contents are inconsistent.
    #[error("corrupt font data: {0}")]
    Corrupt(String),

    /// A value does not fit the field the wire format reserves for it.
    #[error("{field} value {value} does not fit the encoded field")]
    FieldOverflow { field: &'static str, value: i64 },

    /// A font snapshot failed to parse as JSON or did not match the schema.
    #[error("failed to parse font snapshot: {source}{}", format_hint(.hint))]
    MalformedSnapshot {
        source: serde_json::Error,
        hint: String,
    },

    /// A snapshot parsed but carries a value the model cannot hold.
    #[error("invalid snapshot field: {0}")]
    InvalidSnapshotField(String),

    /// Encoding a rendered preview as PNG failed.
    #[error("failed to encode preview image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, FontError>;

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FontError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the font snapshot schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the snapshot truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FontError::MalformedSnapshot { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_error_has_hint() {
        let err: FontError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.contains("failed to parse font snapshot"));
        assert!(msg.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn test_eof_hint() {
        let err: FontError = serde_json::from_str::<serde_json::Value>("{\"meta\":")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_validation_message() {
        let err = FontError::Validation {
            field: "letterSpacing",
            input: "120".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value '120' for letterSpacing: expected an integer in 0..=100"
        );
    }
}
