//! JSON rendering of extracted content.

use crate::error::{Error, Result};
use crate::extract::ExtractedContent;
use serde::Serialize;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any value to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Lines become an array, form fields an object sorted by key.
pub fn content_to_json(content: &ExtractedContent, format: JsonFormat) -> Result<String> {
    match content {
        ExtractedContent::Lines(lines) => to_json(lines, format),
        ExtractedContent::Forms(pairs) => to_json(pairs, format),
    }
}
