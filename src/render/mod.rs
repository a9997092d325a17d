//! Rendering extracted content for output.

mod forms;
mod json;
mod text;

pub use forms::{to_form_text, FORMS_HEADER};
pub use json::{content_to_json, to_json, JsonFormat};
pub use text::to_text;

use crate::error::Result;
use crate::extract::ExtractedContent;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Lines, or a header followed by `key: value` lines
    #[default]
    Text,
    /// JSON array of lines, or JSON object of pairs
    Json(JsonFormat),
}

/// Render extracted content in the given format.
pub fn render(content: &ExtractedContent, format: OutputFormat) -> Result<String> {
    match (format, content) {
        (OutputFormat::Text, ExtractedContent::Lines(lines)) => Ok(to_text(lines)),
        (OutputFormat::Text, ExtractedContent::Forms(pairs)) => Ok(to_form_text(pairs)),
        (OutputFormat::Json(json_format), content) => content_to_json(content, json_format),
    }
}
