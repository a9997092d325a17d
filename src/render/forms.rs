//! Form field listing.

use crate::graph::KeyValuePairs;

/// First line of a form listing.
pub const FORMS_HEADER: &str = "Extracted Key-Value Pairs:";

/// Header followed by one `key: value` line per field, sorted by key.
pub fn to_form_text(pairs: &KeyValuePairs) -> String {
    let mut output = String::from(FORMS_HEADER);
    output.push('\n');
    for (key, value) in pairs.sorted() {
        output.push_str(key);
        output.push_str(": ");
        output.push_str(value);
        output.push('\n');
    }
    output
}
