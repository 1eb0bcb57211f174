use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::fields::{FieldMatchers, RecognizedField, comment_ranges, locate_declaration};
use crate::literal::parse_literal_at;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedField {
    pub field: RecognizedField,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Field name to parsed literal, in [`RecognizedField::ALL`] order.
    pub data: Map<String, Value>,
    pub dropped: Vec<DroppedField>,
}

impl Extraction {
    pub fn extracted_fields(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }
}

/// Lift every recognized field's first declaration out of `source`.
///
/// Missing fields are simply absent. A literal that fails to parse drops that
/// field only; the remaining fields are still extracted.
pub fn extract_fields(source: &str, matchers: &FieldMatchers) -> Extraction {
    let comments = comment_ranges(source);
    let mut extraction = Extraction::default();

    for (field, regex) in matchers.iter() {
        let Some(start) = locate_declaration(source, regex, &comments) else {
            continue;
        };
        match parse_literal_at(source, start) {
            Ok(parsed) => {
                extraction
                    .data
                    .insert(field.as_str().to_string(), parsed.value);
            }
            Err(error) => {
                warn!(field = field.as_str(), %error, "dropping unparseable field");
                extraction.dropped.push(DroppedField {
                    field,
                    reason: error.to_string(),
                });
            }
        }
    }
    extraction
}

/// Shallow merge: every key of `extracted` overrides the same key of `defaults`.
pub fn merge_config(defaults: &Map<String, Value>, extracted: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = defaults.clone();
    for (key, value) in extracted {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
