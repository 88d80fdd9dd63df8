use crate::audit::AuditSink;
use crate::content_filter::keywords::KeywordMatcher;
use crate::error::{FilterError, Result};
use crate::models::{AuditAction, AuditKind, AuditRecord};
use log::info;
use serde_json::error::Category;
use serde_json::value::RawValue;
use serde_json::{json, Value};
use std::sync::Arc;

/// Anti-JSON-hijacking prefix in front of autocomplete payloads.
pub const SUGGESTION_PREFIX: &[u8] = b")]}'\n";

const ENVELOPE_SHAPE: &str = "expected [[suggestion, ...], ...]";

/// Drops autocomplete suggestions whose text matches a filter word.
///
/// Payload shape: `)]}'\n[[[text, ...], [text, ...]], ...other fields]`.
#[derive(Clone)]
pub struct SuggestionFilter {
    sink: Arc<dyn AuditSink>,
}

impl SuggestionFilter {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Malformed JSON or an unexpected envelope is returned as an error; the
    /// caller decides whether to pass the raw body through.
    ///
    /// Kept suggestions and trailing fields are spliced back from their raw
    /// source text, so escapes and formatting survive unchanged.
    pub fn filter_content(&self, body: &[u8], filter_words: &[String]) -> Result<Vec<u8>> {
        let (prefix, json_bytes) = match body.strip_prefix(SUGGESTION_PREFIX) {
            Some(rest) => (SUGGESTION_PREFIX, rest),
            None => (&b""[..], body),
        };

        let json = std::str::from_utf8(json_bytes)?;
        let matcher = KeywordMatcher::compile_case_sensitive(filter_words)?;

        let top: Vec<&RawValue> = serde_json::from_str(json).map_err(shape_error)?;
        let (suggestions, trailing) = top
            .split_first()
            .ok_or(FilterError::UnexpectedShape(ENVELOPE_SHAPE))?;
        let entries: Vec<&RawValue> =
            serde_json::from_str(suggestions.get()).map_err(shape_error)?;

        let mut kept = Vec::with_capacity(entries.len());
        for &entry in &entries {
            let value: Value = serde_json::from_str(entry.get())?;
            match value.get(0).and_then(Value::as_str) {
                Some(text) if matcher.is_match(text) => {
                    info!("Filtered out suggestion: {}", text);
                    self.sink.record(AuditRecord::new(
                        AuditKind::SearchSuggestion,
                        AuditAction::Filtered,
                        json!({
                            "text": text,
                            "original_data": value,
                        }),
                        filter_words,
                    ));
                }
                _ => kept.push(entry),
            }
        }

        if kept.len() == entries.len() {
            return Ok(body.to_vec());
        }

        let mut new_body = prefix.to_vec();
        new_body.extend_from_slice(b"[[");
        for (i, entry) in kept.iter().enumerate() {
            if i > 0 {
                new_body.push(b',');
            }
            new_body.extend_from_slice(entry.get().as_bytes());
        }
        new_body.push(b']');
        for field in trailing {
            new_body.push(b',');
            new_body.extend_from_slice(field.get().as_bytes());
        }
        new_body.push(b']');
        Ok(new_body)
    }
}

/// Type mismatches mean the envelope is not the expected shape; anything else
/// is malformed JSON.
fn shape_error(e: serde_json::Error) -> FilterError {
    match e.classify() {
        Category::Data => FilterError::UnexpectedShape(ENVELOPE_SHAPE),
        _ => FilterError::Json(e),
    }
}
