use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the rule table: where to look, what to consider removing there,
/// and what must survive regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    pub container: String,
    pub remove_rules: Vec<String>,
    #[serde(default)]
    pub preserve_rules: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FilterRule {
    pub fn new<S: Into<String>>(container: S, remove_rules: &[&str], preserve_rules: &[&str]) -> Self {
        Self {
            container: container.into(),
            remove_rules: remove_rules.iter().map(|s| s.to_string()).collect(),
            preserve_rules: preserve_rules.iter().map(|s| s.to_string()).collect(),
            note: None,
        }
    }

    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.container.as_str())
            .chain(self.remove_rules.iter().map(String::as_str))
            .chain(self.preserve_rules.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    VetPageFilter,
    SearchSuggestion,
    SearchPageFilter,
    VideoPageFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    RemovedElement,
    Filtered,
}

/// An append-only fact describing one removal decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(rename = "type")]
    pub kind: AuditKind,
    pub action: AuditAction,
    pub payload: Value,
    pub filter_words: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl AuditRecord {
    pub fn new(kind: AuditKind, action: AuditAction, payload: Value, filter_words: &[String]) -> Self {
        Self {
            kind,
            action,
            payload,
            filter_words: filter_words.to_vec(),
            timestamp: None,
        }
    }

    /// Stamps the record with the current UTC time. Sinks call this at write time.
    pub fn stamped(mut self) -> Self {
        self.timestamp = Some(Utc::now());
        self
    }
}

/// Identifying details of a removed element, copied out before it is detached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub tag: String,
    pub classes: Vec<String>,
    pub id: Option<String>,
    pub rule: String,
    pub container: String,
    pub content: String,
}

/// A response body together with its headers, as handed over by the proxy layer.
#[derive(Debug, Clone, Default)]
pub struct InterceptedResponse {
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl InterceptedResponse {
    pub fn new(headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
