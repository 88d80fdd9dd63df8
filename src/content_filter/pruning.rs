use crate::audit::AuditSink;
use crate::content_filter::keywords::KeywordMatcher;
use crate::error::{FilterError, Result};
use crate::models::{AuditAction, AuditKind, AuditRecord, ElementInfo, FilterRule};
use kuchiki::traits::*;
use kuchiki::{ElementData, NodeDataRef, NodeRef};
use log::{debug, info, warn};
use serde_json::json;
use std::borrow::Cow;
use std::sync::Arc;

const BOM: &str = "\u{feff}";

/// Result of one sweep: the re-serialized document and how many elements left it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sweep {
    pub body: Vec<u8>,
    pub removed: usize,
}

/// Removes keyword-matching elements from the containers named by a rule set.
#[derive(Clone)]
pub struct PruningContentFilter {
    sink: Arc<dyn AuditSink>,
}

impl PruningContentFilter {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Multi-container sweep. Always returns the re-serialized document, or the
    /// input unchanged if it could not be processed.
    pub fn prune_page(
        &self,
        html: &[u8],
        filter_words: &[String],
        rules: &[FilterRule],
        kind: AuditKind,
    ) -> Vec<u8> {
        match self.sweep(html, filter_words, rules, kind) {
            Ok(sweep) => {
                debug!("Removed {} elements from page", sweep.removed);
                sweep.body
            }
            Err(e) => {
                warn!("Page filtering failed, passing original through: {}", e);
                html.to_vec()
            }
        }
    }

    /// Single-container sweep. The input is handed back untouched unless
    /// something was actually removed.
    pub fn prune_container<'a>(
        &self,
        html: &'a [u8],
        filter_words: &[String],
        rule: &FilterRule,
        kind: AuditKind,
    ) -> Cow<'a, [u8]> {
        match self.sweep(html, filter_words, std::slice::from_ref(rule), kind) {
            Ok(sweep) if sweep.removed > 0 => {
                info!("Removed {} blocks containing filter words", sweep.removed);
                Cow::Owned(sweep.body)
            }
            Ok(_) => {
                debug!("No content to remove under {}", rule.container);
                Cow::Borrowed(html)
            }
            Err(e) => {
                warn!("Container filtering failed, passing original through: {}", e);
                Cow::Borrowed(html)
            }
        }
    }

    /// Applies `rules` in order and serializes the result.
    ///
    /// Processing order is rule, container match, removal selector, candidate
    /// match, each in document order.
    pub fn sweep(
        &self,
        html: &[u8],
        filter_words: &[String],
        rules: &[FilterRule],
        kind: AuditKind,
    ) -> Result<Sweep> {
        let text = std::str::from_utf8(html)?;
        let matcher = KeywordMatcher::compile(filter_words)?;
        // The tokenizer treats a byte order mark as text, which would demote
        // the doctype. Parse without it and put it back on output.
        let (bom, text) = match text.strip_prefix(BOM) {
            Some(rest) => (BOM, rest),
            None => ("", text),
        };
        let document = kuchiki::parse_html().one(text);

        let mut removed = 0;
        for rule in rules {
            removed += self.apply_rule(&document, rule, &matcher, filter_words, kind)?;
        }

        let mut body = bom.as_bytes().to_vec();
        body.extend(serialize_document(&document, is_fragment(&document, text))?);
        Ok(Sweep { body, removed })
    }

    fn apply_rule(
        &self,
        document: &NodeRef,
        rule: &FilterRule,
        matcher: &KeywordMatcher,
        filter_words: &[String],
        kind: AuditKind,
    ) -> Result<usize> {
        let containers = select_elements(document, &rule.container)?;
        if containers.is_empty() {
            return Ok(0);
        }

        let mut removed = 0;
        for container in &containers {
            let container = container.as_node();
            // Already excised together with an earlier match.
            if !is_attached(container, document) {
                continue;
            }

            let mut preserved: Vec<NodeRef> = Vec::new();
            for preserve_rule in &rule.preserve_rules {
                preserved.extend(
                    select_elements(container, preserve_rule)?
                        .iter()
                        .map(|e| e.as_node().clone()),
                );
            }

            for remove_rule in &rule.remove_rules {
                for candidate in select_elements(container, remove_rule)? {
                    let node = candidate.as_node();
                    if preserved.contains(node) || !is_attached(node, container) {
                        continue;
                    }
                    if !matcher.is_match(&node.text_contents()) {
                        continue;
                    }

                    let element_info = describe(&candidate, remove_rule, &rule.container)?;
                    info!(
                        "Removing <{}> {:?} [rule: {}]",
                        element_info.tag, element_info.classes, remove_rule
                    );
                    self.sink.record(AuditRecord::new(
                        kind,
                        AuditAction::RemovedElement,
                        json!({
                            "element_info": element_info,
                            "container_config": rule,
                        }),
                        filter_words,
                    ));

                    node.detach();
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }
}

fn select_elements(node: &NodeRef, selector: &str) -> Result<Vec<NodeDataRef<ElementData>>> {
    node.select(selector)
        .map(|selection| selection.collect())
        .map_err(|_| FilterError::InvalidSelector(selector.to_string()))
}

fn is_attached(node: &NodeRef, root: &NodeRef) -> bool {
    node.ancestors().any(|ancestor| ancestor == *root)
}

fn describe(element: &NodeDataRef<ElementData>, rule: &str, container: &str) -> Result<ElementInfo> {
    let attributes = element.attributes.borrow();
    let mut content = vec![];
    element.as_node().serialize(&mut content)?;

    Ok(ElementInfo {
        tag: element.name.local.to_string(),
        classes: attributes
            .get("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
        id: attributes.get("id").map(str::to_string),
        rule: rule.to_string(),
        container: container.to_string(),
        content: String::from_utf8_lossy(&content).into_owned(),
    })
}

/// Whether the body is a bare fragment rather than a full document. The parser
/// wraps fragments in `<html><head><body>`, which must not leak into the output.
fn is_fragment(document: &NodeRef, html: &str) -> bool {
    if document.children().any(|child| child.as_doctype().is_some()) {
        return false;
    }

    let lead = skip_comments(html);
    let lead = lead.get(..5).unwrap_or(lead).to_ascii_lowercase();
    !["<html", "<head", "<body"].iter().any(|tag| lead.starts_with(tag))
}

/// Skips leading whitespace and `<!-- -->` comments.
fn skip_comments(html: &str) -> &str {
    let mut rest = html.trim_start();
    while let Some(comment) = rest.strip_prefix("<!--") {
        match comment.find("-->") {
            Some(end) => rest = comment[end + 3..].trim_start(),
            None => return "",
        }
    }
    rest
}

fn serialize_document(document: &NodeRef, fragment: bool) -> Result<Vec<u8>> {
    let mut bytes = vec![];
    if fragment {
        for comment in document.children().filter(|c| c.as_comment().is_some()) {
            comment.serialize(&mut bytes)?;
        }
        for section in ["head", "body"] {
            if let Ok(parent) = document.select_first(section) {
                for child in parent.as_node().children() {
                    child.serialize(&mut bytes)?;
                }
            }
        }
    } else {
        document.serialize(&mut bytes)?;
    }
    Ok(bytes)
}
