use crate::audit::AuditSink;
use crate::error::Result;
use crate::models::AuditKind;
use crate::rules::RuleCatalog;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;

pub mod keywords;
pub mod pruning;
pub mod suggestions;

pub use keywords::KeywordMatcher;
pub use pruning::{PruningContentFilter, Sweep};
pub use suggestions::{SuggestionFilter, SUGGESTION_PREFIX};

/// Which filter a response body goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    SearchPage,
    VideoPage,
    Vet,
    Suggestions,
}

impl FilterMode {
    pub fn audit_kind(self) -> AuditKind {
        match self {
            FilterMode::SearchPage => AuditKind::SearchPageFilter,
            FilterMode::VideoPage => AuditKind::VideoPageFilter,
            FilterMode::Vet => AuditKind::VetPageFilter,
            FilterMode::Suggestions => AuditKind::SearchSuggestion,
        }
    }
}

/// All filters over one shared, read-only rule catalog and audit sink.
#[derive(Clone)]
pub struct ContentFilter {
    catalog: Arc<RuleCatalog>,
    pruning: PruningContentFilter,
    suggestions: SuggestionFilter,
}

impl ContentFilter {
    pub fn new(catalog: RuleCatalog, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            pruning: PruningContentFilter::new(sink.clone()),
            suggestions: SuggestionFilter::new(sink),
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Sweeps every search-page rule. Always re-serializes.
    pub fn filter_search_page(&self, html: &[u8], filter_words: &[String]) -> Vec<u8> {
        self.pruning.prune_page(
            html,
            filter_words,
            &self.catalog.search_page,
            AuditKind::SearchPageFilter,
        )
    }

    pub fn filter_video_page<'a>(&self, html: &'a [u8], filter_words: &[String]) -> Cow<'a, [u8]> {
        self.pruning.prune_container(
            html,
            filter_words,
            &self.catalog.video_page,
            AuditKind::VideoPageFilter,
        )
    }

    /// Responses of the `search?vet=` endpoint.
    pub fn filter_vet<'a>(&self, html: &'a [u8], filter_words: &[String]) -> Cow<'a, [u8]> {
        self.pruning.prune_container(
            html,
            filter_words,
            &self.catalog.vet_page,
            AuditKind::VetPageFilter,
        )
    }

    pub fn filter_suggestions(&self, body: &[u8], filter_words: &[String]) -> Result<Vec<u8>> {
        self.suggestions.filter_content(body, filter_words)
    }

    /// Runs the filter for `mode`. `Cow::Borrowed` means the body came back untouched.
    pub fn filter_content<'a>(
        &self,
        mode: FilterMode,
        body: &'a [u8],
        filter_words: &[String],
    ) -> Result<Cow<'a, [u8]>> {
        Ok(match mode {
            FilterMode::SearchPage => Cow::Owned(self.filter_search_page(body, filter_words)),
            FilterMode::VideoPage => self.filter_video_page(body, filter_words),
            FilterMode::Vet => self.filter_vet(body, filter_words),
            FilterMode::Suggestions => Cow::Owned(self.filter_suggestions(body, filter_words)?),
        })
    }
}
