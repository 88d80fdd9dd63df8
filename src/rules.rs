//! The rule table: which containers to sweep on each kind of result page.
//!
//! A catalog is plain data. It is loaded once at startup, validated, and then
//! shared read-only between filter calls.

use crate::error::{FilterError, Result};
use crate::models::FilterRule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const EMBEDDED_RULES: &str = include_str!("../rules/google.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCatalog {
    /// Swept in order on the regular results page.
    pub search_page: Vec<FilterRule>,
    pub video_page: FilterRule,
    pub vet_page: FilterRule,
}

impl RuleCatalog {
    /// The production table compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_RULES)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: RuleCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| FilterError::RuleFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn rules(&self) -> impl Iterator<Item = &FilterRule> {
        self.search_page
            .iter()
            .chain(std::iter::once(&self.video_page))
            .chain(std::iter::once(&self.vet_page))
    }

    /// Rejects any selector the tree query engine cannot compile.
    pub fn validate(&self) -> Result<()> {
        for rule in self.rules() {
            validate_rule(rule)?;
        }
        Ok(())
    }
}

pub fn validate_rule(rule: &FilterRule) -> Result<()> {
    if rule.container.trim().is_empty() {
        return Err(FilterError::InvalidSelector(rule.container.clone()));
    }
    for selector in rule.selectors() {
        kuchiki::Selectors::compile(selector)
            .map_err(|_| FilterError::InvalidSelector(selector.to_string()))?;
    }
    Ok(())
}
