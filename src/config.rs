use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "mongodb://localhost:27017/";
pub const DEFAULT_AUDIT_DATABASE: &str = "google_filter_logs";
pub const DEFAULT_AUDIT_COLLECTION: &str = "filtered_items";

/// Process configuration, read from the environment (and `.env`) at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub database_url: String,
    pub audit_database: String,
    pub audit_collection: String,
    pub audit_log_path: Option<PathBuf>,
    pub rules_path: Option<PathBuf>,
    pub filter_words: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            audit_database: DEFAULT_AUDIT_DATABASE.to_string(),
            audit_collection: DEFAULT_AUDIT_COLLECTION.to_string(),
            audit_log_path: None,
            rules_path: None,
            filter_words: Vec::new(),
        }
    }
}

impl FilterConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            database_url: non_empty("DATABASE_BASE_URL").unwrap_or(defaults.database_url),
            audit_database: non_empty("AUDIT_DB_NAME").unwrap_or(defaults.audit_database),
            audit_collection: non_empty("AUDIT_COLLECTION").unwrap_or(defaults.audit_collection),
            audit_log_path: non_empty("AUDIT_LOG_PATH").map(PathBuf::from),
            rules_path: non_empty("FILTER_RULES_PATH").map(PathBuf::from),
            filter_words: non_empty("FILTER_WORDS")
                .map(|v| parse_word_list(&v))
                .unwrap_or_default(),
        }
    }
}

/// Splits a comma-separated word list, dropping blanks.
pub fn parse_word_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
