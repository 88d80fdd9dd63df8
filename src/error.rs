use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("response body is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("invalid selector: {0:?}")]
    InvalidSelector(String),

    #[error("invalid filter word pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected JSON shape: {0}")]
    UnexpectedShape(&'static str),

    #[error("failed to read rule file {path}: {source}")]
    RuleFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("audit sink error: {0}")]
    Audit(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
