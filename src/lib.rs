pub mod audit;
pub mod config;
pub mod content_filter;
pub mod decoder;
pub mod error;
pub mod interceptor;
pub mod models;
pub mod rules;

pub use content_filter::{ContentFilter, FilterMode};
pub use error::{FilterError, Result};
pub use interceptor::Interceptor;
