//! Glue between the proxy layer and the filters: decides which filter a
//! response belongs to and whether its body needs replacing.

use crate::content_filter::{ContentFilter, FilterMode};
use crate::decoder::decode_response;
use crate::models::InterceptedResponse;
use log::{debug, warn};
use std::borrow::Cow;
use url::Url;

/// Maps a request URL to the filter its response goes through, if any.
pub fn classify(request_url: &str) -> Option<FilterMode> {
    let url = Url::parse(request_url).ok()?;
    let host = url.host_str()?;
    if !is_google_host(host) {
        return None;
    }

    match url.path() {
        "/complete/search" => Some(FilterMode::Suggestions),
        "/search" => {
            let mut vet = false;
            let mut video = false;
            for (key, value) in url.query_pairs() {
                match (&*key, &*value) {
                    ("vet", _) => vet = true,
                    ("tbm", "vid") | ("udm", "7") => video = true,
                    _ => {}
                }
            }
            Some(if vet {
                FilterMode::Vet
            } else if video {
                FilterMode::VideoPage
            } else {
                FilterMode::SearchPage
            })
        }
        _ => None,
    }
}

fn is_google_host(host: &str) -> bool {
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.starts_with("google.")
}

pub struct Interceptor {
    filter: ContentFilter,
}

impl Interceptor {
    pub fn new(filter: ContentFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    /// Filters one intercepted response.
    ///
    /// `Some(body)` is a decoded replacement body; the caller must drop the
    /// `content-encoding` header along with the old body. `None` means the
    /// response must be delivered exactly as received.
    pub fn process(
        &self,
        request_url: &str,
        response: &InterceptedResponse,
        filter_words: &[String],
    ) -> Option<Vec<u8>> {
        let mode = classify(request_url)?;
        self.process_as(mode, response, filter_words)
    }

    pub fn process_as(
        &self,
        mode: FilterMode,
        response: &InterceptedResponse,
        filter_words: &[String],
    ) -> Option<Vec<u8>> {
        let decoded = decode_response(response);
        if decoded.is_empty() {
            if !response.body.is_empty() {
                warn!("Could not decode {:?} response body, leaving it untouched", mode);
            }
            return None;
        }

        match self.filter.filter_content(mode, &decoded, filter_words) {
            Ok(Cow::Owned(body)) => Some(body),
            Ok(Cow::Borrowed(_)) => {
                debug!("{:?} response unchanged", mode);
                None
            }
            Err(e) => {
                warn!("Filtering {:?} response failed, leaving it untouched: {}", mode, e);
                None
            }
        }
    }
}
