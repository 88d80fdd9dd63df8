use crate::models::InterceptedResponse;
use flate2::read::MultiGzDecoder;
use log::{debug, warn};
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Brotli,
    Gzip,
    Deflate,
    Identity,
}

impl ContentEncoding {
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "br" => ContentEncoding::Brotli,
            "gzip" => ContentEncoding::Gzip,
            "deflate" => ContentEncoding::Deflate,
            _ => ContentEncoding::Identity,
        }
    }
}

/// Reverses the transport encoding of a response body.
///
/// Never fails: a broken brotli or gzip stream yields an empty body and a
/// warning. `deflate` bodies are returned as-is, they are not inflated.
pub fn decode(body: &[u8], encoding: &str) -> Vec<u8> {
    match ContentEncoding::from_header(encoding) {
        ContentEncoding::Brotli => {
            let mut decoded = Vec::new();
            match brotli::Decompressor::new(body, 4096).read_to_end(&mut decoded) {
                Ok(_) => decoded,
                Err(e) => {
                    warn!("[decode] brotli decompression failed: {}", e);
                    Vec::new()
                }
            }
        }
        ContentEncoding::Gzip => {
            let mut decoded = Vec::new();
            match MultiGzDecoder::new(body).read_to_end(&mut decoded) {
                Ok(_) => decoded,
                Err(e) => {
                    warn!("[decode] gzip decompression failed: {}", e);
                    Vec::new()
                }
            }
        }
        ContentEncoding::Deflate => {
            debug!("[decode] deflate body passed through without inflating");
            body.to_vec()
        }
        ContentEncoding::Identity => body.to_vec(),
    }
}

pub fn decode_response(response: &InterceptedResponse) -> Vec<u8> {
    let encoding = response.header("content-encoding").unwrap_or("");
    decode(&response.body, encoding)
}
