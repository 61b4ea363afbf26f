use crate::tabular::{decode, ResultSet};

/// Every way a results request can end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Ready(ResultSet),
    /// 202: the service is still working; the body is shown verbatim.
    NotReady(String),
    NotFound,
    /// Success status, but nothing meaningful to show.
    Empty,
    HttpError { status: u16, status_text: String },
    TransportError(String),
    DecodeError(String),
}

impl FetchOutcome {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutcome::Ready(_) => "ready",
            FetchOutcome::NotReady(_) => "not_ready",
            FetchOutcome::NotFound => "not_found",
            FetchOutcome::Empty => "empty",
            FetchOutcome::HttpError { .. } => "http_error",
            FetchOutcome::TransportError(_) => "transport_error",
            FetchOutcome::DecodeError(_) => "decode_error",
        }
    }
}

/// A results response as received, body already converted to text.
#[derive(Debug, Clone, Copy)]
pub struct RawResponse<'a> {
    pub status: u16,
    pub status_text: &'a str,
    pub content_type: Option<&'a str>,
    pub body: &'a str,
}

pub const HTML_PAYLOAD_MESSAGE: &str = "received HTML instead of data; check the API configuration";

/// Classifies a results response.
///
/// Order matters: an HTML page is reported as a decode problem whatever its
/// status, then the status code decides, and only a successful tabular body
/// is checked for emptiness.
pub fn classify(response: &RawResponse<'_>) -> FetchOutcome {
    if looks_like_html(response.body) {
        return FetchOutcome::DecodeError(HTML_PAYLOAD_MESSAGE.to_string());
    }

    match response.status {
        202 => FetchOutcome::NotReady(response.body.to_string()),
        404 => FetchOutcome::NotFound,
        200..=299 => {
            let results = decode(response.body);
            if results.has_content() {
                FetchOutcome::Ready(results)
            } else {
                FetchOutcome::Empty
            }
        }
        status => FetchOutcome::HttpError {
            status,
            status_text: response.status_text.to_string(),
        },
    }
}

/// True when the body carries an HTML document marker (`<!doctype html` or `<html`).
pub fn looks_like_html(body: &str) -> bool {
    contains_ignore_ascii_case(body, "<!doctype html") || contains_ignore_ascii_case(body, "<html")
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
