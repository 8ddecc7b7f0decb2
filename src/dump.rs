//! Request and response dumps for `show_http`.
//!
//! These only observe: nothing here reads a response body or touches the
//! request beyond borrowing it.

use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};

pub(crate) fn log_request(request: &reqwest::Request) {
    let body = match request.body() {
        Some(body) => match body.as_bytes() {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => "<binary stream>".to_string(),
        },
        None => String::new(),
    };

    tracing::debug!(
        method = %request.method(),
        url = %request.url(),
        headers = ?redacted(request.headers()),
        body = %body,
        "HTTP request"
    );
}

pub(crate) fn log_response(response: &reqwest::Response) {
    tracing::debug!(
        status = response.status().as_u16(),
        url = %response.url(),
        headers = ?redacted(response.headers()),
        "HTTP response"
    );
}

fn redacted(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();
    if headers.contains_key(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, HeaderValue::from_static("******"));
    }
    headers
}
