//! Header constants and the payload metadata capability.

use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

/// `Accept` header name.
pub const HEADER_KEY_ACCEPT: &str = "Accept";
/// `Content-Type` header name.
pub const HEADER_KEY_CONTENT_TYPE: &str = "Content-Type";
/// Content type used for JSON bodies.
pub const HEADER_VAL_CONTENT_TYPE_JSON: &str = "application/json";
/// Content type used for raw stream bodies that do not declare one.
pub const HEADER_VAL_CONTENT_TYPE_BINARY_OCTET_STREAM: &str = "binary/octet-stream";

/// Extra headers intrinsic to a request payload.
///
/// Some array operations expect correlation headers that belong to the
/// payload rather than to the call site. Implement this for such payload
/// types and send them with [`Body::json_with_metadata`](crate::Body::json_with_metadata);
/// the headers are merged into the request without overwriting anything
/// already set.
///
/// # Examples
///
/// ```
/// use http::{HeaderMap, HeaderValue};
/// use powermax_api::{Body, MetaData};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct ExpandStorageGroup {
///     name: String,
/// }
///
/// impl MetaData for ExpandStorageGroup {
///     fn metadata(&self) -> HeaderMap {
///         let mut headers = HeaderMap::new();
///         headers.insert("x-request-owner", HeaderValue::from_static("csi"));
///         headers
///     }
/// }
///
/// let body = Body::json_with_metadata(&ExpandStorageGroup { name: "SG1".into() });
/// assert!(!body.is_empty());
/// ```
pub trait MetaData {
    /// Headers to merge into any request carrying this payload.
    fn metadata(&self) -> HeaderMap;
}

/// Assembles the final header set for a request.
///
/// `content_type` is the encoding default chosen for the body, if any. The
/// caller's `Content-Type` wins over it, metadata headers fill only the gaps,
/// and the remaining caller headers are appended.
pub(crate) fn build_headers(
    content_type: Option<HeaderValue>,
    metadata: Option<&HeaderMap>,
    overrides: Option<&HeaderMap>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let content_type_set = match content_type {
        Some(default) => {
            let value = overrides
                .and_then(|o| o.get(CONTENT_TYPE))
                .cloned()
                .unwrap_or(default);
            headers.insert(CONTENT_TYPE, value);
            true
        }
        None => false,
    };

    if let Some(metadata) = metadata {
        for name in metadata.keys() {
            if headers.contains_key(name) {
                continue;
            }
            for value in metadata.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
    }

    if let Some(overrides) = overrides {
        for (name, value) in overrides {
            if *name == CONTENT_TYPE && content_type_set {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
    }

    headers
}
