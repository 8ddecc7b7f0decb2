//! Error types for calls against the management REST API.
//!
//! Every failure is returned to the immediate caller. Construction problems
//! (bad host, unusable trust store, unreadable certificate) surface from
//! [`Client::new`](crate::Client::new); everything else surfaces per call.
//! Non-2xx responses always become an [`ApiError`], never a transport error.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The main error type for the transport client.
///
/// # Examples
///
/// ```no_run
/// use powermax_api::{Client, ClientOptions, Context, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new("https://array.example.com", ClientOptions::default())?;
/// let ctx = Context::background();
///
/// match client.get::<serde_json::Value>(&ctx, "/sloprovisioning/symmetrix", None).await {
///     Ok(data) => println!("Arrays: {:?}", data),
///     Err(Error::Api(api)) if api.http_status_code == 404 => eprintln!("not found: {}", api.message),
///     Err(e) if e.is_transport() => eprintln!("array unreachable: {}", e),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid construction input, such as an empty host.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The platform could not produce a system trust store.
    #[error("Unable to initialize cert pool from system: {0}")]
    TrustStore(String),

    /// The extra CA certificate file could not be read.
    #[error("Unable to read certificate file {}: {source}", .path.display())]
    CertificateLoad {
        /// Path that was configured
        path: PathBuf,
        /// The underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The extra CA certificate file held no usable PEM certificates.
    #[error("Failed to append certificate {} to pool: {reason}", .path.display())]
    CertificateAppend {
        /// Path that was configured
        path: PathBuf,
        /// Why the contents were rejected
        reason: String,
    },

    /// The host and path did not join into a parseable URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request body could not be encoded as JSON.
    ///
    /// No network I/O was attempted.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// A network-level error occurred (DNS, connect, TLS handshake, client timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The caller's context was cancelled before the exchange finished.
    #[error("Request cancelled")]
    Cancelled,

    /// The caller's context deadline passed before the exchange finished.
    #[error("Request timed out")]
    Timeout,

    /// A successful response could not be decoded into the requested type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// Returns `true` if no HTTP response was obtained.
    ///
    /// Covers network failures as well as caller cancellation and deadlines.
    ///
    /// ```
    /// use powermax_api::Error;
    ///
    /// assert!(Error::Cancelled.is_transport());
    /// assert!(!Error::ConfigurationError("missing endpoint".into()).is_transport());
    /// ```
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Cancelled | Error::Timeout)
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(api) => StatusCode::from_u16(api.http_status_code).ok(),
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the structured error if the server answered with a non-2xx status.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }
}

/// The structured error returned for any non-2xx response.
///
/// Decoded from the array's JSON error body when possible. The status code is
/// always the one observed on the wire, regardless of what the body claims.
/// Unknown vendor fields are kept in `details`.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[error("{message} (HTTP {http_status_code})")]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// HTTP status code of the response
    #[serde(default)]
    pub http_status_code: u16,

    /// Human-readable message
    #[serde(default)]
    pub message: String,

    /// Array-specific error code, when the array supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,

    /// Any other fields present in the error body
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl ApiError {
    /// Builds an error from the status alone, using the canonical reason as message.
    ///
    /// ```
    /// use http::StatusCode;
    /// use powermax_api::ApiError;
    ///
    /// let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR);
    /// assert_eq!(err.http_status_code, 500);
    /// assert_eq!(err.message, "Internal Server Error");
    /// ```
    pub fn from_status(status: StatusCode) -> Self {
        Self {
            http_status_code: status.as_u16(),
            message: status
                .canonical_reason()
                .map(str::to_owned)
                .unwrap_or_else(|| status.as_str().to_owned()),
            ..Default::default()
        }
    }

    /// Interprets an error response body.
    ///
    /// If the body decodes, the observed status is stamped over any embedded
    /// one and an empty message falls back to the status line (`"404 Not
    /// Found"`). Otherwise the error is synthesized with [`ApiError::from_status`].
    pub fn from_response_body(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<ApiError>(body) {
            Ok(mut err) => {
                err.http_status_code = status.as_u16();
                if err.message.is_empty() {
                    err.message = status.to_string();
                }
                err
            }
            Err(_) => Self::from_status(status),
        }
    }
}

/// A specialized `Result` type for transport calls.
pub type Result<T> = std::result::Result<T, Error>;
