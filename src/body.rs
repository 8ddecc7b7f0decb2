//! Request bodies.
//!
//! A [`Body`] makes the encoding decision once, when it is constructed:
//! structured values become JSON, byte streams are sent as they are.

use crate::metadata::{
    MetaData, HEADER_VAL_CONTENT_TYPE_BINARY_OCTET_STREAM, HEADER_VAL_CONTENT_TYPE_JSON,
};
use crate::{Error, Result};
use http::{HeaderMap, HeaderValue};
use serde::Serialize;
use std::fmt;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// The payload of a request.
#[derive(Debug, Default)]
pub enum Body {
    /// No payload.
    #[default]
    Empty,
    /// A value encoded as JSON.
    Json(JsonBody),
    /// A pre-formed byte stream sent without encoding.
    Stream(ByteStream),
}

impl Body {
    /// Encodes `value` as JSON.
    ///
    /// An encoding failure is reported when the body is sent, before any
    /// network I/O.
    pub fn json<T>(value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        Body::Json(JsonBody {
            encoded: serde_json::to_vec(value),
            metadata: None,
        })
    }

    /// Encodes `value` as JSON and carries its [`MetaData`] headers.
    pub fn json_with_metadata<T>(value: &T) -> Self
    where
        T: Serialize + MetaData + ?Sized,
    {
        Body::Json(JsonBody {
            encoded: serde_json::to_vec(value),
            metadata: Some(value.metadata()),
        })
    }

    /// Sends the bytes produced by `reader` verbatim.
    pub fn stream<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        Body::Stream(ByteStream::new(reader))
    }

    /// Returns `true` for [`Body::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    /// Splits the body into its wire payload, default content type and
    /// payload headers.
    pub(crate) fn into_parts(self) -> Result<Parts> {
        match self {
            Body::Empty => Ok(Parts::default()),
            Body::Json(json) => {
                let bytes = json
                    .encoded
                    .map_err(|e| Error::SerializationFailed(e.to_string()))?;
                Ok(Parts {
                    payload: Some(Payload::Bytes(bytes)),
                    content_type: Some(HeaderValue::from_static(HEADER_VAL_CONTENT_TYPE_JSON)),
                    metadata: json.metadata,
                })
            }
            Body::Stream(stream) => {
                let content_type = stream.content_type.unwrap_or_else(|| {
                    HeaderValue::from_static(HEADER_VAL_CONTENT_TYPE_BINARY_OCTET_STREAM)
                });
                Ok(Parts {
                    payload: Some(Payload::Stream(stream.reader)),
                    content_type: Some(content_type),
                    metadata: stream.metadata,
                })
            }
        }
    }
}

impl From<ByteStream> for Body {
    fn from(stream: ByteStream) -> Self {
        Body::Stream(stream)
    }
}

/// A JSON-encoded payload, see [`Body::json`].
pub struct JsonBody {
    encoded: serde_json::Result<Vec<u8>>,
    metadata: Option<HeaderMap>,
}

impl fmt::Debug for JsonBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("JsonBody");
        match &self.encoded {
            Ok(bytes) => s.field("json", &String::from_utf8_lossy(bytes)),
            Err(e) => s.field("error", e),
        };
        s.field("metadata", &self.metadata).finish()
    }
}

/// A readable byte source sent as the raw request payload.
///
/// The reader is dropped exactly once: as soon as it reaches end-of-file
/// while the request is streamed, or together with the request if the
/// exchange fails first.
pub struct ByteStream {
    reader: Box<dyn AsyncRead + Send + Sync + Unpin>,
    content_type: Option<HeaderValue>,
    metadata: Option<HeaderMap>,
}

impl ByteStream {
    /// Wraps an async reader.
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        Self {
            reader: Box::new(reader),
            content_type: None,
            metadata: None,
        }
    }

    /// Declares the stream's own content type.
    ///
    /// A caller-supplied `Content-Type` header still takes precedence.
    pub fn with_content_type(mut self, content_type: HeaderValue) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Attaches payload headers, merged like those of
    /// [`Body::json_with_metadata`].
    pub fn with_metadata(mut self, metadata: HeaderMap) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(bytes: Vec<u8>) -> Self {
        ByteStream::new(std::io::Cursor::new(bytes))
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("content_type", &self.content_type)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub(crate) struct Parts {
    pub(crate) payload: Option<Payload>,
    pub(crate) content_type: Option<HeaderValue>,
    pub(crate) metadata: Option<HeaderMap>,
}

pub(crate) enum Payload {
    Bytes(Vec<u8>),
    Stream(Box<dyn AsyncRead + Send + Sync + Unpin>),
}

impl From<Payload> for reqwest::Body {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Bytes(bytes) => reqwest::Body::from(bytes),
            Payload::Stream(reader) => reqwest::Body::wrap_stream(ReaderStream::new(reader)),
        }
    }
}
