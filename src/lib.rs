//! # powermax-api - transport client for a storage array's management REST API
//!
//! This crate is the request/response pipeline used to talk to the array's
//! REST endpoint. It joins a configurable host with relative paths, encodes
//! bodies (JSON or raw byte streams), injects headers and the auth token,
//! runs each call under a caller-supplied [`Context`], and maps every failure
//! into one [`Error`] type.
//!
//! Each call is exactly one HTTP exchange. The client does not retry and does
//! not cache.
//!
//! ## Quick Start
//!
//! ```no_run
//! use powermax_api::{Body, Client, Context};
//! use powermax_api::types::replication::{ModifySgRdfGroup, Suspend};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), powermax_api::Error> {
//!     let client = Client::builder()
//!         .host("https://array.example.com:8443/api")
//!         .timeout(Duration::from_secs(120))
//!         .build()?;
//!     client.set_token("session-token");
//!
//!     let ctx = Context::with_timeout(Duration::from_secs(30));
//!
//!     // GET, decoded into any deserializable type
//!     let arrays: Option<serde_json::Value> = client
//!         .get(&ctx, "/sloprovisioning/symmetrix", None)
//!         .await?;
//!     println!("Arrays: {:?}", arrays);
//!
//!     // PUT with a JSON body
//!     let suspend = ModifySgRdfGroup {
//!         action: "Suspend".to_string(),
//!         suspend: Some(Suspend { force: true, ..Default::default() }),
//!         execution_option: "SYNCHRONOUS".to_string(),
//!         ..Default::default()
//!     };
//!     let _: Option<serde_json::Value> = client
//!         .put(
//!             &ctx,
//!             "/replication/symmetrix/000197900046/storagegroup/SG1/rdf_group/10",
//!             None,
//!             Body::json(&suspend),
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Non-2xx responses always come back as [`Error::Api`] carrying the status
//! observed on the wire and the array's message:
//!
//! ```no_run
//! use powermax_api::{Client, ClientOptions, Context, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::new("https://array.example.com", ClientOptions::default())?;
//! # let ctx = Context::background();
//! match client.get::<serde_json::Value>(&ctx, "/sloprovisioning/symmetrix/000000000000", None).await {
//!     Ok(data) => println!("Success: {:?}", data),
//!     Err(Error::Api(api)) => eprintln!("HTTP {}: {}", api.http_status_code, api.message),
//!     Err(Error::DeserializationFailed { raw_response, serde_error, .. }) => {
//!         eprintln!("Unexpected payload {}: {}", raw_response, serde_error);
//!     }
//!     Err(e) if e.is_transport() => eprintln!("Array unreachable: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod body;
mod client;
mod context;
mod dump;
mod error;
pub mod metadata;
mod tls;
pub mod types;

pub use body::{Body, ByteStream, JsonBody};
pub use client::{Client, ClientBuilder, ClientOptions};
pub use context::Context;
pub use error::{ApiError, Error, Result};
pub use metadata::MetaData;
