//! Transport client for the management REST API.
//!
//! The [`Client`] type is the main entry point. Each call is a single HTTP
//! exchange: no retries, no caching. Use [`ClientBuilder`] or
//! [`Client::new`] with [`ClientOptions`] to create one.

use crate::{
    body::Body,
    context::Context,
    dump,
    error::ApiError,
    metadata, tls, Error, Result,
};
use arc_swap::ArcSwap;
use http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Options fixed at construction.
///
/// The default is a verifying client with no timeout and no diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Skip TLS certificate verification.
    pub insecure: bool,

    /// Load the system trust store.
    ///
    /// Kept for configuration compatibility: the system store is loaded
    /// whenever `insecure` is false.
    pub use_certs: bool,

    /// Bound on every request; zero means no client-enforced deadline.
    pub timeout: Duration,

    /// Dump requests and responses through `tracing` at debug level.
    pub show_http: bool,

    /// Extra PEM CA bundle appended to the trust store (e.g. a reverse proxy's certificate).
    pub cert_file: Option<PathBuf>,

    /// Emit error-level diagnostics for failed calls and construction errors.
    pub debug: bool,
}

/// A client for one array's management endpoint.
///
/// The client is cheap to clone and safe to share between tasks. Clones share
/// the connection pool and the auth token.
///
/// # Examples
///
/// ```no_run
/// use powermax_api::{Body, Client, Context};
/// use serde::{Deserialize, Serialize};
/// use std::time::Duration;
///
/// #[derive(Serialize)]
/// struct CreateStorageGroup {
///     name: String,
/// }
///
/// #[derive(Deserialize)]
/// struct StorageGroup {
///     name: String,
/// }
///
/// # async fn example() -> Result<(), powermax_api::Error> {
/// let client = Client::builder()
///     .host("https://array.example.com/api")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// client.set_token("secret");
///
/// let ctx = Context::background();
/// let request = CreateStorageGroup { name: "SG1".to_string() };
/// let created: Option<StorageGroup> = client
///     .post(&ctx, "/sloprovisioning/symmetrix/000197900046/storagegroup", None, Body::json(&request))
///     .await?;
/// if let Some(sg) = created {
///     println!("Created {}", sg.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    host: String,
    token: ArcSwap<String>,
    show_http: bool,
    debug: bool,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client for `host`.
    ///
    /// The first `/api` in `host` is removed, so both the endpoint root and
    /// its API mount point are accepted.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ConfigurationError`] for an empty host, and with
    /// [`Error::TrustStore`], [`Error::CertificateLoad`] or
    /// [`Error::CertificateAppend`] if the trust pool cannot be built.
    pub fn new(host: impl AsRef<str>, options: ClientOptions) -> Result<Self> {
        let host = host.as_ref();
        if host.is_empty() {
            return Err(Error::ConfigurationError("missing endpoint".to_string()));
        }
        let host = host.replacen("/api", "", 1);

        let http_client = build_http_client(&options).inspect_err(|e| {
            if options.debug {
                tracing::error!(error = %e, "Unable to build HTTP client");
            }
        })?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                host,
                token: ArcSwap::from_pointee(String::new()),
                show_http: options.show_http,
                debug: options.debug,
            }),
        })
    }

    /// The pooled HTTP client used for every call.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.inner.http_client
    }

    /// The normalized host.
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    /// Replaces the auth token used by every subsequent call.
    ///
    /// An empty token disables authentication.
    pub fn set_token(&self, token: impl Into<String>) {
        self.inner.token.store(Arc::new(token.into()));
    }

    /// The current auth token.
    pub fn token(&self) -> String {
        self.inner.token.load_full().as_str().to_owned()
    }

    /// Sends a GET request and decodes the response.
    ///
    /// Returns `Ok(None)` when the response body is empty (or JSON `null`).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use powermax_api::{Client, ClientOptions, Context};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct SymmetrixIdList {
    ///     #[serde(rename = "symmetrixId")]
    ///     ids: Vec<String>,
    /// }
    ///
    /// # async fn example() -> Result<(), powermax_api::Error> {
    /// let client = Client::new("https://array.example.com", ClientOptions::default())?;
    /// let ctx = Context::background();
    /// let list: Option<SymmetrixIdList> = client
    ///     .get(&ctx, "/sloprovisioning/symmetrix", None)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<R>(
        &self,
        ctx: &Context,
        path: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<Option<R>>
    where
        R: DeserializeOwned,
    {
        self.exchange(ctx, Method::GET, path, headers, Body::Empty)
            .await
    }

    /// Sends a POST request with `body` and decodes the response.
    pub async fn post<R>(
        &self,
        ctx: &Context,
        path: &str,
        headers: Option<&HeaderMap>,
        body: Body,
    ) -> Result<Option<R>>
    where
        R: DeserializeOwned,
    {
        self.exchange(ctx, Method::POST, path, headers, body).await
    }

    /// Sends a PUT request with `body` and decodes the response.
    pub async fn put<R>(
        &self,
        ctx: &Context,
        path: &str,
        headers: Option<&HeaderMap>,
        body: Body,
    ) -> Result<Option<R>>
    where
        R: DeserializeOwned,
    {
        self.exchange(ctx, Method::PUT, path, headers, body).await
    }

    /// Sends a DELETE request and decodes the response, if any.
    pub async fn delete<R>(
        &self,
        ctx: &Context,
        path: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<Option<R>>
    where
        R: DeserializeOwned,
    {
        self.exchange(ctx, Method::DELETE, path, headers, Body::Empty)
            .await
    }

    async fn exchange<R>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        headers: Option<&HeaderMap>,
        body: Body,
    ) -> Result<Option<R>>
    where
        R: DeserializeOwned,
    {
        let mut data: Option<R> = None;
        self.call_with_headers(ctx, method, path, headers, body, Some(&mut data))
            .await?;
        Ok(data)
    }

    /// Sends a request with any method.
    ///
    /// Same as [`Client::call_with_headers`] without header overrides.
    pub async fn call<R>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        body: Body,
        dest: Option<&mut R>,
    ) -> Result<()>
    where
        R: DeserializeOwned,
    {
        self.call_with_headers(ctx, method, path, None, body, dest)
            .await
    }

    /// Sends a request and decodes a successful response into `dest`.
    ///
    /// With no destination the response body is discarded. An empty success
    /// body leaves `dest` untouched. Any non-2xx status becomes
    /// [`Error::Api`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use http::{HeaderMap, HeaderValue, Method};
    /// use powermax_api::{Body, Client, ClientOptions, Context};
    ///
    /// # async fn example() -> Result<(), powermax_api::Error> {
    /// let client = Client::new("https://array.example.com", ClientOptions::default())?;
    /// let ctx = Context::background();
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("Accept", HeaderValue::from_static("application/json"));
    ///
    /// let mut version = serde_json::Value::Null;
    /// client
    ///     .call_with_headers(&ctx, Method::GET, "/version", Some(&headers), Body::Empty, Some(&mut version))
    ///     .await?;
    ///
    /// // Fire and forget: nothing is decoded.
    /// client
    ///     .call_with_headers::<serde::de::IgnoredAny>(&ctx, Method::DELETE, "/session", None, Body::Empty, None)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call_with_headers<R>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        headers: Option<&HeaderMap>,
        body: Body,
        dest: Option<&mut R>,
    ) -> Result<()>
    where
        R: DeserializeOwned,
    {
        let response = self
            .call_for_response(ctx, method.clone(), path, headers, body)
            .await
            .inspect_err(|e| {
                if self.inner.debug {
                    tracing::error!(error = %e, method = %method, path = %path, "Request failed");
                }
            })?;
        let status = response.status();

        if !status.is_success() {
            // The body is read under the caller's context; if it fires, the
            // status alone still yields a structured error.
            let err = ctx
                .run(self.parse_json_error(response))
                .await
                .unwrap_or_else(|_| Error::Api(ApiError::from_status(status)));
            if self.inner.debug {
                tracing::error!(
                    status = status.as_u16(),
                    method = %method,
                    path = %path,
                    error = %err,
                    "HTTP error response"
                );
            }
            return Err(err);
        }

        let Some(dest) = dest else {
            return Ok(());
        };

        let raw = ctx.run(response.bytes()).await??;
        self.decode_into(dest, &raw, status)
    }

    /// Sends a request and returns the raw response, whatever its status.
    ///
    /// Builds the URL, encodes the body, injects headers and the auth token,
    /// then performs exactly one exchange bound to `ctx`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`] and [`Error::SerializationFailed`] are returned
    /// before any network I/O. Transport failures are [`Error::Network`],
    /// [`Error::Cancelled`] or [`Error::Timeout`].
    pub async fn call_for_response(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        headers: Option<&HeaderMap>,
        body: Body,
    ) -> Result<reqwest::Response> {
        let url = join_url(&self.inner.host, path)?;
        let request = self.build_request(method, url, headers, body)?;

        if self.inner.show_http {
            dump::log_request(&request);
        }

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            "Executing HTTP request"
        );

        let response = ctx.run(self.inner.http_client.execute(request)).await??;

        if self.inner.show_http {
            dump::log_response(&response);
        }

        Ok(response)
    }

    /// Turns an error response into the structured error.
    ///
    /// Consumes the response body. Never fails: if the body cannot be read or
    /// decoded the error is synthesized from the status code.
    pub async fn parse_json_error(&self, response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        Error::Api(ApiError::from_response_body(status, &body))
    }

    fn build_request(
        &self,
        method: Method,
        url: Url,
        overrides: Option<&HeaderMap>,
        body: Body,
    ) -> Result<reqwest::Request> {
        let parts = body.into_parts()?;
        let mut headers =
            metadata::build_headers(parts.content_type, parts.metadata.as_ref(), overrides);

        let mut request = self.inner.http_client.request(method, url);
        let token = self.inner.token.load_full();
        if token.is_empty() {
            request = request.headers(headers);
        } else {
            headers.remove(AUTHORIZATION);
            request = request
                .headers(headers)
                .basic_auth("", Some(token.as_str()));
        }

        if let Some(payload) = parts.payload {
            request = request.body(reqwest::Body::from(payload));
        }

        Ok(request.build()?)
    }

    fn decode_into<R>(&self, dest: &mut R, raw: &[u8], status: StatusCode) -> Result<()>
    where
        R: DeserializeOwned,
    {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        match serde_json::from_slice::<R>(raw) {
            Ok(data) => {
                *dest = data;
                Ok(())
            }
            Err(e) => {
                let raw_response = String::from_utf8_lossy(raw).into_owned();
                if self.inner.debug {
                    tracing::error!(
                        error = %e,
                        raw_response = %raw_response,
                        "Unable to decode response"
                    );
                }
                Err(Error::DeserializationFailed {
                    raw_response,
                    serde_error: e.to_string(),
                    status,
                })
            }
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.inner.host)
            .field("has_token", &!self.inner.token.load().is_empty())
            .field("show_http", &self.inner.show_http)
            .field("debug", &self.inner.debug)
            .finish()
    }
}

/// Joins the host and a relative path with exactly one `/` between them.
fn join_url(host: &str, path: &str) -> Result<Url> {
    let mut joined = String::with_capacity(host.len() + path.len() + 1);
    joined.push_str(host);
    if !path.is_empty() {
        if !host.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(path.strip_prefix('/').unwrap_or(path));
    }
    Ok(Url::parse(&joined)?)
}

fn build_http_client(options: &ClientOptions) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if !options.timeout.is_zero() {
        builder = builder.timeout(options.timeout);
    }

    if options.insecure {
        tracing::warn!("TLS certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    } else {
        let extra = match &options.cert_file {
            Some(path) => tls::pem_file(path)?,
            None => Vec::new(),
        };
        let roots = tls::system_roots(!extra.is_empty())?;
        builder = builder.tls_built_in_root_certs(false);
        for cert in roots.into_iter().chain(extra) {
            builder = builder.add_root_certificate(cert);
        }
    }

    builder
        .build()
        .map_err(|e| Error::ConfigurationError(format!("Failed to build HTTP client: {}", e)))
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use powermax_api::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), powermax_api::Error> {
/// let client = ClientBuilder::new()
///     .host("https://array.example.com:8443")
///     .cert_file("/etc/powermax/proxy.pem")
///     .timeout(Duration::from_secs(120))
///     .show_http(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ClientBuilder {
    host: String,
    options: ClientOptions,
    token: Option<String>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the array endpoint.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Skips TLS certificate verification.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.options.insecure = insecure;
        self
    }

    /// Sets the `use_certs` option.
    ///
    /// Has no effect: the system store is loaded whenever `insecure` is
    /// false.
    pub fn use_certs(mut self, use_certs: bool) -> Self {
        self.options.use_certs = use_certs;
        self
    }

    /// Bounds every request; zero disables the bound.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Dumps requests and responses at debug level.
    pub fn show_http(mut self, show_http: bool) -> Self {
        self.options.show_http = show_http;
        self
    }

    /// Appends a PEM CA bundle to the trust store.
    pub fn cert_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.cert_file = Some(path.into());
        self
    }

    /// Enables error-level diagnostics.
    pub fn debug(mut self, debug: bool) -> Self {
        self.options.debug = debug;
        self
    }

    /// Sets the initial auth token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// See [`Client::new`].
    pub fn build(self) -> Result<Client> {
        let client = Client::new(&self.host, self.options)?;
        if let Some(token) = self.token {
            client.set_token(token);
        }
        Ok(client)
    }
}
