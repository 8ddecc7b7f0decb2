//! Integration tests using wiremock to simulate the array's REST endpoint.

use http::{HeaderMap, HeaderValue, Method};
use powermax_api::{Body, ByteStream, Client, Context, Error, MetaData};
use serde::{Deserialize, Serialize};
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, ReadBuf};
use wiremock::matchers::{body_bytes, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
struct StorageGroup {
    name: String,
    #[serde(default)]
    num_devices: u32,
}

fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .host(server.uri())
        .insecure(true)
        .build()
        .unwrap()
}

/// A reader that counts how many times it has been dropped.
struct TrackedReader {
    inner: io::Cursor<Vec<u8>>,
    drops: Arc<AtomicUsize>,
}

impl TrackedReader {
    fn new(bytes: &[u8]) -> (Self, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        let reader = Self {
            inner: io::Cursor::new(bytes.to_vec()),
            drops: drops.clone(),
        };
        (reader, drops)
    }
}

impl AsyncRead for TrackedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Serialize)]
struct TaggedPayload {
    name: String,
}

impl MetaData for TaggedPayload {
    fn metadata(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-correlation-id", HeaderValue::from_static("corr-42"));
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        headers
    }
}

#[tokio::test]
async fn test_api_mount_point_is_stripped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sloprovisioning/symmetrix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "symmetrixId": ["000197900046"]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .host(format!("{}/api", mock_server.uri()))
        .insecure(true)
        .build()
        .unwrap();

    let data: Option<serde_json::Value> = client
        .get(&Context::background(), "/sloprovisioning/symmetrix", None)
        .await
        .unwrap();

    assert_eq!(data.unwrap()["symmetrixId"][0], "000197900046");
}

#[tokio::test]
async fn test_post_encodes_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/storagegroup"))
        .and(header("content-type", "application/json"))
        .and(body_bytes(br#"{"name":"SG1"}"#.to_vec()))
        .respond_with(ResponseTemplate::new(201).set_body_json(StorageGroup {
            name: "SG1".to_string(),
            num_devices: 0,
        }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let created: Option<StorageGroup> = client
        .post(
            &Context::background(),
            "/storagegroup",
            None,
            Body::json(&serde_json::json!({"name": "SG1"})),
        )
        .await
        .unwrap();

    assert_eq!(created.unwrap().name, "SG1");
}

#[tokio::test]
async fn test_caller_content_type_wins() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/storagegroup/SG1"))
        .and(header("content-type", "application/vnd.array+json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert(
        "Content-Type",
        HeaderValue::from_static("application/vnd.array+json"),
    );

    let client = client_for(&mock_server);
    let result: Option<StorageGroup> = client
        .put(
            &Context::background(),
            "storagegroup/SG1",
            Some(&headers),
            Body::json(&StorageGroup {
                name: "SG1".to_string(),
                num_devices: 2,
            }),
        )
        .await
        .unwrap();
    assert!(result.is_none());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers.get_all("content-type").iter().count(), 1);
    let sent: StorageGroup = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent.num_devices, 2);
}

#[tokio::test]
async fn test_stream_body_is_sent_verbatim_and_dropped_once() {
    let mock_server = MockServer::start().await;
    let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("content-type", "binary/octet-stream"))
        .and(body_bytes(payload.clone()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (reader, drops) = TrackedReader::new(&payload);
    let client = client_for(&mock_server);
    client
        .call::<serde::de::IgnoredAny>(
            &Context::background(),
            Method::POST,
            "/upload",
            Body::stream(reader),
            None,
        )
        .await
        .unwrap();

    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stream_declared_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/import"))
        .and(header("content-type", "application/zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let stream = ByteStream::from(b"PK\x03\x04".to_vec())
        .with_content_type(HeaderValue::from_static("application/zip"));
    let client = client_for(&mock_server);
    let _: Option<serde_json::Value> = client
        .post(&Context::background(), "/import", None, stream.into())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_stream_metadata_headers_are_merged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/import"))
        .and(header("x-correlation-id", "corr-7"))
        .and(header("content-type", "binary/octet-stream"))
        .and(body_bytes(b"raw".to_vec()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut metadata = HeaderMap::new();
    metadata.insert("x-correlation-id", HeaderValue::from_static("corr-7"));
    let stream = ByteStream::from(b"raw".to_vec()).with_metadata(metadata);

    let client = client_for(&mock_server);
    let _: Option<serde_json::Value> = client
        .post(&Context::background(), "/import", None, stream.into())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_stream_dropped_once_on_transport_failure() {
    let client = Client::builder()
        .host("http://127.0.0.1:1")
        .insecure(true)
        .build()
        .unwrap();

    let (reader, drops) = TrackedReader::new(b"payload");
    let result: Result<Option<serde_json::Value>, Error> = client
        .post(&Context::background(), "/upload", None, Body::stream(reader))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Network(_)), "got {err:?}");
    assert!(err.is_transport());
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_token_sent_as_basic_auth_password() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/system/version"))
        // base64(":secret")
        .and(header("authorization", "Basic OnNlY3JldA=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": "V10.0"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.set_token("secret");

    let version: Option<serde_json::Value> = client
        .get(&Context::background(), "/system/version", None)
        .await
        .unwrap();
    assert_eq!(version.unwrap()["version"], "V10.0");
}

#[tokio::test]
async fn test_no_token_sends_no_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.set_token("secret");
    client.set_token("");
    let _: Option<serde_json::Value> = client
        .get(&Context::background(), "/system/version", None)
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_metadata_headers_are_merged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/storagegroup"))
        .and(header("x-correlation-id", "corr-42"))
        .and(header("x-caller", "csi"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"name": "SG2"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert("x-caller", HeaderValue::from_static("csi"));

    let client = client_for(&mock_server);
    let _: Option<serde_json::Value> = client
        .post(
            &Context::background(),
            "/storagegroup",
            Some(&headers),
            Body::json_with_metadata(&TaggedPayload {
                name: "SG2".to_string(),
            }),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_success_body_leaves_destination_unchanged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/storagegroup/SG1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let original = StorageGroup {
        name: "unchanged".to_string(),
        num_devices: 7,
    };
    let mut dest = original.clone();

    client
        .call(
            &Context::background(),
            Method::DELETE,
            "/storagegroup/SG1",
            Body::Empty,
            Some(&mut dest),
        )
        .await
        .unwrap();
    assert_eq!(dest, original);

    let deleted: Option<StorageGroup> = client
        .delete(&Context::background(), "/storagegroup/SG1", None)
        .await
        .unwrap();
    assert!(deleted.is_none());
}

#[tokio::test]
async fn test_no_destination_skips_decoding() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client
        .call_with_headers::<StorageGroup>(
            &Context::background(),
            Method::POST,
            "/action",
            None,
            Body::Empty,
            None,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storagegroup/SG1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .get::<StorageGroup>(&Context::background(), "/storagegroup/SG1", None)
        .await;

    match result {
        Err(Error::DeserializationFailed {
            raw_response,
            serde_error,
            status,
        }) => {
            assert_eq!(status.as_u16(), 200);
            assert_eq!(raw_response, "invalid json");
            assert!(serde_error.contains("expected"));
        }
        _ => panic!("Expected DeserializationFailed, got {:?}", result),
    }
}

#[tokio::test]
async fn test_http_error_with_json_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storagegroup/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "not found"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .get::<StorageGroup>(&Context::background(), "/storagegroup/missing", None)
        .await;

    match result {
        Err(Error::Api(api)) => {
            assert_eq!(api.http_status_code, 404);
            assert_eq!(api.message, "not found");
        }
        _ => panic!("Expected Api error, got {:?}", result),
    }
}

#[tokio::test]
async fn test_http_error_status_overrides_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "httpStatusCode": 200,
            "message": "storage group already exists",
            "errorCode": 40
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .post::<StorageGroup>(
            &Context::background(),
            "/storagegroup",
            None,
            Body::json(&serde_json::json!({"name": "SG1"})),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(409));
    let api = err.api_error().unwrap();
    assert_eq!(api.http_status_code, 409);
    assert_eq!(api.error_code, Some(40));
    assert_eq!(api.message, "storage group already exists");
}

#[tokio::test]
async fn test_http_error_with_unparsable_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>proxy failure</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get::<StorageGroup>(&Context::background(), "/system/version", None)
        .await
        .unwrap_err();

    match err {
        Error::Api(api) => {
            assert_eq!(api.http_status_code, 500);
            assert_eq!(api.message, "Internal Server Error");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_with_empty_message_uses_status_line() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({"message": ""})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get::<StorageGroup>(&Context::background(), "/system/version", None)
        .await
        .unwrap_err();

    assert_eq!(err.api_error().unwrap().message, "400 Bad Request");
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_call_for_response_returns_raw_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .call_for_response(&Context::background(), Method::GET, "/system", None, Body::Empty)
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 503);

    let err = client.parse_json_error(response).await;
    let api = err.api_error().unwrap();
    assert_eq!(api.http_status_code, 503);
    assert_eq!(api.message, "Service Unavailable");
}

#[tokio::test]
async fn test_context_deadline_aborts_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let ctx = Context::with_timeout(Duration::from_millis(100));

    let start = Instant::now();
    let result = client
        .get::<StorageGroup>(&ctx, "/slow", None)
        .await;

    assert!(matches!(result, Err(Error::Timeout)), "got {result:?}");
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_cancellation_aborts_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let ctx = Context::background();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let result = client.get::<StorageGroup>(&ctx, "/slow", None).await;

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Cancelled), "got {err:?}");
    assert!(err.is_transport());
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_cancelled_context_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let ctx = Context::background();
    ctx.cancel();

    let result = client.get::<StorageGroup>(&ctx, "/anything", None).await;
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn test_client_timeout_bounds_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .host(mock_server.uri())
        .insecure(true)
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let result = client
        .get::<StorageGroup>(&Context::background(), "/slow", None)
        .await;

    match result {
        Err(Error::Network(e)) => assert!(e.is_timeout()),
        other => panic!("Expected a network timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_repeated_get_is_idempotent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storagegroup/SG1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(StorageGroup {
            name: "SG1".to_string(),
            num_devices: 3,
        }))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let ctx = Context::background();
    let first: Option<StorageGroup> = client.get(&ctx, "/storagegroup/SG1", None).await.unwrap();
    let second: Option<StorageGroup> = client.get(&ctx, "/storagegroup/SG1", None).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let mock_server = MockServer::start().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();

    Mock::given(method("GET"))
        .respond_with(move |_req: &wiremock::Request| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "SG", "num_devices": 1}))
        })
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.set_token("shared");

    let mut handles = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .get::<StorageGroup>(&Context::background(), &format!("/storagegroup/SG{i}"), None)
                .await
        }));
    }
    for handle in handles {
        let group = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(group.num_devices, 1);
    }
    assert_eq!(hits.load(Ordering::SeqCst), 10);

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| r.headers.get("authorization").is_some()));
}

#[tokio::test]
async fn test_show_http_and_debug_do_not_change_results() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("powermax_api=debug")
        .with_test_writer()
        .try_init();

    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/storagegroup"))
        .respond_with(ResponseTemplate::new(201).set_body_json(StorageGroup {
            name: "SG9".to_string(),
            num_devices: 0,
        }))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "gone"})))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .host(mock_server.uri())
        .insecure(true)
        .show_http(true)
        .debug(true)
        .token("secret")
        .build()
        .unwrap();
    let ctx = Context::background();

    let created: Option<StorageGroup> = client
        .post(&ctx, "/storagegroup", None, Body::json(&serde_json::json!({"name": "SG9"})))
        .await
        .unwrap();
    assert_eq!(created.unwrap().name, "SG9");

    let err = client
        .get::<StorageGroup>(&ctx, "/storagegroup/SG9", None)
        .await
        .unwrap_err();
    assert_eq!(err.api_error().unwrap().message, "gone");
}
