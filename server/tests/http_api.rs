use std::collections::BTreeMap;
use std::sync::Arc;

use alert_archive_core::archive::AlertArchive;
use alert_archive_core::config::ArchiveConfig;
use alert_archive_core::error::{CoreError, CoreResult};
use alert_archive_core::model::AlertRecord;
use alert_archive_core::sns::ConfirmationPolicy;
use alert_archive_core::source::AlertSource;
use alert_archive_core::store::fs::FsObjectStore;
use alert_archive_core::store::ObjectStore;
use alert_archive_server::http::router::build_router;
use alert_archive_server::http::state::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get as get_route;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const T0: i64 = 1_700_000_000_000; // 2023-11-14T22:13:20Z

#[derive(Default)]
struct FakeSource {
    records: BTreeMap<String, Value>,
    missing: Vec<String>,
    down: bool,
}

impl FakeSource {
    fn with(ids: &[&str]) -> Self {
        let mut src = Self::default();
        for id in ids {
            src.records.insert(
                id.to_string(),
                json!({"id": id, "created_at": T0, "severity": 3, "title": "Suspicious login"}),
            );
        }
        src
    }
}

impl AlertSource for FakeSource {
    fn fetch_by_id(&self, alert_id: &str) -> CoreResult<AlertRecord> {
        if self.down {
            return Err(CoreError::SourceUnavailable("connection refused".into()));
        }
        if self.missing.iter().any(|m| m == alert_id) {
            return Err(CoreError::SourceApi {
                status: 404,
                reason: "Not Found".into(),
                body: Some(json!({"errors": ["Not Found"]})),
            });
        }
        let record = self
            .records
            .get(alert_id)
            .cloned()
            .ok_or_else(|| CoreError::SourceUnavailable(format!("no record {}", alert_id)))?;
        AlertRecord::try_from(record)
            .map_err(|v| CoreError::SourceUnavailable(format!("not an object: {}", v)))
    }

    fn probe(&self) -> CoreResult<bool> {
        if self.down {
            return Err(CoreError::SourceUnavailable("connection refused".into()));
        }
        Ok(true)
    }
}

fn state(dir: &tempfile::TempDir, source: FakeSource) -> AppState {
    let config = ArchiveConfig::new(
        "alerts",
        Some("prod".to_string()),
        "https://api.example.com/v2",
        "test-key",
        5,
    )
    .unwrap();
    let store: Box<dyn ObjectStore> = Box::new(FsObjectStore::open(dir.path()).unwrap());
    let source: Box<dyn AlertSource> = Box::new(source);
    AppState::new(AlertArchive::new(config, store, source)).unwrap()
}

fn app(dir: &tempfile::TempDir, source: FakeSource) -> Router {
    build_router(Arc::new(state(dir, source)))
}

/// Serves `GET /confirm` on a local port, answering with `status`.
async fn confirmation_endpoint(status: StatusCode) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let endpoint = Router::new().route("/confirm", get_route(move || async move { status }));
    tokio::spawn(async move {
        axum::serve(listener, endpoint).await.unwrap();
    });
    format!("http://{}/confirm?Token=2336412f37", addr)
}

/// Router whose subscription handshake may call back to a local endpoint.
fn app_confirming_locally(dir: &tempfile::TempDir) -> Router {
    let mut state = state(dir, FakeSource::default());
    state.confirmation_policy = ConfirmationPolicy {
        require_https: false,
        host_suffix: "127.0.0.1".to_string(),
    };
    state.http_client = reqwest::Client::builder().no_proxy().build().unwrap();
    build_router(Arc::new(state))
}

fn confirmation(subscribe_url: &str) -> Request<Body> {
    let message = json!({
        "Type": "SubscriptionConfirmation",
        "TopicArn": "arn:aws:sns:us-east-1:123456789012:alerts",
        "Token": "2336412f37",
        "SubscribeURL": subscribe_url
    });
    post(message.to_string(), Some("SubscriptionConfirmation"))
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(body: impl Into<Body>, message_type: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/alert");
    if let Some(t) = message_type {
        builder = builder.header("x-amz-sns-message-type", t);
    }
    builder.body(body.into()).unwrap()
}

fn batch(ids: &[&str]) -> String {
    let alerts: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "created_at": T0}))
        .collect();
    json!({ "alerts": alerts }).to_string()
}

#[tokio::test]
async fn status_reports_store_and_source() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(&dir, FakeSource::default());

    let (status, body) = send(&router, get("/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "s3": {"success": true}, "threatstack": {"success": true}})
    );
}

#[tokio::test]
async fn status_surfaces_source_failure_as_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(
        &dir,
        FakeSource {
            down: true,
            ..FakeSource::default()
        },
    );

    let (status, body) = send(&router, get("/status")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "SourceUnavailableError");
}

#[tokio::test]
async fn posted_webhook_is_readable_by_id_and_by_range() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(&dir, FakeSource::with(&["abcd1234", "efgh5678"]));

    let (status, body) = send(&router, post(batch(&["abcd1234", "efgh5678"]), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, body) = send(&router, get("/alert/abcd1234")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alert"]["title"], "Suspicious login");

    let (status, body) = send(
        &router,
        get("/alert?start=2023-11-14T22:00:00Z&end=2023-11-14T23:00:00Z"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["abcd1234", "efgh5678"]);

    let (_, body) = send(&router, get("/alert?start=2023-11-15&end=2023-11-16")).await;
    assert_eq!(body, json!({"success": true, "alerts": []}));
}

#[tokio::test]
async fn notification_envelope_with_string_message_is_unwrapped() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(&dir, FakeSource::with(&["abcd1234"]));
    let envelope = json!({
        "Type": "Notification",
        "TopicArn": "arn:aws:sns:us-east-1:123456789012:alerts",
        "Message": batch(&["abcd1234"])
    });

    let (status, _) = send(&router, post(envelope.to_string(), Some("Notification"))).await;
    assert_eq!(status, StatusCode::OK);

    let stored = dir.path().join("prod/alerts/ab/cd/abcd1234");
    assert!(stored.is_file());
}

#[tokio::test]
async fn invalid_webhooks_are_client_errors() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(&dir, FakeSource::with(&["abcd1234"]));

    let (status, body) = send(&router, post("not json", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "MissingPayloadError");

    let (status, body) = send(&router, post(r#"{"alerts": []}"#, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "MissingAlertsError");

    let (status, body) = send(&router, post(r#"{"alerts": [{"id": "abcd1234"}]}"#, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "InvalidAlertError");

    assert!(!dir.path().join("prod").exists());
}

#[tokio::test]
async fn source_rejection_is_reported_with_its_status() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(
        &dir,
        FakeSource {
            missing: vec!["abcd1234".to_string()],
            ..FakeSource::default()
        },
    );

    let (status, body) = send(&router, post(batch(&["abcd1234"]), None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "SourceAPIError");
    assert_eq!(body["error"]["message"][0], "Not Found");
    assert_eq!(body["error"]["message"][1], "404");
}

#[tokio::test]
async fn subscription_to_foreign_host_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(&dir, FakeSource::default());
    let message = json!({
        "Type": "SubscriptionConfirmation",
        "TopicArn": "arn:aws:sns:us-east-1:123456789012:alerts",
        "Token": "2336412f37",
        "SubscribeURL": "https://attacker.example.com/confirm"
    });

    let (status, body) = send(
        &router,
        post(message.to_string(), Some("SubscriptionConfirmation")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "SubscriptionConfirmationError");
}

#[tokio::test]
async fn subscription_confirmation_relays_the_provider_status() {
    let dir = tempfile::tempdir().unwrap();
    let router = app_confirming_locally(&dir);

    let refused = confirmation_endpoint(StatusCode::FORBIDDEN).await;
    let (status, body) = send(&router, confirmation(&refused)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"success": false}));

    let accepted = confirmation_endpoint(StatusCode::OK).await;
    let (status, body) = send(&router, confirmation(&accepted)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    assert!(!dir.path().join("prod").exists());
}

#[tokio::test]
async fn oversized_webhook_is_rejected_with_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(&dir, FakeSource::default());

    let (status, body) = send(&router, post(vec![b' '; 1024 * 1024 + 1], None)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "PayloadTooLargeError");
}

#[tokio::test]
async fn unsubscribe_confirmation_is_acknowledged_without_archiving() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(&dir, FakeSource::default());

    let (status, body) = send(
        &router,
        post(r#"{"Type":"UnsubscribeConfirmation"}"#, Some("UnsubscribeConfirmation")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
}

#[tokio::test]
async fn range_query_requires_parseable_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(&dir, FakeSource::default());

    let (status, body) = send(&router, get("/alert?start=2023-11-14")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "DateParseError");

    let (status, body) = send(&router, get("/alert?start=yesterday&end=2023-11-14")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "DateParseError");

    let (status, body) = send(
        &router,
        get("/alert?start=2023-01-01&start=2023-01-02&end=2024-01-01"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "DateParseError");
}

#[tokio::test]
async fn lookup_by_id_errors() {
    let dir = tempfile::tempdir().unwrap();
    let router = app(&dir, FakeSource::default());

    let (status, body) = send(&router, get("/alert/zzzz9999")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "RecordNotFoundError");

    let (status, body) = send(&router, get("/alert/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "InvalidAlertError");
}
