//! Cloudflare client against an in-process fake of the v4 API

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::{get, put};
use axum::{Json, Router};
use ddns_core::traits::{DnsApi, DnsApiFactory, DnsRecord, RecordType, TokenStatus};
use ddns_core::{Bridge, BridgeConfig, Credentials, Error, QueryParams, UpdateCall};
use ddns_http::{AppState, HttpConfig, create_routes};
use ddns_provider_cloudflare::{CloudflareFactory, DEFAULT_HTTP_TIMEOUT};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const TOKEN: &str = "good-token";

#[derive(Default)]
struct FakeApi {
    token_status: Mutex<String>,
    puts: Mutex<Vec<(String, String, Value)>>,
    fail_with: Mutex<Option<StatusCode>>,
}

type Shared = Arc<FakeApi>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn denied() -> (StatusCode, Json<Value>) {
    rejected(StatusCode::FORBIDDEN, 9109, "Invalid access token")
}

fn rejected(status: StatusCode, code: i64, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "success": false,
            "result": null,
            "errors": [{"code": code, "message": message}],
        })),
    )
}

fn ok(result: Value) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({"success": true, "result": result, "errors": []})),
    )
}

async fn verify(State(api): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return rejected(StatusCode::UNAUTHORIZED, 1000, "Invalid API Token");
    }
    let status = api.token_status.lock().unwrap().clone();
    ok(json!({"id": "tok", "status": status}))
}

async fn zones(
    State(api): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return denied();
    }
    if let Some(status) = *api.fail_with.lock().unwrap() {
        return (status, Json(json!({"success": false, "errors": []})));
    }

    let all = vec![
        json!({"id": "zone-com", "name": "example.com", "status": "active"}),
        json!({"id": "zone-net", "name": "example.net", "status": "active"}),
    ];
    let zones: Vec<Value> = match query.get("name") {
        Some(name) => all.into_iter().filter(|z| z["name"] == name.as_str()).collect(),
        None => all,
    };
    ok(Value::Array(zones))
}

async fn records(
    headers: HeaderMap,
    Path(zone_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return denied();
    }

    let all = vec![
        json!({"id": "rec-a", "name": "home.example.com", "type": "A",
               "content": "198.51.100.7", "proxied": true, "ttl": 300,
               "comment": "router", "zone_id": "zone-com",
               "tags": ["owner:home", "site:lab"], "settings": {"ipv4_only": true}}),
        json!({"id": "rec-aaaa", "name": "home.example.com", "type": "AAAA",
               "content": "2001:db8::7", "proxied": false, "ttl": 1,
               "comment": null}),
    ];
    let matches: Vec<Value> = all
        .into_iter()
        .filter(|_| zone_id == "zone-com")
        .filter(|r| query.get("name").is_none_or(|n| r["name"] == n.as_str()))
        .filter(|r| query.get("type").is_none_or(|t| r["type"] == t.as_str()))
        .collect();
    ok(Value::Array(matches))
}

async fn update(
    State(api): State<Shared>,
    headers: HeaderMap,
    Path((zone_id, record_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return denied();
    }
    api.puts
        .lock()
        .unwrap()
        .push((zone_id, record_id.clone(), body.clone()));

    let mut result = body;
    result["id"] = json!(record_id);
    ok(result)
}

/// Start the fake API and return its base URL
async fn start_fake(api: Shared) -> String {
    let app = Router::new()
        .route("/client/v4/user/tokens/verify", get(verify))
        .route("/client/v4/zones", get(zones))
        .route("/client/v4/zones/{zone_id}/dns_records", get(records))
        .route(
            "/client/v4/zones/{zone_id}/dns_records/{record_id}",
            put(update),
        )
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/client/v4")
}

async fn connect(fake: &Shared, token: &str, dry_run: bool) -> Box<dyn DnsApi> {
    let base_url = start_fake(Arc::clone(fake)).await;
    CloudflareFactory::new(base_url, DEFAULT_HTTP_TIMEOUT, dry_run)
        .unwrap()
        .connect(&Credentials::new("", token))
        .unwrap()
}

fn fake() -> Shared {
    let api = FakeApi::default();
    *api.token_status.lock().unwrap() = "active".to_string();
    Arc::new(api)
}

#[tokio::test]
async fn verify_token_reports_status() {
    let fake = fake();
    let api = connect(&fake, TOKEN, false).await;
    assert_eq!(api.verify_token().await.unwrap(), TokenStatus::Active);

    *fake.token_status.lock().unwrap() = "disabled".to_string();
    assert_eq!(api.verify_token().await.unwrap(), TokenStatus::Disabled);
}

#[tokio::test]
async fn refused_token_fails_verification() {
    let fake = fake();
    let api = connect(&fake, "revoked", false).await;

    let err = api.verify_token().await.unwrap_err();
    assert!(matches!(err, Error::TokenRejected(_)), "{err:?}");
    assert_eq!(err.to_string(), "API token is invalid or revoked.");
}

#[tokio::test]
async fn refused_token_is_401_at_the_http_layer() {
    let fake = fake();
    let base_url = start_fake(Arc::clone(&fake)).await;
    let factory = CloudflareFactory::new(base_url, DEFAULT_HTTP_TIMEOUT, false).unwrap();
    let bridge = Bridge::new(
        Arc::new(factory),
        BridgeConfig::default().with_verify_token(true),
    )
    .unwrap();
    let app = create_routes(AppState::new(bridge, HttpConfig::default()));

    let request = Request::builder()
        .uri("/update?token=revoked&hostname=home.example.com&ip=192.0.2.1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        String::from_utf8(body.to_vec()).unwrap(),
        "API token is invalid or revoked."
    );
    assert!(fake.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_token_is_an_upstream_error() {
    let fake = fake();
    let api = connect(&fake, "bad-token", false).await;

    let err = api.list_zones(Some("example.com")).await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
    assert!(err.to_string().contains("Authentication failed"), "{err}");
}

#[tokio::test]
async fn list_zones_by_name_and_unfiltered() {
    let fake = fake();
    let api = connect(&fake, TOKEN, false).await;

    let zones = api.list_zones(Some("example.com")).await.unwrap();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].id, "zone-com");

    let zones = api.list_zones(None).await.unwrap();
    assert_eq!(zones.len(), 2);
}

#[tokio::test]
async fn list_records_filters_by_name_and_type() {
    let fake = fake();
    let api = connect(&fake, TOKEN, false).await;

    let records = api
        .list_records("zone-com", "home.example.com", RecordType::Aaaa)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "rec-aaaa");
    assert_eq!(records[0].record_type, RecordType::Aaaa);
    // Missing zone_id is filled from the request path
    assert_eq!(records[0].zone_id, "zone-com");
    assert_eq!(records[0].comment, None);
}

#[tokio::test]
async fn update_record_sends_the_full_record() {
    let fake = fake();
    let api = connect(&fake, TOKEN, false).await;

    let current = api
        .list_records("zone-com", "home.example.com", RecordType::A)
        .await
        .unwrap()
        .remove(0);
    let updated = api
        .update_record("zone-com", &current.with_content("192.0.2.1"))
        .await
        .unwrap();

    assert_eq!(updated.content, "192.0.2.1");
    assert_eq!(updated.zone_id, "zone-com");

    let puts = fake.puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    let (zone_id, record_id, body) = &puts[0];
    assert_eq!(zone_id, "zone-com");
    assert_eq!(record_id, "rec-a");
    assert_eq!(
        *body,
        json!({
            "type": "A",
            "name": "home.example.com",
            "content": "192.0.2.1",
            "proxied": true,
            "ttl": 300,
            "comment": "router",
            "tags": ["owner:home", "site:lab"],
            "settings": {"ipv4_only": true},
        })
    );
}

#[tokio::test]
async fn bridge_update_keeps_tags_and_settings() {
    let fake = fake();
    let base_url = start_fake(Arc::clone(&fake)).await;
    let factory = CloudflareFactory::new(base_url, DEFAULT_HTTP_TIMEOUT, false).unwrap();
    let bridge = Bridge::new(Arc::new(factory), BridgeConfig::default()).unwrap();

    let params = QueryParams::from_pairs([
        ("token", TOKEN),
        ("hostname", "home.example.com"),
        ("ip", "192.0.2.1"),
    ]);
    let summary = bridge
        .handle(UpdateCall {
            authorization: None,
            params: &params,
            client_ip: None,
        })
        .await
        .unwrap();
    assert_eq!(summary.updated_count(), 1);

    let puts = fake.puts.lock().unwrap();
    let (_, _, body) = &puts[0];
    assert_eq!(body["content"], "192.0.2.1");
    assert_eq!(body["tags"], json!(["owner:home", "site:lab"]));
    assert_eq!(body["settings"], json!({"ipv4_only": true}));
}

#[tokio::test]
async fn dry_run_skips_the_put() {
    let fake = fake();
    let api = connect(&fake, TOKEN, true).await;

    let record = DnsRecord {
        id: "rec-a".to_string(),
        zone_id: "zone-com".to_string(),
        name: "home.example.com".to_string(),
        record_type: RecordType::A,
        content: "192.0.2.1".to_string(),
        proxied: false,
        comment: None,
        ttl: 1,
        extra: Default::default(),
    };
    let returned = api.update_record("zone-com", &record).await.unwrap();

    assert_eq!(returned, record);
    assert!(fake.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn server_errors_are_upstream_errors() {
    let fake = fake();
    *fake.fail_with.lock().unwrap() = Some(StatusCode::SERVICE_UNAVAILABLE);
    let api = connect(&fake, TOKEN, false).await;

    let err = api.list_zones(Some("example.com")).await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
    assert!(err.to_string().contains("503"), "{err}");
}

#[tokio::test]
async fn unreachable_api_is_an_upstream_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = CloudflareFactory::new(format!("http://{addr}"), DEFAULT_HTTP_TIMEOUT, false)
        .unwrap()
        .connect(&Credentials::new("", TOKEN))
        .unwrap();

    let err = api.list_zones(None).await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
}
