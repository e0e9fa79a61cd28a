//! Integration tests for moodtunes-web HTTP endpoints
//!
//! Tests cover:
//! - Health and build info (no session required)
//! - Sign-up / sign-in / sign-out and the session cookie
//! - Session gate on pages and flow APIs
//! - Full mood -> artist -> songs flow over HTTP, one flow per session
//! - Billing checkout and portal
//! - Classic-variant curated recommendations
//! - Catch-all 404 page

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use moodtunes_common::config::{ProductVariant, TomlConfig};
use moodtunes_web::{build_router, AppState};
use serde_json::{json, Value};
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: config with no artificial latency
fn test_config(variant: ProductVariant) -> TomlConfig {
    let mut config = TomlConfig::default();
    config.variant = variant;
    config.lookup.latency_ms = 0;
    config
}

/// Test helper: Create app with in-memory collaborators
fn setup_app(variant: ProductVariant) -> Router {
    build_router(AppState::from_config(test_config(variant)))
}

/// Test helper: Create request with optional JSON body and session cookie
fn test_request(method: &str, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

async fn send(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

/// Test helper: register and sign in, returning the `name=value` cookie pair
async fn sign_in(app: &Router, email: &str) -> String {
    let credentials = json!({"email": email, "password": "secret123"});

    let response = send(app, test_request("POST", "/api/auth/sign-up", Some(credentials), None)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    sign_in_existing(app, email).await
}

/// Test helper: open another session for an already registered account
async fn sign_in_existing(app: &Router, email: &str) -> String {
    let credentials = json!({"email": email, "password": "secret123"});

    let response = send(app, test_request("POST", "/api/auth/sign-in", Some(credentials), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Sign-in should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    set_cookie.split(';').next().unwrap().to_string()
}

/// Test helper: poll the flow until the pending lookup settles
async fn wait_for_lookup(app: &Router, cookie: &str) -> Value {
    for _ in 0..100 {
        let response = send(app, test_request("GET", "/api/flow", None, Some(cookie))).await;
        let body = extract_json(response.into_body()).await;
        if body["is_loading"] == false {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Lookup did not complete");
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_session_required() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(&app, test_request("GET", "/health", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "moodtunes-web");
    assert_eq!(body["variant"], "guided");
    assert_eq!(body["lookup_backend"], "mock");
    assert_eq!(body["billing_backend"], "demo");
}

#[tokio::test]
async fn test_buildinfo() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(&app, test_request("GET", "/api/buildinfo", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["version"].is_string());
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Session gate
// =============================================================================

#[tokio::test]
async fn test_guided_index_redirects_without_session() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(&app, test_request("GET", "/", None, None)).await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/auth");
}

#[tokio::test]
async fn test_guided_index_served_with_session() {
    let app = setup_app(ProductVariant::Guided);
    let cookie = sign_in(&app, "index@example.com").await;

    let response = send(&app, test_request("GET", "/", None, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("data-page=\"guided\""));

    // Signed-in users skip the auth page
    let response = send(&app, test_request("GET", "/auth", None, Some(&cookie))).await;
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_flow_api_requires_session() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(&app, test_request("GET", "/api/flow", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let response = send(
        &app,
        test_request("POST", "/api/flow/mood", Some(json!({"mood": "Happy"})), Some("mt_session=bogus")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_pages() {
    let app = setup_app(ProductVariant::Guided);

    for path in ["/welcome", "/auth", "/pricing", "/subscription-success"] {
        let response = send(&app, test_request("GET", path, None, None)).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
    }

    let response = send(&app, test_request("GET", "/static/app.js", None, None)).await;
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/javascript");
}

#[tokio::test]
async fn test_app_js_renders_only_latest_response() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(&app, test_request("GET", "/static/app.js", None, None)).await;
    let script = extract_text(response.into_body()).await;

    assert!(script.contains("function latestOnly()"));
    assert!(script.contains("if (ticket === issued) resolve(data)"));
    assert!(script.contains("latestFlow(api(method, path, body)).then(renderFlow)"));
    assert!(script.contains("latestRecs(api('POST', '/api/recommendations', { mood }))"));
}

#[tokio::test]
async fn test_unknown_path_is_404_page() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(&app, test_request("GET", "/no/such/page", None, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("Page not found"));
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_sign_up_validation_errors() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(
        &app,
        test_request("POST", "/api/auth/sign-up", Some(json!({"email": "a@b.c", "password": "123"})), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("at least 6"));
}

#[tokio::test]
async fn test_wrong_password_reports_provider_message() {
    let app = setup_app(ProductVariant::Guided);
    sign_in(&app, "user@example.com").await;

    let response = send(
        &app,
        test_request(
            "POST",
            "/api/auth/sign-in",
            Some(json!({"email": "user@example.com", "password": "not-it"})),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["message"], "Invalid login credentials");
}

#[tokio::test]
async fn test_session_endpoint_and_sign_out() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(&app, test_request("GET", "/api/session", None, None)).await;
    let body = extract_json(response.into_body()).await;
    assert!(body["user"].is_null());

    let cookie = sign_in(&app, "priya@example.com").await;
    let response = send(&app, test_request("GET", "/api/session", None, Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["user"]["display_name"], "priya");
    assert_eq!(body["entitlement"]["subscribed"], false);

    let response = send(&app, test_request("POST", "/api/auth/sign-out", None, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cleared.contains("Max-Age=0"));

    let response = send(&app, test_request("GET", "/api/flow", None, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Flow
// =============================================================================

#[tokio::test]
async fn test_full_flow_over_http() {
    let app = setup_app(ProductVariant::Guided);
    let cookie = sign_in(&app, "flow@example.com").await;

    let response = send(&app, test_request("GET", "/api/flow", None, Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "mood");

    let response = send(
        &app,
        test_request("POST", "/api/flow/mood", Some(json!({"mood": "Happy"})), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "artist");
    assert_eq!(body["mood"], "Happy");

    let response = send(
        &app,
        test_request("POST", "/api/flow/artist", Some(json!({"artist": "A.R. Rahman"})), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "songs");
    assert_eq!(body["artist"]["group"], "Tamil");

    let body = wait_for_lookup(&app, &cookie).await;
    assert_eq!(body["outcome"], "results");
    let songs = body["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 5);
    for song in songs {
        assert_eq!(song["artist"], "A.R. Rahman");
        assert!(song["url"].as_str().unwrap().starts_with("https://www.youtube.com/results?search_query="));
    }

    // Back to artist keeps the mood
    let response = send(&app, test_request("POST", "/api/flow/back", None, Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "artist");
    assert_eq!(body["mood"], "Happy");
    assert!(body["artist"].is_null());
    assert!(body["songs"].as_array().unwrap().is_empty());

    // Back to mood clears it
    let response = send(&app, test_request("POST", "/api/flow/back", None, Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "mood");
    assert!(body["mood"].is_null());
}

#[tokio::test]
async fn test_blank_mood_is_silent_no_op() {
    let app = setup_app(ProductVariant::Guided);
    let cookie = sign_in(&app, "blank@example.com").await;

    let response = send(
        &app,
        test_request("POST", "/api/flow/mood", Some(json!({"mood": "   "})), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "mood");
    assert!(body["mood"].is_null());
}

#[tokio::test]
async fn test_artist_before_mood_is_rejected() {
    let app = setup_app(ProductVariant::Guided);
    let cookie = sign_in(&app, "order@example.com").await;

    let response = send(
        &app,
        test_request("POST", "/api/flow/artist", Some(json!({"artist": "Arijit Singh"})), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(&app, test_request("GET", "/api/flow", None, Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "mood");
    assert!(body["artist"].is_null());
}

#[tokio::test]
async fn test_unknown_artist_is_bad_request() {
    let app = setup_app(ProductVariant::Guided);
    let cookie = sign_in(&app, "unknown@example.com").await;

    send(
        &app,
        test_request("POST", "/api/flow/mood", Some(json!({"mood": "Chill"})), Some(&cookie)),
    )
    .await;
    let response = send(
        &app,
        test_request("POST", "/api/flow/artist", Some(json!({"artist": "Not An Artist"})), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_mood_and_refresh() {
    let app = setup_app(ProductVariant::Guided);
    let cookie = sign_in(&app, "chat@example.com").await;

    let response = send(
        &app,
        test_request("POST", "/api/chat/mood", Some(json!({"message": "Party"})), Some(&cookie)),
    )
    .await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "artist");
    let chat = body["chat"].as_array().unwrap();
    assert_eq!(chat.len(), 3);
    assert_eq!(chat[1]["role"], "user");
    assert_eq!(chat[1]["content"], "Party");

    // Refresh is only valid once songs are showing
    let response = send(&app, test_request("POST", "/api/flow/refresh", None, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    send(
        &app,
        test_request("POST", "/api/flow/artist", Some(json!({"artist": "Badshah"})), Some(&cookie)),
    )
    .await;
    wait_for_lookup(&app, &cookie).await;

    let response = send(&app, test_request("POST", "/api/flow/refresh", None, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = wait_for_lookup(&app, &cookie).await;
    assert_eq!(body["songs"].as_array().unwrap().len(), 5);
    assert_eq!(body["mood"], "Party");

    let response = send(&app, test_request("POST", "/api/flow/reset", None, Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "mood");
    assert_eq!(body["chat"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_flows_are_per_user() {
    let app = setup_app(ProductVariant::Guided);
    let alice = sign_in(&app, "alice@example.com").await;
    let bob = sign_in(&app, "bob@example.com").await;

    send(
        &app,
        test_request("POST", "/api/flow/mood", Some(json!({"mood": "Sad"})), Some(&alice)),
    )
    .await;

    let response = send(&app, test_request("GET", "/api/flow", None, Some(&bob))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "mood");
}

#[tokio::test]
async fn test_sessions_of_one_user_keep_separate_flows() {
    let app = setup_app(ProductVariant::Guided);
    let laptop = sign_in(&app, "meera@example.com").await;
    let phone = sign_in_existing(&app, "meera@example.com").await;
    assert_ne!(laptop, phone);

    let response = send(
        &app,
        test_request("POST", "/api/flow/mood", Some(json!({"mood": "Happy"})), Some(&laptop)),
    )
    .await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "artist");

    let response = send(&app, test_request("GET", "/api/flow", None, Some(&phone))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "mood");
    assert!(body["mood"].is_null());

    // Signing out one browser leaves the other's flow alone
    let response = send(&app, test_request("POST", "/api/auth/sign-out", None, Some(&phone))).await;
    assert_eq!(response.status(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let response = send(&app, test_request("GET", "/api/flow", None, Some(&laptop))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "artist");
    assert_eq!(body["mood"], "Happy");
}

#[tokio::test]
async fn test_reloading_index_starts_fresh_flow() {
    let app = setup_app(ProductVariant::Guided);
    let cookie = sign_in(&app, "kavya@example.com").await;

    send(
        &app,
        test_request("POST", "/api/flow/mood", Some(json!({"mood": "Chill"})), Some(&cookie)),
    )
    .await;
    let response = send(&app, test_request("GET", "/api/flow", None, Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "artist");

    let response = send(&app, test_request("GET", "/", None, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, test_request("GET", "/api/flow", None, Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["step"], "mood");
    assert!(body["mood"].is_null());
}

// =============================================================================
// Catalog and billing
// =============================================================================

#[tokio::test]
async fn test_catalog_endpoints() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(&app, test_request("GET", "/api/catalog/moods", None, None)).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["presets"], json!(["Happy", "Sad", "Romantic", "Party", "Chill", "Workout"]));

    let response = send(&app, test_request("GET", "/api/catalog/artists", None, None)).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["name"], "Tamil");
    assert_eq!(body[1]["name"], "Hindi");

    let response = send(&app, test_request("GET", "/api/billing/plans", None, None)).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["plans"].as_array().unwrap().len(), 3);
    assert_eq!(body["plans"][1]["popular"], true);
}

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(
        &app,
        test_request("POST", "/api/billing/checkout", Some(json!({"plan": "standard"})), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["error"]["message"],
        "You need to be signed in to subscribe to a plan."
    );
}

#[tokio::test]
async fn test_checkout_and_portal() {
    let app = setup_app(ProductVariant::Guided);
    let cookie = sign_in(&app, "buyer@example.com").await;

    // No subscription yet
    let response = send(&app, test_request("POST", "/api/billing/portal", None, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let response = send(
        &app,
        test_request("POST", "/api/billing/checkout", Some(json!({"plan": "enterprise"})), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        test_request("POST", "/api/billing/checkout", Some(json!({"plan": "premium"})), Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["url"], "/subscription-success");

    let response = send(&app, test_request("GET", "/api/subscription", None, Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["subscribed"], true);
    assert_eq!(body["tier"], "Premium");

    let response = send(&app, test_request("POST", "/api/billing/portal", None, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Classic variant
// =============================================================================

#[tokio::test]
async fn test_classic_index_is_open() {
    let app = setup_app(ProductVariant::Classic);

    let response = send(&app, test_request("GET", "/", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("data-page=\"classic\""));
}

#[tokio::test]
async fn test_classic_recommendations() {
    let app = setup_app(ProductVariant::Classic);

    let response = send(
        &app,
        test_request("POST", "/api/recommendations", Some(json!({"mood": " Happy "})), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["mood"], "Happy");
    assert_eq!(body["recommendations"][0]["artist"], "Pharrell Williams");

    let response = send(
        &app,
        test_request("POST", "/api/recommendations", Some(json!({"mood": ""})), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_absent_in_guided_variant() {
    let app = setup_app(ProductVariant::Guided);

    let response = send(
        &app,
        test_request("POST", "/api/recommendations", Some(json!({"mood": "Happy"})), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
