use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use hoplink::{
    codegen::{CodeGenerator, DEFAULT_ALPHABET},
    config::AppConfig,
    store::MemoryStore,
    AppState,
};

// "admin:secret" / "admin:wrong", base64-encoded
const AUTH_OK: &str = "Basic YWRtaW46c2VjcmV0";
const AUTH_BAD: &str = "Basic YWRtaW46d3Jvbmc=";

// ── Fixtures ───────────────────────────────────────────────────────────────

fn test_app() -> Router {
    let config = AppConfig {
        database_url: "sqlite::memory:".into(),
        storage_backend: "memory".into(),
        admin_username: "admin".into(),
        admin_password: "secret".into(),
        host: "127.0.0.1".into(),
        port: 0,
        base_url: "http://localhost:3000".into(),
        code_length: 7,
        code_alphabet: DEFAULT_ALPHABET.into(),
        root_redirect_url: "https://home.example.com".into(),
    };
    let codegen =
        CodeGenerator::new(&config.code_alphabet, config.code_length).expect("valid config");
    let state = Arc::new(AppState {
        store: Arc::new(MemoryStore::new(codegen)),
        config,
    });
    hoplink::app(state)
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Open routes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_needs_no_auth() {
    let response = test_app()
        .oneshot(get_request("/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn root_redirects_to_configured_homepage() {
    let response = test_app().oneshot(get_request("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://home.example.com"
    );
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let response = test_app()
        .oneshot(get_request("/zzzzzzz", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ── Auth gate ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn management_api_rejects_missing_or_wrong_credentials() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/links",
            None,
            r#"{"url":"https://example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/links",
            Some(AUTH_BAD),
            r#"{"url":"https://example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_request("/api/links/abc/stats", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ── Management + redirect flow ─────────────────────────────────────────────

#[tokio::test]
async fn create_redirect_update_delete_flow() {
    let app = test_app();

    // Create
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/links",
            Some(AUTH_OK),
            r#"{"url":"https://example.com/a"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let record = body_json(response).await;
    let code = record["code"].as_str().unwrap().to_owned();
    assert_eq!(record["url"], "https://example.com/a");
    assert_eq!(record["clicks"], 0);
    assert_eq!(record["indexable"], false);

    // Redirect counts a click and discourages indexing by default
    let response = app
        .clone()
        .oneshot(get_request(&format!("/{code}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/a"
    );
    assert_eq!(response.headers().get("x-robots-tag").unwrap(), "noindex");

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/links/{code}/stats"), Some(AUTH_OK)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["clicks"], 1);

    // Update rewrites the target and the hint, keeps the counter
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/links/{code}"),
            Some(AUTH_OK),
            r#"{"url":"https://example.com/b","indexable":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["url"], "https://example.com/b");
    assert_eq!(updated["indexable"], true);
    assert_eq!(updated["clicks"], 1);

    // Indexable links carry no robots hint
    let response = app
        .clone()
        .oneshot(get_request(&format!("/{code}"), None))
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/b"
    );
    assert!(response.headers().get("x-robots-tag").is_none());

    // Delete, then the code is gone everywhere
    let response = app
        .clone()
        .oneshot({
            let mut builder = Request::builder()
                .method("DELETE")
                .uri(format!("/api/links/{code}"));
            builder = builder.header(header::AUTHORIZATION, AUTH_OK);
            builder.body(Body::empty()).unwrap()
        })
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/{code}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get_request(&format!("/api/links/{code}/stats"), Some(AUTH_OK)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_rejects_syntactically_bad_urls() {
    let app = test_app();

    for body in [
        r#"{"url":""}"#,
        r#"{"url":"not a url"}"#,
        r#"{"url":"ftp://example.com"}"#,
        r#"{"url":"javascript:alert(1)"}"#,
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/links", Some(AUTH_OK), body))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "body {body} should be rejected"
        );
    }
}

#[tokio::test]
async fn update_and_delete_missing_codes_are_not_found() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/links/missing0",
            Some(AUTH_OK),
            r#"{"url":"https://example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot({
            Request::builder()
                .method("DELETE")
                .uri("/api/links/missing0")
                .header(header::AUTHORIZATION, AUTH_OK)
                .body(Body::empty())
                .unwrap()
        })
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
