//! Integration tests for the Sheet Catalog Server API
//!
//! These tests drive the full router against the in-memory repository and
//! blob store, so every request/response cycle runs without Postgres or
//! Cloudinary.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use sheet_catalog_server::{
    config::CloudinaryConfig,
    constants::{MAX_SHEET_SIZE_BYTES, MSG_FILE_TOO_LARGE, MSG_ROUTE_NOT_FOUND, MSG_SHEET_NOT_FOUND},
    db::MemorySheetStore,
    routes,
    security::hash_password,
    storage::MemoryBlobStore,
    AppState, Config, SheetManager, Timeouts,
};

// Test configuration constants
const TEST_JWT_SECRET: &str = "test-jwt-secret";
const TEST_ADMIN: &str = "admin";
const TEST_PASSWORD: &str = "test-password";
const BOUNDARY: &str = "----sheet-catalog-test-boundary";

// =============================================================================
// Test Helpers
// =============================================================================

/// Create a test configuration
fn test_config(admin_password_hash: Option<String>) -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: String::new(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        environment: "test".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiry_secs: 3600,
        admin_username: admin_password_hash.as_ref().map(|_| TEST_ADMIN.to_string()),
        admin_password_hash,
        cloudinary: CloudinaryConfig {
            cloud_name: "test".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            folder: "test_sources".to_string(),
            api_base: "http://127.0.0.1:1".to_string(),
        },
        blob_timeout_secs: 1,
        db_timeout_secs: 1,
    }
}

/// In-memory backends plus the state wired on top of them
struct TestContext {
    store: Arc<MemorySheetStore>,
    blobs: Arc<MemoryBlobStore>,
    state: AppState,
}

impl TestContext {
    fn new() -> Self {
        Self::with_config(test_config(None))
    }

    fn with_config(config: Config) -> Self {
        let store = Arc::new(MemorySheetStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let timeouts = Timeouts {
            blob: Duration::from_millis(300),
            db: Duration::from_secs(1),
        };
        let sheets = SheetManager::new(store.clone(), blobs.clone(), timeouts);
        let state = AppState::new(sheets, store.clone(), config);

        Self {
            store,
            blobs,
            state,
        }
    }

    /// Create a test app router
    fn app(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn admin_token(&self) -> String {
        self.state.tokens.issue(TEST_ADMIN).unwrap()
    }
}

/// A small but well-formed looking PDF payload
fn sample_pdf(size: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(size, b'0');
    data
}

/// Build a multipart/form-data body
fn multipart_body(
    title: Option<&str>,
    category_id: Option<&str>,
    file: Option<(&[u8], &str)>,
) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(title) = title {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{}\r\n",
                BOUNDARY, title
            )
            .as_bytes(),
        );
    }

    if let Some(category_id) = category_id {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"category_id\"\r\n\r\n{}\r\n",
                BOUNDARY, category_id
            )
            .as_bytes(),
        );
    }

    if let Some((bytes, content_type)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"sheet.pdf\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Create an authenticated multipart upload request
fn make_upload_request(token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/sheets")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Create a POST request with JSON body
fn make_post_request(uri: &str, token: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Create a GET request
fn make_get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Create a DELETE request
fn make_delete_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Parse response body as JSON
async fn body_to_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Upload a sheet through the API and return the created sheet JSON
async fn create_sheet(ctx: &TestContext, title: &str, category_id: Option<i64>) -> Value {
    let token = ctx.admin_token();
    let category = category_id.map(|id| id.to_string());
    let pdf = sample_pdf(2048);
    let body = multipart_body(
        Some(title),
        category.as_deref(),
        Some((&pdf, "application/pdf")),
    );

    let response = ctx
        .app()
        .oneshot(make_upload_request(Some(&token), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_to_json(response.into_body()).await;
    body["sheet"].clone()
}

/// Create a category through the API and return its id
async fn create_category(ctx: &TestContext, name: &str) -> i64 {
    let token = ctx.admin_token();
    let response = ctx
        .app()
        .oneshot(make_post_request(
            "/api/categories",
            Some(&token),
            json!({ "name": name }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_to_json(response.into_body()).await;
    body["category"]["id"].as_i64().unwrap()
}

async fn list_sheets(ctx: &TestContext, query: &str) -> Vec<Value> {
    let response = ctx
        .app()
        .oneshot(make_get_request(&format!("/api/sheets{}", query)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    body_to_json(response.into_body())
        .await
        .as_array()
        .cloned()
        .unwrap()
}

async fn download(ctx: &TestContext, id: i64) -> (StatusCode, Value) {
    let response = ctx
        .app()
        .oneshot(make_get_request(&format!("/api/sheets/{}/download", id)))
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check_returns_healthy() {
    let ctx = TestContext::new();

    let response = ctx.app().oneshot(make_get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert!(body["version"].as_str().is_some());
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let ctx = TestContext::new();

    let response = ctx.app().oneshot(make_get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["endpoints"]["sheets"], "/api/sheets");
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let ctx = TestContext::new();

    let response = ctx
        .app()
        .oneshot(make_get_request("/api/nothing-here"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["error"], "Not found");
    assert_eq!(body["message"], MSG_ROUTE_NOT_FOUND);
    assert_eq!(body["path"], "/api/nothing-here");
}

// =============================================================================
// Login Tests
// =============================================================================

#[tokio::test]
async fn test_login_success_issues_usable_token() {
    let hash = hash_password(TEST_PASSWORD).unwrap();
    let ctx = TestContext::with_config(test_config(Some(hash)));

    let response = ctx
        .app()
        .oneshot(make_post_request(
            "/api/auth/login",
            None,
            json!({ "username": TEST_ADMIN, "password": TEST_PASSWORD }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["username"], TEST_ADMIN);

    // The issued token opens admin routes
    let token = body["token"].as_str().unwrap().to_string();
    let response = ctx
        .app()
        .oneshot(make_post_request(
            "/api/categories",
            Some(&token),
            json!({ "name": "Halacha" }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_login_with_bcrypt_admin_hash() {
    // bcryptjs-style hash of "admin123"
    let hash = "$2a$04$..CA.uOD/eaGAOmJB.yMBuzs0J17lmuHGOn9ovkMjm6kIrYX1kFau".to_string();
    let ctx = TestContext::with_config(test_config(Some(hash)));

    let response = ctx
        .app()
        .oneshot(make_post_request(
            "/api/auth/login",
            None,
            json!({ "username": TEST_ADMIN, "password": "admin123" }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let hash = hash_password(TEST_PASSWORD).unwrap();
    let ctx = TestContext::with_config(test_config(Some(hash)));

    let response = ctx
        .app()
        .oneshot(make_post_request(
            "/api/auth/login",
            None,
            json!({ "username": TEST_ADMIN, "password": "nope" }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_missing_fields() {
    let ctx = TestContext::new();

    let response = ctx
        .app()
        .oneshot(make_post_request(
            "/api/auth/login",
            None,
            json!({ "username": TEST_ADMIN }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_without_configured_admin() {
    let ctx = TestContext::new();

    let response = ctx
        .app()
        .oneshot(make_post_request(
            "/api/auth/login",
            None,
            json!({ "username": TEST_ADMIN, "password": TEST_PASSWORD }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Sheet Creation Tests
// =============================================================================

#[tokio::test]
async fn test_create_sheet_requires_token() {
    let ctx = TestContext::new();
    let pdf = sample_pdf(512);
    let body = multipart_body(Some("No Auth"), None, Some((&pdf, "application/pdf")));

    let response = ctx
        .app()
        .oneshot(make_upload_request(None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.blobs.upload_calls(), 0);
}

#[tokio::test]
async fn test_create_sheet_rejects_invalid_token() {
    let ctx = TestContext::new();
    let pdf = sample_pdf(512);
    let body = multipart_body(Some("Bad Auth"), None, Some((&pdf, "application/pdf")));

    let response = ctx
        .app()
        .oneshot(make_upload_request(Some("not-a-jwt"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_sheet_success() {
    let ctx = TestContext::new();

    let sheet = create_sheet(&ctx, "Bereishit", None).await;

    assert_eq!(sheet["title"], "Bereishit");
    assert_eq!(sheet["download_count"], 0);
    assert!(sheet["category_id"].is_null());
    assert!(!sheet["file_url"].as_str().unwrap().is_empty());
    assert_eq!(ctx.blobs.object_count().await, 1);

    let listed = list_sheets(&ctx, "").await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], sheet["id"]);
    assert_eq!(listed[0]["download_count"], 0);
}

#[tokio::test]
async fn test_create_sheet_rejects_non_pdf() {
    let ctx = TestContext::new();
    let token = ctx.admin_token();
    let body = multipart_body(Some("Image"), None, Some((b"\x89PNG....", "image/png")));

    let response = ctx
        .app()
        .oneshot(make_upload_request(Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.blobs.upload_calls(), 0);
}

#[tokio::test]
async fn test_create_sheet_missing_title() {
    let ctx = TestContext::new();
    let token = ctx.admin_token();
    let pdf = sample_pdf(512);
    let body = multipart_body(None, None, Some((&pdf, "application/pdf")));

    let response = ctx
        .app()
        .oneshot(make_upload_request(Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_sheet_empty_file() {
    let ctx = TestContext::new();
    let token = ctx.admin_token();
    let body = multipart_body(Some("Empty"), None, Some((b"", "application/pdf")));

    let response = ctx
        .app()
        .oneshot(make_upload_request(Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.blobs.upload_calls(), 0);
}

#[tokio::test]
async fn test_create_sheet_too_large() {
    let ctx = TestContext::new();
    let token = ctx.admin_token();
    let pdf = sample_pdf(MAX_SHEET_SIZE_BYTES + 1);
    let body = multipart_body(Some("Huge"), None, Some((&pdf, "application/pdf")));

    let response = ctx
        .app()
        .oneshot(make_upload_request(Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["error"], "File too large");
    assert_eq!(body["message"], MSG_FILE_TOO_LARGE);
    assert_eq!(ctx.blobs.upload_calls(), 0);
}

#[tokio::test]
async fn test_create_sheet_upload_failure_writes_nothing() {
    let ctx = TestContext::new();
    ctx.blobs.fail_uploads(true);
    let token = ctx.admin_token();
    let pdf = sample_pdf(1024);
    let body = multipart_body(Some("Doomed"), None, Some((&pdf, "application/pdf")));

    let response = ctx
        .app()
        .oneshot(make_upload_request(Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(list_sheets(&ctx, "").await.is_empty());
}

#[tokio::test]
async fn test_create_sheet_upload_timeout_writes_nothing() {
    let ctx = TestContext::new();
    ctx.blobs.set_upload_delay(Some(Duration::from_secs(3))).await;
    let token = ctx.admin_token();
    let pdf = sample_pdf(1024);
    let body = multipart_body(Some("Slow"), None, Some((&pdf, "application/pdf")));

    let response = ctx
        .app()
        .oneshot(make_upload_request(Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ctx.store.sheet_count().await, 0);
}

#[tokio::test]
async fn test_create_sheet_persist_failure_leaves_orphan_blob() {
    let ctx = TestContext::new();
    ctx.store.fail_inserts(true);
    let token = ctx.admin_token();
    let pdf = sample_pdf(1024);
    let body = multipart_body(Some("Orphan"), None, Some((&pdf, "application/pdf")));

    let response = ctx
        .app()
        .oneshot(make_upload_request(Some(&token), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ctx.store.sheet_count().await, 0);
    // Known gap: the uploaded object is not reconciled
    assert_eq!(ctx.blobs.object_count().await, 1);
}

// =============================================================================
// Download Tests
// =============================================================================

#[tokio::test]
async fn test_sequential_downloads_increment() {
    let ctx = TestContext::new();
    let sheet = create_sheet(&ctx, "Counter", None).await;
    let id = sheet["id"].as_i64().unwrap();

    for expected in 1..=3 {
        let (status, body) = download(&ctx, id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["downloadCount"], expected);
        assert_eq!(body["fileUrl"], sheet["file_url"]);
    }
}

#[tokio::test]
async fn test_concurrent_downloads_are_all_counted() {
    let ctx = TestContext::new();
    let sheet = create_sheet(&ctx, "Busy", None).await;
    let id = sheet["id"].as_i64().unwrap();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let app = ctx.app();
            tokio::spawn(async move {
                let response = app
                    .oneshot(make_get_request(&format!("/api/sheets/{}/download", id)))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK);
                body_to_json(response.into_body()).await["downloadCount"]
                    .as_i64()
                    .unwrap()
            })
        })
        .collect();

    let mut counts = HashSet::new();
    for handle in handles {
        counts.insert(handle.await.unwrap());
    }

    assert_eq!(counts, (1..=20).collect::<HashSet<i64>>());

    let listed = list_sheets(&ctx, "").await;
    assert_eq!(listed[0]["download_count"], 20);
}

#[tokio::test]
async fn test_download_missing_sheet() {
    let ctx = TestContext::new();

    let (status, body) = download(&ctx, 9999).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Sheet not found");
    assert_eq!(body["message"], MSG_SHEET_NOT_FOUND);
}

#[tokio::test]
async fn test_download_invalid_id() {
    let ctx = TestContext::new();

    let response = ctx
        .app()
        .oneshot(make_get_request("/api/sheets/abc/download"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Listing Tests
// =============================================================================

#[tokio::test]
async fn test_list_popular_and_category_filter() {
    let ctx = TestContext::new();
    let category = create_category(&ctx, "Tanach").await;

    let quiet = create_sheet(&ctx, "Quiet", Some(category)).await;
    let loud = create_sheet(&ctx, "Loud", None).await;
    let loud_id = loud["id"].as_i64().unwrap();
    download(&ctx, loud_id).await;
    download(&ctx, loud_id).await;

    let newest = list_sheets(&ctx, "?sort=newest").await;
    assert_eq!(newest[0]["id"], loud["id"]);

    let popular = list_sheets(&ctx, "?sort=popular").await;
    assert_eq!(popular[0]["id"], loud["id"]);
    assert_eq!(popular[1]["id"], quiet["id"]);

    let filtered = list_sheets(&ctx, &format!("?category={}", category)).await;
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["id"], quiet["id"]);
    assert_eq!(filtered[0]["category_name"], "Tanach");
}

#[tokio::test]
async fn test_list_invalid_category_param() {
    let ctx = TestContext::new();

    let response = ctx
        .app()
        .oneshot(make_get_request("/api/sheets?category=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Sheet Deletion Tests
// =============================================================================

#[tokio::test]
async fn test_delete_sheet_success() {
    let ctx = TestContext::new();
    let sheet = create_sheet(&ctx, "Short Lived", None).await;
    let id = sheet["id"].as_i64().unwrap();
    let token = ctx.admin_token();

    let response = ctx
        .app()
        .oneshot(make_delete_request(&format!("/api/sheets/{}", id), Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["title"], "Short Lived");
    assert_eq!(ctx.blobs.object_count().await, 0);
    assert!(list_sheets(&ctx, "").await.is_empty());

    // Second delete of the same id
    let response = ctx
        .app()
        .oneshot(make_delete_request(&format!("/api/sheets/{}", id), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_sheet_requires_token() {
    let ctx = TestContext::new();
    let sheet = create_sheet(&ctx, "Protected", None).await;
    let id = sheet["id"].as_i64().unwrap();

    let response = ctx
        .app()
        .oneshot(make_delete_request(&format!("/api/sheets/{}", id), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(list_sheets(&ctx, "").await.len(), 1);
}

#[tokio::test]
async fn test_delete_sheet_succeeds_when_blob_delete_fails() {
    let ctx = TestContext::new();
    let sheet = create_sheet(&ctx, "Leaky", None).await;
    let id = sheet["id"].as_i64().unwrap();
    ctx.blobs.fail_deletes(true);
    let token = ctx.admin_token();

    let response = ctx
        .app()
        .oneshot(make_delete_request(&format!("/api/sheets/{}", id), Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["title"], "Leaky");
    assert!(list_sheets(&ctx, "").await.is_empty());
    assert_eq!(ctx.blobs.delete_calls(), 1);
}

// =============================================================================
// Category Tests
// =============================================================================

#[tokio::test]
async fn test_category_duplicate_and_blank_names() {
    let ctx = TestContext::new();
    let token = ctx.admin_token();
    create_category(&ctx, "Halacha").await;

    let response = ctx
        .app()
        .oneshot(make_post_request(
            "/api/categories",
            Some(&token),
            json!({ "name": " Halacha " }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = ctx
        .app()
        .oneshot(make_post_request(
            "/api/categories",
            Some(&token),
            json!({ "name": "   " }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_category_keeps_sheets() {
    let ctx = TestContext::new();
    let category = create_category(&ctx, "Mishnah").await;
    create_sheet(&ctx, "Avot", Some(category)).await;
    create_sheet(&ctx, "Brachot", Some(category)).await;

    let response = ctx.app().oneshot(make_get_request("/api/categories")).await.unwrap();
    let categories = body_to_json(response.into_body()).await;
    assert_eq!(categories[0]["sheet_count"], 2);

    let token = ctx.admin_token();
    let response = ctx
        .app()
        .oneshot(make_delete_request(
            &format!("/api/categories/{}", category),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sheets = list_sheets(&ctx, "").await;
    assert_eq!(sheets.len(), 2);
    assert!(sheets.iter().all(|s| s["category_id"].is_null()));

    let response = ctx
        .app()
        .oneshot(make_delete_request(
            &format!("/api/categories/{}", category),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// End-to-end Scenario
// =============================================================================

#[tokio::test]
async fn test_parsha_notes_lifecycle() {
    let ctx = TestContext::new();
    create_category(&ctx, "Chumash").await;
    create_category(&ctx, "Gemara").await;
    let parsha = create_category(&ctx, "Parsha").await;
    assert_eq!(parsha, 3);

    let sheet = create_sheet(&ctx, "Parsha Notes", Some(3)).await;
    assert_eq!(sheet["download_count"], 0);
    assert_eq!(sheet["category_id"], 3);
    assert!(!sheet["file_url"].as_str().unwrap().is_empty());
    let id = sheet["id"].as_i64().unwrap();

    let (_, first) = download(&ctx, id).await;
    assert_eq!(first["downloadCount"], 1);
    let (_, second) = download(&ctx, id).await;
    assert_eq!(second["downloadCount"], 2);

    let token = ctx.admin_token();
    let response = ctx
        .app()
        .oneshot(make_delete_request(&format!("/api/sheets/{}", id), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["title"], "Parsha Notes");

    let remaining = list_sheets(&ctx, "").await;
    assert!(remaining.iter().all(|s| s["id"] != sheet["id"]));
}
