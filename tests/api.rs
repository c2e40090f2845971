//! HTTP-level tests driving the router in-process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use scan_docs::api::{create_router, AppState};
use scan_docs::domain::{ports::OcrEngine, DomainError};
use scan_docs::infrastructure::{AppConfig, DocxGenerator, InMemoryBlobStorage, DOCX_MIME_TYPE};

const BOUNDARY: &str = "scan-docs-test-boundary";

/// Returns fixed text, or fails when switched off.
struct StubOcr {
    text: String,
    healthy: AtomicBool,
}

#[async_trait]
impl OcrEngine for StubOcr {
    async fn extract_text(&self, _image: &[u8]) -> Result<String, DomainError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(self.text.clone())
        } else {
            Err(DomainError::ocr("engine unavailable"))
        }
    }
}

struct TestApp {
    state: AppState,
    storage: Arc<InMemoryBlobStorage>,
    ocr: Arc<StubOcr>,
}

impl TestApp {
    fn new() -> Self {
        let storage = Arc::new(InMemoryBlobStorage::new());
        let ocr = Arc::new(StubOcr {
            text: "Line1\n\nLine2".to_string(),
            healthy: AtomicBool::new(true),
        });
        let generator = Arc::new(DocxGenerator::new(storage.clone()));
        let state = AppState::new(AppConfig::default(), storage.clone(), ocr.clone(), generator);
        Self {
            state,
            storage,
            ocr,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = create_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send(request).await;
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    async fn register(&self, username: &str) -> String {
        let request = Request::post("/api/v1/tenants")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "username": username }).to_string()))
            .unwrap();
        let (status, body) = self.send_json(request).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn upload(&self, tenant: &str, filename: &str, folder_id: Option<&str>) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"\x89PNG fake image bytes");
        body.extend_from_slice(b"\r\n");
        if let Some(folder_id) = folder_id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"folderId\"\r\n\r\n{folder_id}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post("/api/v1/documents/upload")
            .header("x-tenant-id", tenant)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send_json(request).await
    }
}

fn get(uri: &str, tenant: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-tenant-id", tenant)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, tenant: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-tenant-id", tenant)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new();

    let (status, body) = app
        .send_json(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = app
        .send_json(Request::get("/ready").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);

    app.storage.set_writable(false);
    let (status, body) = app
        .send_json(Request::get("/ready").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");
}

#[tokio::test]
async fn test_register_seeds_root_and_resolves_identity() {
    let app = TestApp::new();
    let tenant = app.register("alice").await;

    let (status, me) = app.send_json(get("/api/v1/tenants/me", &tenant)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");

    let (status, roots) = app.send_json(get("/api/v1/folders/root", &tenant)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roots.as_array().unwrap().len(), 1);
    assert_eq!(roots[0]["name"], "Root");

    let request = Request::post("/api/v1/tenants")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "username": "alice" }).to_string()))
        .unwrap();
    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_missing_or_unknown_tenant_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app
        .send_json(Request::get("/api/v1/documents").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app.send_json(get("/api/v1/documents", "not-a-uuid")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let stranger = uuid::Uuid::new_v4().to_string();
    let (status, _) = app.send_json(get("/api/v1/folders/root", &stranger)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_process_and_download() {
    let app = TestApp::new();
    let tenant = app.register("alice").await;

    let (status, doc) = app.upload(&tenant, "receipt.png", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["status"], "COMPLETED");
    assert_eq!(doc["name"], "receipt.png");
    assert_eq!(doc["extractedText"], "Line1\n\nLine2");
    assert!(doc.get("sourcePath").is_none());
    assert!(doc.get("createdAt").is_some());
    assert!(doc.get("extracted_text").is_none());

    let id = doc["id"].as_str().unwrap();
    let response = create_router(app.state.clone())
        .oneshot(get(&format!("/api/v1/documents/{id}/download"), &tenant))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        DOCX_MIME_TYPE
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap(),
        "attachment; filename=\"receipt.png.docx\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn test_upload_into_folder_and_list() {
    let app = TestApp::new();
    let tenant = app.register("alice").await;
    let (_, roots) = app.send_json(get("/api/v1/folders/root", &tenant)).await;
    let root_id = roots[0]["id"].as_str().unwrap().to_string();

    let (status, doc) = app.upload(&tenant, "a.png", Some(&root_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["folderId"], root_id.as_str());
    app.upload(&tenant, "b.png", None).await;
    app.upload(&tenant, "c.png", None).await;

    let (status, page) = app
        .send_json(get("/api/v1/documents?page=1&size=2", &tenant))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["content"].as_array().unwrap().len(), 1);
    assert_eq!(page["content"][0]["name"], "c.png");
}

#[tokio::test]
async fn test_upload_into_foreign_folder_is_not_found() {
    let app = TestApp::new();
    let owner = app.register("alice").await;
    let intruder = app.register("mallory").await;
    let (_, roots) = app.send_json(get("/api/v1/folders/root", &owner)).await;
    let root_id = roots[0]["id"].as_str().unwrap().to_string();

    let (status, body) = app.upload(&intruder, "a.png", Some(&root_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_ocr_failure_is_reported_and_recorded() {
    let app = TestApp::new();
    let tenant = app.register("alice").await;
    app.ocr.healthy.store(false, Ordering::SeqCst);

    let (status, body) = app.upload(&tenant, "blurry.png", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "ocr_processing_failure");

    let (_, page) = app.send_json(get("/api/v1/documents", &tenant)).await;
    let doc = &page["content"][0];
    assert_eq!(doc["status"], "FAILED");
    assert!(doc["extractedText"].is_null());

    let id = doc["id"].as_str().unwrap();
    let (status, body) = app
        .send_json(get(&format!("/api/v1/documents/{id}/download"), &tenant))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_state");
}

#[tokio::test]
async fn test_documents_are_isolated_between_tenants() {
    let app = TestApp::new();
    let owner = app.register("alice").await;
    let intruder = app.register("mallory").await;
    let (_, doc) = app.upload(&owner, "secret.png", None).await;
    let uri = format!("/api/v1/documents/{}", doc["id"].as_str().unwrap());

    let (status, _) = app.send_json(get(&uri, &intruder)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send_json(json_request("PUT", &uri, &intruder, json!({ "name": "mine" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, page) = app.send_json(get("/api/v1/documents", &intruder)).await;
    assert_eq!(page["totalElements"], 0);

    let delete = Request::delete(&uri)
        .header("x-tenant-id", &owner)
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_document_update_validation() {
    let app = TestApp::new();
    let tenant = app.register("alice").await;
    let (_, doc) = app.upload(&tenant, "scan.png", None).await;
    let uri = format!("/api/v1/documents/{}", doc["id"].as_str().unwrap());

    let (status, body) = app
        .send_json(json_request("PUT", &uri, &tenant, json!({ "name": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_argument");

    let (status, body) = app
        .send_json(json_request(
            "PUT",
            &uri,
            &tenant,
            json!({ "name": "Invoice", "extractedText": "fixed" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Invoice");
    assert_eq!(body["extractedText"], "fixed");
}

#[tokio::test]
async fn test_folder_crud_and_self_parenting() {
    let app = TestApp::new();
    let tenant = app.register("alice").await;
    let (_, roots) = app.send_json(get("/api/v1/folders/root", &tenant)).await;
    let root_id = roots[0]["id"].as_str().unwrap().to_string();

    let (status, folder) = app
        .send_json(json_request(
            "POST",
            "/api/v1/folders",
            &tenant,
            json!({ "name": "Taxes", "parentId": root_id }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let folder_id = folder["id"].as_str().unwrap().to_string();
    let folder_uri = format!("/api/v1/folders/{folder_id}");

    let (status, body) = app
        .send_json(json_request(
            "PUT",
            &folder_uri,
            &tenant,
            json!({ "name": "Taxes", "parentId": folder_id }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "A folder cannot be its own parent");

    let (status, children) = app
        .send_json(get(&format!("/api/v1/folders/{root_id}/subfolders"), &tenant))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(children.as_array().unwrap().len(), 1);
    assert_eq!(children[0]["parentId"], root_id.as_str());

    let delete = Request::delete(&folder_uri)
        .header("x-tenant-id", &tenant)
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send_json(get(&format!("{folder_uri}/subfolders"), &tenant))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
