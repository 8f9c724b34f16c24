//! End-to-end tests of the HTTP surface
//!
//! The router runs against the in-memory gateway and a temporary photo
//! directory; tokens are obtained through `/auth/login`.

use std::sync::Arc;

use auth::{AdminConfig, AdminCredentials, AuthState, JwtConfig, JwtService};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::storage::FileStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use users::{AppState, UserService, create_router, repositories::InMemoryUserRepository};

const PRIVATE_KEY: &str = include_str!("../../auth/tests/fixtures/jwt_private.pem");
const PUBLIC_KEY: &str = include_str!("../../auth/tests/fixtures/jwt_public.pem");
const BOUNDARY: &str = "photo-boundary-7MA4YWxkTrZu0gW";

struct TestApp {
    _dir: TempDir,
    store: FileStore,
    router: Router,
    token: String,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_upload_limit(1024 * 1024).await
    }

    async fn with_upload_limit(upload_limit: usize) -> Self {
        let dir = TempDir::new().unwrap();
        let store = FileStore::init(dir.path().join("photos")).await.unwrap();

        let jwt_service = JwtService::new(JwtConfig {
            private_key: PRIVATE_KEY.to_string(),
            public_key: PUBLIC_KEY.to_string(),
            access_token_expiry: 900,
        })
        .unwrap();
        let verifier = AdminCredentials::new(AdminConfig {
            username: "admin".to_string(),
            password: "admin-password".to_string(),
            role: "ADMIN".to_string(),
        })
        .unwrap();

        let router = create_router(AppState {
            user_service: UserService::new(
                Arc::new(InMemoryUserRepository::new()),
                store.clone(),
            ),
            auth: AuthState {
                jwt_service,
                verifier: Arc::new(verifier),
            },
            upload_limit,
        });

        let mut app = TestApp {
            _dir: dir,
            store,
            router,
            token: String::new(),
        };
        app.token = app.login().await;
        app
    }

    async fn login(&self) -> String {
        let request = Request::post("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": "admin", "password": "admin-password"}).to_string(),
            ))
            .unwrap();

        let (status, body) = self.send(request).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn authorized(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
    }

    async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => self
                .authorized(method, uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => self.authorized(method, uri).body(Body::empty()),
        }
        .unwrap();

        let (status, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn text(&self, method: &str, uri: &str) -> (StatusCode, String) {
        let request = self.authorized(method, uri).body(Body::empty()).unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8(bytes).unwrap())
    }

    async fn upload(&self, uri: &str, field: &str, filename: &str, content: &[u8]) -> (StatusCode, Value) {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = self
            .authorized("POST", uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, bytes) = self.send(request).await;
        // multipart rejections carry a plain-text body
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

fn new_user(email: &str, phone: &str) -> Value {
    json!({
        "lastName": "Sidorov",
        "firstName": "Sidor",
        "patronymic": "Sidorovich",
        "birthDate": "1970-07-07",
        "email": email,
        "phoneNumber": phone
    })
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn users_routes_require_bearer_token() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(Request::get("/users").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Request::get("/users/1/photo")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"username": "admin", "password": "guess"}).to_string(),
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_then_conflict_on_duplicate_email() {
    let app = TestApp::new().await;

    let (status, created) = app
        .json("POST", "/users", Some(new_user("a@x.com", "+1")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["photoPath"], Value::Null);

    let (status, body) = app
        .json("POST", "/users", Some(new_user("a@x.com", "+2")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "User with this email or phone number already exists."
    );

    let (status, _) = app
        .json("POST", "/users", Some(new_user("b@x.com", "+1")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = app.json("GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn get_user_and_contact_projection() {
    let app = TestApp::new().await;
    app.json("POST", "/users", Some(new_user("a@x.com", "+1")))
        .await;

    let (status, user) = app.json("GET", "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["birthDate"], "1970-07-07");

    let (status, contact) = app.json("GET", "/users/1/contact", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        contact,
        json!({
            "lastName": "Sidorov",
            "firstName": "Sidor",
            "patronymic": "Sidorovich",
            "phoneNumber": "+1",
            "email": "a@x.com"
        })
    );

    let (status, body) = app.json("GET", "/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User with ID 999 not found.");

    let (status, _) = app.json("GET", "/users/999/contact", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_keeps_path_id() {
    let app = TestApp::new().await;
    app.json("POST", "/users", Some(new_user("a@x.com", "+1")))
        .await;

    let mut payload = new_user("new@email.com", "+1");
    payload["id"] = json!(55);
    let (status, updated) = app.json("PUT", "/users/1", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["email"], "new@email.com");

    let (status, _) = app.json("GET", "/users/55", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .json("PUT", "/users/404", Some(new_user("c@x.com", "+3")))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_user_is_idempotent() {
    let app = TestApp::new().await;
    app.json("POST", "/users", Some(new_user("a@x.com", "+1")))
        .await;

    let (status, _) = app.json("DELETE", "/users/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.json("GET", "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.json("DELETE", "/users/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn photo_upload_replace_and_delete() {
    let app = TestApp::new().await;
    app.json("POST", "/users", Some(new_user("a@x.com", "+1")))
        .await;

    let (status, user) = app.upload("/users/1/photo", "file", "pic.png", b"first").await;
    assert_eq!(status, StatusCode::OK);
    let first = user["photoPath"].as_str().unwrap().to_string();
    assert!(first.starts_with("photos/"));
    assert!(first.ends_with(".png"));
    assert_eq!(std::fs::read(app.store.resolve(&first).unwrap()).unwrap(), b"first");

    let (status, path) = app.text("GET", "/users/1/photo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(path, first);

    let (status, user) = app.upload("/users/1/photo", "file", "pic.JPEG", b"second").await;
    assert_eq!(status, StatusCode::OK);
    let second = user["photoPath"].as_str().unwrap().to_string();
    assert!(second.ends_with(".JPEG"));
    assert!(!app.store.resolve(&first).unwrap().exists());

    let (status, _) = app.json("DELETE", "/users/1/photo", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!app.store.resolve(&second).unwrap().exists());

    let (status, path) = app.text("GET", "/users/1/photo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(path, "");

    // no photo left: still succeeds
    let (status, _) = app.json("DELETE", "/users/1/photo", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn photo_routes_for_missing_user_are_not_found() {
    let app = TestApp::new().await;

    let (status, _) = app.upload("/users/7/photo", "file", "pic.png", b"x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.text("GET", "/users/7/photo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.json("DELETE", "/users/7/photo", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(std::fs::read_dir(app.store.root()).unwrap().count(), 0);
}

#[tokio::test]
async fn upload_without_file_part_is_bad_request() {
    let app = TestApp::new().await;
    app.json("POST", "/users", Some(new_user("a@x.com", "+1")))
        .await;

    let (status, body) = app.upload("/users/1/photo", "avatar", "pic.png", b"x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = TestApp::with_upload_limit(64).await;
    app.json("POST", "/users", Some(new_user("a@x.com", "+1")))
        .await;

    let (status, _) = app
        .upload("/users/1/photo", "file", "big.png", &[0u8; 4096])
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(std::fs::read_dir(app.store.root()).unwrap().count(), 0);
}

#[tokio::test]
async fn rejected_json_bodies_use_error_shape() {
    let app = TestApp::new().await;

    let send_raw = |method: &'static str, uri: &'static str, body: &'static str| {
        app.authorized(method, uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    };

    let (status, body) = app
        .send(send_raw("POST", "/users", r#"{"firstName": "NoContacts"}"#))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("email"));

    let (status, body) = app.send(send_raw("POST", "/users", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].is_string());

    app.json("POST", "/users", Some(new_user("a@x.com", "+1")))
        .await;
    let (status, body) = app.send(send_raw("PUT", "/users/1", "[]")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].is_string());

    let (status, list) = app.json("GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}
