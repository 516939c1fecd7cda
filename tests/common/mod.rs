#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bibliocatalog::auth;
use bibliocatalog::db;
use bibliocatalog::infrastructure::{ApiSettings, AppState};
use bibliocatalog::media::MediaStorage;
use bibliocatalog::server;
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

pub const BOUNDARY: &str = "bibliocatalog-test-boundary";

/// The full application on an in-memory database and a scratch media root
pub struct TestApp {
    pub router: Router,
    pub media_root: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

pub async fn setup_app() -> TestApp {
    setup_app_with(ApiSettings::default()).await
}

pub async fn setup_app_with(settings: ApiSettings) -> TestApp {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let media_root = std::env::temp_dir().join(format!("bibliocatalog-test-{}", uuid::Uuid::new_v4()));
    let state = AppState::new(db, settings, MediaStorage::new(&media_root));
    TestApp {
        router: server::build_router(state, &[]),
        media_root,
    }
}

fn token(subject: &str, is_staff: bool, is_superuser: bool) -> String {
    auth::create_jwt(&ApiSettings::default().jwt_secret, subject, is_staff, is_superuser, 1)
        .expect("Failed to create token")
}

pub fn staff_token() -> String {
    token("librarian", true, false)
}

pub fn superuser_token() -> String {
    token("admin", false, true)
}

pub fn user_token() -> String {
    token("reader", false, false)
}

impl TestApp {
    /// Sends a JSON request and returns the status with the decoded body (`Null` when empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.request(req).await
    }

    pub async fn request(&self, req: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.request_bytes(req).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn request_bytes(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None, None).await
    }

    /// Creates a record as staff and returns its representation
    pub async fn create(&self, collection: &str, body: Value) -> Value {
        let (status, value) = self
            .send("POST", &format!("/api/{}", collection), Some(&staff_token()), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create {} failed: {}", collection, value);
        value
    }
}

/// A small valid PNG
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image::RgbImage::new(8, 8))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// A PNG of pseudo-random noise, which barely compresses (about `3 * side * side` bytes)
pub fn noisy_png_bytes(side: u32) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    let pixels = image::RgbImage::from_fn(side, side, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        image::Rgb([r, g, b])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(pixels)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// `multipart/form-data` body with text fields and an optional cover file
pub fn multipart_body(fields: &[(&str, &str)], cover: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = cover {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"cover\"; filename=\"cover.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(method: &str, uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Creates a publisher, a book and one copy of it; returns (book id, copy id)
pub async fn seed_copy(app: &TestApp, title: &str, publisher: &str) -> (String, String) {
    app.create("publishers", serde_json::json!({ "name": publisher }))
        .await;
    let book = app
        .create("books", serde_json::json!({ "title": title, "authors": ["Jane Austen"] }))
        .await;
    let book_id = book["id"].as_str().unwrap().to_string();
    let copy = app
        .create(
            "book_copies",
            serde_json::json!({
                "book": book_id,
                "date_published": "2001-05-17",
                "publisher": publisher,
            }),
        )
        .await;
    (book_id, copy["id"].as_str().unwrap().to_string())
}
