#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use pharmasite_server::auth::{hash_password, Authenticator, SESSION_COOKIE};
use pharmasite_server::config::AccountConfig;
use pharmasite_server::{build_router, AppState};
use pharmasite_store::{AccessRules, ContentStore, Principal, Role};
use std::time::Duration;
use tempfile::TempDir;

pub const EDITOR: &str = "admin@pharmasite.test";
pub const VIEWER: &str = "viewer@pharmasite.test";
pub const PASSWORD: &str = "correct horse";

pub struct TestApp {
    pub state: AppState,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().expect("tempdir");
        let accounts = vec![AccountConfig {
            email: EDITOR.to_string(),
            password_hash: hash_password(PASSWORD).expect("hash"),
            role: Role::Editor,
        }];
        let auth = Authenticator::new(b"test-secret", Duration::from_secs(3600), accounts);
        let state = AppState::new(ContentStore::in_memory(AccessRules::default()), auth)
            .with_uploads_dir(uploads.path());

        Self { state, uploads }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// `Cookie` header value for a signed-in `principal`
    pub fn cookie(&self, principal: &Principal) -> String {
        let token = self.state.auth.issue(principal).expect("token");
        format!("{}={}", SESSION_COOKIE, token)
    }

    pub fn editor_cookie(&self) -> String {
        self.cookie(&Principal::editor(EDITOR))
    }

    pub fn viewer_cookie(&self) -> String {
        self.cookie(&Principal::viewer(VIEWER))
    }
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn product_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "category": "Tablets",
        "description": "Analgesic and antipyretic tablet.",
        "specifications": "650mg per tablet, IP grade",
        "applications": "Pain relief and fever management",
        "imageUrl": "/uploads/paracetamol.png"
    })
}
