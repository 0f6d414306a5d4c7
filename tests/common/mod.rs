#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use cooktips::app::identity::IdentityService;
use cooktips::domain::user::UserProfile;
use cooktips::infra::store::DocumentStore;
use cooktips::AppState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

// "0123456789abcdef0123456789abcdef"
const TEST_ACCESS_KEY: [u8; 32] = *b"0123456789abcdef0123456789abcdef";
const TEST_ADMIN_TOKEN: &str = "test-admin-token-12345";

// ---------------------------------------------------------------------------
// TestApp — one per test, backed by in-memory collections
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

pub struct TestUser {
    pub id: String,
    pub name: String,
    pub access_token: String,
}

pub fn app() -> TestApp {
    let identity = IdentityService::new(TEST_ACCESS_KEY, 15);
    let state = AppState::in_memory(identity, Some(TEST_ADMIN_TOKEN.to_string()));
    let router = cooktips::http::router(state.clone());
    TestApp { router, state }
}

impl TestApp {
    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        for &(key, value) in headers {
            builder = builder.header(key, value);
        }

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.with_token(Method::GET, path, None, token).await
    }

    pub async fn post_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.with_token(Method::POST, path, Some(body), token).await
    }

    pub async fn put_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.with_token(Method::PUT, path, Some(body), token).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.with_token(Method::PUT, path, None, token).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.with_token(Method::DELETE, path, None, token).await
    }

    /// PUT with an admin token in the x-admin-token header.
    pub async fn put_admin(
        &self,
        path: &str,
        body: Value,
        admin_token: Option<&str>,
    ) -> TestResponse {
        let mut headers = vec![];
        if let Some(t) = admin_token {
            headers.push(("x-admin-token", t));
        }
        self.request(Method::PUT, path, Some(body), &headers).await
    }

    async fn with_token(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut headers = vec![];
        let auth;
        if let Some(t) = token {
            auth = format!("Bearer {}", t);
            headers.push(("Authorization", auth.as_str()));
        }
        self.request(method, path, body, &headers).await
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    /// Register a profile in the users collection and mint a token for it.
    pub async fn create_user(&self, id: &str) -> TestUser {
        let name = format!("Cook {}", id);
        self.state
            .users
            .save(UserProfile {
                id: id.to_string(),
                name: name.clone(),
            })
            .await
            .expect("insert test user failed");

        TestUser {
            id: id.to_string(),
            name,
            access_token: self.token_for(id),
        }
    }

    /// Token for an identity that has no profile in the users collection.
    pub fn token_for(&self, user_id: &str) -> String {
        self.state
            .identity
            .issue_access_token(user_id)
            .expect("issue_access_token failed")
    }

    pub fn admin_token(&self) -> &str {
        TEST_ADMIN_TOKEN
    }

    /// Create a tip through the API. Returns the response body.
    pub async fn create_tip(&self, user: &TestUser, title: &str, category: &str) -> Value {
        let resp = self
            .post_json(
                "/api/tips",
                json!({
                    "title": title,
                    "description": format!("How to: {}", title),
                    "category": category,
                }),
                Some(&user.access_token),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "create tip failed");
        resp.json()
    }

    pub async fn create_tip_id(&self, user: &TestUser, title: &str) -> String {
        let body = self.create_tip(user, title, "Prep").await;
        body["id"].as_str().expect("tip id").to_string()
    }
}
