// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use gitea_bridge::config::Config;
use gitea_bridge::db::{FirestoreDb, MemoryStore};
use gitea_bridge::models::LocalUser;
use gitea_bridge::routes::create_router;
use gitea_bridge::services::create_session_token;
use gitea_bridge::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Local user seeded into every test app.
#[allow(dead_code)]
pub const TEST_USER_ID: u64 = 42;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test app backed by a memory store, talking to Gitea at `gitea_base_url`.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: MemoryStore,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new(gitea_base_url: &str) -> Self {
        let mut config = Config::test_default();
        config.gitea_base_url = gitea_base_url.trim_end_matches('/').to_string();

        let store = MemoryStore::new();
        store.insert_user(LocalUser {
            id: TEST_USER_ID,
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
        });

        let state = Arc::new(AppState::new(
            config,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        ));

        Self {
            router: create_router(state.clone()),
            state,
            store,
        }
    }

    /// Valid session token for `user_id`.
    pub fn session_token(&self, user_id: u64) -> String {
        create_session_token(
            user_id,
            &self.state.config.jwt_signing_key,
            Duration::from_secs(3600),
        )
        .unwrap()
    }

    /// Send a request, optionally authenticated as `user_id`, and return
    /// the status plus the JSON body (`Null` when empty).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user_id: Option<u64>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = user_id {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.session_token(id)),
            );
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        send_request(&self.router, request).await
    }
}

/// Run one request through the router.
#[allow(dead_code)]
pub async fn send_request(
    router: &axum::Router,
    request: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}
