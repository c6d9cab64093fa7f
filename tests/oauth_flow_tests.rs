// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth link lifecycle tests against a mocked Gitea.
//!
//! Unlinked -> callback (exchange + identity) -> Linked -> re-link -> revoke.

use axum::http::StatusCode;
use gitea_bridge::db::CredentialStore;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{TestApp, TEST_USER_ID};

const CALLBACK_URI: &str = "/api/v1/gitea/oauth/callback";
const STATUS_URI: &str = "/api/v1/gitea/oauth/status";
const LINK_URI: &str = "/api/v1/gitea/oauth/link";

/// Mount a token endpoint answering `code` with `access_token`.
async fn mock_exchange(server: &MockServer, code: &str, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(body_string_contains(format!("code={}", code)))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "token_type": "bearer",
            "refresh_token": format!("{}-refresh", access_token),
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// Mount the identity endpoint for `access_token`.
async fn mock_identity(server: &MockServer, access_token: &str, login: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .and(header("authorization", format!("Bearer {}", access_token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 314,
            "login": login,
            "full_name": format!("{} Name", login),
            "email": format!("{}@gitea.test", login),
            "avatar_url": format!("https://gitea.test/avatars/{}", login)
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_status_when_unlinked() {
    let app = TestApp::new("http://gitea.invalid");
    let (status, body) = app.send("GET", STATUS_URI, Some(TEST_USER_ID), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "authorized": false }));
}

#[tokio::test]
async fn test_callback_links_account() {
    let server = MockServer::start().await;
    mock_exchange(&server, "code-1", "tok-1").await;
    mock_identity(&server, "tok-1", "octo").await;

    let app = TestApp::new(&server.uri());
    let (status, body) = app
        .send(
            "POST",
            CALLBACK_URI,
            Some(TEST_USER_ID),
            Some(json!({ "code": "code-1", "state": "abc" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Gitea authorization successful");
    assert_eq!(
        body["gitea_user"],
        json!({
            "login": "octo",
            "name": "octo Name",
            "email": "octo@gitea.test",
            "avatar": "https://gitea.test/avatars/octo"
        })
    );
    assert!(!body.to_string().contains("tok-1"));

    let stored = app.store.find_credential(TEST_USER_ID).await.unwrap().unwrap();
    assert_eq!(stored.access_token.expose(), "tok-1");
    assert_eq!(stored.refresh_token.expose(), "tok-1-refresh");
    assert_eq!(stored.gitea_user_id, 314);
    assert_eq!(stored.token_type, "bearer");
    assert_eq!(stored.scope, "read:repository read:user");
    assert!(stored.expires_at.is_some());

    let (status, body) = app.send("GET", STATUS_URI, Some(TEST_USER_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authorized"], true);
    assert_eq!(body["gitea_user"]["login"], "octo");
    assert!(!body.to_string().contains("tok-1"));
}

#[tokio::test]
async fn test_relink_replaces_existing_credential() {
    let server = MockServer::start().await;
    mock_exchange(&server, "code-1", "tok-1").await;
    mock_identity(&server, "tok-1", "first").await;
    mock_exchange(&server, "code-2", "tok-2").await;
    mock_identity(&server, "tok-2", "second").await;

    let app = TestApp::new(&server.uri());

    let (status, _) = app
        .send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "code": "code-1" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let first = app.store.find_credential(TEST_USER_ID).await.unwrap().unwrap();

    let (status, body) = app
        .send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "code": "code-2" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gitea_user"]["login"], "second");

    assert_eq!(app.store.credential_count(), 1);
    let second = app.store.find_credential(TEST_USER_ID).await.unwrap().unwrap();
    assert_eq!(second.access_token.expose(), "tok-2");
    assert_eq!(second.gitea_login, "second");
    assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn test_exchange_failure_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad client secret"))
        .mount(&server)
        .await;

    let app = TestApp::new(&server.uri());
    let (status, body) = app
        .send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "code": "nope" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "exchange_failed");
    assert!(body["details"].as_str().unwrap().contains("401"));
    assert!(!body.to_string().contains("bad client secret"));
    assert_eq!(app.store.credential_count(), 0);
}

#[tokio::test]
async fn test_oauth_error_body_is_exchange_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "code expired"
        })))
        .mount(&server)
        .await;

    let app = TestApp::new(&server.uri());
    let (status, body) = app
        .send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "code": "stale" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "exchange_failed");
}

#[tokio::test]
async fn test_identity_fetch_failure_is_bad_request() {
    let server = MockServer::start().await;
    mock_exchange(&server, "code-1", "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let app = TestApp::new(&server.uri());
    let (status, body) = app
        .send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "code": "code-1" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "identity_fetch_failed");
    assert_eq!(app.store.credential_count(), 0);
}

#[tokio::test]
async fn test_malformed_callback_body() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server.uri());

    let (status, body) = app
        .send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "state": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = app
        .send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "code": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    // Nothing reached Gitea.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_callback_requires_session() {
    let server = MockServer::start().await;
    let app = TestApp::new(&server.uri());

    let (status, _) = app
        .send("POST", CALLBACK_URI, None, Some(json!({ "code": "code-1" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let server = MockServer::start().await;
    mock_exchange(&server, "code-1", "tok-1").await;
    mock_identity(&server, "tok-1", "octo").await;

    let app = TestApp::new(&server.uri());
    app.send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "code": "code-1" })))
        .await;
    assert_eq!(app.store.credential_count(), 1);

    for _ in 0..2 {
        let (status, body) = app.send("DELETE", LINK_URI, Some(TEST_USER_ID), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Gitea authorization revoked");
    }

    assert_eq!(app.store.credential_count(), 0);
    let (_, body) = app.send("GET", STATUS_URI, Some(TEST_USER_ID), None).await;
    assert_eq!(body["authorized"], false);
}

#[tokio::test]
async fn test_auth_url_default_state() {
    let app = TestApp::new("https://gitea.test");
    let (status, body) = app.send("GET", "/api/v1/gitea/auth-url", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let url = body["auth_url"].as_str().unwrap();
    assert!(url.starts_with("https://gitea.test/login/oauth/authorize?"));
    assert!(url.contains("client_id=test_client_id"));
    assert!(url.ends_with("state=default"));
}

#[tokio::test]
async fn test_unreachable_token_endpoint_is_exchange_failure() {
    // Nothing listens on port 9 of localhost.
    let app = TestApp::new("http://127.0.0.1:9");
    let (status, body) = app
        .send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "code": "code-1" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "exchange_failed");
    assert_eq!(body["details"], "Failed to exchange authorization code");
    assert_eq!(app.store.credential_count(), 0);
}

#[tokio::test]
async fn test_token_response_without_access_token_is_exchange_failure() {
    for token_body in [
        json!({ "access_token": "", "token_type": "bearer" }),
        json!({ "token_type": "bearer", "refresh_token": "r" }),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/user"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = TestApp::new(&server.uri());
        let (status, body) = app
            .send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "code": "code-1" })))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", token_body);
        assert_eq!(body["error"], "exchange_failed", "{}", token_body);
        assert_eq!(app.store.credential_count(), 0);
    }
}

#[tokio::test]
async fn test_missing_or_unusable_lifetime_records_no_expiry() {
    for token_body in [
        json!({ "access_token": "tok-1", "token_type": "bearer", "expires_in": 0 }),
        json!({ "access_token": "tok-1", "token_type": "bearer" }),
        json!({ "access_token": "tok-1", "token_type": "bearer", "expires_in": i64::MAX }),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body.clone()))
            .mount(&server)
            .await;
        mock_identity(&server, "tok-1", "octo").await;

        let app = TestApp::new(&server.uri());
        let (status, body) = app
            .send("POST", CALLBACK_URI, Some(TEST_USER_ID), Some(json!({ "code": "code-1" })))
            .await;
        assert_eq!(status, StatusCode::OK, "{}: {}", token_body, body);

        let stored = app.store.find_credential(TEST_USER_ID).await.unwrap().unwrap();
        assert_eq!(stored.expires_at, None, "{}", token_body);
        assert!(stored.refresh_token.is_empty());
    }
}
