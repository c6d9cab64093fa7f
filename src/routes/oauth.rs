// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gitea OAuth link routes.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::models::GiteaUserView;
use crate::services::SessionIdentity;
use crate::AppState;

/// Routes that need no session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth-url", get(auth_url))
}

/// Routes behind the session middleware (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/oauth/callback", post(oauth_callback))
        .route("/oauth/status", get(oauth_status))
        .route("/oauth/link", delete(revoke_link))
}

// ─── Authorization URL ───────────────────────────────────────

#[derive(Deserialize)]
pub struct AuthUrlParams {
    #[serde(default)]
    state: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

/// Build the Gitea authorization URL for the frontend to redirect to.
async fn auth_url(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthUrlParams>,
) -> Json<AuthUrlResponse> {
    if params.state.as_deref().unwrap_or("").is_empty() {
        tracing::debug!("No OAuth state supplied, using shared default");
    }

    Json(AuthUrlResponse {
        auth_url: state.oauth.authorization_url(params.state.as_deref()),
    })
}

// ─── Callback ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CallbackRequest {
    #[validate(length(min = 1, message = "code is required"))]
    code: String,
    /// Accepted but not compared with the issued state.
    #[serde(default)]
    state: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CallbackResponse {
    pub message: String,
    pub gitea_user: GiteaUserView,
}

/// Exchange the code, fetch the Gitea identity, and link it to the caller.
async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    identity: SessionIdentity,
    payload: std::result::Result<Json<CallbackRequest>, JsonRejection>,
) -> Result<Json<CallbackResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    tracing::info!(
        user_id = identity.user_id,
        state = request.state.as_deref().unwrap_or(""),
        "Exchanging Gitea authorization code"
    );

    let token = state.oauth.exchange_code(&request.code).await?;
    let account = state.oauth.fetch_identity(&token).await?;
    let credential = state.credentials.link(identity.user_id, account).await?;

    Ok(Json(CallbackResponse {
        message: "Gitea authorization successful".to_string(),
        gitea_user: credential.user_view(),
    }))
}

// ─── Status ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatusResponse {
    pub authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitea_user: Option<GiteaUserView>,
}

/// Whether the caller has linked Gitea. Unlinked is not an error.
async fn oauth_status(
    State(state): State<Arc<AppState>>,
    identity: SessionIdentity,
) -> Result<Json<StatusResponse>> {
    let credential = state.credentials.find(identity.user_id).await?;

    Ok(Json(StatusResponse {
        authorized: credential.is_some(),
        gitea_user: credential.map(|c| c.user_view()),
    }))
}

// ─── Revocation ──────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

/// Unlink Gitea. Succeeds whether or not a link existed.
async fn revoke_link(
    State(state): State<Arc<AppState>>,
    identity: SessionIdentity,
) -> Result<Json<MessageResponse>> {
    state.credentials.revoke(identity.user_id).await?;

    Ok(Json(MessageResponse {
        message: "Gitea authorization revoked".to_string(),
    }))
}
