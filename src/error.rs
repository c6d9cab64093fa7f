// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every failure is classified where it originates and rendered as
//! `{"error": <kind>, "details": ...}`. Upstream response bodies are never
//! copied into `details`; only the upstream status is reported.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ─── Session layer ───────────────────────────────────────────
    #[error("Authorization header required")]
    MissingCredential,

    #[error("Bearer token required")]
    MalformedCredential,

    #[error("Invalid or expired session token")]
    InvalidCredential,

    #[error("User not found")]
    IdentityNotFound,

    // ─── OAuth layer ─────────────────────────────────────────────
    #[error("Failed to exchange authorization code{}", fmt_status(.status))]
    ExchangeFailed { status: Option<u16> },

    #[error("Failed to fetch Gitea identity{}", fmt_status(.status))]
    IdentityFetchFailed { status: Option<u16> },

    #[error("Gitea not authorized")]
    NotAuthorized,

    // ─── Proxy layer ─────────────────────────────────────────────
    #[error("Gitea API returned HTTP {status}")]
    Upstream { status: u16 },

    #[error("Gitea API unreachable: {0}")]
    Transport(String),

    #[error("Failed to decode Gitea response: {0}")]
    Decode(String),

    // ─── Store layer ─────────────────────────────────────────────
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn fmt_status(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" (upstream HTTP {})", s))
        .unwrap_or_default()
}

impl AppError {
    /// Stable, machine-readable kind reported in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MissingCredential => "missing_credential",
            AppError::MalformedCredential => "malformed_credential",
            AppError::InvalidCredential => "invalid_credential",
            AppError::IdentityNotFound => "identity_not_found",
            AppError::ExchangeFailed { .. } => "exchange_failed",
            AppError::IdentityFetchFailed { .. } => "identity_fetch_failed",
            AppError::NotAuthorized => "not_authorized",
            AppError::Upstream { .. } => "upstream_error",
            AppError::Transport(_) => "upstream_unreachable",
            AppError::Decode(_) => "decode_error",
            AppError::Persistence(_) => "persistence_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// HTTP status the error is rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingCredential
            | AppError::MalformedCredential
            | AppError::InvalidCredential
            | AppError::IdentityNotFound
            | AppError::NotAuthorized => StatusCode::UNAUTHORIZED,
            AppError::ExchangeFailed { .. }
            | AppError::IdentityFetchFailed { .. }
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. }
            | AppError::Transport(_)
            | AppError::Decode(_)
            | AppError::Persistence(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let details = match &self {
            AppError::ExchangeFailed { .. }
            | AppError::IdentityFetchFailed { .. }
            | AppError::Upstream { .. }
            | AppError::Decode(_)
            | AppError::BadRequest(_) => Some(self.to_string()),
            AppError::Transport(msg) => {
                tracing::error!(error = %msg, "Gitea transport error");
                Some("Gitea API unreachable".to_string())
            }
            AppError::Persistence(msg) => {
                tracing::error!(error = %msg, "Persistence error");
                None
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                None
            }
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), status = status.as_u16(), "Request failed");
        }

        let body = ErrorResponse {
            error: self.kind().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
