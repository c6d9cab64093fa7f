// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::error::AppError;
use crate::services::SessionIdentity;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Middleware that requires a valid session token.
///
/// On success the resolved [`SessionIdentity`] is attached to the request
/// extensions for handlers to extract.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = match request.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AppError::MalformedCredential)?),
        None => None,
    };

    let identity = state.sessions.authenticate(auth_header).await?;

    tracing::debug!(user_id = identity.user_id, "Session authenticated");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Handlers behind [`require_session`] take the identity as an extractor.
/// Using it on an unprotected route is a wiring bug and fails with 500.
impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionIdentity>()
            .cloned()
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "session identity missing from request context"
                ))
            })
    }
}
