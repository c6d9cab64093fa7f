// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token verification.
//!
//! Session tokens are HS256 JWTs issued by the user-management subsystem.
//! They are stateless; the only lookup is confirming that the local user
//! named in the token still exists.

use crate::db::UserDirectory;
use crate::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Local user ID
    pub user_id: u64,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Caller identity resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: u64,
    pub username: String,
}

/// Resolves `Authorization` header values to local users.
#[derive(Clone)]
pub struct SessionAuthenticator {
    key: DecodingKey,
    validation: Validation,
    users: Arc<dyn UserDirectory>,
}

impl SessionAuthenticator {
    pub fn new(signing_key: &[u8], users: Arc<dyn UserDirectory>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No grace period past `exp`.
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(signing_key),
            validation,
            users,
        }
    }

    /// Verify a token and return its claims, without touching the user store.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Session token rejected");
                AppError::InvalidCredential
            })
    }

    /// Resolve an `Authorization` header value to a local user.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<SessionIdentity, AppError> {
        let header = header.ok_or(AppError::MissingCredential)?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AppError::MalformedCredential)?;

        let claims = self.verify(token)?;

        let user = self
            .users
            .find_user(claims.user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = claims.user_id, "Session names an unknown user");
                AppError::IdentityNotFound
            })?;

        Ok(SessionIdentity {
            user_id: user.id,
            username: user.username,
        })
    }
}

/// Create a JWT for a user session.
pub fn create_session_token(
    user_id: u64,
    signing_key: &[u8],
    ttl: std::time::Duration,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        user_id,
        iat: now,
        exp: now + ttl.as_secs() as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
