// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gitea OAuth broker.
//!
//! Handles:
//! - Authorization URL construction
//! - Authorization-code exchange
//! - Identity fetch for an exchanged token
//!
//! The broker persists nothing and holds only static configuration, so a
//! single instance is shared by all requests.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{AccessToken, GiteaAccount};
use crate::services::gitea::GiteaClient;
use crate::time_utils::expiry_from_lifetime;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::fmt;

/// Scopes requested from Gitea.
pub const SCOPES: [&str; 2] = ["read:repository", "read:user"];

/// `state` used when the caller supplies none.
///
/// Not unique per request, so it gives no CSRF protection.
pub const DEFAULT_STATE: &str = "default";

/// Token returned by the authorization-code exchange.
#[derive(Debug, Clone)]
pub struct ExternalToken {
    pub access_token: AccessToken,
    pub refresh_token: AccessToken,
    pub token_type: String,
    /// Absolute expiry (RFC3339); `None` when Gitea reported no lifetime
    pub expires_at: Option<String>,
    /// Scope string granted by Gitea, if reported
    pub scope: Option<String>,
}

/// Raw token endpoint body (success or OAuth error).
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// `GET /api/v1/user` body.
#[derive(Deserialize)]
struct GiteaUserResponse {
    id: i64,
    login: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    avatar_url: String,
}

/// Gitea OAuth broker.
#[derive(Clone)]
pub struct OAuthBroker {
    client: GiteaClient,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl fmt::Debug for OAuthBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthBroker")
            .field("base_url", &self.client.base_url())
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .finish_non_exhaustive()
    }
}

impl OAuthBroker {
    pub fn new(
        client: GiteaClient,
        client_id: String,
        client_secret: String,
        redirect_url: String,
    ) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            redirect_url,
        }
    }

    /// Build a broker from application config.
    pub fn from_config(config: &Config, client: GiteaClient) -> Self {
        Self::new(
            client,
            config.gitea_client_id.clone(),
            config.gitea_client_secret.clone(),
            config.gitea_redirect_url.clone(),
        )
    }

    fn token_url(&self) -> String {
        format!("{}/login/oauth/access_token", self.client.base_url())
    }

    /// Authorization URL the user's browser is sent to.
    ///
    /// A missing or empty `state` falls back to [`DEFAULT_STATE`].
    pub fn authorization_url(&self, state: Option<&str>) -> String {
        let state = state.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_STATE);

        format!(
            "{}/login/oauth/authorize?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             state={}",
            self.client.base_url(),
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(&SCOPES.join(" ")),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for a token. Single attempt.
    pub async fn exchange_code(&self, code: &str) -> Result<ExternalToken, AppError> {
        let response = self
            .client
            .http()
            .post(self.token_url())
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_url.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Gitea token exchange request failed");
                AppError::ExchangeFailed { status: None }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "Gitea token exchange failed");
            return Err(AppError::ExchangeFailed {
                status: Some(status.as_u16()),
            });
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Gitea token response");
            AppError::ExchangeFailed {
                status: Some(status.as_u16()),
            }
        })?;

        if let Some(error) = body.error {
            tracing::warn!(
                error = %error,
                description = body.error_description.as_deref().unwrap_or(""),
                "Gitea rejected authorization code"
            );
            return Err(AppError::ExchangeFailed {
                status: Some(status.as_u16()),
            });
        }

        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::ExchangeFailed {
                status: Some(status.as_u16()),
            })?;

        Ok(ExternalToken {
            access_token: AccessToken::new(access_token),
            refresh_token: AccessToken::new(body.refresh_token.unwrap_or_default()),
            token_type: body
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "bearer".to_string()),
            expires_at: body
                .expires_in
                .and_then(|secs| expiry_from_lifetime(chrono::Utc::now(), secs)),
            scope: body.scope.filter(|s| !s.is_empty()),
        })
    }

    /// Fetch the Gitea identity behind `token` and combine it with the
    /// token into an account ready to be linked.
    pub async fn fetch_identity(&self, token: &ExternalToken) -> Result<GiteaAccount, AppError> {
        let user: GiteaUserResponse = self
            .client
            .get_json(&self.client.api_url("/user"), &token.access_token)
            .await
            .map_err(|e| match e {
                AppError::Upstream { status } => AppError::IdentityFetchFailed {
                    status: Some(status),
                },
                other => {
                    tracing::error!(error = %other, "Gitea identity fetch failed");
                    AppError::IdentityFetchFailed { status: None }
                }
            })?;

        tracing::debug!(gitea_user_id = user.id, login = %user.login, "Fetched Gitea identity");

        Ok(GiteaAccount {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            token_type: token.token_type.clone(),
            expires_at: token.expires_at.clone(),
            scope: token.scope.clone().unwrap_or_else(|| SCOPES.join(" ")),
            gitea_user_id: user.id,
            login: user.login,
            name: user.full_name,
            email: user.email,
            avatar: user.avatar_url,
        })
    }
}
