// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Linked Gitea credential model.
//!
//! [`GiteaCredential`] is the storage shape and carries the OAuth tokens.
//! It is never returned from a handler; responses use [`GiteaUserView`],
//! which has no token fields.

use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// OAuth token string with redacted `Debug` output.
///
/// Serializes transparently so the store keeps the plaintext value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value, for attaching to outbound requests.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True for the placeholder stored when Gitea issued no refresh token.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("AccessToken(<empty>)")
        } else {
            f.write_str("AccessToken(<redacted>)")
        }
    }
}

/// Gitea account resolved by a code exchange plus identity fetch.
///
/// Not yet bound to a local user.
#[derive(Debug, Clone)]
pub struct GiteaAccount {
    pub access_token: AccessToken,
    pub refresh_token: AccessToken,
    pub token_type: String,
    /// Absolute expiry (RFC3339), only when Gitea reported a lifetime
    pub expires_at: Option<String>,
    pub scope: String,
    pub gitea_user_id: i64,
    pub login: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

/// A local user's link to Gitea (document ID = `user_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiteaCredential {
    /// Owning local user ID
    pub user_id: u64,
    pub access_token: AccessToken,
    #[serde(default)]
    pub refresh_token: AccessToken,
    pub token_type: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub scope: String,

    pub gitea_user_id: i64,
    pub gitea_login: String,
    #[serde(default)]
    pub gitea_name: String,
    #[serde(default)]
    pub gitea_email: String,
    #[serde(default)]
    pub gitea_avatar: String,

    /// When the user first linked (preserved across re-authorization)
    pub created_at: String,
    /// When the credential was last written
    pub updated_at: String,
}

impl GiteaCredential {
    /// Bind a freshly authorized account to a local user.
    pub fn link(user_id: u64, account: GiteaAccount, now: DateTime<Utc>) -> Self {
        let now = format_utc_rfc3339(now);
        Self {
            user_id,
            access_token: account.access_token,
            refresh_token: account.refresh_token,
            token_type: account.token_type,
            expires_at: account.expires_at,
            scope: account.scope,
            gitea_user_id: account.gitea_user_id,
            gitea_login: account.login,
            gitea_name: account.name,
            gitea_email: account.email,
            gitea_avatar: account.avatar,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Overwrite every mutable field with `newer`, keeping this record's
    /// owner and creation time.
    pub fn overwrite_with(&mut self, newer: GiteaCredential) {
        let user_id = self.user_id;
        let created_at = std::mem::take(&mut self.created_at);
        *self = GiteaCredential {
            user_id,
            created_at,
            ..newer
        };
    }

    /// Outward projection without tokens.
    pub fn user_view(&self) -> GiteaUserView {
        GiteaUserView {
            login: self.gitea_login.clone(),
            name: self.gitea_name.clone(),
            email: self.gitea_email.clone(),
            avatar: self.gitea_avatar.clone(),
        }
    }
}

/// Gitea identity as shown to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GiteaUserView {
    pub login: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}
