// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Every value has a development default except in production, where the
//! session-signing secret must be supplied explicitly.

use std::env;
use std::fmt;

/// Public Gitea instance used when `GITEA_BASE_URL` is unset.
pub const DEFAULT_GITEA_BASE_URL: &str = "https://gitea.com";

/// OAuth callback used by the local frontend dev server.
pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:5173/oauth/callback";

/// Development-only session secret. Never valid in production.
pub const INSECURE_DEV_JWT_SECRET: &str = "your-secret-key";

/// Which persistence backend serves users and credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    // --- Gitea OAuth application ---
    /// Gitea instance base URL, without trailing slash
    pub gitea_base_url: String,
    /// OAuth client ID (public)
    pub gitea_client_id: String,
    /// OAuth client secret
    pub gitea_client_secret: String,
    /// Redirect URL registered with the Gitea OAuth application
    pub gitea_redirect_url: String,

    // --- Sessions ---
    /// HS256 key for verifying session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,

    // --- Server ---
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,

    // --- Storage ---
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Local users seeded into the memory backend
    pub local_user_ids: Vec<u64>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gitea_base_url", &self.gitea_base_url)
            .field("gitea_client_id", &self.gitea_client_id)
            .field("gitea_client_secret", &"<redacted>")
            .field("gitea_redirect_url", &self.gitea_redirect_url)
            .field("jwt_signing_key", &"<redacted>")
            .field("frontend_url", &self.frontend_url)
            .field("port", &self.port)
            .field("store_backend", &self.store_backend)
            .field("gcp_project_id", &self.gcp_project_id)
            .field("local_user_ids", &self.local_user_ids)
            .finish()
    }
}

impl Config {
    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            gitea_base_url: "http://gitea.test".to_string(),
            gitea_client_id: "test_client_id".to_string(),
            gitea_client_secret: "test_client_secret".to_string(),
            gitea_redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            local_user_ids: Vec::new(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let jwt_secret = match non_empty_var("JWT_SECRET") {
            Some(secret) if production && secret == INSECURE_DEV_JWT_SECRET => {
                return Err(ConfigError::Invalid(
                    "JWT_SECRET",
                    "development secret is not allowed in production".to_string(),
                ));
            }
            Some(secret) => secret,
            None if production => return Err(ConfigError::Missing("JWT_SECRET")),
            None => INSECURE_DEV_JWT_SECRET.to_string(),
        };

        let store_backend = match non_empty_var("STORE_BACKEND").as_deref() {
            None | Some("firestore") => StoreBackend::Firestore,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid(
                    "STORE_BACKEND",
                    format!("unknown backend '{}'", other),
                ))
            }
        };

        let local_user_ids = non_empty_var("LOCAL_USER_IDS")
            .map(|raw| parse_user_ids(&raw))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            gitea_base_url: non_empty_var("GITEA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GITEA_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            gitea_client_id: non_empty_var("GITEA_CLIENT_ID").unwrap_or_default(),
            gitea_client_secret: non_empty_var("GITEA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            gitea_redirect_url: non_empty_var("GITEA_REDIRECT_URL")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string()),
            jwt_signing_key: jwt_secret.into_bytes(),
            frontend_url: non_empty_var("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            gcp_project_id: non_empty_var("GCP_PROJECT_ID")
                .unwrap_or_else(|| "local-dev".to_string()),
            local_user_ids,
        })
    }

    /// True when sessions are verified with the development secret.
    pub fn uses_insecure_session_key(&self) -> bool {
        self.jwt_signing_key == INSECURE_DEV_JWT_SECRET.as_bytes()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_user_ids(raw: &str) -> Result<Vec<u64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>().map_err(|_| {
                ConfigError::Invalid("LOCAL_USER_IDS", format!("'{}' is not a user id", s))
            })
        })
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
