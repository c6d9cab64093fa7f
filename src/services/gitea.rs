// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Low-level Gitea HTTP client shared by the OAuth broker and the
//! repository proxy.
//!
//! Every call is a single attempt with the transport's default timeouts.
//! Failures are classified as transport, non-2xx status, or malformed body.

use crate::error::AppError;
use crate::models::AccessToken;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

/// Gitea API client bound to one instance.
#[derive(Clone)]
pub struct GiteaClient {
    http: reqwest::Client,
    base_url: String,
}

impl GiteaClient {
    /// Create a client for the instance at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// URL of a REST API v1 resource, e.g. `api_url("/user")`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Contents endpoint for `owner/repo` at `path` (empty = root).
    pub fn contents_url(&self, owner: &str, repo: &str, path: &str) -> String {
        let mut url = self.api_url(&format!(
            "/repos/{}/{}/contents",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        ));
        let encoded = encode_file_path(path);
        if !encoded.is_empty() {
            url.push('/');
            url.push_str(&encoded);
        }
        url
    }

    /// Authenticated GET with JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &AccessToken,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token.expose())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url, "Gitea API request failed");
            return Err(AppError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| AppError::Decode(e.to_string()))
    }
}

/// Percent-encode each segment of a repository path, keeping `/` separators.
fn encode_file_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
