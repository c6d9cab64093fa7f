//! Authenticated read proxy for repositories and their contents.

use crate::error::AppError;
use crate::models::{AccessToken, FileEntry, Repository};
use crate::services::codec;
use crate::services::gitea::GiteaClient;

/// Proxies read calls to Gitea with a caller's stored access token.
///
/// Resolving which token to use is the caller's job.
#[derive(Clone)]
pub struct RepositoryProxy {
    client: GiteaClient,
}

impl RepositoryProxy {
    pub fn new(client: GiteaClient) -> Self {
        Self { client }
    }

    /// Repositories visible to the token's owner.
    pub async fn list_repositories(
        &self,
        access_token: &AccessToken,
    ) -> Result<Vec<Repository>, AppError> {
        let url = self.client.api_url("/user/repos");
        self.client.get_json(&url, access_token).await
    }

    /// A single file, with base64 content decoded to text.
    pub async fn get_file_content(
        &self,
        access_token: &AccessToken,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<FileEntry, AppError> {
        let url = self.client.contents_url(owner, repo, path);
        let entry: FileEntry = self.client.get_json(&url, access_token).await?;

        codec::decode_entry(entry).inspect_err(|e| {
            tracing::warn!(owner, repo, path, error = %e, "Failed to decode file content");
        })
    }

    /// Entries of a directory; an empty `path` lists the repository root.
    ///
    /// Listings carry no content, so nothing is decoded.
    pub async fn get_directory_contents(
        &self,
        access_token: &AccessToken,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<FileEntry>, AppError> {
        let url = self.client.contents_url(owner, repo, path);
        self.client.get_json(&url, access_token).await
    }
}
