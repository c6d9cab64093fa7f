// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Repository proxy routes (require a session and a linked credential).

use crate::error::{AppError, Result};
use crate::models::{FileEntry, Repository};
use crate::services::SessionIdentity;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/repositories", get(list_repositories))
        .route(
            "/repositories/{owner}/{repo}/contents",
            get(get_file_content_by_query),
        )
        .route(
            "/repositories/{owner}/{repo}/contents/{*path}",
            get(get_file_content_by_path),
        )
        .route("/repositories/{owner}/{repo}/tree", get(get_directory_contents))
}

#[derive(Deserialize)]
struct PathQuery {
    #[serde(default)]
    path: String,
}

async fn list_repositories(
    State(state): State<Arc<AppState>>,
    identity: SessionIdentity,
) -> Result<Json<Vec<Repository>>> {
    let credential = state.credentials.require(identity.user_id).await?;
    let repos = state
        .repositories
        .list_repositories(&credential.access_token)
        .await?;

    tracing::debug!(user_id = identity.user_id, count = repos.len(), "Listed repositories");
    Ok(Json(repos))
}

async fn get_file_content_by_path(
    State(state): State<Arc<AppState>>,
    identity: SessionIdentity,
    Path((owner, repo, path)): Path<(String, String, String)>,
) -> Result<Json<FileEntry>> {
    file_content(&state, &identity, &owner, &repo, &path).await
}

async fn get_file_content_by_query(
    State(state): State<Arc<AppState>>,
    identity: SessionIdentity,
    Path((owner, repo)): Path<(String, String)>,
    Query(query): Query<PathQuery>,
) -> Result<Json<FileEntry>> {
    file_content(&state, &identity, &owner, &repo, &query.path).await
}

async fn file_content(
    state: &AppState,
    identity: &SessionIdentity,
    owner: &str,
    repo: &str,
    path: &str,
) -> Result<Json<FileEntry>> {
    let credential = state.credentials.require(identity.user_id).await?;

    if path.trim_matches('/').is_empty() {
        return Err(AppError::BadRequest("file path is required".to_string()));
    }

    let entry = state
        .repositories
        .get_file_content(&credential.access_token, owner, repo, path)
        .await?;
    Ok(Json(entry))
}

async fn get_directory_contents(
    State(state): State<Arc<AppState>>,
    identity: SessionIdentity,
    Path((owner, repo)): Path<(String, String)>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<FileEntry>>> {
    let credential = state.credentials.require(identity.user_id).await?;
    let entries = state
        .repositories
        .get_directory_contents(&credential.access_token, &owner, &repo, &query.path)
        .await?;
    Ok(Json(entries))
}
