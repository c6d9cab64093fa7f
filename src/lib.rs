// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gitea-Bridge: link local accounts to Gitea and proxy repository reads
//!
//! This crate provides the backend API that runs the Gitea OAuth flow for an
//! already-authenticated user, stores the resulting credential, and uses it
//! to list repositories and read file and directory contents.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{CredentialStore, UserDirectory};
use services::{CredentialService, GiteaClient, OAuthBroker, RepositoryProxy, SessionAuthenticator};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionAuthenticator,
    pub credentials: CredentialService,
    pub oauth: OAuthBroker,
    pub repositories: RepositoryProxy,
}

impl AppState {
    /// Wire every component from config and the two storage collaborators.
    pub fn new(
        config: Config,
        users: Arc<dyn UserDirectory>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let gitea = GiteaClient::new(config.gitea_base_url.clone());

        Self {
            sessions: SessionAuthenticator::new(&config.jwt_signing_key, users),
            credentials: CredentialService::new(credentials),
            oauth: OAuthBroker::from_config(&config, gitea.clone()),
            repositories: RepositoryProxy::new(gitea),
            config,
        }
    }
}
