// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gitea-Bridge API Server
//!
//! Links local accounts to a Gitea instance over OAuth and proxies
//! repository, file, and directory reads with the stored credential.

use gitea_bridge::{
    config::{Config, StoreBackend},
    db::{CredentialStore, FirestoreDb, MemoryStore, UserDirectory},
    models::LocalUser,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        gitea = %config.gitea_base_url,
        "Starting Gitea-Bridge API"
    );

    if config.uses_insecure_session_key() {
        tracing::warn!("JWT_SECRET not set, using the insecure development key");
    }
    if config.gitea_client_id.is_empty() {
        tracing::warn!("GITEA_CLIENT_ID not set, OAuth exchanges will fail");
    }

    let (users, credentials) = open_store(&config).await?;

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), users, credentials));

    // Build router
    let app = gitea_bridge::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

type Stores = (Arc<dyn UserDirectory>, Arc<dyn CredentialStore>);

/// Open the configured storage backend.
async fn open_store(config: &Config) -> Result<Stores, Box<dyn std::error::Error>> {
    match config.store_backend {
        StoreBackend::Firestore => {
            let db = FirestoreDb::new(&config.gcp_project_id).await?;
            Ok((Arc::new(db.clone()), Arc::new(db)))
        }
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            for &id in &config.local_user_ids {
                store.insert_user(LocalUser {
                    id,
                    username: format!("user{}", id),
                    email: String::new(),
                });
            }
            tracing::warn!(
                seeded_users = config.local_user_ids.len(),
                "Using in-memory store; credentials are lost on restart"
            );
            Ok((Arc::new(store.clone()), Arc::new(store)))
        }
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gitea_bridge=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
