// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential lifecycle on top of a [`CredentialStore`].
//!
//! Linking and revoking for the same owner are serialized by a per-owner
//! mutex, so concurrent OAuth callbacks cannot interleave their
//! read-then-write against the store.

use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::{GiteaAccount, GiteaCredential};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-owner locks shared by all clones of the service.
pub type LinkLocks = Arc<DashMap<u64, Arc<Mutex<()>>>>;

#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    locks: LinkLocks,
}

impl CredentialService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            locks: Arc::new(DashMap::new()),
        }
    }

    fn owner_lock(&self, user_id: u64) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Linked credential for `user_id`, if any.
    pub async fn find(&self, user_id: u64) -> Result<Option<GiteaCredential>, AppError> {
        self.store.find_credential(user_id).await
    }

    /// Linked credential for `user_id`, or `NotAuthorized`.
    pub async fn require(&self, user_id: u64) -> Result<GiteaCredential, AppError> {
        self.find(user_id).await?.ok_or(AppError::NotAuthorized)
    }

    /// Store `account` as the user's credential, replacing any previous link.
    pub async fn link(
        &self,
        user_id: u64,
        account: GiteaAccount,
    ) -> Result<GiteaCredential, AppError> {
        let lock = self.owner_lock(user_id);
        let _guard = lock.lock().await;

        let credential = GiteaCredential::link(user_id, account, Utc::now());
        let stored = self.store.upsert_credential(credential).await?;

        tracing::info!(
            user_id,
            gitea_user_id = stored.gitea_user_id,
            login = %stored.gitea_login,
            "Gitea credential stored"
        );
        Ok(stored)
    }

    /// Remove the user's credential. Returns whether one existed.
    pub async fn revoke(&self, user_id: u64) -> Result<bool, AppError> {
        let lock = self.owner_lock(user_id);
        let _guard = lock.lock().await;

        let removed = self.store.delete_credential(user_id).await?;
        if removed {
            tracing::info!(user_id, "Gitea credential revoked");
        } else {
            tracing::debug!(user_id, "No Gitea credential to revoke");
        }
        Ok(removed)
    }
}
