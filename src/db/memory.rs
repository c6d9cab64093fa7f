//! In-process store for tests and local development.

use crate::db::{CredentialStore, UserDirectory};
use crate::error::AppError;
use crate::models::{GiteaCredential, LocalUser};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe map-backed store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<DashMap<u64, LocalUser>>,
    credentials: Arc<DashMap<u64, GiteaCredential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a local user (stands in for the user-management subsystem).
    pub fn insert_user(&self, user: LocalUser) {
        self.users.insert(user.id, user);
    }

    /// Number of stored credentials.
    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, user_id: u64) -> Result<Option<LocalUser>, AppError> {
        Ok(self.users.get(&user_id).map(|u| u.value().clone()))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_credential(&self, user_id: u64) -> Result<Option<GiteaCredential>, AppError> {
        Ok(self.credentials.get(&user_id).map(|c| c.value().clone()))
    }

    async fn upsert_credential(
        &self,
        credential: GiteaCredential,
    ) -> Result<GiteaCredential, AppError> {
        // The entry holds the shard lock, so find-then-write is atomic.
        let stored = match self.credentials.entry(credential.user_id) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().overwrite_with(credential);
                existing.get().clone()
            }
            Entry::Vacant(slot) => slot.insert(credential).value().clone(),
        };
        Ok(stored)
    }

    async fn delete_credential(&self, user_id: u64) -> Result<bool, AppError> {
        Ok(self.credentials.remove(&user_id).is_some())
    }
}
