//! Database layer.
//!
//! Handlers see storage only through [`UserDirectory`] and
//! [`CredentialStore`]. [`FirestoreDb`] backs production; [`MemoryStore`]
//! backs tests and local development.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{GiteaCredential, LocalUser};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Local users (owned by the user-management subsystem)
    pub const USERS: &str = "users";
    /// Gitea credentials (keyed by local user ID)
    pub const GITEA_CREDENTIALS: &str = "gitea_credentials";
}

/// Read-only view of local users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a local user by ID.
    async fn find_user(&self, user_id: u64) -> Result<Option<LocalUser>, AppError>;
}

/// At most one Gitea credential per local user.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Credential owned by `user_id`, if linked.
    async fn find_credential(&self, user_id: u64) -> Result<Option<GiteaCredential>, AppError>;

    /// Insert the credential, or overwrite the owner's existing record in
    /// place (keeping its `created_at`). Returns the stored record.
    async fn upsert_credential(
        &self,
        credential: GiteaCredential,
    ) -> Result<GiteaCredential, AppError>;

    /// Remove the owner's credential. Returns whether a record existed;
    /// a missing record is not an error.
    async fn delete_credential(&self, user_id: u64) -> Result<bool, AppError>;
}
