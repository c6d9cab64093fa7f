// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (read-only lookups for session resolution)
//! - Gitea credentials (one document per local user)

use crate::db::{collections, CredentialStore, UserDirectory};
use crate::error::AppError;
use crate::models::{GiteaCredential, LocalUser};
use async_trait::async_trait;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator accepts any bearer token, so skip credential discovery.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::Persistence(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Persistence(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::Persistence("Database not connected (offline mode)".to_string())
        })
    }

    /// Create or replace a local user record.
    ///
    /// Users are owned by the user-management subsystem; this exists for
    /// seeding and tests.
    pub async fn put_user(&self, user: &LocalUser) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user.id.to_string())
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(())
    }

    async fn write_credential(&self, credential: &GiteaCredential) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::GITEA_CREDENTIALS)
            .document_id(credential.user_id.to_string())
            .object(credential)
            .execute()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for FirestoreDb {
    async fn find_user(&self, user_id: u64) -> Result<Option<LocalUser>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for FirestoreDb {
    async fn find_credential(&self, user_id: u64) -> Result<Option<GiteaCredential>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GITEA_CREDENTIALS)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))
    }

    /// The document ID is the owner ID, so a write can never produce a
    /// second record for the same user.
    async fn upsert_credential(
        &self,
        credential: GiteaCredential,
    ) -> Result<GiteaCredential, AppError> {
        let stored = match self.find_credential(credential.user_id).await? {
            Some(mut existing) => {
                existing.overwrite_with(credential);
                existing
            }
            None => credential,
        };

        self.write_credential(&stored).await?;
        Ok(stored)
    }

    async fn delete_credential(&self, user_id: u64) -> Result<bool, AppError> {
        if self.find_credential(user_id).await?.is_none() {
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::GITEA_CREDENTIALS)
            .document_id(user_id.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_mock_reports_persistence_error() {
        let db = FirestoreDb::new_mock();

        let err = db.find_credential(1).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));

        let err = db.find_user(1).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
    }
}
