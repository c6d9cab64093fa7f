// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod codec;
pub mod credentials;
pub mod gitea;
pub mod oauth;
pub mod repository;
pub mod session;

pub use credentials::CredentialService;
pub use gitea::GiteaClient;
pub use oauth::{ExternalToken, OAuthBroker};
pub use repository::RepositoryProxy;
pub use session::{create_session_token, SessionAuthenticator, SessionIdentity};
