// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod credential;
pub mod repository;
pub mod user;

pub use credential::{AccessToken, GiteaAccount, GiteaCredential, GiteaUserView};
pub use repository::{FileEntry, FileKind, Repository, RepositoryOwner};
pub use user::LocalUser;
