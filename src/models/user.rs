//! Local user model (owned by the user-management subsystem).

use serde::{Deserialize, Serialize};

/// Local account as stored by the user-management subsystem.
///
/// Only read here, to confirm that a session's identity still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    /// Local user ID (also used as document ID)
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}
