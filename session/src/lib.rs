//! Owned session state for the Vantage client.
//!
//! The session (access token, refresh token, user profile) is explicitly
//! owned by a [`SessionManager`] and handed to collaborators by reference;
//! nothing in the workspace reads ambient global storage. All mutation goes
//! through the manager: the refresh interceptor swaps the access token,
//! logout (or an unrecoverable refresh failure) clears everything.
//!
//! Persistence is pluggable through [`SessionStore`]; the file-backed store
//! writes token material atomically with owner-only permissions.

mod manager;
mod store;

pub use manager::SessionManager;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError};

use serde::{Deserialize, Serialize};
use vantage_types::User;

/// Authenticated session as held in memory and on disk.
///
/// Field names on the wire/disk keep the original storage keys
/// (`token`, `refreshToken`, `user`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "token")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub user: User,
}
