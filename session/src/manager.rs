//! The single owner of mutable session state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use vantage_types::{Role, User};

use crate::{Session, SessionStore, StoreError};

/// Owns the current [`Session`] and mediates every read and write.
///
/// Reads are cheap clones behind an `RwLock`. Writes happen on exactly three
/// paths: sign-in, access-token swap after a refresh, and clear. Each write
/// bumps a token epoch; the refresh interceptor uses the epoch to detect
/// that another caller already refreshed while it was waiting for the
/// single-flight gate.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<Session>>,
    epoch: AtomicU64,
}

impl SessionManager {
    /// Create a manager over `store`, loading any persisted session.
    ///
    /// A corrupt persisted session is discarded (and logged), not fatal:
    /// the user simply has to sign in again.
    pub fn load(store: Arc<dyn SessionStore>) -> Self {
        let current = match store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted session");
                let _ = store.clear();
                None
            }
        };
        Self {
            store,
            current: RwLock::new(current),
            epoch: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read().map(|s| s.access_token)
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read().map(|s| s.refresh_token)
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read().map(|s| s.user)
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    /// Monotonic counter bumped on every session mutation.
    #[must_use]
    pub fn token_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Install a freshly-authenticated session (login).
    pub fn sign_in(&self, session: Session) -> Result<(), StoreError> {
        self.store.save(&session)?;
        *self.write() = Some(session);
        self.bump();
        tracing::info!("Session established");
        Ok(())
    }

    /// Swap in a new access token after a successful refresh.
    ///
    /// No-op if the session was cleared while the refresh was in flight.
    pub fn apply_refreshed_token(&self, access_token: String) -> Result<(), StoreError> {
        let mut guard = self.write();
        let Some(session) = guard.as_mut() else {
            tracing::debug!("Refresh completed after logout; dropping token");
            return Ok(());
        };
        session.access_token = access_token;
        let snapshot = session.clone();
        drop(guard);

        self.store.save(&snapshot)?;
        self.bump();
        Ok(())
    }

    /// Tear the session down (logout or unrecoverable refresh failure).
    ///
    /// In-memory state is dropped even if removing the persisted copy
    /// fails; the error is still reported so callers can surface it.
    pub fn clear(&self) -> Result<(), StoreError> {
        *self.write() = None;
        self.bump();
        self.store.clear()
    }

    fn read(&self) -> Option<Session> {
        self.current.read().expect("session lock poisoned").clone()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().expect("session lock poisoned")
    }

    fn bump(&self) {
        self.epoch.fetch_add(1, Ordering::Release);
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticated", &self.is_authenticated())
            .field("epoch", &self.token_epoch())
            .finish_non_exhaustive()
    }
}
