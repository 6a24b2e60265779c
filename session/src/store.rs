//! Session persistence backends.
//!
//! [`FileSessionStore`] keeps the session as a single JSON file and
//! per-ticket reply drafts as plain files under `drafts/`. Writes use a
//! temp-file + rename so a crash mid-write never leaves a truncated session
//! on disk, and token material is written owner-only (0o600) on Unix.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use vantage_types::TicketId;

use crate::Session;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("stored session is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistence backend for session state and per-ticket drafts.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, StoreError>;
    fn save(&self, session: &Session) -> Result<(), StoreError>;
    /// Remove all persisted session state. Must be a no-op when nothing is
    /// stored. Drafts survive a session clear.
    fn clear(&self) -> Result<(), StoreError>;

    fn load_draft(&self, ticket: &TicketId) -> Result<Option<String>, StoreError>;
    fn save_draft(&self, ticket: &TicketId, text: &str) -> Result<(), StoreError>;
    fn clear_draft(&self, ticket: &TicketId) -> Result<(), StoreError>;
}

const SESSION_FILE: &str = "session.json";
const DRAFTS_DIR: &str = "drafts";

/// File-backed store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    fn draft_path(&self, ticket: &TicketId) -> PathBuf {
        // Ticket ids come from the backend; keep only filename-safe chars.
        let safe: String = ticket
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.root.join(DRAFTS_DIR).join(safe)
    }

    fn atomic_write(path: &Path, bytes: &[u8], owner_only: bool) -> io::Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        #[cfg(unix)]
        if owner_only {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))?;
        }
        #[cfg(not(unix))]
        let _ = owner_only;

        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        let path = self.session_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_slice(&bytes)?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(session)?;
        Self::atomic_write(&self.session_path(), &bytes, true)?;
        tracing::debug!(path = %self.session_path().display(), "Session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(self.session_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load_draft(&self, ticket: &TicketId) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.draft_path(ticket)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_draft(&self, ticket: &TicketId, text: &str) -> Result<(), StoreError> {
        Self::atomic_write(&self.draft_path(ticket), text.as_bytes(), false)?;
        Ok(())
    }

    fn clear_draft(&self, ticket: &TicketId) -> Result<(), StoreError> {
        match fs::remove_file(self.draft_path(ticket)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: std::sync::Mutex<Option<Session>>,
    drafts: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.session.lock().expect("store poisoned").clone())
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.session.lock().expect("store poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.session.lock().expect("store poisoned") = None;
        Ok(())
    }

    fn load_draft(&self, ticket: &TicketId) -> Result<Option<String>, StoreError> {
        Ok(self
            .drafts
            .lock()
            .expect("store poisoned")
            .get(ticket.as_str())
            .cloned())
    }

    fn save_draft(&self, ticket: &TicketId, text: &str) -> Result<(), StoreError> {
        self.drafts
            .lock()
            .expect("store poisoned")
            .insert(ticket.as_str().to_string(), text.to_string());
        Ok(())
    }

    fn clear_draft(&self, ticket: &TicketId) -> Result<(), StoreError> {
        self.drafts
            .lock()
            .expect("store poisoned")
            .remove(ticket.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_session;

    #[test]
    fn file_store_round_trips_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path());

        assert!(store.load().expect("load empty").is_none());

        let session = sample_session();
        store.save(&session).expect("save");
        assert_eq!(store.load().expect("load"), Some(session));

        store.clear().expect("clear");
        assert!(store.load().expect("load cleared").is_none());
        // Clearing twice is fine.
        store.clear().expect("clear again");
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path());
        store.save(&sample_session()).expect("save");

        let mode = fs::metadata(dir.path().join("session.json"))
            .expect("metadata")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn drafts_survive_session_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path());
        let ticket = TicketId::new("T-42");

        store.save_draft(&ticket, "half-written reply").expect("save draft");
        store.save(&sample_session()).expect("save session");
        store.clear().expect("clear session");

        assert_eq!(
            store.load_draft(&ticket).expect("load draft").as_deref(),
            Some("half-written reply")
        );

        store.clear_draft(&ticket).expect("clear draft");
        assert!(store.load_draft(&ticket).expect("load draft").is_none());
    }

    #[test]
    fn draft_paths_are_sanitized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path());
        let ticket = TicketId::new("../../etc/passwd");

        store.save_draft(&ticket, "x").expect("save draft");
        // Everything must land under drafts/, never outside the root.
        let entries: Vec<_> = fs::read_dir(dir.path().join("drafts"))
            .expect("drafts dir")
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemorySessionStore::new();
        let ticket = TicketId::new("T-1");

        store.save(&sample_session()).expect("save");
        assert!(store.load().expect("load").is_some());
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());

        store.save_draft(&ticket, "d").expect("draft");
        assert_eq!(store.load_draft(&ticket).expect("load").as_deref(), Some("d"));
    }
}
