//! On-disk solve history: one versioned JSON document holding every
//! session plus the active session id.
//!
//! Loading never fails: a missing or unreadable file yields a default
//! single-session store, and a legacy flat solve-list file (the
//! pre-session format) is wrapped into one migrated session on first
//! load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app_dirs::AppDirs;
use crate::session::SessionStore;
use crate::solve::Solve;

const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(flatten)]
    store: SessionStore,
}

pub trait HistoryStore {
    fn load(&self) -> SessionStore;
    fn save(&self, store: &SessionStore) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
    legacy_path: PathBuf,
}

impl FileHistoryStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let dir = AppDirs::state_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: dir.join("sessions.json"),
            legacy_path: dir.join("solves.json"),
        }
    }

    pub fn with_paths<P: AsRef<Path>>(path: P, legacy_path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            legacy_path: legacy_path.as_ref().to_path_buf(),
        }
    }

    fn load_current(&self) -> Option<SessionStore> {
        let bytes = fs::read(&self.path).ok()?;
        let file = serde_json::from_slice::<StoreFile>(&bytes).ok()?;
        if file.version != STORE_VERSION {
            return None;
        }
        let mut store = file.store;
        store.repair();
        Some(store)
    }

    fn migrate_legacy(&self) -> Option<SessionStore> {
        let bytes = fs::read(&self.legacy_path).ok()?;
        let solves = serde_json::from_slice::<Vec<Solve>>(&bytes).ok()?;
        let store = SessionStore::from_legacy_solves(solves);
        // Persist the migrated shape and drop the old file so the
        // migration runs once.
        if self.save(&store).is_ok() {
            let _ = fs::remove_file(&self.legacy_path);
        }
        Some(store)
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> SessionStore {
        self.load_current()
            .or_else(|| self.migrate_legacy())
            .unwrap_or_else(SessionStore::with_default_session)
    }

    fn save(&self, store: &SessionStore) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = StoreFile {
            version: STORE_VERSION,
            store: store.clone(),
        };
        let data = serde_json::to_vec_pretty(&file).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::PuzzleType;
    use tempfile::tempdir;

    fn store_at(dir: &Path) -> FileHistoryStore {
        FileHistoryStore::with_paths(dir.join("sessions.json"), dir.join("solves.json"))
    }

    #[test]
    fn missing_file_yields_default_store() {
        let dir = tempdir().unwrap();
        let backend = store_at(dir.path());
        let store = backend.load();
        assert_eq!(store.sessions.len(), 1);
        assert_eq!(store.sessions[0].name, "Default Session");
        assert!(store.sessions[0].solves.is_empty());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempdir().unwrap();
        let backend = store_at(dir.path());

        let mut store = SessionStore::with_default_session();
        store.record_solve(PuzzleType::ThreeByThree, "R U R'".into(), 12_345, 1);
        store.create_session("Second");
        backend.save(&store).unwrap();

        let loaded = backend.load();
        assert_eq!(loaded, store);
    }

    #[test]
    fn corrupt_file_yields_default_store() {
        let dir = tempdir().unwrap();
        let backend = store_at(dir.path());
        fs::write(dir.path().join("sessions.json"), b"not json").unwrap();
        let store = backend.load();
        assert_eq!(store.sessions.len(), 1);
    }

    #[test]
    fn unknown_version_is_not_loaded() {
        let dir = tempdir().unwrap();
        let backend = store_at(dir.path());
        fs::write(
            dir.path().join("sessions.json"),
            br#"{"version": 99, "sessions": [], "active_session_id": 0}"#,
        )
        .unwrap();
        let store = backend.load();
        assert_eq!(store.sessions.len(), 1);
        assert_eq!(store.sessions[0].name, "Default Session");
    }

    #[test]
    fn legacy_flat_list_is_migrated_once() {
        let dir = tempdir().unwrap();
        let backend = store_at(dir.path());

        let legacy = vec![
            Solve::new(1, PuzzleType::ThreeByThree, "R U".into(), 10_000, 0),
            Solve::new(2, PuzzleType::TwoByTwo, "F R".into(), 4_000, 0),
        ];
        fs::write(
            dir.path().join("solves.json"),
            serde_json::to_vec(&legacy).unwrap(),
        )
        .unwrap();

        let store = backend.load();
        assert_eq!(store.sessions.len(), 1);
        assert_eq!(store.sessions[0].solves, legacy);

        // The legacy file is gone and the migrated store persists.
        assert!(!dir.path().join("solves.json").exists());
        let reloaded = backend.load();
        assert_eq!(reloaded, store);
    }
}
