use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::solve::{PuzzleType, Solve};

/// Store-level failures. Everything else (unknown solve ids, unknown
/// session ids) is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("cannot delete the only session")]
    LastSession,
}

/// A named practice session owning its solve history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: u64,
    pub name: String,
    pub solves: Vec<Solve>,
}

impl Session {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            solves: Vec::new(),
        }
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut Solve> {
        self.solves.iter_mut().find(|s| s.id == id)
    }

    pub fn solves_of(&self, puzzle: PuzzleType) -> Vec<Solve> {
        self.solves
            .iter()
            .filter(|s| s.puzzle == puzzle)
            .cloned()
            .collect()
    }

    pub fn count_of(&self, puzzle: PuzzleType) -> usize {
        self.solves.iter().filter(|s| s.puzzle == puzzle).count()
    }
}

/// All sessions plus which one is active. Never empty: the last
/// session cannot be deleted, and deserialized/migrated stores are
/// repaired to hold at least one session with a valid active id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStore {
    pub sessions: Vec<Session>,
    pub active_session_id: u64,
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

impl SessionStore {
    pub fn with_default_session() -> Self {
        let session = Session::new(now_ms(), "Default Session");
        let id = session.id;
        Self {
            sessions: vec![session],
            active_session_id: id,
        }
    }

    /// Wrap a legacy flat solve list into a single migrated session.
    pub fn from_legacy_solves(solves: Vec<Solve>) -> Self {
        let mut store = Self::with_default_session();
        store.sessions[0].solves = solves;
        store
    }

    /// Re-establish the invariants after deserialization: at least one
    /// session, and an active id that names an existing session.
    pub fn repair(&mut self) {
        if self.sessions.is_empty() {
            let session = Session::new(now_ms(), "Default Session");
            self.active_session_id = session.id;
            self.sessions.push(session);
        }
        if !self.sessions.iter().any(|s| s.id == self.active_session_id) {
            self.active_session_id = self.sessions[0].id;
        }
    }

    pub fn active(&self) -> &Session {
        self.sessions
            .iter()
            .find(|s| s.id == self.active_session_id)
            .unwrap_or(&self.sessions[0])
    }

    pub fn active_mut(&mut self) -> &mut Session {
        let idx = self
            .sessions
            .iter()
            .position(|s| s.id == self.active_session_id)
            .unwrap_or(0);
        &mut self.sessions[idx]
    }

    fn next_solve_id(&self) -> u64 {
        let mut id = now_ms();
        while self.active().solves.iter().any(|s| s.id == id) {
            id += 1;
        }
        id
    }

    /// Append a finished timed solve to the active session.
    pub fn record_solve(
        &mut self,
        puzzle: PuzzleType,
        scramble: String,
        raw_time_ms: u64,
        penalty_units: u8,
    ) -> u64 {
        let id = self.next_solve_id();
        let solve = Solve::new(id, puzzle, scramble, raw_time_ms, penalty_units);
        self.active_mut().solves.insert(0, solve);
        id
    }

    /// Append an automatic DNF (inspection overrun) to the active
    /// session.
    pub fn record_dnf(&mut self, puzzle: PuzzleType, scramble: String) -> u64 {
        let id = self.next_solve_id();
        let solve = Solve::dnf(id, puzzle, scramble);
        self.active_mut().solves.insert(0, solve);
        id
    }

    pub fn delete_solve(&mut self, id: u64) {
        self.active_mut().solves.retain(|s| s.id != id);
    }

    pub fn cycle_penalty(&mut self, id: u64) {
        if let Some(solve) = self.active_mut().find_mut(id) {
            solve.cycle_penalty();
        }
    }

    pub fn toggle_dnf(&mut self, id: u64) {
        if let Some(solve) = self.active_mut().find_mut(id) {
            solve.toggle_dnf();
        }
    }

    pub fn clear_all_of_type(&mut self, puzzle: PuzzleType) {
        self.active_mut().solves.retain(|s| s.puzzle != puzzle);
    }

    pub fn create_session(&mut self, name: impl Into<String>) -> u64 {
        let mut id = now_ms();
        while self.sessions.iter().any(|s| s.id == id) {
            id += 1;
        }
        self.sessions.push(Session::new(id, name));
        self.active_session_id = id;
        id
    }

    /// Switch the active session; unknown ids are ignored.
    pub fn switch_to(&mut self, id: u64) {
        if self.sessions.iter().any(|s| s.id == id) {
            self.active_session_id = id;
        }
    }

    pub fn rename_active(&mut self, name: impl Into<String>) {
        self.active_mut().name = name.into();
    }

    /// Delete the active session and fall back to the first remaining
    /// one. Refused when it is the only session.
    pub fn delete_active(&mut self) -> Result<(), StoreError> {
        if self.sessions.len() <= 1 {
            return Err(StoreError::LastSession);
        }
        let active = self.active_session_id;
        self.sessions.retain(|s| s.id != active);
        self.active_session_id = self.sessions[0].id;
        Ok(())
    }
}
