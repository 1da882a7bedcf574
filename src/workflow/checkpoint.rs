// Ephemeral checkpoint store keyed by session id

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::state::SessionState;
use super::step::Step;

/// Snapshot of a run taken after a completed step.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub step: Step,
    pub state: SessionState,
    pub saved_at: DateTime<Utc>,
}

/// Process-local checkpoint store.
///
/// Exists only so a single in-flight run can be resumed from the step after
/// its last completed one. Nothing here survives the process and nothing is
/// shared across processes.
#[derive(Debug, Default)]
pub struct CheckpointStore {
    sessions: DashMap<String, Checkpoint>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state after `step` completed for this session.
    pub fn save(&self, session_id: &str, step: Step, state: &SessionState) {
        self.sessions.insert(
            session_id.to_string(),
            Checkpoint {
                step,
                state: state.clone(),
                saved_at: Utc::now(),
            },
        );
    }

    /// Latest checkpoint for the session, if any.
    pub fn load(&self, session_id: &str) -> Option<Checkpoint> {
        self.sessions.get(session_id).map(|entry| entry.clone())
    }

    /// Drop a finished session's checkpoint.
    pub fn remove(&self, session_id: &str) -> Option<Checkpoint> {
        self.sessions.remove(session_id).map(|(_, checkpoint)| checkpoint)
    }
}
