// Session state threaded through every workflow step

use serde::{Deserialize, Serialize};

/// Flat record carried through one workflow run.
///
/// `content` is append-only for the lifetime of the run: research steps push
/// snippets and nothing ever removes or rewrites prior entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// The user's writing goal. Immutable after creation.
    pub task: String,

    /// Model-produced outline, overwritten once per cycle by the plan step.
    pub plan: String,

    /// Latest essay draft, overwritten each generation step.
    pub draft: String,

    /// Latest reviewer feedback, overwritten each reflection step.
    pub critique: String,

    /// Accumulated research snippets across the whole session.
    pub content: Vec<String>,

    /// Incremented exactly once per generation step, success or not.
    pub revision_number: u32,

    /// Revision ceiling; the loop stops once `revision_number` exceeds it.
    pub max_revisions: u32,
}

impl SessionState {
    pub fn new(task: impl Into<String>, max_revisions: u32, revision_number: u32) -> Self {
        Self {
            task: task.into(),
            plan: String::new(),
            draft: String::new(),
            critique: String::new(),
            content: Vec::new(),
            revision_number,
            max_revisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = SessionState::new("the history of glass", 2, 1);
        assert_eq!(state.task, "the history of glass");
        assert_eq!(state.revision_number, 1);
        assert_eq!(state.max_revisions, 2);
        assert!(state.plan.is_empty());
        assert!(state.draft.is_empty());
        assert!(state.critique.is_empty());
        assert!(state.content.is_empty());
    }

    #[test]
    fn test_state_round_trips_through_serde() {
        let mut state = SessionState::new("t", 1, 1);
        state.content.push("snippet".to_string());
        let json = serde_json::to_string(&state).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, vec!["snippet"]);
        assert_eq!(back.max_revisions, 1);
    }
}
