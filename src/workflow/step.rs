// Workflow steps and the transition function

use serde::{Deserialize, Serialize};

use super::state::SessionState;

/// The five workflow nodes plus the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Planner,
    ResearchPlan,
    Generate,
    Reflect,
    ResearchCritique,
    End,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Planner => "planner",
            Step::ResearchPlan => "research_plan",
            Step::Generate => "generate",
            Step::Reflect => "reflect",
            Step::ResearchCritique => "research_critique",
            Step::End => "end",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the step that follows `current`.
///
/// Every edge is fixed except `Generate`, which branches on the revision
/// budget via [`should_continue`].
pub fn next_step(current: Step, state: &SessionState) -> Step {
    match current {
        Step::Planner => Step::ResearchPlan,
        Step::ResearchPlan => Step::Generate,
        Step::Generate => should_continue(state),
        Step::Reflect => Step::ResearchCritique,
        Step::ResearchCritique => Step::Generate,
        Step::End => Step::End,
    }
}

/// The one conditional edge: stop the first time the revision counter
/// exceeds the ceiling, evaluated only after a generation step.
pub fn should_continue(state: &SessionState) -> Step {
    if state.revision_number > state.max_revisions {
        Step::End
    } else {
        Step::Reflect
    }
}
