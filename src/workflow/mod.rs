// Essay workflow - explicit state machine over the plan/research/draft/
// critique/revise loop

pub mod checkpoint;
pub mod runner;
pub mod state;
pub mod step;

pub use checkpoint::{Checkpoint, CheckpointStore};
pub use runner::{StepSnapshot, Workflow};
pub use state::SessionState;
pub use step::{next_step, should_continue, Step};
