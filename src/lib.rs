// Redraft - iterative essay-writing agent
// Library exports

pub mod config;
pub mod prompts;
pub mod providers;
pub mod retry;
pub mod search;
pub mod workflow;
