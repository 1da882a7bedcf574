// Redraft - iterative essay-writing agent
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use redraft::config::load_config;
use redraft::providers::AnthropicProvider;
use redraft::search::TavilyClient;
use redraft::workflow::{SessionState, Step, Workflow};

#[derive(Parser)]
#[command(name = "redraft", version, about = "Plan, research, draft, critique, revise")]
struct Args {
    /// The writing task, e.g. "the role of rivers in early trade networks"
    task: String,

    /// Maximum number of revisions before the loop stops
    #[arg(long, default_value_t = 2)]
    max_revisions: u32,

    /// Starting revision number
    #[arg(long, default_value_t = 1)]
    revision_number: u32,

    /// Session id used to key the checkpoint store (random if omitted)
    #[arg(long)]
    session_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = load_config()?;

    let model = AnthropicProvider::new(config.anthropic_api_key.clone(), config.model.clone())?
        .with_max_tokens(config.max_tokens);
    let search = TavilyClient::new(config.tavily_api_key.clone())?;

    let workflow = Workflow::new(Arc::new(model), Arc::new(search))
        .with_results_per_query(config.results_per_query);

    let session_id = args
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!("Starting session {}", session_id);

    let state = SessionState::new(args.task.clone(), args.max_revisions, args.revision_number);

    let mut updates = workflow.run_streaming(&session_id, state);
    let mut final_draft = String::new();

    while let Some(update) = updates.recv().await {
        let snapshot = update?;
        match snapshot.step {
            Step::Planner => {
                println!("── plan ──\n{}\n", snapshot.state.plan);
            }
            Step::ResearchPlan | Step::ResearchCritique => {
                println!(
                    "── {} ── {} snippets gathered\n",
                    snapshot.step,
                    snapshot.state.content.len()
                );
            }
            Step::Generate => {
                println!(
                    "── draft (revision {}) ──\n{}\n",
                    snapshot.state.revision_number - 1,
                    snapshot.state.draft
                );
                final_draft = snapshot.state.draft.clone();
            }
            Step::Reflect => {
                println!("── critique ──\n{}\n", snapshot.state.critique);
            }
            Step::End => {}
        }
    }

    println!("── final draft ──\n{final_draft}");

    Ok(())
}
