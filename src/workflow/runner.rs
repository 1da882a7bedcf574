// Workflow driver and node implementations
//
// Drives the fixed five-node graph: planner → research_plan → generate, then
// generate → reflect → research_critique → generate until the revision budget
// is exhausted. The three free-text model calls go through the backoff
// wrapper and degrade to empty strings on failure; query generation and
// search are unprotected and abort the run.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::prompts;
use crate::providers::{ChatMessage, ModelProvider};
use crate::retry::with_backoff;
use crate::search::SearchProvider;

use super::checkpoint::CheckpointStore;
use super::state::SessionState;
use super::step::{next_step, Step};

const DEFAULT_RESULTS_PER_QUERY: usize = 2;

/// Emitted after every completed step when streaming a run.
#[derive(Debug, Clone)]
pub struct StepSnapshot {
    pub step: Step,
    pub state: SessionState,
}

/// The essay workflow.
///
/// Both clients are constructed by the caller and injected; the workflow owns
/// no process-wide state beyond its checkpoint store. Clone is cheap (all
/// fields are behind `Arc`).
#[derive(Clone)]
pub struct Workflow {
    model: Arc<dyn ModelProvider>,
    search: Arc<dyn SearchProvider>,
    checkpoints: Arc<CheckpointStore>,
    results_per_query: usize,
}

impl Workflow {
    pub fn new(model: Arc<dyn ModelProvider>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            model,
            search,
            checkpoints: Arc::new(CheckpointStore::new()),
            results_per_query: DEFAULT_RESULTS_PER_QUERY,
        }
    }

    /// Search-result limit applied to each model-produced query.
    pub fn with_results_per_query(mut self, results_per_query: usize) -> Self {
        self.results_per_query = results_per_query;
        self
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    /// Drive a fresh run from the planner to the terminal state.
    pub async fn run(&self, session_id: &str, state: SessionState) -> Result<SessionState> {
        self.drive(session_id, Step::Planner, state, None).await
    }

    /// Resume an in-flight run from the step after its last checkpoint.
    pub async fn resume(&self, session_id: &str) -> Result<SessionState> {
        let checkpoint = self
            .checkpoints
            .load(session_id)
            .with_context(|| format!("No checkpoint for session {session_id}"))?;
        let start = next_step(checkpoint.step, &checkpoint.state);
        self.drive(session_id, start, checkpoint.state, None).await
    }

    /// Run on a spawned task, emitting a snapshot after every completed step.
    ///
    /// The final channel item is an `Err` if the run aborted; otherwise the
    /// channel closes after the snapshot of the last step.
    pub fn run_streaming(
        &self,
        session_id: &str,
        state: SessionState,
    ) -> mpsc::Receiver<Result<StepSnapshot>> {
        let (tx, rx) = mpsc::channel(16);
        let workflow = self.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = workflow
                .drive(&session_id, Step::Planner, state, Some(tx.clone()))
                .await
            {
                tracing::error!("Workflow run {} aborted: {:#}", session_id, e);
                let _ = tx.send(Err(e)).await;
            }
        });
        rx
    }

    async fn drive(
        &self,
        session_id: &str,
        start: Step,
        mut state: SessionState,
        updates: Option<mpsc::Sender<Result<StepSnapshot>>>,
    ) -> Result<SessionState> {
        let mut step = start;

        while step != Step::End {
            tracing::debug!("Session {}: entering {}", session_id, step);
            self.execute(step, &mut state)
                .await
                .with_context(|| format!("Step {step} failed"))?;

            self.checkpoints.save(session_id, step, &state);
            if let Some(tx) = &updates {
                // Receiver may have been dropped; the run finishes regardless.
                let _ = tx
                    .send(Ok(StepSnapshot {
                        step,
                        state: state.clone(),
                    }))
                    .await;
            }

            step = next_step(step, &state);
        }

        Ok(state)
    }

    async fn execute(&self, step: Step, state: &mut SessionState) -> Result<()> {
        match step {
            Step::Planner => {
                self.planner(state).await;
                Ok(())
            }
            Step::ResearchPlan => self.research_plan(state).await,
            Step::Generate => {
                self.generate(state).await;
                Ok(())
            }
            Step::Reflect => {
                self.reflect(state).await;
                Ok(())
            }
            Step::ResearchCritique => self.research_critique(state).await,
            Step::End => Ok(()),
        }
    }

    // ── Nodes ──────────────────────────────────────────────────────────────────

    /// Produce the outline. A failed model call degrades to an empty plan.
    async fn planner(&self, state: &mut SessionState) {
        let messages = vec![
            ChatMessage::system(prompts::PLAN_PROMPT),
            ChatMessage::user(state.task.as_str()),
        ];
        state.plan = with_backoff(|| self.model.generate(&messages))
            .await
            .unwrap_or_default();
    }

    /// Ask for search queries derived from the task and append every returned
    /// snippet. Unprotected: any failure aborts the run.
    async fn research_plan(&self, state: &mut SessionState) -> Result<()> {
        let system = prompts::research_system(prompts::RESEARCH_PLAN_PROMPT);
        let subject = state.task.clone();
        self.research(state, system, subject).await
    }

    /// Write (or rewrite) the draft from the plan and all accumulated
    /// research. The revision counter advances even when generation failed,
    /// so degraded cycles still count against the budget.
    async fn generate(&self, state: &mut SessionState) {
        let user = format!("{}\n\nHere is my plan:\n\n{}", state.task, state.plan);
        let messages = vec![
            ChatMessage::system(prompts::writer_system(&state.content)),
            ChatMessage::user(user),
        ];

        let draft = with_backoff(|| self.model.generate(&messages)).await;
        if draft.is_none() {
            tracing::warn!(
                "Draft generation failed; revision {} counts as degraded",
                state.revision_number
            );
        }
        state.draft = draft.unwrap_or_default();
        state.revision_number += 1;
    }

    /// Critique the current draft. Degrades to an empty critique on failure.
    async fn reflect(&self, state: &mut SessionState) {
        let messages = vec![
            ChatMessage::system(prompts::REFLECTION_PROMPT),
            ChatMessage::user(state.draft.as_str()),
        ];
        state.critique = with_backoff(|| self.model.generate(&messages))
            .await
            .unwrap_or_default();
    }

    /// Same query/search/append pattern as `research_plan`, applied to the
    /// critique instead of the task.
    async fn research_critique(&self, state: &mut SessionState) -> Result<()> {
        let system = prompts::research_system(prompts::RESEARCH_CRITIQUE_PROMPT);
        let subject = state.critique.clone();
        self.research(state, system, subject).await
    }

    /// Shared research body: one structured-query call, then one search per
    /// query, appending every snippet to `content`. Never deduplicates.
    async fn research(
        &self,
        state: &mut SessionState,
        system: String,
        subject: String,
    ) -> Result<()> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(subject)];
        let queries = self
            .model
            .generate_queries(&messages)
            .await
            .context("Query generation failed")?;

        for query in &queries.queries {
            let snippets = self
                .search
                .search(query, self.results_per_query)
                .await
                .with_context(|| format!("Search failed for query {query:?}"))?;
            for snippet in snippets {
                state.content.push(snippet.content);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ProviderError, Queries};
    use crate::search::Snippet;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Model fake with scripted generate results; query calls always succeed
    /// unless `fail_queries` is set.
    #[derive(Default)]
    struct ScriptedModel {
        generate_results: Mutex<VecDeque<Result<String, ProviderError>>>,
        generate_calls: AtomicUsize,
        query_calls: AtomicUsize,
        fail_queries: bool,
    }

    impl ScriptedModel {
        fn with_generate_results(
            results: Vec<Result<String, ProviderError>>,
        ) -> Self {
            Self {
                generate_results: Mutex::new(results.into()),
                ..Default::default()
            }
        }
    }

    #[async_trait::async_trait]
    impl ModelProvider for ScriptedModel {
        async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, ProviderError> {
            let n = self.generate_calls.fetch_add(1, Ordering::SeqCst);
            self.generate_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(format!("text-{n}")))
        }

        async fn generate_queries(
            &self,
            _messages: &[ChatMessage],
        ) -> Result<Queries, ProviderError> {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_queries {
                return Err(ProviderError::Api("queries unavailable".to_string()));
            }
            Ok(Queries {
                queries: vec!["q1".to_string(), "q2".to_string()],
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[derive(Default)]
    struct FixedSearch {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Snippet>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..max_results)
                .map(|i| Snippet {
                    title: format!("{query} #{i}"),
                    url: "https://example.test".to_string(),
                    content: format!("snippet-{call}-{i}"),
                })
                .collect())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn workflow_with(model: ScriptedModel) -> (Workflow, Arc<ScriptedModel>) {
        let model = Arc::new(model);
        let workflow = Workflow::new(model.clone(), Arc::new(FixedSearch::default()));
        (workflow, model)
    }

    #[tokio::test]
    async fn test_planner_sets_plan() {
        let (workflow, _) = workflow_with(ScriptedModel::with_generate_results(vec![Ok(
            "1. Intro".to_string(),
        )]));
        let mut state = SessionState::new("t", 2, 1);

        workflow.planner(&mut state).await;

        assert_eq!(state.plan, "1. Intro");
    }

    #[tokio::test]
    async fn test_planner_degrades_to_empty_plan() {
        let (workflow, model) = workflow_with(ScriptedModel::with_generate_results(vec![Err(
            ProviderError::Api("boom".to_string()),
        )]));
        let mut state = SessionState::new("t", 2, 1);

        workflow.planner(&mut state).await;

        assert_eq!(state.plan, "");
        assert_eq!(model.generate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_increments_revision_on_success() {
        let (workflow, _) = workflow_with(ScriptedModel::default());
        let mut state = SessionState::new("t", 2, 1);

        workflow.generate(&mut state).await;

        assert_eq!(state.draft, "text-0");
        assert_eq!(state.revision_number, 2);
    }

    #[tokio::test]
    async fn test_generate_increments_revision_on_failure() {
        let (workflow, _) = workflow_with(ScriptedModel::with_generate_results(vec![Err(
            ProviderError::Api("boom".to_string()),
        )]));
        let mut state = SessionState::new("t", 2, 1);

        workflow.generate(&mut state).await;

        assert_eq!(state.draft, "");
        assert_eq!(state.revision_number, 2);
    }

    #[tokio::test]
    async fn test_research_plan_appends_without_dedup() {
        let (workflow, model) = workflow_with(ScriptedModel::default());
        let mut state = SessionState::new("t", 2, 1);
        state.content.push("existing".to_string());

        workflow.research_plan(&mut state).await.unwrap();

        // 2 queries x 2 results each, appended after the existing entry
        assert_eq!(state.content.len(), 5);
        assert_eq!(state.content[0], "existing");
        assert_eq!(model.query_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_research_failure_aborts_run() {
        let model = ScriptedModel {
            fail_queries: true,
            ..Default::default()
        };
        let (workflow, _) = workflow_with(model);
        let state = SessionState::new("t", 2, 1);

        let err = workflow.run("s", state).await.unwrap_err();

        assert!(err.to_string().contains("research_plan"));
    }

    #[tokio::test]
    async fn test_reflect_sets_critique_from_draft() {
        let (workflow, _) = workflow_with(ScriptedModel::with_generate_results(vec![Ok(
            "needs work".to_string(),
        )]));
        let mut state = SessionState::new("t", 2, 1);
        state.draft = "a draft".to_string();

        workflow.reflect(&mut state).await;

        assert_eq!(state.critique, "needs work");
    }

    #[tokio::test]
    async fn test_drive_checkpoints_every_step() {
        let (workflow, _) = workflow_with(ScriptedModel::default());
        let state = SessionState::new("t", 0, 1);

        workflow.run("session-9", state).await.unwrap();

        // Last completed step before End is always generate
        let checkpoint = workflow.checkpoints().load("session-9").unwrap();
        assert_eq!(checkpoint.step, Step::Generate);
        assert_eq!(checkpoint.state.revision_number, 2);
    }
}
