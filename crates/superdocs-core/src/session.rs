use anyhow::{Context, Result};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::prompts::{edit_system_prompt, edit_user_prompt, plan_user_prompt, PLAN_SYSTEM_PROMPT};
use crate::services::anthropic::CompletionClient;
use crate::services::diff::markdown::extract_code_blocks;
use crate::services::diff::{FileSet, ReconcileConfig, Reconciler, Reconciliation, Snippet};
use crate::shared::message::{Plan, StreamMessage};

/// What the user sent: the code they selected and what they want done with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditRequest {
    pub snippets: Vec<Snippet>,
    pub request: String,
}

/// Outcome of one edit instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionResult {
    pub index: usize,
    pub instruction: String,
    pub reconciliation: Reconciliation,
    /// Set when the model call itself failed.
    pub error: Option<String>,
}

fn emit(tx: &UnboundedSender<StreamMessage>, message: StreamMessage) {
    if tx.send(message).is_err() {
        tracing::debug!("stream receiver dropped, message discarded");
    }
}

/// Reads the planner's JSON, which models often wrap in a fenced block or
/// surround with prose.
pub fn parse_plan(response: &str) -> Result<Plan> {
    let trimmed = response.trim();
    if let Ok(plan) = serde_json::from_str(trimmed) {
        return Ok(plan);
    }
    for block in extract_code_blocks(trimmed, "") {
        if let Ok(plan) = serde_json::from_str(&block) {
            return Ok(plan);
        }
    }
    let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) else {
        anyhow::bail!("plan response contains no JSON object");
    };
    if end < start {
        anyhow::bail!("plan response contains no JSON object");
    }
    serde_json::from_str(&trimmed[start..=end]).context("failed to parse plan response")
}

/// Plans a request, then runs every edit instruction concurrently and
/// reconciles each response against the request's snippets.
#[derive(Debug, Clone)]
pub struct EditSession {
    client: Arc<dyn CompletionClient>,
    reconciler: Arc<Reconciler>,
    cwd: String,
}

impl EditSession {
    pub fn new(client: Arc<dyn CompletionClient>, config: ReconcileConfig) -> Self {
        Self {
            client,
            reconciler: Arc::new(Reconciler::new(config)),
            cwd: ".".to_string(),
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub async fn run(
        &self,
        request: &EditRequest,
        tx: &UnboundedSender<StreamMessage>,
    ) -> Result<Vec<InstructionResult>> {
        let files = FileSet::from_snippets(&request.snippets);
        tracing::info!("planning request over {} files", files.len());

        let plan = match self.plan(&files, &request.request).await {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!("planning failed: {:#}", e);
                emit(tx, StreamMessage::error(None, format!("{:#}", e)));
                return Err(e);
            }
        };
        emit(tx, StreamMessage::Plan(plan.clone()));
        tracing::info!("plan has {} edit instructions", plan.edit_instructions.len());

        let tasks = plan
            .edit_instructions
            .iter()
            .enumerate()
            .map(|(index, instruction)| self.run_instruction(index, instruction, &files, tx));
        let results = join_all(tasks).await;

        tracing::info!(
            "session finished: {} changes, {} failed instructions",
            results.iter().map(|r| r.reconciliation.changes.len()).sum::<usize>(),
            results.iter().filter(|r| r.error.is_some()).count()
        );
        Ok(results)
    }

    async fn plan(&self, files: &FileSet, request: &str) -> Result<Plan> {
        let response = self
            .client
            .complete(PLAN_SYSTEM_PROMPT, &plan_user_prompt(files, request))
            .await?;
        parse_plan(&response)
    }

    async fn run_instruction(
        &self,
        index: usize,
        instruction: &str,
        files: &FileSet,
        tx: &UnboundedSender<StreamMessage>,
    ) -> InstructionResult {
        let system = edit_system_prompt(self.reconciler.strategy(), &self.cwd);
        let user = edit_user_prompt(files, instruction);
        let progress_tx = tx.clone();
        let on_chunk = Box::new(move |text: String| {
            emit(&progress_tx, StreamMessage::Progress { index, text });
        });

        let mut result = InstructionResult {
            index,
            instruction: instruction.to_string(),
            reconciliation: Reconciliation::default(),
            error: None,
        };

        let response = match self.client.stream_completion(&system, &user, on_chunk).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("edit instruction {} failed: {:#}", index, e);
                let message = format!("{:#}", e);
                emit(tx, StreamMessage::error(Some(index), message.clone()));
                result.error = Some(message);
                return result;
            }
        };

        let reconciliation = self.reconciler.reconcile(files, &response);
        emit(
            tx,
            StreamMessage::Change {
                index,
                changes: reconciliation.changes.clone(),
            },
        );
        for failure in &reconciliation.failures {
            emit(tx, StreamMessage::reconcile_error(index, failure.clone()));
        }

        result.reconciliation = reconciliation;
        result
    }
}
