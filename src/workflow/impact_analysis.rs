//! The `impact_analysis` task-type handler: spec §4.6.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::deps::{DependencyGraph, IssueBackend, TriageAnalyzer};
use crate::peer::PeerRegistry;
use crate::task_store::{TaskStatus, TaskStore};
use crate::worker::TaskHandler;

const KNOWLEDGE_BASE_PEER: &str = "knowledge-base";

/// The six-step impact-analysis protocol, wired to its collaborators at
/// construction time (spec §9: "wired as explicit dependencies ... avoid
/// hidden module-level mutable state").
#[derive(Clone)]
pub struct ImpactAnalysisWorkflow {
    graph: Arc<dyn DependencyGraph>,
    triage: Arc<dyn TriageAnalyzer>,
    issues: Arc<dyn IssueBackend>,
    peers: Arc<PeerRegistry>,
    task_store: Arc<dyn TaskStore>,
}

impl std::fmt::Debug for ImpactAnalysisWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpactAnalysisWorkflow").finish()
    }
}

impl ImpactAnalysisWorkflow {
    pub fn new(
        graph: Arc<dyn DependencyGraph>,
        triage: Arc<dyn TriageAnalyzer>,
        issues: Arc<dyn IssueBackend>,
        peers: Arc<PeerRegistry>,
        task_store: Arc<dyn TaskStore>,
    ) -> Self {
        Self {
            graph,
            triage,
            issues,
            peers,
            task_store,
        }
    }

    /// Run the workflow for `task_id` against `repository`/`change_data`,
    /// and write the terminal status (`completed` or `failed`) to the task
    /// store before returning. The worker pool never needs to inspect the
    /// return value to know the task is finalized.
    #[instrument(skip(self, change_data), fields(%task_id, %repository))]
    pub async fn run(&self, task_id: Uuid, repository: &str, change_data: Value) {
        match self.run_inner(repository, &change_data).await {
            Ok(result) => {
                if let Err(e) = self
                    .task_store
                    .update(task_id, TaskStatus::Completed, Some(result), None)
                    .await
                {
                    warn!(%task_id, error = %e, "failed to write completed result");
                }
            }
            Err(message) => {
                warn!(%task_id, error = %message, "impact analysis workflow failed");
                if let Err(e) = self
                    .task_store
                    .update(task_id, TaskStatus::Failed, None, Some(message))
                    .await
                {
                    warn!(%task_id, error = %e, "failed to write failed result");
                }
            }
        }
    }

    /// The protocol itself, returning `Err` only for an unrecovered
    /// failure (consumer resolution). Every other sub-step is
    /// best-effort: failures are logged and folded into the result
    /// document rather than aborting.
    async fn run_inner(&self, repository: &str, change_data: &Value) -> Result<Value, String> {
        // Step 1: resolve consumers. The only step whose failure is fatal
        // to the whole workflow. The graph's return order is the contract
        // (see `DependencyGraph::consumers`); dedup without disturbing it,
        // since there's no per-consumer rank to re-sort by.
        let consumers = self
            .graph
            .consumers(repository)
            .await
            .map_err(|e| format!("failed to resolve consumers: {e}"))?;
        let mut seen = std::collections::HashSet::with_capacity(consumers.len());
        let consumers: Vec<String> = consumers.into_iter().filter(|c| seen.insert(c.clone())).collect();

        // Step 2: enrich via the knowledge-base peer, if registered.
        let enrichment = self.enrich(repository).await;

        // Step 3: fan out triage. Independent per consumer; a failing call
        // is logged and omitted rather than aborting the others.
        let mut triage_results = Vec::new();
        let mut triage_failures = 0usize;
        for consumer in &consumers {
            match self
                .triage
                .analyze(repository, consumer, change_data, &enrichment)
                .await
            {
                Ok(record) => triage_results.push(record),
                Err(e) => {
                    triage_failures += 1;
                    warn!(provider = repository, %consumer, error = %e, "triage call failed");
                }
            }
        }

        // Step 4: create one issue per breaking-change triage record,
        // preserving triage order.
        let mut issues_created = Vec::new();
        let mut issue_failures = 0usize;
        for record in triage_results.iter().filter(|r| r.has_breaking_changes) {
            let title = format!("Breaking change impact from {repository}");
            match self
                .issues
                .create_issue(&record.consumer_repo, &title, &record.issue_body)
                .await
            {
                Ok(summary) => issues_created.push(summary),
                Err(e) => {
                    issue_failures += 1;
                    warn!(
                        consumer = %record.consumer_repo,
                        error = %e,
                        "issue creation failed"
                    );
                }
            }
        }

        // Step 5: report back to the knowledge base, only if something
        // actually happened.
        if !issues_created.is_empty() {
            self.report_lesson_learned(repository, &issues_created).await;
        }

        // Step 6: assemble the result document.
        let affected_repos: Vec<&str> = triage_results
            .iter()
            .filter(|r| r.has_breaking_changes)
            .map(|r| r.consumer_repo.as_str())
            .collect();

        Ok(json!({
            "repository": repository,
            "consumers_analyzed": consumers.len(),
            "issues_created": issues_created.len(),
            "triage_results": triage_results,
            "affected_repos": affected_repos,
            "triage_failures": triage_failures,
            "issue_failures": issue_failures,
        }))
    }

    async fn enrich(&self, repository: &str) -> Value {
        let Some(peer) = self.peers.get(KNOWLEDGE_BASE_PEER) else {
            return json!({});
        };

        let response = peer
            .execute_skill("get_deployment_info", json!({ "repository": repository }))
            .await;

        if response.get("success").and_then(Value::as_bool) == Some(false) {
            warn!(
                repository,
                error = ?response.get("error"),
                "knowledge-base enrichment failed; proceeding with empty enrichment"
            );
            return json!({});
        }

        response
    }

    async fn report_lesson_learned(&self, repository: &str, issues: &[crate::deps::IssueSummary]) {
        let Some(peer) = self.peers.get(KNOWLEDGE_BASE_PEER) else {
            return;
        };

        let lesson = json!({
            "repository": repository,
            "summary": format!(
                "{} downstream issue(s) filed after a change in {}",
                issues.len(),
                repository
            ),
            "issues": issues,
        });

        let response = peer.execute_skill("add_lesson_learned", lesson).await;
        if response.get("success").and_then(Value::as_bool) == Some(false) {
            warn!(repository, error = ?response.get("error"), "add_lesson_learned failed");
        }
    }
}

#[async_trait]
impl TaskHandler for ImpactAnalysisWorkflow {
    async fn handle(&self, task_id: Uuid, repository: String, input: Value) {
        self.run(task_id, &repository, input).await;
    }
}
