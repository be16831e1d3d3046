//! `get_impact_analysis` — synchronous query, unprotected: spec §4.8.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::deps::{DependencyGraph, ImpactEstimator};
use crate::skill::{failure, require_str, Skill};

/// Resolves consumers and runs the (synchronous, no-peer-call) impact
/// estimator, without touching the task queue.
pub struct GetImpactAnalysisSkill {
    graph: Arc<dyn DependencyGraph>,
    estimator: Arc<dyn ImpactEstimator>,
}

impl GetImpactAnalysisSkill {
    pub fn new(graph: Arc<dyn DependencyGraph>, estimator: Arc<dyn ImpactEstimator>) -> Self {
        Self { graph, estimator }
    }
}

#[async_trait]
impl Skill for GetImpactAnalysisSkill {
    fn skill_id(&self) -> &str {
        "get_impact_analysis"
    }

    fn name(&self) -> &str {
        "Get Impact Analysis"
    }

    fn description(&self) -> &str {
        "Estimates the downstream impact of a change to a repository without running a full workflow."
    }

    fn tags(&self) -> Vec<String> {
        vec!["query".to_string()]
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "required": ["repository"],
            "properties": {
                "repository": {"type": "string"}
            }
        })
    }

    fn examples(&self) -> Vec<Value> {
        vec![serde_json::json!({"repository": "acme/api"})]
    }

    async fn execute(&self, input: Value) -> Value {
        let repository = match require_str(&input, "repository") {
            Ok(r) => r,
            Err(e) => return e,
        };

        let consumers = match self.graph.consumers(repository).await {
            Ok(c) => c,
            Err(e) => {
                warn!(repository, error = %e, "failed to resolve consumers");
                return failure(format!("failed to resolve consumers: {e}"));
            }
        };

        let estimate = self.estimator.estimate(repository, &consumers);
        serde_json::json!({
            "success": true,
            "affected_repos": estimate.affected_repos,
            "impact_severity": estimate.impact_severity,
            "estimated_issues": estimate.estimated_issues,
            "recommendations": estimate.recommendations,
        })
    }
}
