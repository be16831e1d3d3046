//! Triage analyzers: opaque functions from `(provider, consumer, change,
//! enrichment)` to a triage record. Two instances exist at runtime —
//! consumer triage and template triage — sharing this one contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentResult;

/// The output of analyzing one `(provider, consumer)` pair for breaking
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRecord {
    pub consumer_repo: String,
    pub has_breaking_changes: bool,
    pub issue_body: String,
}

/// An opaque analyzer: `(provider, consumer, change_data, enrichment) ->
/// TriageRecord`. A call that fails is logged by the caller and omitted
/// from the workflow's accumulated results — the trait itself just
/// propagates the error via `AgentResult`.
#[async_trait]
pub trait TriageAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        provider: &str,
        consumer: &str,
        change_data: &Value,
        enrichment: &Value,
    ) -> AgentResult<TriageRecord>;
}

/// A conservative default analyzer that never reports breaking changes.
/// Exists so the agent boots without an operator having already wired a
/// real AI-assisted analyzer — the real one is explicitly out of scope
/// for this crate (spec §1) and is expected to replace this at startup.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredTriageAnalyzer;

#[async_trait]
impl TriageAnalyzer for UnconfiguredTriageAnalyzer {
    async fn analyze(
        &self,
        provider: &str,
        consumer: &str,
        _change_data: &Value,
        _enrichment: &Value,
    ) -> AgentResult<TriageRecord> {
        tracing::warn!(
            provider,
            consumer,
            "no triage analyzer configured; reporting no breaking changes"
        );
        Ok(TriageRecord {
            consumer_repo: consumer.to_string(),
            has_breaking_changes: false,
            issue_body: String::new(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use super::*;
    use crate::error::AgentError;

    /// A scripted `TriageAnalyzer` keyed by consumer repo, for workflow
    /// tests. Consumers absent from `responses` fail the call.
    #[derive(Default)]
    pub struct ScriptedTriageAnalyzer {
        pub responses: HashMap<String, TriageRecord>,
    }

    #[async_trait]
    impl TriageAnalyzer for ScriptedTriageAnalyzer {
        async fn analyze(
            &self,
            _provider: &str,
            consumer: &str,
            _change_data: &Value,
            _enrichment: &Value,
        ) -> AgentResult<TriageRecord> {
            self.responses
                .get(consumer)
                .cloned()
                .ok_or_else(|| AgentError::internal(format!("no triage script for {consumer}")))
        }
    }
}
