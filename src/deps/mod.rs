//! # External Collaborator Interfaces
//!
//! The dependency graph, triage analyzers, and issue-creation backend are
//! referenced only by their contracts (spec §1 "out of scope"). Each is
//! modeled as a narrow `async_trait`, matching the skill contract's own
//! trait-object pattern, so the orchestration workflow (`workflow`) and the
//! skills (`skills`) depend on an interface rather than a concrete provider.

pub mod estimator;
pub mod issues;
pub mod triage;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use estimator::{FanOutImpactEstimator, ImpactEstimate, ImpactEstimator};
pub use issues::{IssueBackend, IssueSummary, UnconfiguredIssueBackend};
pub use triage::{TriageAnalyzer, TriageRecord, UnconfiguredTriageAnalyzer};

use crate::error::AgentResult;

/// A single dependency edge: `source` depends on / derives from `target`.
/// `add_dependency_relationship` writes one of these; `get_dependencies`
/// reads them back as `template_relationships`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRelationship {
    pub source: String,
    pub target: String,
    pub relationship_type: String,
    #[serde(default = "default_strength")]
    pub strength: f64,
    #[serde(default)]
    pub metadata: Value,
}

fn default_strength() -> f64 {
    1.0
}

/// The dependency graph store: who consumes whom, who provides whom, and
/// the template/derivative relationships between repositories.
///
/// Implementations MUST be safe for concurrent use, or document otherwise
/// (spec §5: "must be documented as thread-safe by their providers").
#[async_trait]
pub trait DependencyGraph: Send + Sync {
    /// Repositories that depend on `repository`, in the order the backing
    /// store returns them. The orchestration workflow processes consumers
    /// in this order, breaking ties by repository name ascending.
    async fn consumers(&self, repository: &str) -> AgentResult<Vec<String>>;

    /// Repositories that `repository` depends on.
    async fn providers(&self, repository: &str) -> AgentResult<Vec<String>>;

    /// Template → derivative relationships involving `repository`, as
    /// either endpoint.
    async fn template_relationships(&self, repository: &str) -> AgentResult<Vec<DependencyRelationship>>;

    /// Record (or update) a relationship.
    async fn add_relationship(&self, relationship: DependencyRelationship) -> AgentResult<()>;
}

/// A process-local `DependencyGraph` keyed by repository, indexed from
/// `add_relationship` calls. This is the agent's shippable default —
/// operators running a real dependency index (a graph DB, a service
/// call) supply their own `DependencyGraph` implementation instead; this
/// one never persists across restarts.
#[derive(Debug, Default)]
pub struct InMemoryDependencyGraph {
    relationships: std::sync::RwLock<Vec<DependencyRelationship>>,
}

impl InMemoryDependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DependencyGraph for InMemoryDependencyGraph {
    async fn consumers(&self, repository: &str) -> AgentResult<Vec<String>> {
        let relationships = self.relationships.read().unwrap();
        let mut consumers: Vec<String> = relationships
            .iter()
            .filter(|r| r.target == repository)
            .map(|r| r.source.clone())
            .collect();
        consumers.sort();
        consumers.dedup();
        Ok(consumers)
    }

    async fn providers(&self, repository: &str) -> AgentResult<Vec<String>> {
        let relationships = self.relationships.read().unwrap();
        let mut providers: Vec<String> = relationships
            .iter()
            .filter(|r| r.source == repository)
            .map(|r| r.target.clone())
            .collect();
        providers.sort();
        providers.dedup();
        Ok(providers)
    }

    async fn template_relationships(&self, repository: &str) -> AgentResult<Vec<DependencyRelationship>> {
        let relationships = self.relationships.read().unwrap();
        Ok(relationships
            .iter()
            .filter(|r| r.relationship_type == "template" && (r.source == repository || r.target == repository))
            .cloned()
            .collect())
    }

    async fn add_relationship(&self, relationship: DependencyRelationship) -> AgentResult<()> {
        self.relationships.write().unwrap().push(relationship);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// An in-memory `DependencyGraph` for workflow/skill tests.
    #[derive(Default)]
    pub struct FakeDependencyGraph {
        pub consumers: HashMap<String, Vec<String>>,
        pub providers: HashMap<String, Vec<String>>,
        pub template_relationships: HashMap<String, Vec<DependencyRelationship>>,
        pub added: Mutex<Vec<DependencyRelationship>>,
    }

    #[async_trait]
    impl DependencyGraph for FakeDependencyGraph {
        async fn consumers(&self, repository: &str) -> AgentResult<Vec<String>> {
            Ok(self.consumers.get(repository).cloned().unwrap_or_default())
        }

        async fn providers(&self, repository: &str) -> AgentResult<Vec<String>> {
            Ok(self.providers.get(repository).cloned().unwrap_or_default())
        }

        async fn template_relationships(&self, repository: &str) -> AgentResult<Vec<DependencyRelationship>> {
            Ok(self
                .template_relationships
                .get(repository)
                .cloned()
                .unwrap_or_default())
        }

        async fn add_relationship(&self, relationship: DependencyRelationship) -> AgentResult<()> {
            self.added.lock().unwrap().push(relationship);
            Ok(())
        }
    }
}
