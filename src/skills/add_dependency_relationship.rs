//! `add_dependency_relationship` — synchronous management, protected: spec §4.8.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::deps::{DependencyGraph, DependencyRelationship};
use crate::skill::{failure, require_str, Skill};

pub struct AddDependencyRelationshipSkill {
    graph: Arc<dyn DependencyGraph>,
}

impl AddDependencyRelationshipSkill {
    pub fn new(graph: Arc<dyn DependencyGraph>) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl Skill for AddDependencyRelationshipSkill {
    fn skill_id(&self) -> &str {
        "add_dependency_relationship"
    }

    fn name(&self) -> &str {
        "Add Dependency Relationship"
    }

    fn description(&self) -> &str {
        "Inserts or updates a dependency relationship between two repositories."
    }

    fn tags(&self) -> Vec<String> {
        vec!["management".to_string()]
    }

    fn authentication_required(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "required": ["source", "target", "relationship_type"],
            "properties": {
                "source": {"type": "string"},
                "target": {"type": "string"},
                "relationship_type": {"type": "string"},
                "strength": {"type": "number"},
                "metadata": {"type": "object"}
            }
        })
    }

    async fn execute(&self, input: Value) -> Value {
        let source = match require_str(&input, "source") {
            Ok(s) => s.to_string(),
            Err(e) => return e,
        };
        let target = match require_str(&input, "target") {
            Ok(t) => t.to_string(),
            Err(e) => return e,
        };
        let relationship_type = match require_str(&input, "relationship_type") {
            Ok(t) => t.to_string(),
            Err(e) => return e,
        };
        let strength = input.get("strength").and_then(Value::as_f64).unwrap_or(1.0);
        let metadata = input.get("metadata").cloned().unwrap_or(Value::Null);

        let relationship = DependencyRelationship {
            source: source.clone(),
            target: target.clone(),
            relationship_type: relationship_type.clone(),
            strength,
            metadata,
        };

        match self.graph.add_relationship(relationship).await {
            Ok(()) => serde_json::json!({
                "success": true,
                "source": source,
                "target": target,
                "relationship_type": relationship_type,
                "strength": strength,
            }),
            Err(e) => {
                warn!(source, target, error = %e, "failed to add dependency relationship");
                failure(format!("failed to add dependency relationship: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::test_support::FakeDependencyGraph;

    #[tokio::test]
    async fn test_adds_relationship_with_default_strength() {
        let graph = Arc::new(FakeDependencyGraph::default());
        let skill = AddDependencyRelationshipSkill::new(graph.clone());
        let result = skill
            .execute(serde_json::json!({
                "source": "acme/api",
                "target": "acme/web",
                "relationship_type": "consumes",
            }))
            .await;
        assert_eq!(result["success"], true);
        assert_eq!(result["strength"], 1.0);
        assert_eq!(graph.added.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_relationship_type_rejected() {
        let skill = AddDependencyRelationshipSkill::new(Arc::new(FakeDependencyGraph::default()));
        let result = skill
            .execute(serde_json::json!({"source": "a", "target": "b"}))
            .await;
        assert_eq!(result["success"], false);
    }
}
