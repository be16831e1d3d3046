//! `get_dependencies` — synchronous query, unprotected: spec §4.8.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::deps::DependencyGraph;
use crate::skill::{failure, require_str, Skill};

pub struct GetDependenciesSkill {
    graph: Arc<dyn DependencyGraph>,
}

impl GetDependenciesSkill {
    pub fn new(graph: Arc<dyn DependencyGraph>) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl Skill for GetDependenciesSkill {
    fn skill_id(&self) -> &str {
        "get_dependencies"
    }

    fn name(&self) -> &str {
        "Get Dependencies"
    }

    fn description(&self) -> &str {
        "Returns the consumers, providers, and template relationships for a repository."
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
        let providers = match self.graph.providers(repository).await {
            Ok(p) => p,
            Err(e) => {
                warn!(repository, error = %e, "failed to resolve providers");
                return failure(format!("failed to resolve providers: {e}"));
            }
        };
        let template_relationships = match self.graph.template_relationships(repository).await {
            Ok(t) => t,
            Err(e) => {
                warn!(repository, error = %e, "failed to resolve template relationships");
                return failure(format!("failed to resolve template relationships: {e}"));
            }
        };

        let total_dependencies = consumers.len() + providers.len();
        serde_json::json!({
            "success": true,
            "consumers": consumers,
            "providers": providers,
            "template_relationships": template_relationships,
            "total_dependencies": total_dependencies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::test_support::FakeDependencyGraph;
    use crate::deps::DependencyRelationship;

    #[tokio::test]
    async fn test_aggregates_consumers_providers_and_templates() {
        let mut graph = FakeDependencyGraph::default();
        graph
            .consumers
            .insert("acme/api".to_string(), vec!["acme/web".to_string()]);
        graph
            .providers
            .insert("acme/api".to_string(), vec!["acme/core".to_string()]);
        graph.template_relationships.insert(
            "acme/api".to_string(),
            vec![DependencyRelationship {
                source: "acme/api-template".to_string(),
                target: "acme/api".to_string(),
                relationship_type: "template".to_string(),
                strength: 1.0,
                metadata: serde_json::Value::Null,
            }],
        );

        let skill = GetDependenciesSkill::new(Arc::new(graph));
        let result = skill.execute(serde_json::json!({"repository": "acme/api"})).await;
        assert_eq!(result["success"], true);
        assert_eq!(result["total_dependencies"], 2);
        assert_eq!(result["consumers"], serde_json::json!(["acme/web"]));
        assert_eq!(result["providers"], serde_json::json!(["acme/core"]));
        assert_eq!(result["template_relationships"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_repository_returns_zero_counts() {
        let skill = GetDependenciesSkill::new(Arc::new(FakeDependencyGraph::default()));
        let result = skill.execute(serde_json::json!({"repository": "acme/unknown"})).await;
        assert_eq!(result["total_dependencies"], 0);
    }
}
