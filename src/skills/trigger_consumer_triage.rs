//! `trigger_consumer_triage` — synchronous action, protected: spec §4.8.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::deps::TriageAnalyzer;
use crate::skill::{failure, require_str, Skill};

/// Runs the consumer-triage analyzer directly for an explicit
/// `(provider, [consumers])` pair, bypassing the task queue and
/// orchestration workflow entirely.
pub struct TriggerConsumerTriageSkill {
    triage: Arc<dyn TriageAnalyzer>,
}

impl TriggerConsumerTriageSkill {
    pub fn new(triage: Arc<dyn TriageAnalyzer>) -> Self {
        Self { triage }
    }
}

#[async_trait]
impl Skill for TriggerConsumerTriageSkill {
    fn skill_id(&self) -> &str {
        "trigger_consumer_triage"
    }

    fn name(&self) -> &str {
        "Trigger Consumer Triage"
    }

    fn description(&self) -> &str {
        "Runs consumer triage directly for an explicit provider/consumers pair."
    }

    fn tags(&self) -> Vec<String> {
        vec!["action".to_string()]
    }

    fn authentication_required(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "required": ["provider", "consumers"],
            "properties": {
                "provider": {"type": "string"},
                "consumers": {"type": "array", "items": {"type": "string"}},
                "change_data": {"type": "object"}
            }
        })
    }

    async fn execute(&self, input: Value) -> Value {
        let provider = match require_str(&input, "provider") {
            Ok(p) => p.to_string(),
            Err(e) => return e,
        };

        let Some(consumers) = input.get("consumers").and_then(Value::as_array) else {
            return failure("Missing required fields: consumers");
        };
        let consumers: Vec<String> = consumers
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        if consumers.is_empty() {
            return failure("Missing required fields: consumers");
        }

        let change_data = input.get("change_data").cloned().unwrap_or_else(|| serde_json::json!({}));
        let enrichment = serde_json::json!({});

        let mut triage_results = Vec::new();
        let mut failures = 0usize;
        for consumer in &consumers {
            match self.triage.analyze(&provider, consumer, &change_data, &enrichment).await {
                Ok(record) => triage_results.push(record),
                Err(e) => {
                    failures += 1;
                    warn!(provider, %consumer, error = %e, "triggered triage call failed");
                }
            }
        }

        serde_json::json!({
            "success": true,
            "provider": provider,
            "triage_results": triage_results,
            "failures": failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::deps::triage::test_support::ScriptedTriageAnalyzer;
    use crate::deps::triage::TriageRecord;

    #[tokio::test]
    async fn test_aggregates_triage_across_consumers() {
        let mut responses = HashMap::new();
        responses.insert(
            "acme/web".to_string(),
            TriageRecord {
                consumer_repo: "acme/web".to_string(),
                has_breaking_changes: true,
                issue_body: "body".to_string(),
            },
        );
        let skill = TriggerConsumerTriageSkill::new(Arc::new(ScriptedTriageAnalyzer { responses }));

        let result = skill
            .execute(serde_json::json!({
                "provider": "acme/api",
                "consumers": ["acme/web"],
            }))
            .await;
        assert_eq!(result["success"], true);
        assert_eq!(result["failures"], 0);
        assert_eq!(result["triage_results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_consumers_rejected() {
        let skill = TriggerConsumerTriageSkill::new(Arc::new(ScriptedTriageAnalyzer::default()));
        let result = skill.execute(serde_json::json!({"provider": "acme/api"})).await;
        assert_eq!(result["success"], false);
    }

    #[tokio::test]
    async fn test_is_protected() {
        let skill = TriggerConsumerTriageSkill::new(Arc::new(ScriptedTriageAnalyzer::default()));
        assert!(skill.authentication_required());
    }
}
