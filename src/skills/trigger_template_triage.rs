//! `trigger_template_triage` — synchronous action, protected: spec §4.8.
//!
//! Same shape as `trigger_consumer_triage`, for the template →
//! derivative propagation direction; the two skills intentionally share
//! no code beyond the `TriageAnalyzer` contract, since they are wired to
//! distinct analyzer instances at startup.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::deps::TriageAnalyzer;
use crate::skill::{failure, require_str, Skill};

pub struct TriggerTemplateTriageSkill {
    triage: Arc<dyn TriageAnalyzer>,
}

impl TriggerTemplateTriageSkill {
    pub fn new(triage: Arc<dyn TriageAnalyzer>) -> Self {
        Self { triage }
    }
}

#[async_trait]
impl Skill for TriggerTemplateTriageSkill {
    fn skill_id(&self) -> &str {
        "trigger_template_triage"
    }

    fn name(&self) -> &str {
        "Trigger Template Triage"
    }

    fn description(&self) -> &str {
        "Runs template triage directly for an explicit template/derivatives pair."
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
            "required": ["template", "derivatives"],
            "properties": {
                "template": {"type": "string"},
                "derivatives": {"type": "array", "items": {"type": "string"}},
                "change_data": {"type": "object"}
            }
        })
    }

    async fn execute(&self, input: Value) -> Value {
        let template = match require_str(&input, "template") {
            Ok(t) => t.to_string(),
            Err(e) => return e,
        };

        let Some(derivatives) = input.get("derivatives").and_then(Value::as_array) else {
            return failure("Missing required fields: derivatives");
        };
        let derivatives: Vec<String> = derivatives
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        if derivatives.is_empty() {
            return failure("Missing required fields: derivatives");
        }

        let change_data = input.get("change_data").cloned().unwrap_or_else(|| serde_json::json!({}));
        let enrichment = serde_json::json!({});

        let mut triage_results = Vec::new();
        let mut failures = 0usize;
        for derivative in &derivatives {
            match self.triage.analyze(&template, derivative, &change_data, &enrichment).await {
                Ok(record) => triage_results.push(record),
                Err(e) => {
                    failures += 1;
                    warn!(template, %derivative, error = %e, "triggered template triage call failed");
                }
            }
        }

        serde_json::json!({
            "success": true,
            "template": template,
            "triage_results": triage_results,
            "failures": failures,
        })
    }
}
