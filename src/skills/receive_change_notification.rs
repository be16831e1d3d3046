//! `receive_change_notification` — event skill, protected: spec §4.8, §6.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::warn;

use crate::skill::{failure, require_str, Skill};
use crate::task_store::TaskStore;

const TASK_TYPE: &str = "impact_analysis";

/// Validates an incoming change notification and enqueues an
/// `impact_analysis` task; the real outcome is retrieved later via
/// `get_orchestration_status`.
pub struct ReceiveChangeNotificationSkill {
    task_store: Arc<dyn TaskStore>,
}

impl ReceiveChangeNotificationSkill {
    pub fn new(task_store: Arc<dyn TaskStore>) -> Self {
        Self { task_store }
    }
}

#[async_trait]
impl Skill for ReceiveChangeNotificationSkill {
    fn skill_id(&self) -> &str {
        "receive_change_notification"
    }

    fn name(&self) -> &str {
        "Receive Change Notification"
    }

    fn description(&self) -> &str {
        "Accepts a change notification for a repository and enqueues impact analysis."
    }

    fn tags(&self) -> Vec<String> {
        vec!["event".to_string(), "ingestion".to_string()]
    }

    fn authentication_required(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "required": ["repository", "commit_sha", "timestamp"],
            "properties": {
                "repository": {"type": "string", "description": "owner/repo"},
                "commit_sha": {"type": "string"},
                "timestamp": {"type": "string", "format": "date-time"},
                "patterns": {"type": "array", "items": {"type": "string"}},
                "dependencies": {"type": "array", "items": {"type": "string"}},
                "change_type": {
                    "type": "string",
                    "enum": ["pattern_change", "dependency_update", "breaking_change"]
                }
            }
        })
    }

    fn examples(&self) -> Vec<Value> {
        vec![serde_json::json!({
            "repository": "acme/api",
            "commit_sha": "abc1234",
            "timestamp": "2025-01-15T10:00:00Z"
        })]
    }

    async fn execute(&self, input: Value) -> Value {
        let mut missing = Vec::new();
        for field in ["repository", "commit_sha", "timestamp"] {
            if input.get(field).and_then(Value::as_str).unwrap_or_default().is_empty() {
                missing.push(field);
            }
        }
        if !missing.is_empty() {
            return failure(format!("Missing required fields: {}", missing.join(", ")));
        }

        let repository = match require_str(&input, "repository") {
            Ok(r) => r.to_string(),
            Err(e) => return e,
        };

        match self.task_store.create(TASK_TYPE, &repository, input).await {
            Ok(task_id) => {
                let estimated_completion = Utc::now() + Duration::seconds(30);
                serde_json::json!({
                    "success": true,
                    "task_id": task_id,
                    "status": "queued",
                    "message": format!("Change notification for {repository} accepted for impact analysis"),
                    "estimated_completion": estimated_completion.to_rfc3339(),
                })
            }
            Err(e) => {
                warn!(repository, error = %e, "failed to enqueue impact_analysis task");
                failure(format!("failed to enqueue task: {e}"))
            }
        }
    }
}
