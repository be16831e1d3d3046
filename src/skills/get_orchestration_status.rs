//! `get_orchestration_status` — synchronous query, unprotected: spec §4.8.

use std::sync::Arc;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::skill::{failure, require_str, Skill};
use crate::task_store::TaskStore;

pub struct GetOrchestrationStatusSkill {
    task_store: Arc<dyn TaskStore>,
}

impl GetOrchestrationStatusSkill {
    pub fn new(task_store: Arc<dyn TaskStore>) -> Self {
        Self { task_store }
    }
}

#[async_trait]
impl Skill for GetOrchestrationStatusSkill {
    fn skill_id(&self) -> &str {
        "get_orchestration_status"
    }

    fn name(&self) -> &str {
        "Get Orchestration Status"
    }

    fn description(&self) -> &str {
        "Retrieves the current status and, once terminal, result of a previously enqueued task."
    }

    fn tags(&self) -> Vec<String> {
        vec!["query".to_string()]
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "required": ["task_id"],
            "properties": {
                "task_id": {"type": "string"}
            }
        })
    }

    async fn execute(&self, input: Value) -> Value {
        let raw_task_id = match require_str(&input, "task_id") {
            Ok(id) => id,
            Err(e) => return e,
        };

        let task_id = match Uuid::from_str(raw_task_id) {
            Ok(id) => id,
            Err(_) => return failure("not found"),
        };

        match self.task_store.get(task_id).await {
            Ok(Some(task)) => serde_json::json!({
                "success": true,
                "task_id": task.task_id,
                "task_type": task.task_type,
                "repository": task.repository,
                "status": task.status,
                "result": task.result,
                "error": task.error,
                "worker_id": task.worker_id,
                "created_at": task.created_at,
                "started_at": task.started_at,
                "completed_at": task.completed_at,
                "updated_at": task.updated_at,
            }),
            Ok(None) => failure("not found"),
            Err(e) => {
                warn!(%task_id, error = %e, "failed to load task");
                failure(format!("failed to load task: {e}"))
            }
        }
    }
}
