//! `GET /health` response assembly: spec §4.7.

use serde_json::Value;
use sqlx::PgPool;

use crate::health::DbHealth;
use crate::peer::PeerRegistry;
use crate::skill::SkillRegistry;
use crate::task_store::TaskStore;

/// Build the `/health` response document. `status` is `"healthy"` iff the
/// database probe succeeds; peer and skill-count fields are informational
/// and never affect `status`.
pub async fn build_health_response(
    registry: &SkillRegistry,
    task_store: &dyn TaskStore,
    peers: &PeerRegistry,
    db_pool: &PgPool,
) -> Value {
    let db = DbHealth::probe(db_pool).await;
    let task_queue = task_store
        .stats()
        .await
        .unwrap_or_default();
    let external_agents = peers.health_check_all().await;

    serde_json::json!({
        "status": if db.healthy { "healthy" } else { "unhealthy" },
        "skills_registered": registry.len(),
        "skills": registry.skill_ids(),
        "database": db,
        "task_queue": task_queue,
        "external_agents": external_agents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::PeerClient;
    use crate::skill::Skill;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopSkill;

    #[async_trait]
    impl Skill for NoopSkill {
        fn skill_id(&self) -> &str {
            "noop"
        }
        fn name(&self) -> &str {
            "Noop"
        }
        fn description(&self) -> &str {
            "does nothing"
        }
        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object"})
        }
        async fn execute(&self, _input: Value) -> Value {
            serde_json::json!({"success": true})
        }
    }

    #[tokio::test]
    async fn test_health_reports_skill_count_and_unreachable_peers() {
        let mut registry = SkillRegistry::new();
        registry.register(Arc::new(NoopSkill));

        let mut peers = PeerRegistry::new();
        peers.register("knowledge-base", PeerClient::new("http://127.0.0.1:0", None));

        let task_store = crate::task_store::test_support::InMemoryTaskStore::default();

        // No live database is reachable in this unit test; the probe
        // itself is exercised against the DB-backed test pool used by the
        // rest of `health::db_status`. Here we only assert the shape
        // around it, using a lazily-created pool that never connects
        // until a query runs.
        let pool = PgPool::connect_lazy("postgres://localhost/does-not-matter").unwrap();

        let health = build_health_response(&registry, &task_store, &peers, &pool).await;
        assert_eq!(health["skills_registered"], 1);
        assert_eq!(health["skills"], serde_json::json!(["noop"]));
        assert_eq!(health["external_agents"]["knowledge-base"], false);
        assert_eq!(health["status"], "unhealthy");
    }
}
