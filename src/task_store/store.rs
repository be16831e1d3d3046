//! `TaskStore` contract and its PostgreSQL-backed implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{Task, TaskStats, TaskStatus};
use crate::error::AgentResult;

/// The durable task queue contract. Every operation is atomic with respect
/// to concurrent callers; see `PgTaskStore::dequeue` for how that is
/// achieved for the one operation where it matters most.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new row in `queued`. `input` is captured immutably.
    async fn create(&self, task_type: &str, repository: &str, input: Value) -> AgentResult<Uuid>;

    /// Atomically select the oldest `queued` row not locked by a peer
    /// dequeue, and transition it to `processing`.
    async fn dequeue(&self, worker_id: &str) -> AgentResult<Option<Task>>;

    /// Transition a task to a new status, writing `result` or `error` as
    /// appropriate. Refuses to alter an already-terminal task: logs a
    /// warning and returns `Ok(())` without writing (permissive per spec
    /// §4.4, since a double-terminal write is an invariant violation the
    /// store chooses to tolerate rather than hard-fail on).
    async fn update(
        &self,
        task_id: Uuid,
        status: TaskStatus,
        result: Option<Value>,
        error: Option<String>,
    ) -> AgentResult<()>;

    async fn get(&self, task_id: Uuid) -> AgentResult<Option<Task>>;

    /// Delete terminal tasks completed before `older_than`. Returns the
    /// number of rows removed.
    async fn cleanup(&self, older_than: DateTime<Utc>) -> AgentResult<u64>;

    async fn stats(&self) -> AgentResult<TaskStats>;
}

/// PostgreSQL-backed task store using row-level locking with skip-locked
/// semantics for safe multi-consumer dequeue.
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    #[instrument(skip(self, input))]
    async fn create(&self, task_type: &str, repository: &str, input: Value) -> AgentResult<Uuid> {
        let task_id = Uuid::now_v7();
        sqlx::query(
            r#"
            insert into tasks (task_id, task_type, repository, status, input, created_at, updated_at)
            values ($1, $2, $3, 'queued', $4, now(), now())
            "#,
        )
        .bind(task_id)
        .bind(task_type)
        .bind(repository)
        .bind(&input)
        .execute(&self.pool)
        .await?;

        Ok(task_id)
    }

    #[instrument(skip(self))]
    async fn dequeue(&self, worker_id: &str) -> AgentResult<Option<Task>> {
        // The CTE selects the oldest queued row, skipping any already
        // locked by a concurrent dequeue (`for update skip locked`), then
        // the outer UPDATE stamps it processing in the same statement —
        // two concurrent dequeues can never observe the same row.
        let task = sqlx::query_as::<_, Task>(
            r#"
            with next_task as (
                select task_id
                from tasks
                where status = 'queued'
                order by created_at asc
                limit 1
                for update skip locked
            )
            update tasks
               set status = 'processing',
                   worker_id = $1,
                   started_at = now(),
                   updated_at = now()
             where task_id in (select task_id from next_task)
            returning task_id, task_type, repository, status, input, result, error,
                      worker_id, created_at, started_at, completed_at, updated_at
            "#,
        )
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    #[instrument(skip(self, result))]
    async fn update(
        &self,
        task_id: Uuid,
        status: TaskStatus,
        result: Option<Value>,
        error: Option<String>,
    ) -> AgentResult<()> {
        let current_status: Option<TaskStatus> =
            sqlx::query_scalar("select status from tasks where task_id = $1")
                .bind(task_id)
                .fetch_optional(&self.pool)
                .await?;

        match current_status {
            None => {
                warn!(%task_id, "update called for unknown task_id");
                return Ok(());
            }
            Some(current) if current.is_terminal() => {
                warn!(
                    %task_id,
                    current = %current,
                    attempted = %status,
                    "refusing to alter a task already in a terminal state"
                );
                return Ok(());
            }
            Some(_) => {}
        }

        if status.is_terminal() {
            sqlx::query(
                r#"
                update tasks
                   set status = $2,
                       result = $3,
                       error = $4,
                       completed_at = now(),
                       updated_at = now()
                 where task_id = $1
                "#,
            )
            .bind(task_id)
            .bind(status)
            .bind(&result)
            .bind(&error)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                r#"
                update tasks
                   set status = $2,
                       updated_at = now()
                 where task_id = $1
                "#,
            )
            .bind(task_id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, task_id: Uuid) -> AgentResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            select task_id, task_type, repository, status, input, result, error,
                   worker_id, created_at, started_at, completed_at, updated_at
            from tasks
            where task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    #[instrument(skip(self))]
    async fn cleanup(&self, older_than: DateTime<Utc>) -> AgentResult<u64> {
        let result = sqlx::query(
            r#"
            delete from tasks
             where status in ('completed', 'failed')
               and completed_at < $1
            "#,
        )
        .bind(older_than)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> AgentResult<TaskStats> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            select
                count(*) filter (where status = 'queued'),
                count(*) filter (where status = 'processing'),
                count(*) filter (where status = 'completed'),
                count(*) filter (where status = 'failed'),
                count(*)
            from tasks
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(TaskStats {
            queued: row.0,
            processing: row.1,
            completed: row.2,
            failed: row.3,
            total: row.4,
        })
    }
}
