//! Lightweight database liveness check backing `GET /health`.

use std::time::Duration;

use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of a single `SELECT 1` probe, timeout-guarded so a wedged
/// database degrades the health response instead of hanging it.
#[derive(Debug, Clone, Serialize)]
pub struct DbHealth {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DbHealth {
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            error: Some(error.into()),
        }
    }

    /// Run `select 1` against `pool`, bounded by `DEFAULT_PROBE_TIMEOUT`.
    pub async fn probe(pool: &PgPool) -> Self {
        let query = sqlx::query("select 1").execute(pool);
        match tokio::time::timeout(DEFAULT_PROBE_TIMEOUT, query).await {
            Ok(Ok(_)) => DbHealth::healthy(),
            Ok(Err(e)) => {
                warn!(error = %e, "database health probe failed");
                DbHealth::unhealthy(e.to_string())
            }
            Err(_) => {
                warn!("database health probe timed out");
                DbHealth::unhealthy("probe timed out")
            }
        }
    }
}
