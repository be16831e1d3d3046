//! Process entry point: loads configuration, wires collaborators, starts
//! the worker pool, and serves the HTTP surface until shutdown.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use impact_agent::config::AgentConfig;
use impact_agent::deps::{
    FanOutImpactEstimator, InMemoryDependencyGraph, UnconfiguredIssueBackend, UnconfiguredTriageAnalyzer,
};
use impact_agent::logging::init_tracing;
use impact_agent::peer::PeerRegistry;
use impact_agent::server::{build_router, AppState};
use impact_agent::skill::SkillRegistry;
use impact_agent::skills::{
    AddDependencyRelationshipSkill, GetDependenciesSkill, GetImpactAnalysisSkill,
    GetOrchestrationStatusSkill, ReceiveChangeNotificationSkill, TriggerConsumerTriageSkill,
    TriggerTemplateTriageSkill,
};
use impact_agent::task_store::{PgTaskStore, TaskStore};
use impact_agent::worker::{TaskHandler, WorkerPool};
use impact_agent::workflow::ImpactAnalysisWorkflow;

/// Grace period for in-flight requests/tasks to settle after a shutdown
/// signal, before the process exits unconditionally.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AgentConfig::load()?;
    tracing::info!(port = config.port, workers = config.workers, "starting impact-agent");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database.connection_url())
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let dependency_graph = Arc::new(InMemoryDependencyGraph::new());
    let consumer_triage = Arc::new(UnconfiguredTriageAnalyzer);
    let template_triage = Arc::new(UnconfiguredTriageAnalyzer);
    let issue_backend = Arc::new(UnconfiguredIssueBackend);
    let impact_estimator = Arc::new(FanOutImpactEstimator);
    let task_store: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool.clone()));
    let peers = Arc::new(PeerRegistry::from_config(&config));

    let mut registry = SkillRegistry::new();
    registry.register(Arc::new(ReceiveChangeNotificationSkill::new(task_store.clone())));
    registry.register(Arc::new(GetImpactAnalysisSkill::new(
        dependency_graph.clone(),
        impact_estimator,
    )));
    registry.register(Arc::new(GetDependenciesSkill::new(dependency_graph.clone())));
    registry.register(Arc::new(GetOrchestrationStatusSkill::new(task_store.clone())));
    registry.register(Arc::new(TriggerConsumerTriageSkill::new(consumer_triage.clone())));
    registry.register(Arc::new(TriggerTemplateTriageSkill::new(template_triage)));
    registry.register(Arc::new(AddDependencyRelationshipSkill::new(dependency_graph.clone())));

    let workflow = Arc::new(ImpactAnalysisWorkflow::new(
        dependency_graph,
        consumer_triage,
        issue_backend,
        peers.clone(),
        task_store.clone(),
    ));
    let mut handlers: HashMap<String, Arc<dyn TaskHandler>> = HashMap::new();
    handlers.insert("impact_analysis".to_string(), workflow);

    let worker_pool = Arc::new(WorkerPool::new(
        task_store.clone(),
        handlers,
        Duration::from_secs(config.poll_interval_seconds),
    ));
    let (worker_handles, worker_shutdown) = worker_pool.spawn(config.workers);

    let state = AppState {
        registry: Arc::new(registry),
        config: Arc::new(config.clone()),
        task_store,
        peers,
        db_pool: pool,
    };
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped; signalling worker pool to shut down");
    let _ = worker_shutdown.send(true);
    let deadline = tokio::time::sleep(SHUTDOWN_GRACE_PERIOD);
    tokio::pin!(deadline);
    for handle in worker_handles {
        tokio::select! {
            _ = handle => {}
            _ = &mut deadline => {
                tracing::warn!("worker pool did not shut down within the grace period");
                break;
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl_c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
