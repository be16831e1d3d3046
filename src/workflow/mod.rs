//! # Orchestration Workflow (C7)
//!
//! The impact-analysis workflow: resolve consumers, enrich via the
//! knowledge-base peer, fan out triage, create issues, report back, and
//! finalize the owning task. See `impact_analysis::ImpactAnalysisWorkflow`.

pub mod impact_analysis;

pub use impact_analysis::ImpactAnalysisWorkflow;
