//! Issue-creation backend: an opaque interface for filing a follow-up
//! issue in a consumer repository.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentResult;

/// A created issue, as summarized into the workflow's `issues_created`
/// list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSummary {
    pub repository: String,
    pub issue_url: String,
}

/// Files one issue per breaking-change triage record. At-least-once:
/// repeated calls for the same logical issue are tolerated by the backend
/// (spec §7 idempotence note), not deduplicated here.
#[async_trait]
pub trait IssueBackend: Send + Sync {
    async fn create_issue(&self, repository: &str, title: &str, body: &str) -> AgentResult<IssueSummary>;
}

/// A backend that refuses every call, surfacing as a logged, counted
/// issue-creation failure (spec §4.6 step 4). Exists so the agent boots
/// without an operator having wired a real issue tracker integration —
/// that integration is explicitly out of scope for this crate (spec §1).
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredIssueBackend;

#[async_trait]
impl IssueBackend for UnconfiguredIssueBackend {
    async fn create_issue(&self, repository: &str, _title: &str, _body: &str) -> AgentResult<IssueSummary> {
        Err(crate::error::AgentError::internal(format!(
            "no issue backend configured; dropped issue for {repository}"
        )))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeIssueBackend;
    use super::*;

    #[tokio::test]
    async fn test_create_issue_succeeds_by_default() {
        let backend = FakeIssueBackend::default();
        let summary = backend
            .create_issue("acme/web", "Breaking change", "details")
            .await
            .unwrap();
        assert_eq!(summary.repository, "acme/web");
        assert!(summary.issue_url.contains("acme/web"));
    }

    #[tokio::test]
    async fn test_create_issue_fails_for_configured_repository() {
        let mut backend = FakeIssueBackend::default();
        backend.fail_for.insert("acme/web".to_string());
        let result = backend.create_issue("acme/web", "t", "b").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_backend_always_fails() {
        let backend = UnconfiguredIssueBackend;
        let result = backend.create_issue("acme/web", "t", "b").await;
        assert!(result.is_err());
    }
}
