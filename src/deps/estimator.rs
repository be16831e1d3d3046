//! The impact estimator: a synchronous, no-peer-calls function from
//! `(repository, consumers)` to a severity estimate, backing
//! `get_impact_analysis`. Deliberately synchronous — unlike
//! `TriageAnalyzer`, it never crosses a process boundary.

use serde::{Deserialize, Serialize};

/// The `get_impact_analysis` response payload, minus the `success` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactEstimate {
    pub affected_repos: Vec<String>,
    pub impact_severity: String,
    pub estimated_issues: usize,
    pub recommendations: Vec<String>,
}

/// An opaque, synchronous estimator: given a repository and its resolved
/// consumers, produce a quick severity estimate without contacting any
/// peer or triage analyzer.
pub trait ImpactEstimator: Send + Sync {
    fn estimate(&self, repository: &str, consumers: &[String]) -> ImpactEstimate;
}

/// A conservative default: severity scales with fan-out, every consumer
/// is assumed affected, and `estimated_issues` mirrors the consumer
/// count. Exists so the agent has a usable estimator out of the box;
/// operators may supply a smarter one.
#[derive(Debug, Clone, Default)]
pub struct FanOutImpactEstimator;

impl ImpactEstimator for FanOutImpactEstimator {
    fn estimate(&self, _repository: &str, consumers: &[String]) -> ImpactEstimate {
        let severity = match consumers.len() {
            0 => "none",
            1..=2 => "low",
            3..=9 => "medium",
            _ => "high",
        };

        let recommendations = if consumers.is_empty() {
            vec!["No known consumers; proceed with standard review.".to_string()]
        } else {
            vec![format!(
                "Notify {} downstream consumer(s) before merging.",
                consumers.len()
            )]
        };

        ImpactEstimate {
            affected_repos: consumers.to_vec(),
            impact_severity: severity.to_string(),
            estimated_issues: consumers.len(),
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_consumers_is_none_severity() {
        let estimate = FanOutImpactEstimator.estimate("acme/lib", &[]);
        assert_eq!(estimate.impact_severity, "none");
        assert_eq!(estimate.estimated_issues, 0);
        assert!(estimate.affected_repos.is_empty());
    }

    #[test]
    fn test_many_consumers_is_high_severity() {
        let consumers: Vec<String> = (0..15).map(|i| format!("acme/c{i}")).collect();
        let estimate = FanOutImpactEstimator.estimate("acme/api", &consumers);
        assert_eq!(estimate.impact_severity, "high");
        assert_eq!(estimate.estimated_issues, 15);
    }

    #[test]
    fn test_few_consumers_is_low_severity() {
        let estimate = FanOutImpactEstimator.estimate("acme/api", &["acme/web".to_string()]);
        assert_eq!(estimate.impact_severity, "low");
    }
}
