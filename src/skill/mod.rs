//! # Skill Contract (C1)
//!
//! A skill is a single named operation exposed by the agent: a stable id, a
//! little human-facing metadata, a JSON Schema for its input, and one async
//! operation, `execute`. Modeled as a trait object (`Arc<dyn Skill>`) rather
//! than an enum or reflection-based dispatch table, so new skills plug into
//! the registry without touching it.

pub mod registry;

use async_trait::async_trait;
use serde_json::Value;

pub use registry::SkillRegistry;

/// Everything about a skill that is not the execution logic itself —
/// exactly what gets rendered into the agent card.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SkillMetadata {
    pub skill_id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub authentication_required: bool,
    pub input_schema: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
}

/// A single named operation exposed by the agent.
///
/// Implementations MUST NOT let an exception/panic escape `execute`; every
/// path returns a JSON object of the shape `{success: bool, ...}`. On
/// failure that shape is `{success: false, error: string}`.
#[async_trait]
pub trait Skill: Send + Sync {
    /// Stable machine identifier, e.g. `"receive_change_notification"`.
    fn skill_id(&self) -> &str;

    /// Human-facing display name.
    fn name(&self) -> &str;

    /// Human-facing description.
    fn description(&self) -> &str;

    /// Optional tag list for catalog/search purposes.
    fn tags(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether a bearer token is required to invoke this skill.
    fn authentication_required(&self) -> bool {
        false
    }

    /// JSON Schema describing the input object.
    fn input_schema(&self) -> Value;

    /// A small list of example inputs, for documentation and the agent card.
    fn examples(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Execute the skill against the given input, returning a JSON result
    /// of the shape `{success: bool, ...}`.
    async fn execute(&self, input: Value) -> Value;

    /// Render this skill's metadata for the agent card / registry listing.
    fn metadata(&self) -> SkillMetadata {
        SkillMetadata {
            skill_id: self.skill_id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            tags: self.tags(),
            authentication_required: self.authentication_required(),
            input_schema: self.input_schema(),
            examples: self.examples(),
        }
    }
}

/// Build a `{success:false, error}` result. Every skill's failure path
/// should funnel through this so the shape stays consistent.
pub fn failure(error: impl Into<String>) -> Value {
    serde_json::json!({ "success": false, "error": error.into() })
}

/// Extract a required string field from an input object, or a validation
/// failure result explaining what was missing.
pub fn require_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, Value> {
    input
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| failure(format!("Missing required fields: {field}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_shape() {
        let v = failure("boom");
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "boom");
    }

    #[test]
    fn test_require_str_present() {
        let input = serde_json::json!({"repository": "acme/api"});
        assert_eq!(require_str(&input, "repository").unwrap(), "acme/api");
    }

    #[test]
    fn test_require_str_missing() {
        let input = serde_json::json!({});
        let err = require_str(&input, "repository").unwrap_err();
        assert_eq!(err["success"], false);
        assert!(err["error"].as_str().unwrap().contains("repository"));
    }

    #[test]
    fn test_require_str_wrong_type() {
        let input = serde_json::json!({"repository": 42});
        assert!(require_str(&input, "repository").is_err());
    }

    #[test]
    fn test_require_str_empty_string_rejected() {
        let input = serde_json::json!({"repository": ""});
        assert!(require_str(&input, "repository").is_err());
    }
}
