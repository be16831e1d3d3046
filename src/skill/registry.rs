//! # Skill Registry (C2)
//!
//! Holds skills keyed by `skill_id` and tracks which ids are protected. The
//! registry is populated once at startup (see `bootstrap`) and is read-only
//! thereafter — no locking is needed for lookups.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use super::Skill;

/// In-memory registry of skills, keyed by `skill_id`.
#[derive(Default)]
pub struct SkillRegistry {
    skills: HashMap<String, Arc<dyn Skill>>,
    explicitly_protected: HashSet<String>,
}

impl std::fmt::Debug for SkillRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillRegistry")
            .field("skill_ids", &self.skill_ids())
            .finish()
    }
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skill. A skill already declaring
    /// `authentication_required() == true` is protected regardless of
    /// whether `register_protected` is also called for it.
    pub fn register(&mut self, skill: Arc<dyn Skill>) {
        self.skills.insert(skill.skill_id().to_string(), skill);
    }

    /// Mark an id as protected independently of the skill's own
    /// `authentication_required` flag.
    pub fn register_protected(&mut self, skill_id: impl Into<String>) {
        self.explicitly_protected.insert(skill_id.into());
    }

    /// Look up a skill by id.
    pub fn get(&self, skill_id: &str) -> Option<Arc<dyn Skill>> {
        self.skills.get(skill_id).cloned()
    }

    /// A skill is protected iff registered as protected OR it self-declares
    /// `authentication_required = true`.
    pub fn is_protected(&self, skill_id: &str) -> bool {
        self.explicitly_protected.contains(skill_id)
            || self
                .skills
                .get(skill_id)
                .map(|s| s.authentication_required())
                .unwrap_or(false)
    }

    /// All registered skill ids, sorted for deterministic enumeration.
    pub fn skill_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.skills.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Render the full skill list for the agent card, sorted by id.
    pub fn render_for_agent_card(&self) -> Vec<Value> {
        self.skill_ids()
            .into_iter()
            .filter_map(|id| self.skills.get(&id))
            .map(|skill| serde_json::to_value(skill.metadata()).unwrap_or(Value::Null))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}
