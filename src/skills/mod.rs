//! # Skill Implementations (C9)
//!
//! The seven skills making up the agent's public surface: see spec §4.8.
//! Each module is one skill, holding exactly the collaborators it needs.

pub mod add_dependency_relationship;
pub mod get_dependencies;
pub mod get_impact_analysis;
pub mod get_orchestration_status;
pub mod receive_change_notification;
pub mod trigger_consumer_triage;
pub mod trigger_template_triage;

pub use add_dependency_relationship::AddDependencyRelationshipSkill;
pub use get_dependencies::GetDependenciesSkill;
pub use get_impact_analysis::GetImpactAnalysisSkill;
pub use get_orchestration_status::GetOrchestrationStatusSkill;
pub use receive_change_notification::ReceiveChangeNotificationSkill;
pub use trigger_consumer_triage::TriggerConsumerTriageSkill;
pub use trigger_template_triage::TriggerTemplateTriageSkill;
