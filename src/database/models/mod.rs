pub mod employment;
pub mod profile;
pub mod project;
pub mod prompt;
pub mod skill;

pub use employment::{Employment, EmploymentDraft, EmploymentRuleViolation};
pub use profile::{NewProfile, Profile, ProfileChanges, ProfileSummary};
pub use project::{Project, ProjectDraft, ProjectType};
pub use prompt::SystemPrompt;
pub use skill::{Skill, SkillCategory, SkillDraft};
