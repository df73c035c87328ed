//! Skill abstractions: the recognizer-backed skill trait, its object-safe
//! twin, skill factories, outputs, and the registry of enabled skills.

pub mod context;
pub mod info;
pub mod output;
pub mod registry;
pub mod traits;

pub use context::SkillContext;
pub use info::SkillInfo;
pub use output::{InteractionPlan, SkillOutput};
pub use registry::{BuiltSkill, SkillRegistry};
pub use traits::{AutoRunnable, Candidate, FuzzySkill, Skill};
