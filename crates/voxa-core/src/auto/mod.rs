//! Background producers for auto-runnable skills.

pub mod scheduler;

pub use scheduler::{AutoOutputs, AutoSkillScheduler};
