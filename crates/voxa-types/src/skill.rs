//! Skill identity metadata.

use serde::{Deserialize, Serialize};

use crate::score::Specificity;

/// Static identity of a skill instance: its registry id and ranking tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMeta {
    pub id: String,
    pub specificity: Specificity,
}

impl SkillMeta {
    pub fn new(id: impl Into<String>, specificity: Specificity) -> Self {
        Self {
            id: id.into(),
            specificity,
        }
    }
}
