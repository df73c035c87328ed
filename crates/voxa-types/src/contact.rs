//! Address book entries consulted by the telephone skill.

use serde::{Deserialize, Serialize};

/// A named contact with zero or more phone numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub numbers: Vec<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, numbers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            numbers,
        }
    }
}
