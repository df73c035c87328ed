//! Events produced by a speech-to-text source.

use serde::{Deserialize, Serialize};

/// One event from a listening session.
///
/// Only `Final` events are interpreted; partial hypotheses are for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeechEvent {
    Partial { text: String },
    Final { text: String, confidence: Option<f32> },
    Silence,
    Error { message: String },
}

impl SpeechEvent {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self::Final {
            text: text.into(),
            confidence: None,
        }
    }
}
