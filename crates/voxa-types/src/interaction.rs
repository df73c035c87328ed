//! Append-only record of past interactions, for display and history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One question/answer exchange inside an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<String>,
    pub at: DateTime<Utc>,
}

/// An interaction starts at an idle utterance and collects every follow-up
/// exchange routed to its continuation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub exchanges: Vec<Exchange>,
}

/// Ordered list of interactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionLog {
    interactions: Vec<Interaction>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new, empty interaction.
    pub fn start_interaction(&mut self) {
        self.interactions.push(Interaction::default());
    }

    /// Append an exchange to the current interaction, opening one if the
    /// log is empty.
    pub fn push_exchange(&mut self, exchange: Exchange) {
        if self.interactions.is_empty() {
            self.start_interaction();
        }
        if let Some(current) = self.interactions.last_mut() {
            current.exchanges.push(exchange);
        }
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn last(&self) -> Option<&Interaction> {
        self.interactions.last()
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn clear(&mut self) {
        self.interactions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(question: &str) -> Exchange {
        Exchange {
            question: question.to_string(),
            answer: "ok".to_string(),
            skill_id: None,
            at: Utc::now(),
        }
    }

    #[test]
    fn test_push_without_start_opens_interaction() {
        let mut log = InteractionLog::new();
        log.push_exchange(exchange("first"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().exchanges.len(), 1);
    }

    #[test]
    fn test_exchanges_append_to_current_interaction() {
        let mut log = InteractionLog::new();
        log.start_interaction();
        log.push_exchange(exchange("позвони маме"));
        log.push_exchange(exchange("да"));
        log.start_interaction();
        log.push_exchange(exchange("который час"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.interactions()[0].exchanges.len(), 2);
        assert_eq!(log.interactions()[1].exchanges[0].question, "который час");
    }
}
