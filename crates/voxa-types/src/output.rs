//! Presentation payloads attached to skill outputs.

use serde::{Deserialize, Serialize};

use crate::contact::Contact;
use crate::timer::TimerSnapshot;
use crate::weather::WeatherReport;

/// How an utterance was resolved, independent of what is spoken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStatus {
    #[default]
    Handled,
    /// No skill produced a candidate for the utterance.
    NoMatch,
    /// A name lookup (timer, contact) found nothing close enough.
    NotFound,
    /// An external service failed; the output carries the attempted query.
    UpstreamFailure,
    /// The skill itself failed while producing its output.
    Failed,
}

/// Structured data for a UI to render alongside the spoken reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rendering {
    FaceTracking {
        active: bool,
    },
    ContactChoices {
        contacts: Vec<Contact>,
    },
    ConfirmCall {
        name: String,
        number: String,
    },
    CallPlaced {
        name: String,
        number: String,
    },
    TimerSet {
        timer: TimerSnapshot,
    },
    TimerStatus {
        timer: TimerSnapshot,
    },
    TimersCancelled {
        timers: Vec<TimerSnapshot>,
    },
    Calculation {
        interpretation: String,
        result: Option<String>,
    },
    Clock {
        formatted: String,
    },
    Weather {
        report: WeatherReport,
    },
    /// Carries the query that could not be resolved.
    Failure {
        query: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering_serializes_with_kind_tag() {
        let json = serde_json::to_value(Rendering::FaceTracking { active: true }).unwrap();
        assert_eq!(json["kind"], "face_tracking");
        assert_eq!(json["active"], true);
    }

    #[test]
    fn test_output_status_default_is_handled() {
        assert_eq!(OutputStatus::default(), OutputStatus::Handled);
        let json = serde_json::to_string(&OutputStatus::UpstreamFailure).unwrap();
        assert_eq!(json, "\"upstream_failure\"");
    }
}
