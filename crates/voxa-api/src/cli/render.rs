//! Terminal and JSON views of engine responses.

use std::io::Write;

use console::style;
use serde::Serialize;

use voxa_core::eval::EngineResponse;
use voxa_types::output::{OutputStatus, Rendering};
use voxa_types::timer::TimerSnapshot;

/// Serializable summary of one processed utterance.
#[derive(Debug, Serialize)]
pub struct ResponseView<'a> {
    pub utterance: &'a str,
    pub skill_id: Option<&'a str>,
    pub score: Option<f32>,
    pub status: OutputStatus,
    pub speech: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendering: Option<&'a Rendering>,
    pub awaiting_answer: bool,
}

impl<'a> From<&'a EngineResponse> for ResponseView<'a> {
    fn from(response: &'a EngineResponse) -> Self {
        Self {
            utterance: &response.utterance,
            skill_id: response.skill_id.as_deref(),
            score: response.score.and_then(|s| s.value()),
            status: response.output.status,
            speech: &response.output.speech,
            rendering: response.output.rendering.as_ref(),
            awaiting_answer: response.reopen_microphone,
        }
    }
}

/// `mm:ss`, or `h:mm:ss` from one hour up. Negative values clamp to zero.
pub fn format_remaining(ms: i64) -> String {
    let total = (ms.max(0) + 999) / 1000;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

fn timer_label(timer: &TimerSnapshot) -> String {
    let name = timer.name.as_deref().unwrap_or("timer");
    if timer.is_expired() {
        format!("{name} (ringing)")
    } else {
        format!("{name} {}", format_remaining(timer.remaining_ms))
    }
}

/// Plain-text lines describing a rendering, without styling.
pub fn describe(rendering: &Rendering) -> Vec<String> {
    match rendering {
        Rendering::FaceTracking { active } => {
            vec![format!("face tracking {}", if *active { "on" } else { "off" })]
        }
        Rendering::ContactChoices { contacts } => contacts
            .iter()
            .enumerate()
            .map(|(i, contact)| match contact.numbers.as_slice() {
                [] => format!("{}. {}", i + 1, contact.name),
                numbers => format!("{}. {} ({})", i + 1, contact.name, numbers.join(", ")),
            })
            .collect(),
        Rendering::ConfirmCall { name, number } => vec![format!("call {name} at {number}?")],
        Rendering::CallPlaced { name, number } => vec![format!("calling {name} at {number}")],
        Rendering::TimerSet { timer } | Rendering::TimerStatus { timer } => vec![timer_label(timer)],
        Rendering::TimersCancelled { timers } => timers
            .iter()
            .map(|timer| format!("cancelled {}", timer.name.as_deref().unwrap_or("timer")))
            .collect(),
        Rendering::Calculation {
            interpretation,
            result,
        } => vec![match result {
            Some(result) => format!("{interpretation} = {result}"),
            None => format!("{interpretation} = ?"),
        }],
        Rendering::Clock { formatted } => vec![formatted.clone()],
        Rendering::Weather { report } => vec![format!(
            "{}: {}, {:.0}°C ({:.0}..{:.0}), wind {:.0} m/s",
            report.city,
            report.description,
            report.temperature,
            report.temperature_min,
            report.temperature_max,
            report.wind_speed
        )],
        Rendering::Failure { query } => vec![format!("nothing found for '{query}'")],
    }
}

/// Print the rendering of a response (the speech itself goes through the
/// speech device).
pub fn print_response(out: &mut impl Write, response: &EngineResponse) -> std::io::Result<()> {
    if let Some(rendering) = &response.output.rendering {
        let failed = matches!(rendering, Rendering::Failure { .. });
        for line in describe(rendering) {
            if failed {
                writeln!(out, "  {} {}", style("!").yellow().bold(), style(line).dim())?;
            } else {
                writeln!(out, "  {} {}", style("|").dim(), line)?;
            }
        }
    }
    if response.reopen_microphone {
        writeln!(out, "  {}", style("(waiting for an answer)").dim())?;
    }
    Ok(())
}
