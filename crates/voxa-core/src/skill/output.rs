//! What a skill hands back to the engine.

use std::fmt;
use std::sync::Arc;

use voxa_types::locale::Locale;
use voxa_types::output::{OutputStatus, Rendering};

use super::traits::Skill;

/// How the interaction proceeds after an output is delivered.
#[derive(Clone, Default)]
pub enum InteractionPlan {
    /// Return to idle; the next utterance is matched against every skill.
    #[default]
    FinishInteraction,
    /// Keep the currently installed follow-up handlers ("ask again").
    /// Outside a follow-up this behaves like `FinishInteraction`.
    ContinueSubInteraction,
    /// Route the next utterance only to `next_skills`, discarding any
    /// follow-up installed before.
    ReplaceSubInteraction {
        reopen_microphone: bool,
        next_skills: Vec<Arc<dyn Skill>>,
    },
}

impl InteractionPlan {
    pub fn replace(reopen_microphone: bool, next_skills: Vec<Arc<dyn Skill>>) -> Self {
        Self::ReplaceSubInteraction {
            reopen_microphone,
            next_skills,
        }
    }
}

impl fmt::Debug for InteractionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FinishInteraction => write!(f, "FinishInteraction"),
            Self::ContinueSubInteraction => write!(f, "ContinueSubInteraction"),
            Self::ReplaceSubInteraction {
                reopen_microphone,
                next_skills,
            } => f
                .debug_struct("ReplaceSubInteraction")
                .field("reopen_microphone", reopen_microphone)
                .field(
                    "next_skills",
                    &next_skills.iter().map(|s| s.id().to_string()).collect::<Vec<_>>(),
                )
                .finish(),
        }
    }
}

/// Spoken reply, optional rendering, outcome class, and follow-up plan.
#[derive(Debug, Clone, Default)]
pub struct SkillOutput {
    pub speech: String,
    pub rendering: Option<Rendering>,
    pub status: OutputStatus,
    pub plan: InteractionPlan,
}

impl SkillOutput {
    pub fn new(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            ..Self::default()
        }
    }

    pub fn with_rendering(mut self, rendering: Rendering) -> Self {
        self.rendering = Some(rendering);
        self
    }

    pub fn with_status(mut self, status: OutputStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_plan(mut self, plan: InteractionPlan) -> Self {
        self.plan = plan;
        self
    }

    /// A lookup found nothing; carries the query that failed.
    pub fn not_found(speech: impl Into<String>, query: impl Into<String>) -> Self {
        Self::new(speech)
            .with_status(OutputStatus::NotFound)
            .with_rendering(Rendering::Failure {
                query: query.into(),
            })
    }

    /// An external service failed; carries the attempted query.
    pub fn upstream_failure(speech: impl Into<String>, query: impl Into<String>) -> Self {
        Self::new(speech)
            .with_status(OutputStatus::UpstreamFailure)
            .with_rendering(Rendering::Failure {
                query: query.into(),
            })
    }

    /// No skill understood the utterance.
    pub fn not_understood(locale: Locale) -> Self {
        let speech = match locale {
            Locale::Ru => "Извини, я не понял",
            Locale::En => "Sorry, I didn't understand",
        };
        Self::new(speech).with_status(OutputStatus::NoMatch)
    }

    /// The skill failed while producing its output.
    pub fn failed(locale: Locale) -> Self {
        let speech = match locale {
            Locale::Ru => "Что-то пошло не так",
            Locale::En => "Something went wrong",
        };
        Self::new(speech).with_status(OutputStatus::Failed)
    }

    pub fn is_handled(&self) -> bool {
        self.status == OutputStatus::Handled
    }
}
