//! Face tracking on/off commands.

use std::sync::Arc;

use voxa_types::error::PatternError;
use voxa_types::locale::Locale;
use voxa_types::output::Rendering;
use voxa_types::score::Specificity;
use voxa_types::skill::SkillMeta;

use crate::recognizer::Pattern;
use crate::skill::{FuzzySkill, Skill, SkillContext, SkillInfo, SkillOutput};

pub const FACE_TRACKER_ID: &str = "face_tracker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceTrackerCommand {
    Start,
    Stop,
}

pub struct FaceTrackerSkill {
    meta: SkillMeta,
    patterns: Vec<Pattern<FaceTrackerCommand>>,
}

impl FaceTrackerSkill {
    pub fn new() -> Result<Self, PatternError> {
        use FaceTrackerCommand::*;

        let target = r"(?:трек\w*|отслеживани\w*|слежени\w*)\s+(?:за\s+)?лиц\w*";
        let target_en = r"(?:face\s+track\w*|track\w*\s+(?:my\s+)?faces?)";
        let patterns = vec![
            Pattern::new(
                "запусти трекинг лица",
                &format!(r"^(?:запусти|включи|начни|активируй)\s+{target}$"),
                |_| Start,
            )?,
            Pattern::new(
                "останови трекинг лица",
                &format!(r"^(?:останови|выключи|закончи|прекрати|отключи)\s+{target}$"),
                |_| Stop,
            )?,
            Pattern::new(
                "start face tracking",
                &format!(r"^(?:start|enable|begin|turn\s+on)\s+{target_en}$"),
                |_| Start,
            )?,
            Pattern::new(
                "stop face tracking",
                &format!(r"^(?:stop|disable|end|turn\s+off)\s+{target_en}$"),
                |_| Stop,
            )?,
        ];

        Ok(Self {
            meta: SkillMeta::new(FACE_TRACKER_ID, Specificity::High),
            patterns,
        })
    }
}

impl FuzzySkill for FaceTrackerSkill {
    type Input = FaceTrackerCommand;

    fn meta(&self) -> &SkillMeta {
        &self.meta
    }

    fn patterns(&self) -> &[Pattern<FaceTrackerCommand>] {
        &self.patterns
    }

    async fn generate_output(&self, ctx: &SkillContext, command: FaceTrackerCommand) -> SkillOutput {
        let (speech, active) = match command {
            FaceTrackerCommand::Start => {
                (ctx.localized("Запускаю трекинг лица", "Starting face tracking"), true)
            }
            FaceTrackerCommand::Stop => {
                (ctx.localized("Останавливаю трекинг лица", "Stopping face tracking"), false)
            }
        };
        SkillOutput::new(speech).with_rendering(Rendering::FaceTracking { active })
    }
}

pub struct FaceTrackerInfo;

impl SkillInfo for FaceTrackerInfo {
    fn id(&self) -> &str {
        FACE_TRACKER_ID
    }

    fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Трекинг лица",
            Locale::En => "Face tracking",
        }
    }

    fn sentence_example(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Запусти трекинг лица",
            Locale::En => "Start face tracking",
        }
    }

    fn build(&self, _ctx: &SkillContext) -> Result<Arc<dyn Skill>, PatternError> {
        Ok(Arc::new(FaceTrackerSkill::new()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{InteractionEngine, SkillRanker};
    use crate::testing::{registry_of, test_context};

    fn engine() -> InteractionEngine {
        let (ctx, _) = test_context();
        let skill = FaceTrackerInfo.build(&ctx).unwrap();
        InteractionEngine::new(registry_of(vec![skill], ctx), SkillRanker::default())
    }

    #[tokio::test]
    async fn test_start_face_tracking() {
        let response = engine().process("Запусти трекинг лица").await;
        assert_eq!(response.skill_id.as_deref(), Some(FACE_TRACKER_ID));
        assert_eq!(
            response.output.rendering,
            Some(Rendering::FaceTracking { active: true })
        );
        assert!(response.output.is_handled());
    }

    #[tokio::test]
    async fn test_stop_face_tracking_variants() {
        let engine = engine();
        for utterance in ["выключи слежение за лицом", "Stop face tracking"] {
            let response = engine.process(utterance).await;
            assert_eq!(
                response.output.rendering,
                Some(Rendering::FaceTracking { active: false }),
                "{utterance}"
            );
        }
    }

    #[tokio::test]
    async fn test_unrelated_command_is_not_matched() {
        let response = engine().process("запусти музыку").await;
        assert_eq!(response.skill_id, None);
    }
}
