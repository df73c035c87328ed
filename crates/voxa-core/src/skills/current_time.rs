//! Speaks the current local time; refreshed every minute as an auto skill.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Timelike};
use futures_util::future::BoxFuture;

use voxa_types::error::PatternError;
use voxa_types::locale::Locale;
use voxa_types::output::Rendering;
use voxa_types::score::Specificity;
use voxa_types::skill::SkillMeta;

use crate::recognizer::Pattern;
use crate::skill::{AutoRunnable, FuzzySkill, Skill, SkillContext, SkillInfo, SkillOutput};
use crate::text::numbers::{russian_plural, russian_words};

pub const CURRENT_TIME_ID: &str = "current_time";

const REFRESH: Duration = Duration::from_secs(60);

/// "десять часов пять минут", "двадцать два часа ровно", "It's 09:07".
pub fn spoken_time(hour: u32, minute: u32, locale: Locale) -> String {
    match locale {
        Locale::Ru => {
            let hours = format!(
                "{} {}",
                russian_words(hour, false),
                russian_plural(u64::from(hour), "час", "часа", "часов")
            );
            if minute == 0 {
                format!("{hours} ровно")
            } else {
                format!(
                    "{hours} {} {}",
                    russian_words(minute, true),
                    russian_plural(u64::from(minute), "минута", "минуты", "минут")
                )
            }
        }
        Locale::En => format!("It's {hour:02}:{minute:02}"),
    }
}

fn time_output(hour: u32, minute: u32, locale: Locale) -> SkillOutput {
    SkillOutput::new(spoken_time(hour, minute, locale)).with_rendering(Rendering::Clock {
        formatted: format!("{hour:02}:{minute:02}"),
    })
}

fn now_output(locale: Locale) -> SkillOutput {
    let now = Local::now();
    time_output(now.hour(), now.minute(), locale)
}

pub struct CurrentTimeSkill {
    meta: SkillMeta,
    patterns: Vec<Pattern<()>>,
}

impl CurrentTimeSkill {
    pub fn new() -> Result<Self, PatternError> {
        Ok(Self {
            meta: SkillMeta::new(CURRENT_TIME_ID, Specificity::Medium),
            patterns: vec![
                Pattern::new(
                    "который час",
                    r"^(?:скажи\s+)?который\s+(?:сейчас\s+)?час(?:\s+сейчас)?$",
                    |_| (),
                )?,
                Pattern::new(
                    "сколько времени",
                    r"^(?:скажи\s+)?сколько\s+(?:сейчас\s+)?времени(?:\s+сейчас)?$",
                    |_| (),
                )?,
                Pattern::new("what time is it", r"^what\s+time\s+is\s+it(?:\s+now)?$", |_| ())?,
                Pattern::new("what is the time", r"^what\s+(?:is|s)\s+the\s+time$", |_| ())?,
            ],
        })
    }
}

impl FuzzySkill for CurrentTimeSkill {
    type Input = ();

    fn meta(&self) -> &SkillMeta {
        &self.meta
    }

    fn patterns(&self) -> &[Pattern<()>] {
        &self.patterns
    }

    async fn generate_output(&self, ctx: &SkillContext, _input: ()) -> SkillOutput {
        now_output(ctx.locale)
    }

    fn auto_runnable(self: Arc<Self>) -> Option<Arc<dyn AutoRunnable>> {
        Some(self)
    }
}

impl AutoRunnable for CurrentTimeSkill {
    fn auto_update_interval(&self) -> Option<Duration> {
        Some(REFRESH)
    }

    fn auto_output<'a>(&'a self, ctx: &'a SkillContext) -> BoxFuture<'a, SkillOutput> {
        Box::pin(async move { now_output(ctx.locale) })
    }
}

pub struct CurrentTimeInfo;

impl SkillInfo for CurrentTimeInfo {
    fn id(&self) -> &str {
        CURRENT_TIME_ID
    }

    fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Текущее время",
            Locale::En => "Current time",
        }
    }

    fn sentence_example(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Который час?",
            Locale::En => "What time is it?",
        }
    }

    fn build(&self, _ctx: &SkillContext) -> Result<Arc<dyn Skill>, PatternError> {
        Ok(Arc::new(CurrentTimeSkill::new()?))
    }
}
