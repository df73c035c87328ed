//! Countdown timers by voice: set, query and cancel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::debug;

use voxa_types::config::TimerConfig;
use voxa_types::error::PatternError;
use voxa_types::locale::Locale;
use voxa_types::output::Rendering;
use voxa_types::score::Specificity;
use voxa_types::skill::SkillMeta;
use voxa_types::timer::TimerSnapshot;

use super::yes_no::{YesNoSkill, yes_no_patterns};
use crate::port::{AlarmDevice, SpeechOutput};
use crate::recognizer::{Extraction, Pattern};
use crate::skill::{FuzzySkill, InteractionPlan, Skill, SkillContext, SkillInfo, SkillOutput};
use crate::text::duration::{format_duration, parse_duration};
use crate::text::numbers::{parse_number_at, russian_words};
use crate::timer::{CancelOutcome, QueryOutcome, TimerCallbacks, TimerRegistry};

pub const TIMER_ID: &str = "timer";
const DURATION_REPLY_ID: &str = "timer_duration";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerCommand {
    Set {
        duration: Option<Duration>,
        name: Option<String>,
    },
    Query {
        name: Option<String>,
    },
    /// `name: None` cancels every timer.
    Cancel {
        name: Option<String>,
    },
}

fn set_command(extraction: &Extraction<'_>) -> TimerCommand {
    TimerCommand::Set {
        duration: extraction.group("duration").and_then(parse_duration),
        name: extraction.group("name").map(str::to_string),
    }
}

fn query_command(extraction: &Extraction<'_>) -> TimerCommand {
    TimerCommand::Query {
        name: extraction.group("name").map(str::to_string),
    }
}

fn cancel_command(extraction: &Extraction<'_>) -> TimerCommand {
    TimerCommand::Cancel {
        name: extraction.group("name").map(str::to_string),
    }
}

fn timer_patterns() -> Result<Vec<Pattern<TimerCommand>>, PatternError> {
    let named = r"(?:\s+(?:для|под названием|с названием|с именем|называется)\s+(?P<name>.+))?";
    Ok(vec![
        Pattern::new(
            "поставь таймер на 5 минут",
            &format!(
                r"^(?:(?:поставь|установи|заведи|запусти|включи|сделаи)\s+)?таймер(?P<duration>.*?){named}$"
            ),
            set_command,
        )?,
        Pattern::new(
            "засеки 5 минут",
            &format!(r"^засеки\s+(?P<duration>.+?){named}$"),
            set_command,
        )?,
        Pattern::new(
            "set a timer for 5 minutes",
            r"^(?:set|start)\s+(?:a\s+|the\s+)?timer(?P<duration>.*?)(?:\s+(?:named|called)\s+(?P<name>.+))?$",
            set_command,
        )?,
        Pattern::new(
            "сколько осталось на таймере",
            r"^сколько\s+(?:еще\s+)?(?:времени\s+)?осталось(?:\s+(?:на\s+таймере|таймеру|у\s+таймера|до\s+конца))?(?:\s+(?:для\s+)?(?P<name>.+))?$",
            query_command,
        )?,
        Pattern::new(
            "что с таймером",
            r"^(?:что\s+с\s+таймером|покажи\s+таймер\w*)(?:\s+(?P<name>.+))?$",
            query_command,
        )?,
        Pattern::new(
            "how much time is left on the timer",
            r"^how\s+much\s+time\s+is\s+left(?:\s+on(?:\s+the)?\s+timer)?(?:\s+(?:for\s+)?(?P<name>.+))?$",
            query_command,
        )?,
        Pattern::new(
            "отмени таймер",
            r"^(?:отмени|останови|выключи|удали|сбрось|отключи)\s+(?:все\s+)?таймер\w*(?:\s+(?:для\s+|под названием\s+)?(?P<name>.+))?$",
            cancel_command,
        )?,
        Pattern::new(
            "cancel the timer",
            r"^(?:cancel|stop|delete|remove|turn\s+off)\s+(?:all\s+)?(?:the\s+)?timers?(?:\s+(?:named\s+|called\s+|for\s+)?(?P<name>.+))?$",
            cancel_command,
        )?,
    ])
}

// ---------------------------------------------------------------------------
// Shared timer operations
// ---------------------------------------------------------------------------

struct Timers {
    registry: Arc<TimerRegistry>,
    alarm: Arc<dyn AlarmDevice>,
    countdown_seconds: u64,
    /// Passes a follow-up answer through verbatim.
    answer_pattern: Pattern<String>,
    confirm_patterns: Vec<Pattern<bool>>,
}

impl Timers {
    async fn set(&self, ctx: &SkillContext, duration: Duration, name: Option<String>) -> SkillOutput {
        let callbacks = self.callbacks(ctx.locale, Arc::clone(&ctx.speech));
        let timer = self.registry.set(duration, name, callbacks).await;

        let spoken = format_duration(duration, ctx.locale);
        let speech = match (ctx.locale, &timer.name) {
            (Locale::Ru, None) => format!("Таймер на {spoken} запущен"),
            (Locale::Ru, Some(name)) => format!("Таймер {name} на {spoken} запущен"),
            (Locale::En, None) => format!("Timer for {spoken} started"),
            (Locale::En, Some(name)) => format!("Timer {name} for {spoken} started"),
        };
        SkillOutput::new(speech).with_rendering(Rendering::TimerSet { timer })
    }

    fn callbacks(&self, locale: Locale, speech: Arc<dyn SpeechOutput>) -> TimerCallbacks {
        let rung = Arc::new(AtomicBool::new(false));
        let countdown_seconds = self.countdown_seconds;

        let on_millis_tick = {
            let (alarm, rung) = (Arc::clone(&self.alarm), Arc::clone(&rung));
            Arc::new(move |remaining_ms: i64| {
                // Keep ringing until the timer is dismissed.
                if remaining_ms < 0 && rung.load(Ordering::SeqCst) && !alarm.is_playing() {
                    alarm.play();
                }
            })
        };
        let on_seconds_tick = {
            let speech = Arc::clone(&speech);
            Arc::new(move |seconds: u64| {
                if seconds <= countdown_seconds {
                    speech.speak(&spoken_count(seconds, locale));
                }
            })
        };
        let on_expired = {
            let (alarm, rung) = (Arc::clone(&self.alarm), Arc::clone(&rung));
            Arc::new(move |timer: &TimerSnapshot| {
                rung.store(true, Ordering::SeqCst);
                if !alarm.play() {
                    speech.speak(&expired_message(timer.name.as_deref(), locale));
                }
            })
        };
        let on_cancel = {
            let alarm = Arc::clone(&self.alarm);
            Arc::new(move |_: &TimerSnapshot| {
                if rung.load(Ordering::SeqCst) {
                    alarm.stop();
                }
            })
        };

        TimerCallbacks {
            on_millis_tick,
            on_seconds_tick,
            on_expired,
            on_cancel,
        }
    }

    fn query(&self, locale: Locale, name: Option<&str>) -> SkillOutput {
        match self.registry.query(name) {
            QueryOutcome::NoActiveTimers => no_timers(locale),
            QueryOutcome::NotFound { name } => timer_not_found(&name, locale),
            QueryOutcome::Found { timer, only_one } => {
                // An unnamed lookup among several timers reports the last one set.
                let last = name.is_none() && !only_one;
                let speech = if timer.is_expired() {
                    match (locale, last) {
                        (Locale::Ru, false) => "Таймер уже сработал".to_string(),
                        (Locale::Ru, true) => "Последний таймер уже сработал".to_string(),
                        (Locale::En, false) => "The timer has already gone off".to_string(),
                        (Locale::En, true) => "The last timer has already gone off".to_string(),
                    }
                } else {
                    let seconds = (timer.remaining_ms as u64).div_ceil(1000);
                    let left = format_duration(Duration::from_secs(seconds), locale);
                    match (locale, &timer.name, last) {
                        (Locale::Ru, None, false) => format!("До конца таймера осталось {left}"),
                        (Locale::Ru, None, true) => {
                            format!("До конца последнего таймера осталось {left}")
                        }
                        (Locale::Ru, Some(name), _) => {
                            format!("До конца таймера {name} осталось {left}")
                        }
                        (Locale::En, None, false) => format!("{left} left on the timer"),
                        (Locale::En, None, true) => format!("{left} left on the last timer"),
                        (Locale::En, Some(name), _) => format!("{left} left on the {name} timer"),
                    }
                };
                SkillOutput::new(speech).with_rendering(Rendering::TimerStatus { timer })
            }
        }
    }

    async fn cancel(&self, locale: Locale, name: Option<&str>) -> SkillOutput {
        let active = self.registry.active_count();
        if name.is_none() && active > 1 {
            let registry = Arc::clone(&self.registry);
            let confirm = YesNoSkill::arc(&self.confirm_patterns, move |yes, locale| {
                let registry = Arc::clone(&registry);
                Box::pin(async move {
                    if yes {
                        cancelled(registry.cancel(None).await, locale)
                    } else {
                        SkillOutput::new(match locale {
                            Locale::Ru => "Хорошо, таймеры продолжают работать",
                            Locale::En => "Okay, the timers keep running",
                        })
                    }
                })
            });
            let speech = match locale {
                Locale::Ru => format!("Отменить все таймеры ({active})?"),
                Locale::En => format!("Cancel all {active} timers?"),
            };
            return SkillOutput::new(speech).with_plan(InteractionPlan::replace(true, vec![confirm]));
        }

        cancelled(self.registry.cancel(name).await, locale)
    }
}

fn cancelled(outcome: CancelOutcome, locale: Locale) -> SkillOutput {
    match outcome {
        CancelOutcome::NoActiveTimers => no_timers(locale),
        CancelOutcome::NotFound { name } => timer_not_found(&name, locale),
        CancelOutcome::Cancelled(timers) => {
            let speech = match (locale, timers.len()) {
                (Locale::Ru, 1) => "Таймер отменён".to_string(),
                (Locale::Ru, n) => format!("Отменено таймеров: {n}"),
                (Locale::En, 1) => "Timer cancelled".to_string(),
                (Locale::En, n) => format!("Cancelled {n} timers"),
            };
            SkillOutput::new(speech).with_rendering(Rendering::TimersCancelled { timers })
        }
    }
}

fn no_timers(locale: Locale) -> SkillOutput {
    SkillOutput::new(match locale {
        Locale::Ru => "Нет активных таймеров",
        Locale::En => "There are no active timers",
    })
}

fn timer_not_found(name: &str, locale: Locale) -> SkillOutput {
    let speech = match locale {
        Locale::Ru => format!("Не нашёл таймер {name}"),
        Locale::En => format!("I couldn't find a timer called {name}"),
    };
    SkillOutput::not_found(speech, name)
}

fn spoken_count(seconds: u64, locale: Locale) -> String {
    match locale {
        Locale::Ru => russian_words(u32::try_from(seconds).unwrap_or(u32::MAX), false),
        Locale::En => seconds.to_string(),
    }
}

fn expired_message(name: Option<&str>, locale: Locale) -> String {
    match (locale, name) {
        (Locale::Ru, None) => "Время вышло".to_string(),
        (Locale::Ru, Some(name)) => format!("Таймер {name} сработал"),
        (Locale::En, None) => "Time is up".to_string(),
        (Locale::En, Some(name)) => format!("The {name} timer is done"),
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

pub struct TimerSkill {
    meta: SkillMeta,
    patterns: Vec<Pattern<TimerCommand>>,
    timers: Arc<Timers>,
}

impl TimerSkill {
    pub fn new(
        registry: Arc<TimerRegistry>,
        alarm: Arc<dyn AlarmDevice>,
        config: &TimerConfig,
    ) -> Result<Self, PatternError> {
        let answer_pattern = Pattern::new("5 минут", r"^(?P<answer>.+)$", |extraction| {
            extraction.group("answer").unwrap_or_default().to_string()
        })?;
        Ok(Self {
            meta: SkillMeta::new(TIMER_ID, Specificity::High),
            patterns: timer_patterns()?,
            timers: Arc::new(Timers {
                registry,
                alarm,
                countdown_seconds: config.countdown_seconds,
                answer_pattern,
                confirm_patterns: yes_no_patterns()?,
            }),
        })
    }
}

impl FuzzySkill for TimerSkill {
    type Input = TimerCommand;

    fn meta(&self) -> &SkillMeta {
        &self.meta
    }

    fn patterns(&self) -> &[Pattern<TimerCommand>] {
        &self.patterns
    }

    async fn generate_output(&self, ctx: &SkillContext, command: TimerCommand) -> SkillOutput {
        debug!(?command, "timer command");
        match command {
            TimerCommand::Set {
                duration: Some(duration),
                name,
            } => self.timers.set(ctx, duration, name).await,
            TimerCommand::Set {
                duration: None,
                name,
            } => {
                let reply = DurationReplySkill::arc(Arc::clone(&self.timers), name);
                SkillOutput::new(ctx.localized("На сколько поставить таймер?", "For how long?"))
                    .with_plan(InteractionPlan::replace(true, vec![reply]))
            }
            TimerCommand::Query { name } => self.timers.query(ctx.locale, name.as_deref()),
            TimerCommand::Cancel { name } => self.timers.cancel(ctx.locale, name.as_deref()).await,
        }
    }
}

/// Follow-up answering "На сколько поставить таймер?".
struct DurationReplySkill {
    meta: SkillMeta,
    patterns: Vec<Pattern<String>>,
    timers: Arc<Timers>,
    name: Option<String>,
}

impl DurationReplySkill {
    fn arc(timers: Arc<Timers>, name: Option<String>) -> Arc<dyn Skill> {
        Arc::new(Self {
            meta: SkillMeta::new(DURATION_REPLY_ID, Specificity::Low),
            patterns: vec![timers.answer_pattern.clone()],
            timers,
            name,
        })
    }
}

/// A duration, or a bare number taken as minutes. Numbers too large for a
/// `Duration` count as no answer.
fn reply_duration(answer: &str) -> Option<Duration> {
    if let Some(duration) = parse_duration(answer) {
        return Some(duration);
    }
    let words: Vec<&str> = answer.split_whitespace().collect();
    match parse_number_at(&words, 0) {
        Some((minutes, used)) if used == words.len() && minutes > 0.0 => {
            Duration::try_from_secs_f64(minutes * 60.0).ok()
        }
        _ => None,
    }
}

fn is_refusal(answer: &str) -> bool {
    ["отмена", "не надо", "нет", "никак", "cancel", "never mind", "no"]
        .iter()
        .any(|refusal| answer == *refusal || answer.starts_with(&format!("{refusal} ")))
}

impl FuzzySkill for DurationReplySkill {
    type Input = String;

    fn meta(&self) -> &SkillMeta {
        &self.meta
    }

    fn patterns(&self) -> &[Pattern<String>] {
        &self.patterns
    }

    async fn generate_output(&self, ctx: &SkillContext, answer: String) -> SkillOutput {
        if let Some(duration) = reply_duration(&answer) {
            return self.timers.set(ctx, duration, self.name.clone()).await;
        }
        if is_refusal(&answer) {
            return SkillOutput::new(ctx.localized("Хорошо, не ставлю", "Okay, no timer"));
        }
        SkillOutput::new(ctx.localized(
            "Не понял. Скажи, например: пять минут",
            "Sorry, how long? For example: five minutes",
        ))
        .with_plan(InteractionPlan::ContinueSubInteraction)
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

pub struct TimerInfo {
    pub registry: Arc<TimerRegistry>,
    pub alarm: Arc<dyn AlarmDevice>,
    pub config: TimerConfig,
}

impl SkillInfo for TimerInfo {
    fn id(&self) -> &str {
        TIMER_ID
    }

    fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Таймер",
            Locale::En => "Timer",
        }
    }

    fn sentence_example(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ru => "Поставь таймер на 5 минут",
            Locale::En => "Set a timer for 5 minutes",
        }
    }

    fn build(&self, _ctx: &SkillContext) -> Result<Arc<dyn Skill>, PatternError> {
        Ok(Arc::new(TimerSkill::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.alarm),
            &self.config,
        )?))
    }
}
