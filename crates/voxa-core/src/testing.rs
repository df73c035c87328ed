//! In-memory doubles shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use voxa_types::contact::Contact;
use voxa_types::error::{PatternError, UpstreamError};
use voxa_types::locale::Locale;
use voxa_types::score::Specificity;
use voxa_types::skill::SkillMeta;

use crate::port::{AlarmDevice, ContactBook, Dialer, MemorySettings, SpeechOutput};
use crate::recognizer::Pattern;
use crate::skill::{FuzzySkill, Skill, SkillContext, SkillInfo, SkillOutput};

#[derive(Debug, Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }
}

pub fn test_context() -> (Arc<SkillContext>, Arc<RecordingSpeech>) {
    test_context_with(MemorySettings::new())
}

pub fn test_context_with(settings: MemorySettings) -> (Arc<SkillContext>, Arc<RecordingSpeech>) {
    let speech = Arc::new(RecordingSpeech::default());
    let ctx = SkillContext::new(Locale::Ru, speech.clone(), Arc::new(settings));
    (Arc::new(ctx), speech)
}

/// Replies with its own id; recognizes the given examples.
pub struct EchoSkill {
    meta: SkillMeta,
    patterns: Vec<Pattern<()>>,
}

impl EchoSkill {
    pub fn new(id: &str, specificity: Specificity, examples: &[&str]) -> Self {
        Self {
            meta: SkillMeta::new(id, specificity),
            patterns: examples
                .iter()
                .map(|example| Pattern::example_only(example, |_| ()))
                .collect(),
        }
    }

    /// Only utterances accepted by `rule` produce a candidate.
    pub fn with_rule(id: &str, specificity: Specificity, example: &str, rule: &str) -> Self {
        Self {
            meta: SkillMeta::new(id, specificity),
            patterns: vec![Pattern::new(example, rule, |_| ()).unwrap()],
        }
    }

    pub fn arc(self) -> Arc<dyn Skill> {
        Arc::new(self)
    }
}

impl FuzzySkill for EchoSkill {
    type Input = ();

    fn meta(&self) -> &SkillMeta {
        &self.meta
    }

    fn patterns(&self) -> &[Pattern<()>] {
        &self.patterns
    }

    async fn generate_output(&self, _ctx: &SkillContext, _input: ()) -> SkillOutput {
        SkillOutput::new(self.meta.id.clone())
    }
}

/// Factory for an [`EchoSkill`] matching one example phrase exactly.
pub struct StaticSkillInfo {
    id: &'static str,
    example: &'static str,
}

impl StaticSkillInfo {
    pub fn arc(id: &'static str, example: &'static str) -> Arc<dyn SkillInfo> {
        Arc::new(Self { id, example })
    }
}

impl SkillInfo for StaticSkillInfo {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self, _locale: Locale) -> &'static str {
        self.id
    }

    fn sentence_example(&self, _locale: Locale) -> &'static str {
        self.example
    }

    fn build(&self, _ctx: &SkillContext) -> Result<Arc<dyn Skill>, PatternError> {
        let rule = format!("^{}$", self.example);
        Ok(EchoSkill::with_rule(self.id, Specificity::Medium, self.example, &rule).arc())
    }
}

#[derive(Debug, Default)]
pub struct FakeAlarm {
    playing: AtomicBool,
    pub plays: AtomicUsize,
    pub unavailable: bool,
}

impl FakeAlarm {
    /// An alarm with no sound available: `play` always fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

impl AlarmDevice for FakeAlarm {
    fn play(&self) -> bool {
        if self.unavailable {
            return false;
        }
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.playing.store(true, Ordering::SeqCst);
        true
    }

    fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

pub struct FakeContacts(pub Vec<Contact>);

impl ContactBook for FakeContacts {
    fn contacts(&self) -> Vec<Contact> {
        self.0.clone()
    }
}

#[derive(Debug, Default)]
pub struct RecordingDialer {
    calls: Mutex<Vec<String>>,
}

impl RecordingDialer {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Dialer for RecordingDialer {
    fn call(&self, number: &str) -> Result<(), UpstreamError> {
        self.calls.lock().unwrap().push(number.to_string());
        Ok(())
    }
}

/// Factory that hands out one prebuilt skill instance.
pub struct FixedSkillInfo {
    id: String,
    skill: Arc<dyn Skill>,
}

impl SkillInfo for FixedSkillInfo {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self, _locale: Locale) -> &'static str {
        "test skill"
    }

    fn sentence_example(&self, _locale: Locale) -> &'static str {
        ""
    }

    fn build(&self, _ctx: &SkillContext) -> Result<Arc<dyn Skill>, PatternError> {
        Ok(Arc::clone(&self.skill))
    }
}

/// A registry with every given skill registered and enabled, in order.
pub fn registry_of(
    skills: Vec<Arc<dyn Skill>>,
    ctx: Arc<SkillContext>,
) -> Arc<crate::skill::SkillRegistry> {
    let infos: Vec<Arc<dyn SkillInfo>> = skills
        .into_iter()
        .map(|skill| {
            Arc::new(FixedSkillInfo {
                id: skill.id().to_string(),
                skill,
            }) as Arc<dyn SkillInfo>
        })
        .collect();
    let registry = crate::skill::SkillRegistry::new(infos, ctx).unwrap();
    registry.enable_all_except(&[]).unwrap();
    Arc::new(registry)
}
