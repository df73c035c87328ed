//! Interaction engine: routes utterances and tracks follow-up exchanges.
//!
//! The engine is a two-state machine. While `Idle`, an utterance is ranked
//! against every enabled skill. When the winning output asks for a follow-up
//! (`ReplaceSubInteraction`), the engine moves to `Awaiting` and the next
//! utterance is ranked only against the installed skills, e.g. a yes/no
//! recognizer after "Позвонить маме?".
//!
//! Utterances are processed one at a time, in arrival order: `process` holds
//! the state mutex for the whole utterance.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use voxa_types::interaction::{Exchange, InteractionLog};
use voxa_types::score::Score;
use voxa_types::speech::SpeechEvent;

use super::ranker::SkillRanker;
use crate::port::SpeechInput;
use crate::skill::{Candidate, InteractionPlan, Skill, SkillContext, SkillOutput, SkillRegistry};
use crate::text::normalize;

/// Where the next utterance is routed.
#[derive(Clone, Default)]
pub enum Continuation {
    #[default]
    Idle,
    Awaiting {
        skills: Vec<Arc<dyn Skill>>,
        reopen_microphone: bool,
    },
}

impl Continuation {
    fn apply(&mut self, plan: InteractionPlan) {
        match plan {
            InteractionPlan::FinishInteraction => *self = Self::Idle,
            InteractionPlan::ContinueSubInteraction => {}
            InteractionPlan::ReplaceSubInteraction {
                next_skills,
                reopen_microphone,
            } => {
                *self = if next_skills.is_empty() {
                    Self::Idle
                } else {
                    Self::Awaiting {
                        skills: next_skills,
                        reopen_microphone,
                    }
                };
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    fn reopens_microphone(&self) -> bool {
        matches!(
            self,
            Self::Awaiting {
                reopen_microphone: true,
                ..
            }
        )
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Awaiting {
                skills,
                reopen_microphone,
            } => f
                .debug_struct("Awaiting")
                .field("skills", &skills.iter().map(|s| s.id()).collect::<Vec<_>>())
                .field("reopen_microphone", reopen_microphone)
                .finish(),
        }
    }
}

/// Result of processing one utterance.
#[derive(Debug, Clone)]
pub struct EngineResponse {
    pub utterance: String,
    /// Winning skill, `None` when nothing matched.
    pub skill_id: Option<String>,
    pub score: Option<Score>,
    pub output: SkillOutput,
    /// The I/O layer should start listening again right away.
    pub reopen_microphone: bool,
    /// The utterance was answered by an installed follow-up.
    pub routed_to_continuation: bool,
}

struct EngineState {
    continuation: Continuation,
    log: InteractionLog,
}

/// Serializes utterances and owns the continuation state and the log.
pub struct InteractionEngine {
    registry: Arc<SkillRegistry>,
    ctx: Arc<SkillContext>,
    ranker: SkillRanker,
    state: Mutex<EngineState>,
}

impl InteractionEngine {
    pub fn new(registry: Arc<SkillRegistry>, ranker: SkillRanker) -> Self {
        let ctx = Arc::clone(registry.context());
        Self {
            registry,
            ctx,
            ranker,
            state: Mutex::new(EngineState {
                continuation: Continuation::Idle,
                log: InteractionLog::new(),
            }),
        }
    }

    /// Interpret one utterance and deliver the resulting output.
    pub async fn process(&self, utterance: &str) -> EngineResponse {
        let normalized = normalize(utterance);
        let mut state = self.state.lock().await;

        let (pool, routed) = match &state.continuation {
            Continuation::Idle => (self.registry.enabled_skills(), false),
            Continuation::Awaiting { skills, .. } => (skills.clone(), true),
        };
        debug!(%normalized, routed, pool = pool.len(), "processing utterance");

        let (skill_id, score, output) = match self.ranker.select(&pool, &normalized) {
            Some(candidate) => {
                let skill_id = candidate.skill_id.clone();
                let score = candidate.score;
                let output = self.generate(candidate).await;
                state.continuation.apply(output.plan.clone());
                (Some(skill_id), Some(score), output)
            }
            None => {
                // The installed follow-up, if any, stays in place.
                debug!("no skill matched");
                (None, None, SkillOutput::not_understood(self.ctx.locale))
            }
        };

        if !routed {
            state.log.start_interaction();
        }
        state.log.push_exchange(Exchange {
            question: utterance.to_string(),
            answer: output.speech.clone(),
            skill_id: skill_id.clone(),
            at: Utc::now(),
        });

        if !output.speech.is_empty() {
            self.ctx.speech.speak(&output.speech);
        }

        info!(
            skill = skill_id.as_deref().unwrap_or("-"),
            status = ?output.status,
            continuation = ?state.continuation,
            "utterance handled"
        );

        EngineResponse {
            utterance: utterance.to_string(),
            skill_id,
            score,
            reopen_microphone: state.continuation.reopens_microphone(),
            routed_to_continuation: routed,
            output,
        }
    }

    /// Run the candidate's output future in its own task so a panicking
    /// skill becomes a failed output instead of taking the engine down.
    async fn generate(&self, candidate: Candidate) -> SkillOutput {
        let skill_id = candidate.skill_id.clone();
        match tokio::spawn(candidate.into_output(Arc::clone(&self.ctx))).await {
            Ok(output) => output,
            Err(e) => {
                error!(skill = %skill_id, error = %e, "skill failed while generating output");
                SkillOutput::failed(self.ctx.locale)
            }
        }
    }

    /// Apply a plan directly, as if an output had returned it.
    pub async fn install(&self, plan: InteractionPlan) {
        self.state.lock().await.continuation.apply(plan);
    }

    /// Drop any installed follow-up.
    pub async fn reset(&self) {
        self.state.lock().await.continuation = Continuation::Idle;
    }

    pub async fn continuation(&self) -> Continuation {
        self.state.lock().await.continuation.clone()
    }

    /// Ids of the installed follow-up skills, `None` while idle.
    pub async fn pending_skill_ids(&self) -> Option<Vec<String>> {
        match &self.state.lock().await.continuation {
            Continuation::Idle => None,
            Continuation::Awaiting { skills, .. } => {
                Some(skills.iter().map(|s| s.id().to_string()).collect())
            }
        }
    }

    pub async fn log(&self) -> InteractionLog {
        self.state.lock().await.log.clone()
    }

    pub async fn clear_log(&self) {
        self.state.lock().await.log.clear();
    }

    /// Consume speech events until `shutdown` fires or the source runs dry.
    ///
    /// Only `Final` events are interpreted. A new listening session is
    /// opened whenever a response asks to reopen the microphone, and after
    /// a session ends on its own.
    pub async fn run<I>(
        &self,
        input: &I,
        shutdown: CancellationToken,
        mut on_response: impl FnMut(&EngineResponse),
    ) where
        I: SpeechInput + ?Sized,
    {
        loop {
            let mut events = input.listen();
            let mut received_any = false;

            loop {
                let event = tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => return,
                    event = events.next() => event,
                };
                let Some(event) = event else {
                    break;
                };
                received_any = true;

                match event {
                    SpeechEvent::Final { text, confidence } => {
                        debug!(?confidence, "final utterance received");
                        let response = self.process(&text).await;
                        on_response(&response);
                        if response.reopen_microphone {
                            break;
                        }
                    }
                    SpeechEvent::Partial { text } => trace!(%text, "partial utterance"),
                    SpeechEvent::Silence => debug!("silence"),
                    SpeechEvent::Error { message } => warn!(%message, "speech input error"),
                }
            }

            if !received_any {
                debug!("speech input exhausted");
                return;
            }
        }
    }
}

impl fmt::Debug for InteractionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionEngine")
            .field("ranker", &self.ranker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use futures_util::stream::{self, BoxStream};
    use voxa_types::output::OutputStatus;
    use voxa_types::score::Specificity;
    use voxa_types::skill::SkillMeta;

    use super::*;
    use crate::recognizer::Pattern;
    use crate::skill::FuzzySkill;
    use crate::testing::{EchoSkill, registry_of, test_context};

    /// Asks a question and installs a yes-only follow-up.
    struct AskSkill {
        meta: SkillMeta,
        patterns: Vec<Pattern<()>>,
    }

    impl AskSkill {
        fn arc() -> Arc<dyn Skill> {
            Arc::new(Self {
                meta: SkillMeta::new("ask", Specificity::High),
                patterns: vec![Pattern::new("спроси меня", r"^спроси меня$", |_| ()).unwrap()],
            })
        }
    }

    impl FuzzySkill for AskSkill {
        type Input = ();

        fn meta(&self) -> &SkillMeta {
            &self.meta
        }

        fn patterns(&self) -> &[Pattern<()>] {
            &self.patterns
        }

        async fn generate_output(&self, _ctx: &SkillContext, _input: ()) -> SkillOutput {
            let confirm = EchoSkill::with_rule("confirm", Specificity::Low, "да", r"^да$").arc();
            SkillOutput::new("точно?").with_plan(InteractionPlan::replace(true, vec![confirm]))
        }
    }

    struct PanicSkill {
        meta: SkillMeta,
        patterns: Vec<Pattern<()>>,
    }

    impl FuzzySkill for PanicSkill {
        type Input = ();

        fn meta(&self) -> &SkillMeta {
            &self.meta
        }

        fn patterns(&self) -> &[Pattern<()>] {
            &self.patterns
        }

        async fn generate_output(&self, _ctx: &SkillContext, _input: ()) -> SkillOutput {
            panic!("boom");
        }
    }

    fn engine() -> (InteractionEngine, Arc<crate::testing::RecordingSpeech>) {
        let (ctx, speech) = test_context();
        let registry = registry_of(
            vec![
                EchoSkill::with_rule("clock", Specificity::High, "который час", r"^который час$").arc(),
                AskSkill::arc(),
            ],
            ctx,
        );
        (InteractionEngine::new(registry, SkillRanker::default()), speech)
    }

    #[tokio::test]
    async fn test_idle_routes_to_enabled_skills() {
        let (engine, speech) = engine();
        let response = engine.process("Который час?").await;
        assert_eq!(response.skill_id.as_deref(), Some("clock"));
        assert!(!response.reopen_microphone);
        assert!(engine.continuation().await.is_idle());
        assert_eq!(speech.spoken(), vec!["clock".to_string()]);
    }

    #[tokio::test]
    async fn test_no_match_at_idle() {
        let (engine, _) = engine();
        let response = engine.process("спой песню").await;
        assert!(response.skill_id.is_none());
        assert_eq!(response.output.status, OutputStatus::NoMatch);
        assert!(engine.continuation().await.is_idle());
    }

    #[tokio::test]
    async fn test_follow_up_restricted_to_installed_skills() {
        let (engine, _) = engine();

        let asked = engine.process("спроси меня").await;
        assert_eq!(asked.skill_id.as_deref(), Some("ask"));
        assert!(asked.reopen_microphone);
        assert_eq!(engine.pending_skill_ids().await, Some(vec!["confirm".to_string()]));

        // A top-level phrase is not considered while a follow-up is installed.
        let ignored = engine.process("который час").await;
        assert!(ignored.skill_id.is_none());
        assert!(ignored.routed_to_continuation);
        assert!(ignored.reopen_microphone);
        assert_eq!(engine.pending_skill_ids().await, Some(vec!["confirm".to_string()]));

        let answered = engine.process("да").await;
        assert_eq!(answered.skill_id.as_deref(), Some("confirm"));
        assert!(engine.continuation().await.is_idle());

        let back = engine.process("который час").await;
        assert_eq!(back.skill_id.as_deref(), Some("clock"));
    }

    #[tokio::test]
    async fn test_installing_replaces_prior_follow_up() {
        let (engine, _) = engine();
        let x = EchoSkill::new("x", Specificity::Low, &["икс"]).arc();
        let y = EchoSkill::new("y", Specificity::Low, &["игрек"]).arc();

        engine.install(InteractionPlan::replace(false, vec![x])).await;
        engine.install(InteractionPlan::replace(false, vec![y])).await;
        assert_eq!(engine.pending_skill_ids().await, Some(vec!["y".to_string()]));

        let response = engine.process("икс").await;
        assert_eq!(response.skill_id.as_deref(), Some("y"));
        assert!(engine.continuation().await.is_idle());
    }

    #[tokio::test]
    async fn test_empty_follow_up_returns_to_idle() {
        let (engine, _) = engine();
        engine.install(InteractionPlan::replace(true, Vec::new())).await;
        assert!(engine.pending_skill_ids().await.is_none());
    }

    #[tokio::test]
    async fn test_panicking_skill_becomes_failed_output() {
        let (ctx, _) = test_context();
        let panicky: Arc<dyn Skill> = Arc::new(PanicSkill {
            meta: SkillMeta::new("panicky", Specificity::High),
            patterns: vec![Pattern::example_only("сломайся", |_| ())],
        });
        let engine = InteractionEngine::new(registry_of(vec![panicky], ctx), SkillRanker::default());

        let response = engine.process("сломайся").await;
        assert_eq!(response.output.status, OutputStatus::Failed);
        assert_eq!(response.skill_id.as_deref(), Some("panicky"));

        // Still serving.
        let again = engine.process("сломайся").await;
        assert_eq!(again.output.status, OutputStatus::Failed);
    }

    #[tokio::test]
    async fn test_log_groups_follow_ups_into_one_interaction() {
        let (engine, _) = engine();
        engine.process("спроси меня").await;
        engine.process("да").await;
        engine.process("который час").await;

        let log = engine.log().await;
        assert_eq!(log.len(), 2);
        assert_eq!(log.interactions()[0].exchanges.len(), 2);
        assert_eq!(log.interactions()[0].exchanges[1].question, "да");
        assert_eq!(log.interactions()[1].exchanges[0].skill_id.as_deref(), Some("clock"));
    }

    struct ScriptedInput {
        sessions: StdMutex<VecDeque<Vec<SpeechEvent>>>,
    }

    impl SpeechInput for ScriptedInput {
        fn listen(&self) -> BoxStream<'static, SpeechEvent> {
            let events = self.sessions.lock().unwrap().pop_front().unwrap_or_default();
            stream::iter(events).boxed()
        }
    }

    #[tokio::test]
    async fn test_run_processes_only_final_events() {
        let (engine, _) = engine();
        let input = ScriptedInput {
            sessions: StdMutex::new(VecDeque::from(vec![
                vec![
                    SpeechEvent::Partial {
                        text: "кото".to_string(),
                    },
                    SpeechEvent::final_text("который час"),
                    SpeechEvent::Silence,
                ],
                vec![
                    SpeechEvent::Error {
                        message: "no audio".to_string(),
                    },
                    SpeechEvent::final_text("спроси меня"),
                    // Dropped: listening restarts after a reopen request.
                    SpeechEvent::final_text("который час"),
                ],
                vec![SpeechEvent::final_text("да")],
            ])),
        };

        let mut skills = Vec::new();
        engine
            .run(&input, CancellationToken::new(), |response| {
                skills.push(response.skill_id.clone().unwrap_or_default());
            })
            .await;

        assert_eq!(skills, vec!["clock", "ask", "confirm"]);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (engine, _) = engine();
        let input = ScriptedInput {
            sessions: StdMutex::new(VecDeque::from(vec![vec![SpeechEvent::final_text(
                "который час",
            )]])),
        };
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let mut count = 0;
        engine.run(&input, shutdown, |_| count += 1).await;
        assert_eq!(count, 0);
    }
}
