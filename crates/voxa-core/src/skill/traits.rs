//! Skill traits.
//!
//! Follows the same blanket-impl pattern as the boxed weather provider:
//! 1. `FuzzySkill` is the ergonomic trait skills implement (RPITIT)
//! 2. `Skill` is the object-safe twin with boxed futures
//! 3. A blanket impl gives every `FuzzySkill` a `Skill` implementation

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

use voxa_types::score::{Score, Specificity};
use voxa_types::skill::SkillMeta;

use super::context::SkillContext;
use super::output::SkillOutput;
use crate::recognizer::{Pattern, best_match};

/// A skill recognized by fuzzy pattern matching.
///
/// `Input` is the structured data extracted from the utterance by the
/// winning pattern's builder.
pub trait FuzzySkill: Send + Sync + 'static {
    type Input: Send + 'static;

    fn meta(&self) -> &SkillMeta;

    fn patterns(&self) -> &[Pattern<Self::Input>];

    /// Produce the reply for a recognized input.
    fn generate_output(
        &self,
        ctx: &SkillContext,
        input: Self::Input,
    ) -> impl Future<Output = SkillOutput> + Send;

    /// The background producer for this skill, if it has one.
    fn auto_runnable(self: Arc<Self>) -> Option<Arc<dyn AutoRunnable>> {
        None
    }
}

/// Object-safe version of [`FuzzySkill`].
///
/// This trait exists so heterogeneous skills can live in one list
/// (`Arc<dyn Skill>`). A blanket implementation is provided for all types
/// implementing `FuzzySkill`.
pub trait Skill: Send + Sync {
    fn id(&self) -> &str;

    fn specificity(&self) -> Specificity;

    /// Best candidate for a normalized utterance, or `None` when every
    /// pattern's rule rejects it.
    fn score(self: Arc<Self>, normalized_input: &str) -> Option<Candidate>;

    fn as_auto_runnable(self: Arc<Self>) -> Option<Arc<dyn AutoRunnable>>;
}

impl<S: FuzzySkill> Skill for S {
    fn id(&self) -> &str {
        &self.meta().id
    }

    fn specificity(&self) -> Specificity {
        self.meta().specificity
    }

    fn score(self: Arc<Self>, normalized_input: &str) -> Option<Candidate> {
        let (score, input) = best_match(self.patterns(), normalized_input)?;
        let meta = self.meta().clone();
        let skill = Arc::clone(&self);
        Some(Candidate {
            skill_id: meta.id,
            specificity: meta.specificity,
            score,
            generate: Box::new(
                move |ctx: Arc<SkillContext>| -> BoxFuture<'static, SkillOutput> {
                    Box::pin(async move { skill.generate_output(&ctx, input).await })
                },
            ),
        })
    }

    fn as_auto_runnable(self: Arc<Self>) -> Option<Arc<dyn AutoRunnable>> {
        FuzzySkill::auto_runnable(self)
    }
}

type GenerateFn = Box<dyn FnOnce(Arc<SkillContext>) -> BoxFuture<'static, SkillOutput> + Send>;

/// A scored match, ready to produce its output.
pub struct Candidate {
    pub skill_id: String,
    pub specificity: Specificity,
    pub score: Score,
    generate: GenerateFn,
}

impl Candidate {
    /// Ranking key: specificity first, then score.
    pub fn rank(&self) -> (Specificity, Score) {
        (self.specificity, self.score)
    }

    /// The output future. Owns everything it needs, so it can be spawned.
    pub fn into_output(self, ctx: Arc<SkillContext>) -> BoxFuture<'static, SkillOutput> {
        (self.generate)(ctx)
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("skill_id", &self.skill_id)
            .field("specificity", &self.specificity)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

/// A skill that also produces output periodically without being asked.
pub trait AutoRunnable: Send + Sync {
    /// Refresh interval. `None` uses the scheduler's default.
    fn auto_update_interval(&self) -> Option<Duration>;

    fn auto_output<'a>(&'a self, ctx: &'a SkillContext) -> BoxFuture<'a, SkillOutput>;
}
