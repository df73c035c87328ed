//! Generic yes/no recognizer for confirmation follow-ups.
//!
//! Never registered as a top-level skill: other skills install it through
//! `InteractionPlan::replace` with a closure that acts on the answer.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use voxa_types::error::PatternError;
use voxa_types::locale::Locale;
use voxa_types::score::Specificity;
use voxa_types::skill::SkillMeta;

use crate::recognizer::Pattern;
use crate::skill::{FuzzySkill, Skill, SkillContext, SkillOutput};

pub const YES_NO_ID: &str = "yes_no";

const YES_RULE: &str = r"^(?:да|ага|угу|конечно|давай|верно|yes|yeah|yep|sure|ok|okay)\b";
const NO_RULE: &str = r"^(?:нет|неа|не надо|не нужно|отмена|no|nope|cancel)\b";

const ANSWER_RULES: [(&str, &str, bool); 4] = [
    ("да", YES_RULE, true),
    ("yes", YES_RULE, true),
    ("нет", NO_RULE, false),
    ("no", NO_RULE, false),
];

type AnswerFn = Arc<dyn Fn(bool, Locale) -> BoxFuture<'static, SkillOutput> + Send + Sync>;

fn compile(rules: &[(&str, &str, bool)]) -> Result<Vec<Pattern<bool>>, PatternError> {
    rules
        .iter()
        .map(|&(example, rule, answer)| Pattern::new(example, rule, move |_| answer))
        .collect()
}

/// Affirmative and negative patterns. Skills that confirm compile these once
/// at construction and hand them to every [`YesNoSkill`] they install.
pub fn yes_no_patterns() -> Result<Vec<Pattern<bool>>, PatternError> {
    compile(&ANSWER_RULES)
}

/// Recognizes an affirmative or negative answer and hands it to `on_answer`.
pub struct YesNoSkill {
    meta: SkillMeta,
    patterns: Vec<Pattern<bool>>,
    on_answer: AnswerFn,
}

impl YesNoSkill {
    pub fn new(
        patterns: Vec<Pattern<bool>>,
        on_answer: impl Fn(bool, Locale) -> BoxFuture<'static, SkillOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            meta: SkillMeta::new(YES_NO_ID, Specificity::Low),
            patterns,
            on_answer: Arc::new(on_answer),
        }
    }

    /// Boxed as a follow-up skill, ready for `InteractionPlan::replace`.
    pub fn arc(
        patterns: &[Pattern<bool>],
        on_answer: impl Fn(bool, Locale) -> BoxFuture<'static, SkillOutput> + Send + Sync + 'static,
    ) -> Arc<dyn Skill> {
        Arc::new(Self::new(patterns.to_vec(), on_answer))
    }
}

impl FuzzySkill for YesNoSkill {
    type Input = bool;

    fn meta(&self) -> &SkillMeta {
        &self.meta
    }

    fn patterns(&self) -> &[Pattern<bool>] {
        &self.patterns
    }

    async fn generate_output(&self, ctx: &SkillContext, answer: bool) -> SkillOutput {
        (self.on_answer)(answer, ctx.locale).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_context;
    use crate::text::normalize;

    fn echo_answer() -> Arc<dyn Skill> {
        YesNoSkill::arc(&yes_no_patterns().unwrap(), |answer, _locale| {
            Box::pin(async move { SkillOutput::new(if answer { "yes" } else { "no" }) })
        })
    }

    async fn answer(skill: &Arc<dyn Skill>, utterance: &str) -> Option<String> {
        let (ctx, _) = test_context();
        let candidate = Arc::clone(skill).score(&normalize(utterance))?;
        Some(candidate.into_output(ctx).await.speech)
    }

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(yes_no_patterns().unwrap().len(), 4);
    }

    #[test]
    fn test_malformed_rule_is_reported() {
        let err = compile(&[("да", YES_RULE, true), ("broken", r"(?P<x>", false)]).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[tokio::test]
    async fn test_recognizes_affirmative_answers() {
        let skill = echo_answer();
        for utterance in ["Да", "да, конечно", "Ага!", "yes please", "Sure"] {
            assert_eq!(answer(&skill, utterance).await.as_deref(), Some("yes"), "{utterance}");
        }
    }

    #[tokio::test]
    async fn test_recognizes_negative_answers() {
        let skill = echo_answer();
        for utterance in ["Нет", "нет, спасибо", "не надо", "No", "nope"] {
            assert_eq!(answer(&skill, utterance).await.as_deref(), Some("no"), "{utterance}");
        }
    }

    #[tokio::test]
    async fn test_other_utterances_do_not_match() {
        let skill = echo_answer();
        assert_eq!(answer(&skill, "может быть").await, None);
        assert_eq!(answer(&skill, "данные").await, None);
    }
}
