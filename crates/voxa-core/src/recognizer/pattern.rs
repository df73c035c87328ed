//! Example phrases with optional extraction rules.
//!
//! A [`Pattern`] pairs a canonical example ("позвони маме") with an optional
//! regular expression that the utterance must match before it is scored. The
//! score is the edit-distance similarity between the utterance and the
//! example; the builder turns the rule's named groups into the skill's typed
//! input.

use std::fmt;
use std::sync::Arc;

use regex::{Captures, Regex};
use tracing::trace;

use voxa_types::error::PatternError;
use voxa_types::score::Score;

use crate::text::{normalize, similarity, strip_diacritics};

/// Named groups captured by a pattern's extraction rule.
pub struct Extraction<'t> {
    captures: Option<Captures<'t>>,
}

impl<'t> Extraction<'t> {
    /// An extraction with no captured groups.
    pub fn empty() -> Self {
        Self { captures: None }
    }

    /// Trimmed text of a named group. Empty groups count as absent.
    pub fn group(&self, name: &str) -> Option<&'t str> {
        self.captures
            .as_ref()?
            .name(name)
            .map(|m| m.as_str().trim())
            .filter(|text| !text.is_empty())
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.group(name).is_some()
    }
}

type Builder<T> = Arc<dyn Fn(&Extraction<'_>) -> T + Send + Sync>;

/// One recognizable phrasing of a skill request.
pub struct Pattern<T> {
    example: String,
    rule: Option<Regex>,
    builder: Builder<T>,
}

impl<T> Pattern<T> {
    /// A pattern that only matches utterances accepted by `rule`.
    ///
    /// The rule is matched against normalized input, so it should be written
    /// in lower case; diacritics in the rule are folded the same way as the
    /// input. Named groups are available to `builder` through [`Extraction`].
    pub fn new(
        example: &str,
        rule: &str,
        builder: impl Fn(&Extraction<'_>) -> T + Send + Sync + 'static,
    ) -> Result<Self, PatternError> {
        let rule = Regex::new(&strip_diacritics(rule)).map_err(|e| PatternError::InvalidRule {
            example: example.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            example: normalize(example),
            rule: Some(rule),
            builder: Arc::new(builder),
        })
    }

    /// A rule-less pattern: every utterance produces a candidate, scored
    /// purely by similarity to `example`.
    pub fn example_only(
        example: &str,
        builder: impl Fn(&Extraction<'_>) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            example: normalize(example),
            rule: None,
            builder: Arc::new(builder),
        }
    }

    /// The normalized example phrase.
    pub fn example(&self) -> &str {
        &self.example
    }

    /// Score a normalized utterance against this pattern.
    ///
    /// Returns `None` when the extraction rule rejects the utterance.
    pub fn evaluate(&self, normalized_input: &str) -> Option<(Score, T)> {
        let extraction = match &self.rule {
            Some(rule) => Extraction {
                captures: Some(rule.captures(normalized_input)?),
            },
            None => Extraction::empty(),
        };
        let score = Score::new(similarity(normalized_input, &self.example));
        Some((score, (self.builder)(&extraction)))
    }
}

impl<T> Clone for Pattern<T> {
    fn clone(&self) -> Self {
        Self {
            example: self.example.clone(),
            rule: self.rule.clone(),
            builder: Arc::clone(&self.builder),
        }
    }
}

impl<T> fmt::Debug for Pattern<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("example", &self.example)
            .field("rule", &self.rule.as_ref().map(Regex::as_str))
            .finish()
    }
}

/// Best-scoring pattern for the utterance.
///
/// A later pattern replaces the current best only with a strictly greater
/// score, so the earliest pattern wins ties. `None` when every rule rejects
/// the utterance.
pub fn best_match<T>(patterns: &[Pattern<T>], normalized_input: &str) -> Option<(Score, T)> {
    let mut best: Option<(Score, T)> = None;
    for pattern in patterns {
        let Some((score, input)) = pattern.evaluate(normalized_input) else {
            continue;
        };
        trace!(example = pattern.example(), %score, "pattern matched");
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, input));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Who(String),
        Nobody,
    }

    fn call_pattern() -> Pattern<Call> {
        Pattern::new(
            "позвони маме",
            r"(?:позвони|набери|позвонить)\s+(?P<who>.+)",
            |m| match m.group("who") {
                Some(who) => Call::Who(who.to_string()),
                None => Call::Nobody,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_rule_rejection_yields_no_candidate() {
        assert!(call_pattern().evaluate("который час").is_none());
    }

    #[test]
    fn test_rule_extracts_named_group() {
        let (score, call) = call_pattern().evaluate("позвони маме").unwrap();
        assert_eq!(score, Score::new(1.0));
        assert_eq!(call, Call::Who("маме".to_string()));
    }

    #[test]
    fn test_rule_may_match_substring() {
        let (score, call) = call_pattern().evaluate("пожалуйста позвони игорю").unwrap();
        assert_eq!(call, Call::Who("игорю".to_string()));
        assert!(score < Score::new(1.0));
    }

    #[test]
    fn test_rule_diacritics_are_folded() {
        let pattern = Pattern::new("который час", r"^который\s+час$", |_| ()).unwrap();
        assert!(pattern.evaluate(&normalize("Который час?")).is_some());
    }

    #[test]
    fn test_example_only_always_scores() {
        let pattern = Pattern::example_only("да", |_| true);
        let (score, answer) = pattern.evaluate("").unwrap();
        assert_eq!(score, Score::new(0.0));
        assert!(answer);
    }

    #[test]
    fn test_malformed_rule_is_an_error() {
        let err = Pattern::new("broken", r"(?P<who>", |_| ()).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_best_match_prefers_earliest_on_ties() {
        let patterns = vec![
            Pattern::example_only("да", |_| 1),
            Pattern::example_only("да", |_| 2),
            Pattern::example_only("нет", |_| 3),
        ];
        let (score, value) = best_match(&patterns, "да").unwrap();
        assert_eq!(score, Score::new(1.0));
        assert_eq!(value, 1);
    }

    #[test]
    fn test_best_match_none_when_all_rules_reject() {
        let patterns = vec![call_pattern()];
        assert!(best_match(&patterns, "поставь таймер").is_none());
    }
}
