//! Candidate selection across skills.

use std::sync::Arc;

use tracing::debug;

use voxa_types::score::Score;

use crate::skill::{Candidate, Skill};

/// Picks the winning candidate for an utterance.
///
/// Ordering: specificity first, then score. Skills are visited in
/// registration order and a later candidate wins only when strictly better,
/// so the first registered skill wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillRanker {
    min_score: f32,
}

impl SkillRanker {
    /// `min_score` discards weak candidates; `0.0` disables the floor.
    pub fn new(min_score: f32) -> Self {
        Self {
            min_score: min_score.clamp(0.0, 1.0),
        }
    }

    pub fn select(&self, skills: &[Arc<dyn Skill>], normalized_input: &str) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;

        for skill in skills {
            let Some(candidate) = Arc::clone(skill).score(normalized_input) else {
                continue;
            };
            if candidate.score.is_worst() || candidate.score < Score::new(self.min_score) {
                debug!(skill = %candidate.skill_id, score = %candidate.score, "candidate discarded");
                continue;
            }
            debug!(
                skill = %candidate.skill_id,
                specificity = %candidate.specificity,
                score = %candidate.score,
                "candidate"
            );
            if best.as_ref().is_none_or(|b| candidate.rank() > b.rank()) {
                best = Some(candidate);
            }
        }

        best
    }
}
