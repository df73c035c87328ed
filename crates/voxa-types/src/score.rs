//! Match confidence and ranking tiers.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse ranking tier declared by a skill.
///
/// Specificity is compared before score: a `High` candidate beats a `Low`
/// candidate no matter how well the `Low` one matched.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Specificity {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Confidence that an utterance addresses a pattern.
///
/// `Worst` is the sentinel for "no match at all" and orders below every
/// numeric value. Numeric values are clamped to `[0, 1]`, so `Score` has a
/// total order.
#[derive(Debug, Clone, Copy)]
pub enum Score {
    Worst,
    Value(f32),
}

impl Score {
    /// Build a numeric score, clamping into `[0, 1]`. NaN becomes `0.0`.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self::Value(0.0)
        } else {
            Self::Value(value.clamp(0.0, 1.0))
        }
    }

    pub fn is_worst(&self) -> bool {
        matches!(self, Self::Worst)
    }

    /// The numeric value, or `None` for the sentinel.
    pub fn value(&self) -> Option<f32> {
        match self {
            Self::Worst => None,
            Self::Value(v) => Some(*v),
        }
    }

    /// Score projected onto `[0, 1]`, with the sentinel mapped to `0.0`.
    pub fn in_unit_range(&self) -> f32 {
        self.value().unwrap_or(0.0)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::Worst
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Worst, Self::Worst) => Ordering::Equal,
            (Self::Worst, Self::Value(_)) => Ordering::Less,
            (Self::Value(_), Self::Worst) => Ordering::Greater,
            (Self::Value(a), Self::Value(b)) => a.total_cmp(b),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Worst => write!(f, "worst"),
            Self::Value(v) => write!(f, "{v:.3}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_clamps_into_unit_range() {
        assert_eq!(Score::new(1.7).value(), Some(1.0));
        assert_eq!(Score::new(-0.2).value(), Some(0.0));
        assert_eq!(Score::new(f32::NAN).value(), Some(0.0));
    }

    #[test]
    fn test_worst_orders_below_zero() {
        assert!(Score::Worst < Score::new(0.0));
        assert!(Score::new(0.0) < Score::new(0.01));
        assert_eq!(Score::Worst, Score::Worst);
    }

    #[test]
    fn test_worst_in_unit_range_is_zero() {
        assert_eq!(Score::Worst.in_unit_range(), 0.0);
        assert!(Score::Worst.is_worst());
    }

    #[test]
    fn test_specificity_order() {
        assert!(Specificity::High > Specificity::Medium);
        assert!(Specificity::Medium > Specificity::Low);
        assert_eq!(Specificity::default(), Specificity::Low);
    }

    #[test]
    fn test_ranking_tuple_prefers_specificity() {
        let low_perfect = (Specificity::Low, Score::new(1.0));
        let high_weak = (Specificity::High, Score::new(0.1));
        assert!(high_weak > low_perfect);
    }
}
