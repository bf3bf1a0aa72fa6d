use serde::{Deserialize, Serialize};

/// Outcome of checking one constraint against one layout.
///
/// `satisfied` always equals `violations.is_empty()`. `score` and `penalty` are computed
/// independently: a large raw penalty floors `score` at 0 and caps `penalty` at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintEvaluation {
    pub satisfied: bool,
    pub score: f64,
    pub violations: Vec<String>,
    pub penalty: f64,
}

impl ConstraintEvaluation {
    /// Result for a constraint whose referenced tool or position is absent.
    pub fn vacuous() -> Self {
        Self {
            satisfied: true,
            score: 1.0,
            violations: Vec::new(),
            penalty: 0.0,
        }
    }

    /// Builds a result from accumulated violations and raw penalty. A satisfied
    /// constraint always scores 1.
    pub fn from_violations(violations: Vec<String>, raw_penalty: f64) -> Self {
        let satisfied = violations.is_empty();
        Self {
            satisfied,
            score: if satisfied {
                1.0
            } else {
                (1.0 - raw_penalty).max(0.0)
            },
            violations,
            penalty: raw_penalty.min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vacuous_is_fully_satisfied() {
        let eval = ConstraintEvaluation::vacuous();
        assert!(eval.satisfied);
        assert_eq!(eval.score, 1.0);
        assert_eq!(eval.penalty, 0.0);
        assert!(eval.violations.is_empty());
    }

    #[test]
    fn large_penalty_floors_score_and_caps_penalty() {
        let eval = ConstraintEvaluation::from_violations(vec!["a".into(), "b".into()], 2.0);
        assert!(!eval.satisfied);
        assert_eq!(eval.score, 0.0);
        assert_eq!(eval.penalty, 1.0);
    }

    #[test]
    fn partial_penalty_is_reported_on_both_sides() {
        let eval = ConstraintEvaluation::from_violations(vec!["a".into()], 0.25);
        assert_eq!(eval.score, 0.75);
        assert_eq!(eval.penalty, 0.25);
    }
}
