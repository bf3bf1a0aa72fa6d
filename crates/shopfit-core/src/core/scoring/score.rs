use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Per-category scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryScores {
    pub safety: f64,
    pub workflow: f64,
    pub space: f64,
    pub accessibility: f64,
}

impl CategoryScores {
    pub fn uniform(value: f64) -> Self {
        Self {
            safety: value,
            workflow: value,
            space: value,
            accessibility: value,
        }
    }
}

/// Relative importance of each category in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub safety: f64,
    pub workflow: f64,
    pub space: f64,
    pub accessibility: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            safety: 0.40,
            workflow: 0.25,
            space: 0.20,
            accessibility: 0.15,
        }
    }
}

impl ScoringWeights {
    /// Weights scaled to sum to one. Non-finite, negative, or all-zero weights fall
    /// back to the defaults.
    pub fn normalized(&self) -> Self {
        let parts = [self.safety, self.workflow, self.space, self.accessibility];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Self::default();
        }
        let sum: f64 = parts.iter().sum();
        if sum <= 0.0 {
            return Self::default();
        }
        Self {
            safety: self.safety / sum,
            workflow: self.workflow / sum,
            space: self.space / sum,
            accessibility: self.accessibility / sum,
        }
    }

    /// Weighted overall score, rounded to the nearest integer and clamped to `[0, 100]`.
    pub fn combine(&self, categories: &CategoryScores) -> u32 {
        let weighted = self.safety * categories.safety
            + self.workflow * categories.workflow
            + self.space * categories.space
            + self.accessibility * categories.accessibility;
        weighted.round().clamp(0.0, 100.0) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutScore {
    pub overall: u32,
    pub categories: CategoryScores,
    pub violations: Vec<String>,
    /// Diagnostic only. Sum of `penalty × priority weight` over unsatisfied constraints.
    pub penalties: f64,
}

impl LayoutScore {
    /// Ranking order: higher overall first, then lower penalties.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.overall.cmp(&other.overall).then_with(|| {
            other
                .penalties
                .partial_cmp(&self.penalties)
                .unwrap_or(Ordering::Equal)
        })
    }

    pub fn is_better_than(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Greater
    }
}
