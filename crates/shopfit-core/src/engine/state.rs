use crate::core::models::layout::Layout;
use crate::core::scoring::LayoutScore;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    #[default]
    Idle,
    Running,
    Converged,
    BudgetExhausted,
    Cancelled,
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SearchState::Converged | SearchState::BudgetExhausted | SearchState::Cancelled
        )
    }
}

/// A scored layout. Ordered by [`LayoutScore::rank_cmp`], so the greatest candidate is
/// the best one.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub layout: Layout,
    pub score: LayoutScore,
}

impl Candidate {
    pub fn new(layout: Layout, score: LayoutScore) -> Self {
        Self { layout, score }
    }

    pub fn into_layout(self) -> Layout {
        self.layout.with_score(self.score)
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.rank_cmp(&other.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    pub iteration: usize,
    pub score: u32,
    pub elapsed: Duration,
}

/// Mutable bookkeeping of one search run. Owned by the search loop only.
#[derive(Debug, Default)]
pub struct OptimizationState {
    pub state: SearchState,
    pub current: Option<Candidate>,
    pub best: Option<Candidate>,
    pub iterations: usize,
    pub stale_iterations: usize,
    pub convergence: Vec<ConvergencePoint>,
    pub history: Vec<Candidate>,
    keep_history: bool,
}

impl OptimizationState {
    pub fn new(keep_history: bool) -> Self {
        Self {
            keep_history,
            ..Default::default()
        }
    }

    pub fn start(&mut self) {
        self.state = SearchState::Running;
    }

    pub fn finish(&mut self, terminal: SearchState) {
        debug_assert!(terminal.is_terminal());
        self.state = terminal;
    }

    pub fn best_score(&self) -> Option<&LayoutScore> {
        self.best.as_ref().map(|c| &c.score)
    }

    /// Records every scored candidate of a batch when history is kept.
    pub fn record(&mut self, candidates: &[Candidate]) {
        if self.keep_history {
            self.history.extend_from_slice(candidates);
        }
    }

    /// Makes `candidate` the current solution and promotes it to best when it ranks
    /// strictly higher. Returns whether the best improved.
    pub fn submit(&mut self, candidate: Candidate) -> bool {
        let improved = match &self.best {
            Some(best) => candidate > *best,
            None => true,
        };
        if improved {
            self.best = Some(candidate.clone());
        }
        self.current = Some(candidate);
        improved
    }

    /// Closes an iteration: updates the stale counter and appends a convergence point.
    pub fn end_iteration(&mut self, improved: bool, elapsed: Duration) {
        if improved {
            self.stale_iterations = 0;
        } else {
            self.stale_iterations += 1;
        }
        if let Some(best) = &self.best {
            self.convergence.push(ConvergencePoint {
                iteration: self.iterations,
                score: best.score.overall,
                elapsed,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(overall: u32, penalties: f64) -> Candidate {
        Candidate::new(
            Layout::new("w", Vec::new()),
            LayoutScore {
                overall,
                penalties,
                ..LayoutScore::default()
            },
        )
    }

    #[test]
    fn only_final_states_are_terminal() {
        assert!(!SearchState::Idle.is_terminal());
        assert!(!SearchState::Running.is_terminal());
        assert!(SearchState::Converged.is_terminal());
        assert!(SearchState::BudgetExhausted.is_terminal());
        assert!(SearchState::Cancelled.is_terminal());
    }

    #[test]
    fn candidates_order_by_score_then_lower_penalty() {
        let mut candidates = vec![candidate(70, 0.0), candidate(90, 5.0), candidate(90, 1.0)];
        candidates.sort();
        let ranked: Vec<(u32, f64)> = candidates
            .iter()
            .map(|c| (c.score.overall, c.score.penalties))
            .collect();
        assert_eq!(ranked, vec![(70, 0.0), (90, 5.0), (90, 1.0)]);
    }

    #[test]
    fn submit_promotes_only_strict_improvements() {
        let mut state = OptimizationState::new(false);
        assert!(state.submit(candidate(50, 0.0)));
        assert!(!state.submit(candidate(50, 0.0)));
        assert!(!state.submit(candidate(40, 0.0)));
        assert_eq!(state.current.as_ref().unwrap().score.overall, 40);
        assert_eq!(state.best_score().unwrap().overall, 50);
        assert!(state.submit(candidate(60, 0.0)));
    }

    #[test]
    fn end_iteration_tracks_stale_count_and_convergence() {
        let mut state = OptimizationState::new(false);
        state.submit(candidate(50, 0.0));
        state.iterations = 1;
        state.end_iteration(false, Duration::ZERO);
        state.iterations = 2;
        state.end_iteration(false, Duration::ZERO);
        assert_eq!(state.stale_iterations, 2);
        state.iterations = 3;
        state.end_iteration(true, Duration::ZERO);
        assert_eq!(state.stale_iterations, 0);
        let iterations: Vec<usize> = state.convergence.iter().map(|p| p.iteration).collect();
        assert_eq!(iterations, vec![1, 2, 3]);
    }

    #[test]
    fn history_is_only_kept_when_requested() {
        let mut kept = OptimizationState::new(true);
        kept.record(&[candidate(1, 0.0), candidate(2, 0.0)]);
        assert_eq!(kept.history.len(), 2);

        let mut dropped = OptimizationState::new(false);
        dropped.record(&[candidate(1, 0.0)]);
        assert!(dropped.history.is_empty());
    }
}
