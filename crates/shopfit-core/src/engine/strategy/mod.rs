//! Pluggable layout search strategies.
//!
//! A strategy proposes layouts and decides whether a proposal replaces the current
//! solution. Termination, incumbent tracking, and scoring belong to the search loop in
//! [`crate::engine::search`], so every strategy shares the same budget and
//! cancellation behaviour.

pub mod annealing;
pub mod genetic;
pub mod grid;
mod moves;

use super::config::{Algorithm, SearchConfig};
use super::state::{Candidate, OptimizationState};
use crate::core::constraints::factory::ConstraintSet;
use crate::core::constraints::kind::{ClearanceRule, ConstraintKind};
use crate::core::models::geometry::Clearance;
use crate::core::models::layout::{Layout, Placement};
use crate::core::models::tool::{Tool, ToolKind};
use crate::core::models::workshop::Workshop;
use crate::core::scoring::Scorer;
use crate::core::scoring::scorer::LEGAL_MIN_CLEARANCE;
use crate::core::utils::geometry::SideClearances;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Clearance assumed for a parked tool when no parked rule exists for its kind.
const DEFAULT_PARKED: Clearance = Clearance {
    front: 12.0,
    back: 0.0,
    left: 6.0,
    right: 6.0,
    top: 0.0,
};

pub trait SearchStrategy {
    fn name(&self) -> &'static str;

    /// Seed layouts scored before the first iteration. The best becomes the current solution.
    fn initial(&mut self, ctx: &SearchContext<'_>, rng: &mut ChaCha8Rng) -> Vec<Layout>;

    /// Layouts to score this iteration. An empty proposal ends the search as converged.
    fn propose(
        &mut self,
        ctx: &SearchContext<'_>,
        state: &OptimizationState,
        rng: &mut ChaCha8Rng,
    ) -> Vec<Layout>;

    /// Whether the best proposal of an iteration replaces the current solution.
    fn accept(&mut self, current: &Candidate, proposed: &Candidate, rng: &mut ChaCha8Rng) -> bool;

    /// Every scored proposal of the iteration, in proposal order.
    fn observe(&mut self, _candidates: &[Candidate]) {}

    /// Short human-readable state for progress reporting.
    fn status(&self) -> Option<String> {
        None
    }
}

pub fn create(config: &SearchConfig) -> Box<dyn SearchStrategy> {
    match config.algorithm {
        Algorithm::GridRepair => Box::new(grid::GridRepair::new(config.grid_step)),
        Algorithm::SimulatedAnnealing => {
            Box::new(annealing::SimulatedAnnealing::new(&config.annealing))
        }
        Algorithm::Genetic => Box::new(genetic::Genetic::new(config.genetic, config.grid_step)),
    }
}

/// Read-only inputs shared by the loop and the strategy for one run.
pub struct SearchContext<'a> {
    pub workshop: &'a Workshop,
    pub tools: &'a [Arc<Tool>],
    pub constraints: &'a ConstraintSet,
    pub config: &'a SearchConfig,
    scorer: Scorer,
    working: HashMap<ToolKind, Clearance>,
    mobile_working: HashMap<ToolKind, Clearance>,
    parked: HashMap<ToolKind, Clearance>,
}

fn widen(target: &mut Clearance, rule: &ClearanceRule) {
    target.front = target.front.max(rule.front);
    target.back = target.back.max(rule.back);
    target.left = target.left.max(rule.sides);
    target.right = target.right.max(rule.sides);
}

impl<'a> SearchContext<'a> {
    pub fn new(
        workshop: &'a Workshop,
        tools: &'a [Arc<Tool>],
        constraints: &'a ConstraintSet,
        config: &'a SearchConfig,
    ) -> Self {
        let mut working: HashMap<ToolKind, Clearance> = HashMap::new();
        let mut mobile_working: HashMap<ToolKind, Clearance> = HashMap::new();
        let mut parked: HashMap<ToolKind, Clearance> = HashMap::new();
        for constraint in constraints {
            match &constraint.kind {
                ConstraintKind::SafetyClearance(rule) => {
                    widen(working.entry(rule.tool.clone()).or_default(), rule)
                }
                ConstraintKind::MobileDeployedClearance(rule) => {
                    widen(mobile_working.entry(rule.tool.clone()).or_default(), rule)
                }
                ConstraintKind::MobileParkedClearance(rule) => {
                    widen(parked.entry(rule.tool.clone()).or_default(), rule)
                }
                ConstraintKind::WorkflowAdjacency(_) | ConstraintKind::WorkflowDistance(_) => {}
            }
        }

        Self {
            workshop,
            tools,
            constraints,
            config,
            scorer: Scorer::with_weights(config.weights),
            working,
            mobile_working,
            parked,
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn evaluate(&self, layout: Layout) -> Candidate {
        let score = self.scorer.score(&layout, self.workshop, self.constraints);
        Candidate::new(layout, score)
    }

    /// Scores a batch, preserving input order.
    pub fn evaluate_batch(&self, layouts: Vec<Layout>) -> Vec<Candidate> {
        #[cfg(feature = "parallel")]
        {
            layouts.into_par_iter().map(|l| self.evaluate(l)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            layouts.into_iter().map(|l| self.evaluate(l)).collect()
        }
    }

    /// Free space a placement should keep on each side: the widest of its own catalog
    /// clearance, the legal minimum, and every clearance rule that applies to it.
    pub fn required_clearance(&self, placement: &Placement) -> Clearance {
        let tool = &placement.tool;
        let mut required = Clearance {
            front: tool.min_clearance.front.max(LEGAL_MIN_CLEARANCE),
            back: tool.min_clearance.back.max(LEGAL_MIN_CLEARANCE),
            left: tool.min_clearance.left.max(LEGAL_MIN_CLEARANCE),
            right: tool.min_clearance.right.max(LEGAL_MIN_CLEARANCE),
            top: tool.min_clearance.top,
        };
        let mut rules = vec![self.working.get(&tool.kind)];
        if tool.is_mobile {
            rules.push(self.mobile_working.get(&tool.kind));
        }
        for rule in rules.into_iter().flatten() {
            required.front = required.front.max(rule.front);
            required.back = required.back.max(rule.back);
            required.left = required.left.max(rule.left);
            required.right = required.right.max(rule.right);
        }
        required
    }

    pub fn parked_clearance(&self, kind: &ToolKind) -> Clearance {
        self.parked.get(kind).copied().unwrap_or(DEFAULT_PARKED)
    }

    /// Total shortfall, in inches, between a placement's clearances and what it requires.
    pub fn clearance_deficit(&self, placement: &Placement) -> f64 {
        let required = self.required_clearance(placement);
        let actual = SideClearances::around(
            &placement.position,
            &placement.tool.dimensions,
            &self.workshop.dimensions,
        );
        (required.front - actual.front).max(0.0)
            + (required.back - actual.back).max(0.0)
            + (required.left - actual.left).max(0.0)
            + (required.right - actual.right).max(0.0)
    }
}
