use super::moves::{footprint_centre, grid_layout, moved, swapped};
use super::{SearchContext, SearchStrategy};
use crate::core::models::geometry::Position;
use crate::core::models::layout::Layout;
use crate::engine::state::{Candidate, OptimizationState};
use nalgebra::Vector2;
use rand_chacha::ChaCha8Rng;

const MIN_STEP: f64 = 1.0;

/// Deterministic constraint repair starting from the grid seed.
///
/// Each iteration focuses on one placement, worst clearance deficit first, and proposes
/// its neighbourhood: nudges by the current step, a step toward the floor centre,
/// wall-anchored positions that honour the required clearances, and swaps with every
/// other placement. A proposal is taken only when it ranks strictly higher. When every
/// placement has been tried without improvement, the step is halved; once it cannot
/// shrink any further the search reports convergence by proposing nothing.
#[derive(Debug, Clone)]
pub struct GridRepair {
    step: f64,
    focus: usize,
    failures: usize,
    placements: usize,
}

impl GridRepair {
    pub fn new(step: f64) -> Self {
        Self {
            step: step.max(MIN_STEP),
            focus: 0,
            failures: 0,
            placements: 0,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    fn exhausted(&self) -> bool {
        self.placements > 0 && self.failures >= self.placements && self.step <= MIN_STEP
    }

    fn neighbourhood(&self, ctx: &SearchContext<'_>, layout: &Layout, index: usize) -> Vec<Layout> {
        let placement = &layout.placements[index];
        let floor = &ctx.workshop.dimensions;
        let dims = &placement.tool.dimensions;
        let required = ctx.required_clearance(placement);
        let p = placement.position;
        let s = self.step;

        let mut targets = vec![
            Position::new(p.x + s, p.y, p.z),
            Position::new(p.x - s, p.y, p.z),
            Position::new(p.x, p.y + s, p.z),
            Position::new(p.x, p.y - s, p.z),
            Position::new(required.back, p.y, p.z),
            Position::new(floor.length - dims.length - required.front, p.y, p.z),
            Position::new(p.x, required.left, p.z),
            Position::new(p.x, floor.width - dims.width - required.right, p.z),
        ];

        let to_centre = Vector2::new(floor.length / 2.0, floor.width / 2.0) - footprint_centre(placement);
        let distance = to_centre.norm();
        if distance > f64::EPSILON {
            let shift = to_centre * (s.min(distance) / distance);
            targets.push(Position::new(p.x + shift.x, p.y + shift.y, p.z));
        }

        let mut proposals: Vec<Layout> = targets
            .into_iter()
            .map(|target| moved(ctx, layout, index, target))
            .filter(|next| next.placements[index].position != p)
            .collect();
        proposals.extend(
            (0..layout.len())
                .filter(|&other| other != index)
                .map(|other| swapped(ctx, layout, index, other)),
        );
        proposals
    }
}

impl SearchStrategy for GridRepair {
    fn name(&self) -> &'static str {
        "grid_repair"
    }

    fn initial(&mut self, ctx: &SearchContext<'_>, _rng: &mut ChaCha8Rng) -> Vec<Layout> {
        self.placements = ctx.tools.len();
        vec![grid_layout(ctx)]
    }

    fn propose(
        &mut self,
        ctx: &SearchContext<'_>,
        state: &OptimizationState,
        _rng: &mut ChaCha8Rng,
    ) -> Vec<Layout> {
        let Some(current) = &state.current else {
            return Vec::new();
        };
        let layout = &current.layout;
        self.placements = layout.len();
        if layout.is_empty() || self.exhausted() {
            return Vec::new();
        }

        let deficits: Vec<f64> = layout
            .placements
            .iter()
            .map(|p| ctx.clearance_deficit(p))
            .collect();
        let mut order: Vec<usize> = (0..layout.len()).collect();
        order.sort_by(|&a, &b| deficits[b].total_cmp(&deficits[a]));

        let index = order[self.focus % order.len()];
        self.neighbourhood(ctx, layout, index)
    }

    fn accept(&mut self, current: &Candidate, proposed: &Candidate, _rng: &mut ChaCha8Rng) -> bool {
        if proposed > current {
            self.focus = 0;
            self.failures = 0;
            return true;
        }
        self.focus += 1;
        self.failures += 1;
        if self.placements > 0 && self.failures >= self.placements && self.step > MIN_STEP {
            self.step = (self.step / 2.0).max(MIN_STEP);
            self.failures = 0;
            self.focus = 0;
        }
        false
    }

    fn status(&self) -> Option<String> {
        Some(format!("Grid step: {:.1}\"", self.step))
    }
}
