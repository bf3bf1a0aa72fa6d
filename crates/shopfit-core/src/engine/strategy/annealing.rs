//! Simulated annealing over single-placement moves.
//!
//! Worse proposals are accepted with the Metropolis probability `exp(delta / T)`, where
//! `delta` is the drop in overall score. The temperature decays geometrically each
//! iteration; once it falls below the configured minimum the schedule is frozen and
//! the strategy behaves as a hill climber.

use super::moves::{displaced, grid_layout, moved, swapped};
use super::{SearchContext, SearchStrategy};
use crate::core::models::geometry::Position;
use crate::core::models::layout::Layout;
use crate::engine::config::AnnealingConfig;
use crate::engine::state::{Candidate, OptimizationState};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

const SWAP_PROBABILITY: f64 = 0.1;
const RELOCATE_PROBABILITY: f64 = 0.1;

pub trait CoolingSchedule: std::fmt::Debug {
    fn update(&mut self);
    fn current(&self) -> f64;
    /// Below the frozen threshold worse moves are never accepted.
    fn is_frozen(&self) -> bool;
}

/// `T(k+1) = T(k) * alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricCooling {
    current: f64,
    alpha: f64,
    min_temp: f64,
}

impl GeometricCooling {
    pub fn new(initial: f64, alpha: f64, min_temp: f64) -> Self {
        Self {
            current: initial,
            alpha: alpha.clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON),
            min_temp,
        }
    }
}

impl CoolingSchedule for GeometricCooling {
    #[inline]
    fn update(&mut self) {
        self.current *= self.alpha;
    }

    #[inline]
    fn current(&self) -> f64 {
        self.current
    }

    #[inline]
    fn is_frozen(&self) -> bool {
        self.current <= self.min_temp || self.current <= f64::EPSILON
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedAnnealing<C: CoolingSchedule = GeometricCooling> {
    cooling: C,
    move_step: f64,
}

impl SimulatedAnnealing<GeometricCooling> {
    pub fn new(config: &AnnealingConfig) -> Self {
        Self::with_schedule(
            GeometricCooling::new(
                config.initial_temperature,
                config.cooling_rate,
                config.min_temperature,
            ),
            config.move_step,
        )
    }
}

impl<C: CoolingSchedule> SimulatedAnnealing<C> {
    pub fn with_schedule(cooling: C, move_step: f64) -> Self {
        Self { cooling, move_step }
    }

    pub fn temperature(&self) -> f64 {
        self.cooling.current()
    }

    fn random_move(&self, ctx: &SearchContext<'_>, layout: &Layout, rng: &mut ChaCha8Rng) -> Layout {
        let count = layout.len();
        let index = rng.gen_range(0..count);
        let roll: f64 = rng.r#gen();

        if roll < SWAP_PROBABILITY && count >= 2 {
            let mut other = rng.gen_range(0..count - 1);
            if other >= index {
                other += 1;
            }
            return swapped(ctx, layout, index, other);
        }
        if roll < SWAP_PROBABILITY + RELOCATE_PROBABILITY {
            let floor = &ctx.workshop.dimensions;
            let dims = &layout.placements[index].tool.dimensions;
            let max_x = (floor.length - dims.length).max(0.0);
            let max_y = (floor.width - dims.width).max(0.0);
            let target = Position::planar(rng.gen_range(0.0..=max_x), rng.gen_range(0.0..=max_y));
            return moved(ctx, layout, index, target);
        }
        let step = self.move_step;
        let dx = rng.gen_range(-step..=step);
        let dy = rng.gen_range(-step..=step);
        displaced(ctx, layout, index, dx, dy)
    }
}

impl<C: CoolingSchedule> SearchStrategy for SimulatedAnnealing<C> {
    fn name(&self) -> &'static str {
        "simulated_annealing"
    }

    fn initial(&mut self, ctx: &SearchContext<'_>, _rng: &mut ChaCha8Rng) -> Vec<Layout> {
        vec![grid_layout(ctx)]
    }

    fn propose(
        &mut self,
        ctx: &SearchContext<'_>,
        state: &OptimizationState,
        rng: &mut ChaCha8Rng,
    ) -> Vec<Layout> {
        match &state.current {
            Some(current) if !current.layout.is_empty() => {
                vec![self.random_move(ctx, &current.layout, rng)]
            }
            _ => Vec::new(),
        }
    }

    fn accept(&mut self, current: &Candidate, proposed: &Candidate, rng: &mut ChaCha8Rng) -> bool {
        let accepted = if proposed >= current {
            true
        } else if self.cooling.is_frozen() {
            false
        } else {
            let delta = proposed.score.overall as f64 - current.score.overall as f64;
            let probability = (delta / self.cooling.current()).exp();
            probability.is_finite() && rng.r#gen::<f64>() < probability
        };
        self.cooling.update();
        accepted
    }

    fn status(&self) -> Option<String> {
        Some(format!("SA temperature: {:.3}", self.cooling.current()))
    }
}
