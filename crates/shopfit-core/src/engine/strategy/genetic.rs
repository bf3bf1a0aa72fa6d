use super::moves::{displaced, grid_layout};
use super::{SearchContext, SearchStrategy};
use crate::core::models::layout::Layout;
use crate::engine::config::GeneticConfig;
use crate::engine::state::{Candidate, OptimizationState};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Generational genetic search over placement positions.
///
/// Layouts in one run share the catalog's placement order, so crossover splices the
/// positions of two parents at a single cut point. Elites survive unchanged; the rest
/// of each generation comes from tournament selection, crossover, and per-placement
/// jitter mutation.
#[derive(Debug, Clone)]
pub struct Genetic {
    params: GeneticConfig,
    jitter: f64,
    /// Last scored generation, best first.
    population: Vec<Candidate>,
}

impl Genetic {
    pub fn new(params: GeneticConfig, jitter: f64) -> Self {
        Self {
            params,
            jitter,
            population: Vec::new(),
        }
    }

    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    fn mutate(&self, ctx: &SearchContext<'_>, mut layout: Layout, rate: f64, rng: &mut ChaCha8Rng) -> Layout {
        for index in 0..layout.len() {
            if rng.gen_bool(rate) {
                let dx = rng.gen_range(-self.jitter..=self.jitter);
                let dy = rng.gen_range(-self.jitter..=self.jitter);
                layout = displaced(ctx, &layout, index, dx, dy);
            }
        }
        layout
    }

    fn tournament(&self, rng: &mut ChaCha8Rng) -> &Candidate {
        let size = self.params.tournament_size.clamp(1, self.population.len());
        (0..size)
            .map(|_| &self.population[rng.gen_range(0..self.population.len())])
            .reduce(|best, next| if next > best { next } else { best })
            .unwrap_or(&self.population[0])
    }

    fn crossover(a: &Layout, b: &Layout, rng: &mut ChaCha8Rng) -> Layout {
        let count = a.len().min(b.len());
        let mut child = a.clone();
        if count < 2 {
            return child;
        }
        let cut = rng.gen_range(1..count);
        for (slot, donor) in child.placements[cut..count].iter_mut().zip(&b.placements[cut..count]) {
            slot.position = donor.position;
            slot.parked_position = donor.parked_position;
        }
        child
    }
}

impl SearchStrategy for Genetic {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn initial(&mut self, ctx: &SearchContext<'_>, rng: &mut ChaCha8Rng) -> Vec<Layout> {
        let seed = grid_layout(ctx);
        let mut layouts = Vec::with_capacity(self.params.population_size);
        layouts.push(seed.clone());
        while layouts.len() < self.params.population_size.max(1) {
            layouts.push(self.mutate(ctx, seed.clone(), 1.0, rng));
        }
        layouts
    }

    fn propose(
        &mut self,
        ctx: &SearchContext<'_>,
        _state: &OptimizationState,
        rng: &mut ChaCha8Rng,
    ) -> Vec<Layout> {
        if self.population.is_empty() || self.population[0].layout.is_empty() {
            return Vec::new();
        }
        let size = self.params.population_size.max(1);
        let mut next: Vec<Layout> = self
            .population
            .iter()
            .take(self.params.elitism.min(size))
            .map(|c| c.layout.clone())
            .collect();
        while next.len() < size {
            let a = self.tournament(rng).layout.clone();
            let b = &self.tournament(rng).layout;
            let child = Self::crossover(&a, b, rng);
            next.push(self.mutate(ctx, child, self.params.mutation_rate, rng));
        }
        next
    }

    fn accept(&mut self, _current: &Candidate, _proposed: &Candidate, _rng: &mut ChaCha8Rng) -> bool {
        true
    }

    fn observe(&mut self, candidates: &[Candidate]) {
        self.population = candidates.to_vec();
        self.population.sort_by(|a, b| b.cmp(a));
    }

    fn status(&self) -> Option<String> {
        self.population
            .first()
            .map(|best| format!("GA generation best: {}", best.score.overall))
    }
}
