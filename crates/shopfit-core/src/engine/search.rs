//! The strategy-agnostic search loop.

use super::config::SearchConfig;
use super::progress::{Progress, ProgressReporter};
use super::state::{Candidate, OptimizationState, SearchState};
use super::strategy::{SearchContext, SearchStrategy};
use super::termination::{
    CompositeMonitor, InterruptMonitor, IterationLimitMonitor, PatienceMonitor, SearchCommand,
    SearchMonitor, SearchStatus, TimeLimitMonitor,
};
use crate::core::models::layout::Layout;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// The standard stop conditions of a run, cancellation first.
pub fn monitors_for<'a>(config: &SearchConfig, cancel: &'a AtomicBool) -> CompositeMonitor<'a> {
    let mut monitor = CompositeMonitor::new()
        .with(InterruptMonitor::new(cancel))
        .with(IterationLimitMonitor::new(config.max_iterations))
        .with(TimeLimitMonitor::new(config.time_limit));
    if let Some(patience) = config.patience {
        monitor = monitor.with(PatienceMonitor::new(patience));
    }
    monitor
}

/// Drives `strategy` until a monitor terminates the run or the strategy stops proposing.
///
/// The returned state is terminal and always holds a best candidate: the seed is scored
/// before any monitor is consulted, so a run that is cancelled or out of budget before
/// its first iteration still reports the seed layout.
#[instrument(skip_all, name = "search_loop", fields(algorithm = strategy.name()))]
pub fn run(
    ctx: &SearchContext<'_>,
    strategy: &mut dyn SearchStrategy,
    monitor: &dyn SearchMonitor,
    reporter: &ProgressReporter,
) -> OptimizationState {
    let started = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.config.seed);
    let mut state = OptimizationState::new(ctx.config.keep_candidates);
    state.start();

    let mut seeds = strategy.initial(ctx, &mut rng);
    if seeds.is_empty() {
        seeds.push(Layout::new(&ctx.workshop.id, Vec::new()));
    }
    let scored = ctx.evaluate_batch(seeds);
    state.record(&scored);
    strategy.observe(&scored);
    if let Some(seed) = best_of(&scored) {
        state.submit(seed.clone());
    }
    state.end_iteration(true, started.elapsed());
    debug!(
        seeds = scored.len(),
        score = state.best_score().map(|s| s.overall),
        "Seed layouts scored"
    );

    reporter.report(Progress::TaskStart {
        total_steps: ctx.config.max_iterations as u64,
    });

    loop {
        let status = SearchStatus {
            iterations: state.iterations,
            stale_iterations: state.stale_iterations,
            elapsed: started.elapsed(),
        };
        if let SearchCommand::Terminate { state: terminal, reason } = monitor.search_command(&status) {
            info!(iterations = state.iterations, %reason, "Search stopped");
            state.finish(terminal);
            break;
        }

        let proposals = strategy.propose(ctx, &state, &mut rng);
        if proposals.is_empty() {
            info!(iterations = state.iterations, "Strategy exhausted its neighbourhood");
            state.finish(SearchState::Converged);
            break;
        }
        state.iterations += 1;

        let scored = ctx.evaluate_batch(proposals);
        state.record(&scored);

        let mut improved = false;
        if let Some(proposed) = best_of(&scored) {
            let accepted = match &state.current {
                Some(current) => strategy.accept(current, proposed, &mut rng),
                None => true,
            };
            if accepted {
                improved = state.submit(proposed.clone());
            }
        }
        strategy.observe(&scored);
        state.end_iteration(improved, started.elapsed());

        reporter.report(Progress::TaskIncrement);
        if improved {
            let overall = state.best_score().map_or(0, |s| s.overall);
            debug!(iteration = state.iterations, overall, "New best layout");
            if let Some(text) = strategy.status() {
                reporter.report(Progress::StatusUpdate {
                    text: format!("{text} | best {overall}"),
                });
            }
        }
    }

    reporter.report(Progress::TaskFinish);
    state
}

/// The highest-ranked candidate; the earliest wins a tie.
fn best_of(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().rev().max()
}
