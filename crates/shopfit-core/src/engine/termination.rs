//! Stop conditions checked by the search loop between iterations.

use super::state::SearchState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Snapshot of the loop counters handed to every monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchStatus {
    pub iterations: usize,
    pub stale_iterations: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchCommand {
    Continue,
    Terminate { state: SearchState, reason: String },
}

pub trait SearchMonitor {
    fn name(&self) -> &str;
    fn search_command(&self, status: &SearchStatus) -> SearchCommand;
}

#[derive(Debug, Clone)]
pub struct InterruptMonitor<'a> {
    stop_flag: &'a AtomicBool,
}

impl<'a> InterruptMonitor<'a> {
    pub fn new(stop_flag: &'a AtomicBool) -> Self {
        Self { stop_flag }
    }
}

impl SearchMonitor for InterruptMonitor<'_> {
    fn name(&self) -> &str {
        "InterruptMonitor"
    }

    fn search_command(&self, _status: &SearchStatus) -> SearchCommand {
        if self.stop_flag.load(Ordering::Relaxed) {
            SearchCommand::Terminate {
                state: SearchState::Cancelled,
                reason: "Cancellation requested".to_string(),
            }
        } else {
            SearchCommand::Continue
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IterationLimitMonitor {
    max_iterations: usize,
}

impl IterationLimitMonitor {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl SearchMonitor for IterationLimitMonitor {
    fn name(&self) -> &str {
        "IterationLimitMonitor"
    }

    fn search_command(&self, status: &SearchStatus) -> SearchCommand {
        if status.iterations >= self.max_iterations {
            SearchCommand::Terminate {
                state: SearchState::BudgetExhausted,
                reason: format!("Reached {} iterations", self.max_iterations),
            }
        } else {
            SearchCommand::Continue
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimeLimitMonitor {
    limit: Duration,
}

impl TimeLimitMonitor {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

impl SearchMonitor for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn search_command(&self, status: &SearchStatus) -> SearchCommand {
        if status.elapsed >= self.limit {
            SearchCommand::Terminate {
                state: SearchState::BudgetExhausted,
                reason: format!("Time limit of {:?} reached", self.limit),
            }
        } else {
            SearchCommand::Continue
        }
    }
}

/// Declares convergence after `patience` consecutive iterations without improvement.
#[derive(Debug, Clone, Copy)]
pub struct PatienceMonitor {
    patience: usize,
}

impl PatienceMonitor {
    pub fn new(patience: usize) -> Self {
        Self { patience }
    }
}

impl SearchMonitor for PatienceMonitor {
    fn name(&self) -> &str {
        "PatienceMonitor"
    }

    fn search_command(&self, status: &SearchStatus) -> SearchCommand {
        if status.stale_iterations >= self.patience {
            SearchCommand::Terminate {
                state: SearchState::Converged,
                reason: format!("No improvement for {} iterations", self.patience),
            }
        } else {
            SearchCommand::Continue
        }
    }
}

/// Runs monitors in insertion order; the first one asking to terminate wins.
#[derive(Default)]
pub struct CompositeMonitor<'a> {
    monitors: Vec<Box<dyn SearchMonitor + 'a>>,
}

impl<'a> CompositeMonitor<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, monitor: impl SearchMonitor + 'a) -> Self {
        self.monitors.push(Box::new(monitor));
        self
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl SearchMonitor for CompositeMonitor<'_> {
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn search_command(&self, status: &SearchStatus) -> SearchCommand {
        self.monitors
            .iter()
            .map(|m| m.search_command(status))
            .find(|command| *command != SearchCommand::Continue)
            .unwrap_or(SearchCommand::Continue)
    }
}
