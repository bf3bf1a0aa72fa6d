//! # Engine Module
//!
//! The stateful search layer. It turns a workshop, a tool roster, and a constraint set
//! into a ranked layout by running one of several interchangeable search strategies
//! under a shared loop.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Search parameters, strategy tuning, and TOML loading
//! - **Strategies** ([`strategy`]) - Grid repair, simulated annealing, and genetic search
//! - **Search Loop** ([`search`]) - Seeding, proposal scoring, acceptance, and stop checks
//! - **Termination** ([`termination`]) - Iteration, time, patience, and cancellation monitors
//! - **State Tracking** ([`state`]) - Candidates, best-so-far, and convergence history
//! - **Constraint Cache** ([`cache`]) - Reuse of built constraint sets across runs
//! - **Progress Monitoring** ([`progress`]) - Phase and task events for callers
//! - **Error Handling** ([`error`]) - Engine-level error type
//!
//! Scoring is deterministic and every random decision draws from one seeded generator,
//! so two runs with the same inputs and seed return identical layouts.

pub mod cache;
pub mod config;
pub mod error;
pub mod progress;
pub mod search;
pub mod state;
pub mod strategy;
pub mod termination;
