//! # shopfit
//!
//! Constraint scoring and layout search for small woodworking shops.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless models (workshops, tools, layouts), research
//!   data and its built-in defaults, the constraint factory and evaluator, and the
//!   multi-objective scorer.
//!
//! - **[`engine`]: The Search.** Configuration, pluggable strategies, the search loop
//!   with its termination monitors, and the constraint cache.
//!
//! - **[`workflows`]: The Public API.** Runs an optimization end to end and reports the
//!   best layout with run statistics.
//!
//! - **[`store`]** is the seam to wherever workshops and layouts are persisted.

pub mod core;
pub mod engine;
pub mod store;
pub mod workflows;
