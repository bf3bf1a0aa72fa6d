//! # Core Module
//!
//! Stateless building blocks for workshop layout evaluation.
//!
//! - **Entities** ([`models`]) - Workshop, tool, placement, and layout value types
//! - **Research Parameters** ([`research`]) - Clearance findings, workflow patterns, and
//!   mobile-tool records with TOML loading and a built-in dataset
//! - **Constraints** ([`constraints`]) - Typed constraint kinds, their evaluators, and the
//!   factory that builds a run's constraint set
//! - **Scoring** ([`scoring`]) - The four-category layout scorer
//! - **Geometry** ([`utils`]) - Planar clearance and distance helpers

pub mod constraints;
pub mod models;
pub mod research;
pub mod scoring;
pub mod utils;
