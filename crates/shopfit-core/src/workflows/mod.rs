//! # Workflows Module
//!
//! Top-level entry points. A workflow validates the request, prepares constraints,
//! runs the configured search, and assembles the final layout and run statistics.
//!
//! - **Optimize** ([`optimize`]) - One layout optimization run, optionally backed by a
//!   caller-owned constraint cache and an entity store.

pub mod optimize;
