//! Multi-objective layout scoring.
//!
//! Four category scores in `[0, 100]` are combined into one integer overall score:
//!
//! - **Safety**: priority-weighted clearance constraint scores, minus an exponential
//!   penalty for sides closer than the 28" legal minimum.
//! - **Workflow**: priority-weighted adjacency and distance-band scores plus a bonus for
//!   mobile tools.
//! - **Space**: floor utilization on a peak curve centred at 70%, plus a mobile bonus.
//! - **Accessibility**: share of tool pairs within 120" of each other.

pub mod score;
pub mod scorer;

pub use score::{CategoryScores, LayoutScore, ScoringWeights};
pub use scorer::{Scorer, space_savings_percent};
