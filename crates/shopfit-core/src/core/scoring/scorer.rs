use super::score::{CategoryScores, LayoutScore, ScoringWeights};
use crate::core::constraints::Constraint;
use crate::core::constraints::evaluation::ConstraintEvaluation;
use crate::core::constraints::factory::ConstraintSet;
use crate::core::constraints::kind::ConstraintKind;
use crate::core::constraints::priority::Priority;
use crate::core::models::layout::Layout;
use crate::core::models::workshop::Workshop;
use crate::core::utils::geometry::{SideClearances, planar_distance};
use itertools::Itertools;

pub const LEGAL_MIN_CLEARANCE: f64 = 28.0;
const LEGAL_PENALTY_BASE: f64 = 10.0;
const LEGAL_PENALTY_CAP: f64 = 100.0;
const WORKFLOW_MOBILE_BONUS: f64 = 10.0;
const SPACE_MOBILE_BONUS: f64 = 15.0;
const TARGET_UTILIZATION_PERCENT: f64 = 70.0;
const MAX_REACH_INCHES: f64 = 120.0;
const MOBILE_SAVINGS_FRACTION: f64 = 0.4;
const MAX_SAVINGS_PERCENT: f64 = 50.0;

/// Combines constraint evaluations and layout geometry into a [`LayoutScore`].
///
/// Scoring is pure: the same layout, workshop, and constraint set always give the same
/// score, and nothing is mutated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self {
            weights: weights.normalized(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(&self, layout: &Layout, workshop: &Workshop, constraints: &ConstraintSet) -> LayoutScore {
        let index = layout.index();
        let evaluations: Vec<(&Constraint, ConstraintEvaluation)> = constraints
            .iter()
            .map(|c| (c, c.evaluate_indexed(&index, workshop)))
            .collect();

        let categories = CategoryScores {
            safety: safety_score(&evaluations, layout, workshop),
            workflow: workflow_score(&evaluations, layout),
            space: space_score(layout, workshop),
            accessibility: accessibility_score(layout),
        };

        let penalties = evaluations
            .iter()
            .filter(|(_, eval)| !eval.satisfied)
            .map(|(c, eval)| eval.penalty * c.priority.weight())
            .sum();
        let violations = evaluations
            .into_iter()
            .flat_map(|(_, eval)| eval.violations)
            .collect();

        LayoutScore {
            overall: self.weights.combine(&categories),
            categories,
            violations,
            penalties,
        }
    }
}

/// Priority-weighted mean of the selected scores on a 0–100 scale, or 100 when none apply.
fn weighted_average<'a, 'c: 'a>(
    evaluations: impl Iterator<Item = &'a (&'c Constraint, ConstraintEvaluation)>,
) -> f64 {
    let (sum, weight) = evaluations.fold((0.0, 0.0), |(sum, weight), (c, eval)| {
        let w = c.priority.weight();
        (sum + eval.score * w, weight + w)
    });
    if weight > 0.0 { sum / weight * 100.0 } else { 100.0 }
}

fn is_safety(constraint: &Constraint) -> bool {
    matches!(constraint.kind, ConstraintKind::SafetyClearance(_))
        || constraint.priority == Priority::Required
}

fn safety_score(
    evaluations: &[(&Constraint, ConstraintEvaluation)],
    layout: &Layout,
    workshop: &Workshop,
) -> f64 {
    let base = weighted_average(evaluations.iter().filter(|(c, _)| is_safety(c)));
    (base - legal_floor_penalty(layout, workshop)).max(0.0)
}

/// Exponential penalty for every side of every placement closer than the legal minimum.
pub fn legal_floor_penalty(layout: &Layout, workshop: &Workshop) -> f64 {
    let penalty: f64 = layout
        .placements
        .iter()
        .flat_map(|p| {
            let sides =
                SideClearances::around(&p.position, &p.tool.dimensions, &workshop.dimensions);
            [sides.front, sides.back, sides.left, sides.right]
        })
        .filter(|clearance| *clearance < LEGAL_MIN_CLEARANCE)
        .map(|clearance| LEGAL_PENALTY_BASE * (LEGAL_MIN_CLEARANCE - clearance).exp2())
        .sum();
    penalty.min(LEGAL_PENALTY_CAP)
}

fn workflow_score(evaluations: &[(&Constraint, ConstraintEvaluation)], layout: &Layout) -> f64 {
    let base = weighted_average(evaluations.iter().filter(|(c, _)| c.kind.is_workflow()));
    (base + layout.mobile_ratio() * WORKFLOW_MOBILE_BONUS).min(100.0)
}

fn space_score(layout: &Layout, workshop: &Workshop) -> f64 {
    let area = workshop.floor_area();
    if layout.is_empty() || !(area > 0.0) {
        return 100.0;
    }
    let used: f64 = layout
        .placements
        .iter()
        .map(|p| p.tool.footprint_area() + p.tool.clearance_halo_area())
        .sum();
    let usage_percent = used / area * 100.0;
    let base = (100.0 - 2.0 * (usage_percent - TARGET_UTILIZATION_PERCENT).abs()).max(0.0);
    (base + layout.mobile_ratio() * SPACE_MOBILE_BONUS).min(100.0)
}

fn accessibility_score(layout: &Layout) -> f64 {
    let n = layout.len();
    if n < 2 {
        return 100.0;
    }
    let reachable = layout
        .placements
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| planar_distance(&a.position, &b.position) <= MAX_REACH_INCHES)
        .count();
    let pairs = n * (n - 1) / 2;
    let reachability = reachable as f64 / pairs as f64 * 100.0;
    (reachability - ergonomic_penalty(layout)).max(0.0)
}

/// Reserved for height and reach rules. No rules exist yet.
fn ergonomic_penalty(_layout: &Layout) -> f64 {
    0.0
}

/// Estimated percentage of floor area freed by making tools mobile, capped at 50.
pub fn space_savings_percent(tool_count: usize, mobile_count: usize, workshop_area: f64) -> f64 {
    if tool_count == 0 || mobile_count == 0 || !(workshop_area > 0.0) {
        return 0.0;
    }
    let ratio = mobile_count as f64 / tool_count as f64;
    let potential = workshop_area * MOBILE_SAVINGS_FRACTION * ratio;
    (potential / workshop_area * 100.0).min(MAX_SAVINGS_PERCENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constraints::factory::{ConstraintFactory, ConstraintSelection};
    use crate::core::models::geometry::{Clearance, Dimensions, Position};
    use crate::core::models::layout::Placement;
    use crate::core::models::tool::{Tool, ToolKind};
    use crate::core::research::data::ResearchData;
    use std::sync::Arc;

    fn shop(length: f64, width: f64) -> Workshop {
        Workshop::new("w", "Garage", Dimensions::new(length, width, 96.0))
    }

    fn tool(kind: ToolKind, dims: (f64, f64), mobile: bool) -> Arc<Tool> {
        let key = kind.key().to_string();
        Arc::new(
            Tool::new(&key, &key, kind, Dimensions::new(dims.0, dims.1, 30.0))
                .with_clearance(Clearance::new(12.0, 12.0, 12.0, 12.0, 0.0))
                .mobile(mobile),
        )
    }

    #[test]
    fn empty_layout_with_no_constraints_scores_full_marks() {
        let layout = Layout::new("w", Vec::new());
        let score = Scorer::new().score(&layout, &shop(213.0, 103.0), &ConstraintSet::default());
        assert_eq!(score.categories, CategoryScores::uniform(100.0));
        assert_eq!(score.overall, 100);
        assert_eq!(score.penalties, 0.0);
        assert!(score.violations.is_empty());
    }

    #[test]
    fn zero_area_workshop_defaults_space_and_accessibility() {
        let layout = Layout::new(
            "w",
            vec![Placement::new(tool(ToolKind::Planer, (10.0, 10.0), false), Position::default())],
        );
        let score = Scorer::new().score(&layout, &shop(0.0, 0.0), &ConstraintSet::default());
        assert_eq!(score.categories.space, 100.0);
        assert_eq!(score.categories.accessibility, 100.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let constraints =
            ConstraintFactory::build(&ResearchData::builtin(), &ConstraintSelection::all());
        let layout = Layout::new(
            "w",
            vec![
                Placement::new(tool(ToolKind::TableSaw, (84.0, 48.0), false), Position::planar(40.0, 30.0)),
                Placement::new(tool(ToolKind::Planer, (36.0, 24.0), true), Position::planar(150.0, 60.0))
                    .with_parked_position(Position::planar(170.0, 0.0)),
            ],
        );
        let workshop = shop(240.0, 160.0);
        let scorer = Scorer::new();
        let first = scorer.score(&layout, &workshop, &constraints);
        let second = scorer.score(&layout, &workshop, &constraints);
        assert_eq!(first, second);
    }

    #[test]
    fn violations_follow_constraint_order_and_penalties_use_priority_weights() {
        let constraints = ConstraintFactory::build(&ResearchData::builtin(), &ConstraintSelection::all());
        let layout = Layout::new(
            "w",
            vec![Placement::new(tool(ToolKind::TableSaw, (84.0, 48.0), false), Position::planar(0.0, 0.0))],
        );
        let score = Scorer::new().score(&layout, &shop(213.0, 103.0), &constraints);

        // only the safety clearance applies to a stationary table saw at the corner
        assert_eq!(score.violations.len(), 2);
        assert_eq!(score.penalties, 1.0 * Priority::Required.weight());
    }

    #[test]
    fn legal_floor_penalty_caps_at_one_hundred() {
        let layout = Layout::new(
            "w",
            vec![Placement::new(tool(ToolKind::Planer, (10.0, 10.0), false), Position::planar(0.0, 0.0))],
        );
        assert_eq!(legal_floor_penalty(&layout, &shop(213.0, 103.0)), 100.0);
    }

    #[test]
    fn legal_floor_penalty_grows_exponentially_with_deficit() {
        let workshop = shop(100.0, 100.0);
        let placement = |x: f64| {
            Layout::new(
                "w",
                vec![Placement::new(tool(ToolKind::Planer, (10.0, 10.0), false), Position::planar(x, 40.0))],
            )
        };
        // back clearance 27 (deficit 1) then 26 (deficit 2)
        assert_eq!(legal_floor_penalty(&placement(27.0), &workshop), 20.0);
        assert_eq!(legal_floor_penalty(&placement(26.0), &workshop), 40.0);
        assert_eq!(legal_floor_penalty(&placement(40.0), &workshop), 0.0);
    }

    #[test]
    fn accessibility_counts_pairs_within_reach() {
        let layout = Layout::new(
            "w",
            vec![
                Placement::new(tool(ToolKind::Planer, (10.0, 10.0), false), Position::planar(0.0, 0.0)),
                Placement::new(tool(ToolKind::Jointer, (10.0, 10.0), false), Position::planar(120.0, 0.0)),
                Placement::new(tool(ToolKind::BandSaw, (10.0, 10.0), false), Position::planar(300.0, 0.0)),
            ],
        );
        // only planer-jointer (exactly 120) is within reach: 1 of 3 pairs
        assert!((accessibility_score(&layout) - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn space_score_peaks_at_seventy_percent_usage() {
        // footprint 100 + halo 12 × 20 = 340 per tool; workshop area 340 / 0.7
        let workshop = shop(340.0 / 0.7, 1.0);
        let layout = Layout::new(
            "w",
            vec![Placement::new(tool(ToolKind::Planer, (10.0, 10.0), false), Position::default())],
        );
        assert!((space_score(&layout, &workshop) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn workflow_bonus_rewards_mobile_tools() {
        let layout = Layout::new(
            "w",
            vec![
                Placement::new(tool(ToolKind::Planer, (10.0, 10.0), true), Position::default()),
                Placement::new(tool(ToolKind::Jointer, (10.0, 10.0), false), Position::default()),
            ],
        );
        // no workflow constraints: base 100, capped
        assert_eq!(workflow_score(&[], &layout), 100.0);
    }

    #[test]
    fn space_savings_matches_reference_example() {
        assert!((space_savings_percent(10, 5, 213.0 * 103.0) - 20.0).abs() < 1e-9);
        assert_eq!(space_savings_percent(10, 0, 21939.0), 0.0);
        assert_eq!(space_savings_percent(0, 0, 21939.0), 0.0);
        assert_eq!(space_savings_percent(2, 2, 21939.0), 40.0);
    }

    #[test]
    fn custom_weights_are_normalized() {
        let scorer = Scorer::with_weights(ScoringWeights {
            safety: 4.0,
            workflow: 0.0,
            space: 0.0,
            accessibility: 0.0,
        });
        assert_eq!(scorer.weights().safety, 1.0);
    }
}
