use super::evaluation::ConstraintEvaluation;
use crate::core::models::geometry::Position;
use crate::core::models::layout::{Placement, PlacementIndex};
use crate::core::models::tool::ToolKind;
use crate::core::models::workshop::Workshop;
use crate::core::utils::geometry::{Side, SideClearances, planar_distance};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

const INCHES_PER_FOOT: f64 = 12.0;
const SOFT_BAND_RATE: f64 = 0.5;
const PARKED_PENALTY_SCALE: f64 = 0.5;

/// Required free space, in inches, around one tool kind. Left and right share `sides`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceRule {
    pub tool: ToolKind,
    pub front: f64,
    pub back: f64,
    pub sides: f64,
}

impl ClearanceRule {
    pub fn minimum(&self, side: Side) -> f64 {
        match side {
            Side::Front => self.front,
            Side::Back => self.back,
            Side::Left | Side::Right => self.sides,
        }
    }

    fn check(
        &self,
        placement: &Placement,
        position: &Position,
        workshop: &Workshop,
        penalty_scale: f64,
        describe: impl Fn(&str, Side, f64, f64) -> String,
    ) -> ConstraintEvaluation {
        let tool = &placement.tool;
        let clearances =
            SideClearances::around(position, &tool.dimensions, &workshop.dimensions);

        let mut violations = Vec::new();
        let mut total = 0.0;
        for (side, actual) in clearances.iter() {
            let min = self.minimum(side);
            if min <= 0.0 || actual >= min {
                continue;
            }
            violations.push(describe(&tool.name, side, actual, min));
            total += (min - actual) / min * penalty_scale;
        }
        ConstraintEvaluation::from_violations(violations, total)
    }
}

/// Tools that should all stay within `max_distance` inches of one another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyGroup {
    pub tools: Vec<ToolKind>,
    pub max_distance: f64,
    pub time_penalty_percentage: f64,
}

/// Preferred spacing between two tools, in feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceBandRule {
    pub from: ToolKind,
    pub to: ToolKind,
    pub ideal_feet: f64,
    pub max_feet: f64,
    pub penalty_per_foot: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    SafetyClearance(ClearanceRule),
    WorkflowAdjacency(AdjacencyGroup),
    WorkflowDistance(DistanceBandRule),
    MobileDeployedClearance(ClearanceRule),
    MobileParkedClearance(ClearanceRule),
}

impl ConstraintKind {
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintKind::SafetyClearance(_) => "safety_clearance",
            ConstraintKind::WorkflowAdjacency(_) => "workflow_adjacency",
            ConstraintKind::WorkflowDistance(_) => "workflow_distance",
            ConstraintKind::MobileDeployedClearance(_) => "mobile_deployed_clearance",
            ConstraintKind::MobileParkedClearance(_) => "mobile_parked_clearance",
        }
    }

    pub fn is_workflow(&self) -> bool {
        matches!(
            self,
            ConstraintKind::WorkflowAdjacency(_) | ConstraintKind::WorkflowDistance(_)
        )
    }

    pub fn references(&self, kind: &ToolKind) -> bool {
        match self {
            ConstraintKind::SafetyClearance(rule)
            | ConstraintKind::MobileDeployedClearance(rule)
            | ConstraintKind::MobileParkedClearance(rule) => &rule.tool == kind,
            ConstraintKind::WorkflowAdjacency(group) => group.tools.contains(kind),
            ConstraintKind::WorkflowDistance(band) => &band.from == kind || &band.to == kind,
        }
    }

    pub fn evaluate(&self, index: &PlacementIndex<'_>, workshop: &Workshop) -> ConstraintEvaluation {
        match self {
            ConstraintKind::SafetyClearance(rule) => safety_clearance(rule, index, workshop),
            ConstraintKind::WorkflowAdjacency(group) => adjacency(group, index),
            ConstraintKind::WorkflowDistance(band) => distance_band(band, index),
            ConstraintKind::MobileDeployedClearance(rule) => deployed(rule, index, workshop),
            ConstraintKind::MobileParkedClearance(rule) => parked(rule, index, workshop),
        }
    }
}

fn safety_clearance(
    rule: &ClearanceRule,
    index: &PlacementIndex<'_>,
    workshop: &Workshop,
) -> ConstraintEvaluation {
    let Some(placement) = index.get(&rule.tool) else {
        return ConstraintEvaluation::vacuous();
    };
    rule.check(placement, &placement.position, workshop, 1.0, |name, side, actual, min| {
        format!("{name} {side} clearance {actual}\" < required {min}\"")
    })
}

fn deployed(
    rule: &ClearanceRule,
    index: &PlacementIndex<'_>,
    workshop: &Workshop,
) -> ConstraintEvaluation {
    let Some(placement) = index.get_mobile(&rule.tool) else {
        return ConstraintEvaluation::vacuous();
    };
    rule.check(placement, &placement.position, workshop, 1.0, |name, side, actual, min| {
        format!("{name} deployed {side} {actual}\" < {min}\"")
    })
}

fn parked(
    rule: &ClearanceRule,
    index: &PlacementIndex<'_>,
    workshop: &Workshop,
) -> ConstraintEvaluation {
    let Some(placement) = index.get_mobile(&rule.tool) else {
        return ConstraintEvaluation::vacuous();
    };
    let Some(parked_at) = placement.parked_position.as_ref() else {
        return ConstraintEvaluation::vacuous();
    };
    // Stored tools only need an approach from the front; back and sides may sit flush.
    let tool = &placement.tool;
    let front = SideClearances::around(parked_at, &tool.dimensions, &workshop.dimensions).front;
    if rule.front <= 0.0 || front >= rule.front {
        return ConstraintEvaluation::from_violations(Vec::new(), 0.0);
    }
    ConstraintEvaluation::from_violations(
        vec![format!("{} parked front {front}\" < {}\"", tool.name, rule.front)],
        (rule.front - front) / rule.front * PARKED_PENALTY_SCALE,
    )
}

fn adjacency(group: &AdjacencyGroup, index: &PlacementIndex<'_>) -> ConstraintEvaluation {
    let placements: Vec<&Placement> = group
        .tools
        .iter()
        .unique()
        .filter_map(|kind| index.get(kind))
        .collect();
    if placements.len() < 2 || group.max_distance <= 0.0 {
        return ConstraintEvaluation::vacuous();
    }

    let mut violations = Vec::new();
    let mut total = 0.0;
    for (a, b) in placements.iter().tuple_combinations() {
        let distance = planar_distance(&a.position, &b.position);
        if distance > group.max_distance {
            let excess = distance - group.max_distance;
            violations.push(format!(
                "{} to {}: {:.1}\" > {}\"",
                a.tool.name, b.tool.name, distance, group.max_distance
            ));
            total += excess / group.max_distance * (group.time_penalty_percentage / 100.0);
        }
    }
    ConstraintEvaluation::from_violations(violations, total)
}

fn distance_band(band: &DistanceBandRule, index: &PlacementIndex<'_>) -> ConstraintEvaluation {
    let (Some(a), Some(b)) = (index.get(&band.from), index.get(&band.to)) else {
        return ConstraintEvaluation::vacuous();
    };

    let feet = planar_distance(&a.position, &b.position) / INCHES_PER_FOOT;
    let mut violations = Vec::new();
    let penalty = if feet > band.max_feet {
        violations.push(format!(
            "{} to {}: {:.1}' > {}' max",
            a.tool.name, b.tool.name, feet, band.max_feet
        ));
        (feet - band.max_feet) * band.penalty_per_foot
    } else if feet > band.ideal_feet {
        (feet - band.ideal_feet) * band.penalty_per_foot * SOFT_BAND_RATE
    } else {
        0.0
    };

    ConstraintEvaluation {
        satisfied: violations.is_empty(),
        score: (1.0 - penalty).max(0.0),
        violations,
        penalty: penalty.min(1.0),
    }
}
