use super::Constraint;
use super::kind::{AdjacencyGroup, ClearanceRule, ConstraintKind, DistanceBandRule};
use super::priority::Priority;
use crate::core::models::tool::{Tool, ToolKind};
use crate::core::research::builtin::DEFAULT_PROJECT_TYPES;
use crate::core::research::data::{ResearchData, SkippedRecord};
use crate::core::research::records::{
    AdjacencyRule, ClearanceRequirement, DistanceBand, MobileToolRecord, SafetyFinding,
    WorkflowPattern,
};
use itertools::Itertools;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Which parts of the research data a run needs constraints for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ConstraintSelection {
    /// Requested project types. Empty selects the default project types.
    pub project_types: Vec<String>,
    /// Mobile tool kinds on the roster. `None` keeps every mobile record.
    pub mobile_kinds: Option<Vec<ToolKind>>,
}

impl ConstraintSelection {
    pub fn all() -> Self {
        Self::default()
    }

    /// Selection for a concrete tool roster: mobile records are limited to kinds of
    /// tools flagged as mobile.
    pub fn for_roster(project_types: &[String], tools: &[Arc<Tool>]) -> Self {
        let mobile_kinds = tools
            .iter()
            .filter(|t| t.is_mobile)
            .map(|t| t.kind.clone())
            .sorted()
            .dedup()
            .collect();
        Self {
            project_types: project_types.to_vec(),
            mobile_kinds: Some(mobile_kinds),
        }
    }

    /// Order-insensitive form used as a cache key.
    pub fn normalized(&self) -> Self {
        Self {
            project_types: self
                .project_types
                .iter()
                .map(|p| p.trim().to_lowercase())
                .sorted()
                .dedup()
                .collect(),
            mobile_kinds: self
                .mobile_kinds
                .as_ref()
                .map(|kinds| kinds.iter().cloned().sorted().dedup().collect()),
        }
    }

    fn wants_pattern(&self, pattern: &WorkflowPattern) -> bool {
        if self.project_types.is_empty() {
            DEFAULT_PROJECT_TYPES.iter().any(|p| pattern.matches(p))
        } else {
            self.project_types.iter().any(|p| pattern.matches(p))
        }
    }

    fn wants_mobile(&self, kind: &ToolKind) -> bool {
        self.mobile_kinds
            .as_ref()
            .is_none_or(|kinds| kinds.contains(kind))
    }
}

/// Constraints for one run, ordered by descending priority, plus every research entry
/// that was dropped on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
    skipped: Vec<SkippedRecord>,
}

impl ConstraintSet {
    pub fn new(mut constraints: Vec<Constraint>, skipped: Vec<SkippedRecord>) -> Self {
        constraints.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self {
            constraints,
            skipped,
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.id == id)
    }

    pub fn for_tool<'a>(&'a self, kind: &'a ToolKind) -> impl Iterator<Item = &'a Constraint> {
        self.constraints.iter().filter(move |c| c.references(kind))
    }

    pub fn required(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.priority == Priority::Required)
    }

    /// Combines two sets, keeping the first constraint for any repeated id.
    pub fn merge(self, other: ConstraintSet) -> Self {
        let mut skipped = self.skipped;
        skipped.extend(other.skipped);
        let mut seen = HashSet::new();
        let mut constraints = Vec::new();
        for (index, constraint) in self
            .constraints
            .into_iter()
            .chain(other.constraints)
            .enumerate()
        {
            if seen.insert(constraint.id.clone()) {
                constraints.push(constraint);
            } else {
                skipped.push(SkippedRecord::new(
                    "constraints",
                    index,
                    format!("duplicate constraint id '{}'", constraint.id),
                ));
            }
        }
        Self::new(constraints, skipped)
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}

fn clearance_rule(
    tool: &ToolKind,
    requirement: &ClearanceRequirement,
) -> Result<ClearanceRule, String> {
    let rule = ClearanceRule {
        tool: tool.clone(),
        front: requirement.front.min_inches(),
        back: requirement.back.min_inches(),
        sides: requirement.sides.min_inches(),
    };
    for (label, value) in [("front", rule.front), ("back", rule.back), ("sides", rule.sides)] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{label} minimum must be a non-negative number, got {value}"));
        }
    }
    Ok(rule)
}

fn positive_finite(label: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{label} must be a positive number, got {value}"))
    }
}

fn non_negative_finite(label: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{label} must be a non-negative number, got {value}"))
    }
}

fn adjacency_group(rule: &AdjacencyRule) -> Result<AdjacencyGroup, String> {
    if rule.tools.iter().unique().count() < 2 {
        return Err("adjacency group needs at least two distinct tools".to_string());
    }
    Ok(AdjacencyGroup {
        tools: rule.tools.clone(),
        max_distance: positive_finite("max-distance", rule.max_distance.to_inches())?,
        time_penalty_percentage: non_negative_finite(
            "time-penalty-percentage",
            rule.time_penalty_percentage,
        )?,
    })
}

fn distance_band_rule(band: &DistanceBand) -> Result<DistanceBandRule, String> {
    let max_feet = positive_finite(
        "max-acceptable-distance",
        band.max_acceptable_distance.to_feet(),
    )?;
    let ideal_feet = non_negative_finite("ideal-distance", band.ideal_distance.to_feet())?;
    Ok(DistanceBandRule {
        from: band.tool_pair.0.clone(),
        to: band.tool_pair.1.clone(),
        ideal_feet: ideal_feet.min(max_feet),
        max_feet,
        penalty_per_foot: non_negative_finite("penalty-per-foot-over", band.penalty_per_foot_over)?,
    })
}

/// Turns research records into typed constraints.
pub struct ConstraintFactory;

impl ConstraintFactory {
    /// One constraint per clearance finding. Findings of other requirement types are ignored.
    pub fn safety_constraints(findings: &[SafetyFinding]) -> ConstraintSet {
        let mut constraints = Vec::new();
        let mut skipped = Vec::new();
        for (index, finding) in findings.iter().enumerate() {
            if !finding.is_clearance() {
                continue;
            }
            match clearance_rule(&finding.tool, &finding.measurements) {
                Ok(rule) => constraints.push(Constraint::new(
                    format!("safety_clearance_{}", finding.tool),
                    finding.priority,
                    format!("{}: {}", finding.tool, finding.reasoning),
                    ConstraintKind::SafetyClearance(rule),
                )),
                Err(reason) => skipped.push(SkippedRecord::new("safety", index, reason)),
            }
        }
        ConstraintSet::new(constraints, skipped)
    }

    /// Adjacency and distance-band constraints for every rule of every pattern.
    pub fn workflow_constraints(patterns: &[WorkflowPattern]) -> ConstraintSet {
        let mut constraints = Vec::new();
        let mut skipped = Vec::new();
        for pattern in patterns {
            let project = pattern.slug();

            for (index, rule) in pattern.adjacency.iter().enumerate() {
                match adjacency_group(rule) {
                    Ok(group) => constraints.push(Constraint::new(
                        format!(
                            "workflow_adjacency_{}_{}",
                            project,
                            rule.tools.iter().join("_")
                        ),
                        rule.priority,
                        format!("{}: {}", pattern.project_type, rule.reasoning),
                        ConstraintKind::WorkflowAdjacency(group),
                    )),
                    Err(reason) => skipped.push(SkippedRecord::new(
                        format!("workflow.{project}.adjacency"),
                        index,
                        reason,
                    )),
                }
            }

            for (index, band) in pattern.distance_bands.iter().enumerate() {
                match distance_band_rule(band) {
                    Ok(rule) => constraints.push(Constraint::new(
                        format!(
                            "workflow_distance_{}_{}_{}",
                            project, band.tool_pair.0, band.tool_pair.1
                        ),
                        Priority::Medium,
                        format!("{}: {}", pattern.project_type, band.reasoning),
                        ConstraintKind::WorkflowDistance(rule),
                    )),
                    Err(reason) => skipped.push(SkippedRecord::new(
                        format!("workflow.{project}.distance-bands"),
                        index,
                        reason,
                    )),
                }
            }
        }
        ConstraintSet::new(constraints, skipped)
    }

    /// A deployed and a parked constraint per mobile record. Parked constraints are
    /// always `Medium`.
    pub fn mobile_constraints(records: &[MobileToolRecord]) -> ConstraintSet {
        let mut constraints = Vec::new();
        let mut skipped = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let rules = clearance_rule(&record.tool_type, &record.deployed).and_then(|deployed| {
                clearance_rule(&record.tool_type, &record.parked).map(|parked| (deployed, parked))
            });
            let (deployed, parked) = match rules {
                Ok(rules) => rules,
                Err(reason) => {
                    skipped.push(SkippedRecord::new("mobile", index, reason));
                    continue;
                }
            };
            let tool = &record.tool_type;
            constraints.push(Constraint::new(
                format!("mobile_deployed_{tool}"),
                record.priority,
                format!("{tool} deployed: {}", record.stability_requirements),
                ConstraintKind::MobileDeployedClearance(deployed),
            ));
            constraints.push(Constraint::new(
                format!("mobile_parked_{tool}"),
                Priority::Medium,
                format!("{tool} parked: {}", record.parking_zone_requirements),
                ConstraintKind::MobileParkedClearance(parked),
            ));
        }
        ConstraintSet::new(constraints, skipped)
    }

    /// Full constraint set for a run. Records skipped while loading the research data are
    /// carried into the set's skip report.
    #[instrument(skip_all, name = "constraint_factory")]
    pub fn build(data: &ResearchData, selection: &ConstraintSelection) -> ConstraintSet {
        let patterns: Vec<WorkflowPattern> = data
            .workflow
            .iter()
            .filter(|p| selection.wants_pattern(p))
            .cloned()
            .collect();
        let mobile: Vec<MobileToolRecord> = data
            .mobile
            .iter()
            .filter(|m| selection.wants_mobile(&m.tool_type))
            .cloned()
            .collect();

        let set = ConstraintSet::new(Vec::new(), data.skipped.clone())
            .merge(Self::safety_constraints(&data.safety))
            .merge(Self::workflow_constraints(&patterns))
            .merge(Self::mobile_constraints(&mobile));

        debug!(
            constraints = set.len(),
            skipped = set.skipped().len(),
            patterns = patterns.len(),
            "Built constraint set."
        );
        set
    }
}
