use super::units::{Distance, Measurement};
use crate::core::constraints::priority::Priority;
use crate::core::models::tool::ToolKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearanceRequirement {
    pub front: Measurement,
    pub back: Measurement,
    pub sides: Measurement,
}

impl ClearanceRequirement {
    pub const fn new(front: Measurement, back: Measurement, sides: Measurement) -> Self {
        Self { front, back, sides }
    }
}

/// A published clearance or hazard finding for one tool kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SafetyFinding {
    pub tool: ToolKind,
    pub requirement_type: String,
    pub measurements: ClearanceRequirement,
    pub priority: Priority,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub source_title: Option<String>,
    #[serde(default)]
    pub source_urls: Vec<String>,
    #[serde(default)]
    pub accident_reduction_percentage: Option<f64>,
}

impl SafetyFinding {
    pub fn is_clearance(&self) -> bool {
        self.requirement_type.eq_ignore_ascii_case("clearance")
    }
}

/// Tools of one project type that should stay within `max_distance` of each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdjacencyRule {
    pub tools: Vec<ToolKind>,
    pub max_distance: Distance,
    pub time_penalty_percentage: f64,
    pub priority: Priority,
    #[serde(default)]
    pub reasoning: String,
}

/// Soft preferred spacing for an ordered tool pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DistanceBand {
    pub tool_pair: (ToolKind, ToolKind),
    pub ideal_distance: Distance,
    pub max_acceptable_distance: Distance,
    pub penalty_per_foot_over: f64,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkflowPattern {
    pub project_type: String,
    #[serde(default)]
    pub tool_sequence: Vec<ToolKind>,
    #[serde(default)]
    pub adjacency: Vec<AdjacencyRule>,
    #[serde(default)]
    pub distance_bands: Vec<DistanceBand>,
}

impl WorkflowPattern {
    /// Lowercased project type with spaces replaced by underscores, used in constraint ids.
    pub fn slug(&self) -> String {
        slugify(&self.project_type)
    }

    /// Loose project-type match: either name contains the other's leading word, so
    /// "kitchen" selects "Kitchen Goods" and "cabinetry work" selects "Cabinetry".
    pub fn matches(&self, requested: &str) -> bool {
        let own = self.project_type.trim().to_lowercase();
        let requested = requested.trim().to_lowercase();
        if own.is_empty() || requested.is_empty() {
            return false;
        }
        let own_head = own.split_whitespace().next().unwrap_or(&own);
        own.contains(&requested) || requested.contains(own_head)
    }
}

pub(crate) fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn default_mobile_priority() -> Priority {
    Priority::High
}

/// Working and storage clearances for a tool kind that can be rolled between positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MobileToolRecord {
    pub tool_type: ToolKind,
    pub deployed: ClearanceRequirement,
    pub parked: ClearanceRequirement,
    #[serde(default = "default_mobile_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub stability_requirements: String,
    #[serde(default)]
    pub parking_zone_requirements: String,
}
