//! Built-in research dataset used when no external research file is supplied.

use super::data::ResearchData;
use super::records::{
    AdjacencyRule, ClearanceRequirement, DistanceBand, MobileToolRecord, SafetyFinding,
    WorkflowPattern,
};
use super::units::{Distance, Measurement, parse_distance};
use crate::core::constraints::priority::Priority;
use crate::core::models::tool::ToolKind;
use phf::{Map, phf_map};

pub const BUILTIN_VERSION: &str = "builtin-2024.1";

struct ClearanceRow {
    front: Measurement,
    back: Measurement,
    sides: Measurement,
    priority: Priority,
    reasoning: &'static str,
}

impl ClearanceRow {
    fn requirement(&self) -> ClearanceRequirement {
        ClearanceRequirement::new(self.front, self.back, self.sides)
    }
}

/// Deployed working clearances, in inches, with the priority assigned to the finding.
static DEPLOYED_CLEARANCES: Map<&'static str, ClearanceRow> = phf_map! {
    "table_saw" => ClearanceRow {
        front: Measurement::inches(96.0, 120.0),
        back: Measurement::inches(96.0, 120.0),
        sides: Measurement::inches(36.0, 48.0),
        priority: Priority::Required,
        reasoning: "Infeed and outfeed support for full sheets; kickback path must stay clear",
    },
    "band_saw" => ClearanceRow {
        front: Measurement::inches(36.0, 48.0),
        back: Measurement::inches(24.0, 36.0),
        sides: Measurement::inches(24.0, 36.0),
        priority: Priority::High,
        reasoning: "Operator stance in front of the blade and room to swing long stock",
    },
    "planer" => ClearanceRow {
        front: Measurement::inches(48.0, 72.0),
        back: Measurement::inches(48.0, 72.0),
        sides: Measurement::inches(18.0, 24.0),
        priority: Priority::High,
        reasoning: "Infeed and outfeed length for boards leaving the cutterhead",
    },
    "jointer" => ClearanceRow {
        front: Measurement::inches(60.0, 84.0),
        back: Measurement::inches(60.0, 84.0),
        sides: Measurement::inches(18.0, 24.0),
        priority: Priority::High,
        reasoning: "Long boards pass over both tables; operator walks the stock",
    },
    "router_table" => ClearanceRow {
        front: Measurement::inches(36.0, 48.0),
        back: Measurement::inches(36.0, 48.0),
        sides: Measurement::inches(24.0, 36.0),
        priority: Priority::Medium,
        reasoning: "Feed direction access and featherboard setup room",
    },
    "drill_press" => ClearanceRow {
        front: Measurement::inches(24.0, 36.0),
        back: Measurement::inches(18.0, 24.0),
        sides: Measurement::inches(18.0, 24.0),
        priority: Priority::Medium,
        reasoning: "Operator stance and room for long workpieces across the table",
    },
};

/// Storage clearance shared by every parked mobile tool. The back may touch the wall.
const PARKED_CLEARANCE: ClearanceRequirement = ClearanceRequirement::new(
    Measurement::inches(12.0, 18.0),
    Measurement::inches(0.0, 6.0),
    Measurement::inches(6.0, 12.0),
);

const MOBILE_TOOL_KEYS: [&str; 6] = [
    "table_saw",
    "band_saw",
    "planer",
    "jointer",
    "router_table",
    "drill_press",
];

/// Per project type: spoken distance for the milling cell, and which arrangement
/// features the project pattern calls for.
struct ProjectRow {
    name: &'static str,
    milling_cell_distance: &'static str,
    sequence: &'static [&'static str],
    assembly_table: bool,
    panel_breakdown: bool,
    lumber_rack: bool,
    separate_finishing: bool,
}

const PROJECT_PATTERNS: [ProjectRow; 3] = [
    ProjectRow {
        name: "Cabinetry",
        milling_cell_distance: "8 ft",
        sequence: &["table_saw", "jointer", "planer", "router_table", "drill_press"],
        assembly_table: true,
        panel_breakdown: true,
        lumber_rack: true,
        separate_finishing: true,
    },
    ProjectRow {
        name: "Furniture",
        milling_cell_distance: "6 ft",
        sequence: &["jointer", "planer", "table_saw", "band_saw", "router_table"],
        assembly_table: true,
        panel_breakdown: false,
        lumber_rack: true,
        separate_finishing: true,
    },
    ProjectRow {
        name: "Kitchen Goods",
        milling_cell_distance: "4 ft",
        sequence: &["table_saw", "band_saw", "planer", "drill_press"],
        assembly_table: false,
        panel_breakdown: false,
        lumber_rack: false,
        separate_finishing: true,
    },
];

/// Project types evaluated when a run does not name any.
pub const DEFAULT_PROJECT_TYPES: [&str; 3] = ["cabinetry", "furniture", "kitchen goods"];

impl ProjectRow {
    fn pattern(&self) -> WorkflowPattern {
        let mut adjacency = vec![AdjacencyRule {
            tools: vec![ToolKind::Jointer, ToolKind::Planer, ToolKind::TableSaw],
            max_distance: Distance::inches(parse_distance(self.milling_cell_distance)),
            time_penalty_percentage: 15.0,
            priority: Priority::High,
            reasoning: "Milling cell efficiency: minimize travel between rough mill and final cuts"
                .to_string(),
        }];
        if self.assembly_table {
            adjacency.push(AdjacencyRule {
                tools: vec![ToolKind::parse("assembly"), ToolKind::parse("clamps")],
                max_distance: Distance::inches(72.0),
                time_penalty_percentage: 10.0,
                priority: Priority::Medium,
                reasoning: "Quick access to clamps during glue-up reduces setup time".to_string(),
            });
        }
        if self.panel_breakdown {
            adjacency.push(AdjacencyRule {
                tools: vec![ToolKind::TableSaw, ToolKind::RouterTable],
                max_distance: Distance::inches(96.0),
                time_penalty_percentage: 12.0,
                priority: Priority::Medium,
                reasoning: "Sheet processing: cut then edgeband in sequence".to_string(),
            });
        }

        let mut distance_bands = Vec::new();
        if self.lumber_rack {
            distance_bands.push(DistanceBand {
                tool_pair: (ToolKind::TableSaw, ToolKind::parse("material_storage")),
                ideal_distance: Distance::inches(120.0),
                max_acceptable_distance: Distance::inches(240.0),
                penalty_per_foot_over: 0.05,
                reasoning: "Minimize material handling from storage to breakdown".to_string(),
            });
        }
        if self.separate_finishing {
            distance_bands.push(DistanceBand {
                tool_pair: (ToolKind::parse("finishing"), ToolKind::TableSaw),
                ideal_distance: Distance::inches(144.0),
                max_acceptable_distance: Distance::inches(360.0),
                penalty_per_foot_over: 0.03,
                reasoning: "Keep finishing away from dust-generating machines".to_string(),
            });
        }

        WorkflowPattern {
            project_type: self.name.to_string(),
            tool_sequence: self.sequence.iter().map(|k| ToolKind::parse(k)).collect(),
            adjacency,
            distance_bands,
        }
    }
}

pub fn deployed_clearance(kind: &ToolKind) -> Option<ClearanceRequirement> {
    DEPLOYED_CLEARANCES.get(kind.key()).map(ClearanceRow::requirement)
}

impl ResearchData {
    pub fn builtin() -> Self {
        let mut safety: Vec<SafetyFinding> = DEPLOYED_CLEARANCES
            .entries()
            .map(|(key, row)| SafetyFinding {
                tool: ToolKind::parse(key),
                requirement_type: "clearance".to_string(),
                measurements: row.requirement(),
                priority: row.priority,
                reasoning: row.reasoning.to_string(),
                source_title: None,
                source_urls: Vec::new(),
                accident_reduction_percentage: None,
            })
            .collect();
        // phf iteration order is not declaration order
        safety.sort_by(|a, b| a.tool.cmp(&b.tool));

        let mobile = MOBILE_TOOL_KEYS
            .iter()
            .filter_map(|key| {
                let row = DEPLOYED_CLEARANCES.get(key)?;
                Some(MobileToolRecord {
                    tool_type: ToolKind::parse(key),
                    deployed: row.requirement(),
                    parked: PARKED_CLEARANCE,
                    priority: Priority::High,
                    stability_requirements:
                        "Total-lock casters engaged on all four wheels on a level surface"
                            .to_string(),
                    parking_zone_requirements:
                        "Wall-adjacent or corner parking grouped with similar-height tools"
                            .to_string(),
                })
            })
            .collect();

        Self {
            version: BUILTIN_VERSION.to_string(),
            safety,
            workflow: PROJECT_PATTERNS.iter().map(ProjectRow::pattern).collect(),
            mobile,
            skipped: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_six_machines() {
        let data = ResearchData::builtin();
        assert_eq!(data.safety.len(), 6);
        assert_eq!(data.mobile.len(), 6);
        assert!(data.skipped.is_empty());
        assert!(data.safety.iter().all(SafetyFinding::is_clearance));
    }

    #[test]
    fn builtin_table_saw_clearance_matches_published_minimums() {
        let req = deployed_clearance(&ToolKind::TableSaw).unwrap();
        assert_eq!(req.front.min_inches(), 96.0);
        assert_eq!(req.back.min_inches(), 96.0);
        assert_eq!(req.sides.min_inches(), 36.0);
    }

    #[test]
    fn builtin_mobile_records_share_the_parked_clearance() {
        let data = ResearchData::builtin();
        for record in &data.mobile {
            assert_eq!(record.parked, PARKED_CLEARANCE);
            assert_eq!(record.priority, Priority::High);
        }
    }

    #[test]
    fn builtin_patterns_include_milling_cell_for_every_project() {
        let data = ResearchData::builtin();
        assert_eq!(data.workflow.len(), 3);
        let cabinetry = &data.workflow[0];
        assert_eq!(cabinetry.adjacency.len(), 3);
        assert_eq!(cabinetry.adjacency[0].max_distance.to_inches(), 96.0);
        assert_eq!(cabinetry.distance_bands.len(), 2);

        for pattern in &data.workflow {
            assert_eq!(
                pattern.adjacency[0].tools,
                vec![ToolKind::Jointer, ToolKind::Planer, ToolKind::TableSaw]
            );
        }
    }

    #[test]
    fn default_project_types_select_each_builtin_pattern() {
        let data = ResearchData::builtin();
        for (requested, pattern) in DEFAULT_PROJECT_TYPES.iter().zip(&data.workflow) {
            assert!(pattern.matches(requested));
        }
    }
}
