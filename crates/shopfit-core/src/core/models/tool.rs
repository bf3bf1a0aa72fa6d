use super::geometry::{Clearance, Dimensions};
use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;

static TOOL_KIND_ALIASES: Map<&'static str, &'static str> = phf_map! {
    "bandsaw" => "band_saw",
    "tablesaw" => "table_saw",
    "cabinet_saw" => "table_saw",
    "thickness_planer" => "planer",
    "router" => "router_table",
    "routertable" => "router_table",
    "drillpress" => "drill_press",
    "mitre_saw" => "miter_saw",
    "mitersaw" => "miter_saw",
    "bench" => "workbench",
    "lumber_rack" => "material_storage",
    "dust_collection" => "dust_collector",
};

/// The kind of a shop tool.
///
/// Kinds are compared by their canonical snake_case key, so research data can refer
/// to tools with loosely formatted names ("Band Saw", "bandsaw", "band-saw") and still
/// resolve to the same kind. Keys without a dedicated variant are kept as [`ToolKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToolKind {
    TableSaw,
    BandSaw,
    Planer,
    Jointer,
    RouterTable,
    DrillPress,
    MiterSaw,
    Workbench,
    Storage,
    DustCollector,
    Other(String),
}

impl ToolKind {
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize_key(raw);
        let key = TOOL_KIND_ALIASES
            .get(normalized.as_str())
            .copied()
            .unwrap_or(normalized.as_str());

        match key {
            "table_saw" => Self::TableSaw,
            "band_saw" => Self::BandSaw,
            "planer" => Self::Planer,
            "jointer" => Self::Jointer,
            "router_table" => Self::RouterTable,
            "drill_press" => Self::DrillPress,
            "miter_saw" => Self::MiterSaw,
            "workbench" => Self::Workbench,
            "storage" => Self::Storage,
            "dust_collector" => Self::DustCollector,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::TableSaw => "table_saw",
            Self::BandSaw => "band_saw",
            Self::Planer => "planer",
            Self::Jointer => "jointer",
            Self::RouterTable => "router_table",
            Self::DrillPress => "drill_press",
            Self::MiterSaw => "miter_saw",
            Self::Workbench => "workbench",
            Self::Storage => "storage",
            Self::DustCollector => "dust_collector",
            Self::Other(key) => key,
        }
    }
}

fn normalize_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<String> for ToolKind {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for ToolKind {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<ToolKind> for String {
    fn from(kind: ToolKind) -> Self {
        kind.key().to_string()
    }
}

/// A read-only catalog entry. Runs share tools through `Arc<Tool>` and never mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub kind: ToolKind,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub min_clearance: Clearance,
    #[serde(default)]
    pub is_mobile: bool,
}

impl Tool {
    pub fn new(id: &str, name: &str, kind: ToolKind, dimensions: Dimensions) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            dimensions,
            min_clearance: Clearance::default(),
            is_mobile: false,
        }
    }

    pub fn with_clearance(mut self, clearance: Clearance) -> Self {
        self.min_clearance = clearance;
        self
    }

    pub fn mobile(mut self, is_mobile: bool) -> Self {
        self.is_mobile = is_mobile;
        self
    }

    #[inline]
    pub fn footprint_area(&self) -> f64 {
        self.dimensions.footprint_area()
    }

    /// Rough floor area kept free around the tool: the mean side clearance
    /// swept along the tool's length and width.
    pub fn clearance_halo_area(&self) -> f64 {
        self.min_clearance.mean_floor_side() * (self.dimensions.length + self.dimensions.width)
    }
}
