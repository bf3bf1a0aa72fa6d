use super::geometry::{Orientation, Position};
use super::tool::{Tool, ToolKind};
use crate::core::scoring::LayoutScore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Where one tool sits on the floor.
///
/// `position` is the back-left corner of the tool's axis-aligned footprint. The
/// orientation is carried for consumers but clearance math does not rotate the
/// footprint. Only mobile tools are expected to carry a `parked_position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Placement {
    pub tool: Arc<Tool>,
    pub position: Position,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub parked_position: Option<Position>,
}

impl Placement {
    pub fn new(tool: Arc<Tool>, position: Position) -> Self {
        Self {
            tool,
            position,
            orientation: Orientation::default(),
            parked_position: None,
        }
    }

    pub fn with_parked_position(mut self, parked: Position) -> Self {
        self.parked_position = Some(parked);
        self
    }

    #[inline]
    pub fn kind(&self) -> &ToolKind {
        &self.tool.kind
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayoutMetadata {
    pub algorithm: String,
    pub iterations: usize,
    pub elapsed: Duration,
}

/// An immutable snapshot of one candidate arrangement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Layout {
    /// Empty until the layout has been persisted.
    #[serde(default)]
    pub id: String,
    pub workshop_id: String,
    pub placements: Vec<Placement>,
    #[serde(default)]
    pub score: Option<LayoutScore>,
    #[serde(default)]
    pub metadata: LayoutMetadata,
}

impl Layout {
    pub fn new(workshop_id: &str, placements: Vec<Placement>) -> Self {
        Self {
            workshop_id: workshop_id.to_string(),
            placements,
            ..Default::default()
        }
    }

    pub fn with_score(mut self, score: LayoutScore) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_metadata(mut self, metadata: LayoutMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn mobile_count(&self) -> usize {
        self.placements.iter().filter(|p| p.tool.is_mobile).count()
    }

    /// Fraction of placements holding a mobile tool, `0` for an empty layout.
    pub fn mobile_ratio(&self) -> f64 {
        if self.placements.is_empty() {
            0.0
        } else {
            self.mobile_count() as f64 / self.placements.len() as f64
        }
    }

    pub fn index(&self) -> PlacementIndex<'_> {
        PlacementIndex::new(self)
    }
}

/// Lookup from tool kind to the layout's placement of that kind.
///
/// When a kind is placed more than once, the first placement in layout order wins.
#[derive(Debug)]
pub struct PlacementIndex<'a> {
    any: HashMap<&'a ToolKind, &'a Placement>,
    mobile: HashMap<&'a ToolKind, &'a Placement>,
}

impl<'a> PlacementIndex<'a> {
    pub fn new(layout: &'a Layout) -> Self {
        let mut any = HashMap::with_capacity(layout.placements.len());
        let mut mobile = HashMap::new();
        for placement in &layout.placements {
            any.entry(placement.kind()).or_insert(placement);
            if placement.tool.is_mobile {
                mobile.entry(placement.kind()).or_insert(placement);
            }
        }
        Self { any, mobile }
    }

    pub fn get(&self, kind: &ToolKind) -> Option<&'a Placement> {
        self.any.get(kind).copied()
    }

    pub fn get_mobile(&self, kind: &ToolKind) -> Option<&'a Placement> {
        self.mobile.get(kind).copied()
    }
}
