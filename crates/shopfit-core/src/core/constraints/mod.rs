//! Layout constraints derived from research parameters.
//!
//! A [`Constraint`] is an immutable, stateless predicate over a layout and its workshop.
//! Each [`kind::ConstraintKind`] variant carries its own parameters and has exactly one
//! evaluation function. Constraints reference tools by [`ToolKind`] and report vacuous
//! satisfaction when the referenced tool is not placed.

pub mod evaluation;
pub mod factory;
pub mod kind;
pub mod priority;

use crate::core::models::layout::{Layout, PlacementIndex};
use crate::core::models::tool::ToolKind;
use crate::core::models::workshop::Workshop;
use evaluation::ConstraintEvaluation;
use kind::ConstraintKind;
use priority::Priority;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub priority: Priority,
    pub description: String,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn new(id: String, priority: Priority, description: String, kind: ConstraintKind) -> Self {
        Self {
            id,
            priority,
            description,
            kind,
        }
    }

    pub fn evaluate(&self, layout: &Layout, workshop: &Workshop) -> ConstraintEvaluation {
        self.evaluate_indexed(&layout.index(), workshop)
    }

    /// Same as [`Constraint::evaluate`], reusing a placement index built once per layout.
    #[inline]
    pub fn evaluate_indexed(
        &self,
        index: &PlacementIndex<'_>,
        workshop: &Workshop,
    ) -> ConstraintEvaluation {
        self.kind.evaluate(index, workshop)
    }

    pub fn references(&self, tool: &ToolKind) -> bool {
        self.kind.references(tool)
    }
}
