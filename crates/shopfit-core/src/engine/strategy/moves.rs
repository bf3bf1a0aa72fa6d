//! Layout constructors and elementary moves shared by all strategies.
//!
//! Every move returns a fresh layout with footprints clamped to the floor and the
//! parked position of each moved mobile tool recomputed.

use super::SearchContext;
use crate::core::models::geometry::Position;
use crate::core::models::layout::{Layout, Placement};
use crate::core::utils::geometry::clamp_to_floor;
use nalgebra::Vector2;

/// Parking spot for a mobile placement: against the back wall, keeping the deployed
/// `y` where the parked side clearances allow it.
pub(crate) fn parked_position(ctx: &SearchContext<'_>, placement: &Placement) -> Position {
    let floor = &ctx.workshop.dimensions;
    let footprint = &placement.tool.dimensions;
    let clearance = ctx.parked_clearance(placement.kind());
    let max_y = floor.width - footprint.width - clearance.right;
    let y = placement.position.y.min(max_y).max(clearance.left);
    clamp_to_floor(Position::planar(clearance.back, y), footprint, floor)
}

fn settle(ctx: &SearchContext<'_>, placement: &mut Placement, position: Position) {
    placement.position = clamp_to_floor(position, &placement.tool.dimensions, &ctx.workshop.dimensions);
    if placement.tool.is_mobile {
        placement.parked_position = Some(parked_position(ctx, placement));
    }
}

/// Tools in catalog order on a near-square grid, each footprint centred in its cell.
pub(crate) fn grid_layout(ctx: &SearchContext<'_>) -> Layout {
    let floor = &ctx.workshop.dimensions;
    let count = ctx.tools.len();
    if count == 0 {
        return Layout::new(&ctx.workshop.id, Vec::new());
    }
    let cols = (count as f64).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    let cell_length = floor.length / cols as f64;
    let cell_width = floor.width / rows as f64;

    let placements = ctx
        .tools
        .iter()
        .enumerate()
        .map(|(i, tool)| {
            let (row, col) = (i / cols, i % cols);
            let centre_x = (col as f64 + 0.5) * cell_length;
            let centre_y = (row as f64 + 0.5) * cell_width;
            let mut placement = Placement::new(tool.clone(), Position::default());
            let origin = Position::planar(
                centre_x - tool.dimensions.length / 2.0,
                centre_y - tool.dimensions.width / 2.0,
            );
            settle(ctx, &mut placement, origin);
            placement
        })
        .collect();

    Layout::new(&ctx.workshop.id, placements)
}

pub(crate) fn moved(ctx: &SearchContext<'_>, layout: &Layout, index: usize, position: Position) -> Layout {
    let mut next = layout.clone();
    if let Some(placement) = next.placements.get_mut(index) {
        settle(ctx, placement, position);
    }
    next
}

pub(crate) fn displaced(ctx: &SearchContext<'_>, layout: &Layout, index: usize, dx: f64, dy: f64) -> Layout {
    match layout.placements.get(index) {
        Some(placement) => {
            let p = placement.position;
            moved(ctx, layout, index, Position::new(p.x + dx, p.y + dy, p.z))
        }
        None => layout.clone(),
    }
}

/// Exchanges the footprint centres of two placements.
pub(crate) fn swapped(ctx: &SearchContext<'_>, layout: &Layout, a: usize, b: usize) -> Layout {
    let mut next = layout.clone();
    if a == b || a >= next.len() || b >= next.len() {
        return next;
    }
    let centre_a = footprint_centre(&next.placements[a]);
    let centre_b = footprint_centre(&next.placements[b]);
    for (index, centre) in [(a, centre_b), (b, centre_a)] {
        let placement = &mut next.placements[index];
        let dims = placement.tool.dimensions;
        let origin = Position::new(
            centre.x - dims.length / 2.0,
            centre.y - dims.width / 2.0,
            placement.position.z,
        );
        settle(ctx, placement, origin);
    }
    next
}

pub(crate) fn footprint_centre(placement: &Placement) -> Vector2<f64> {
    Vector2::new(
        placement.position.x + placement.tool.dimensions.length / 2.0,
        placement.position.y + placement.tool.dimensions.width / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constraints::factory::ConstraintSet;
    use crate::core::models::geometry::Dimensions;
    use crate::core::models::tool::{Tool, ToolKind};
    use crate::core::models::workshop::Workshop;
    use crate::engine::config::SearchConfig;
    use std::sync::Arc;

    fn tools() -> Vec<Arc<Tool>> {
        vec![
            Arc::new(Tool::new("ts", "Saw", ToolKind::TableSaw, Dimensions::new(40.0, 20.0, 30.0))),
            Arc::new(
                Tool::new("bs", "Bandsaw", ToolKind::BandSaw, Dimensions::new(20.0, 20.0, 60.0))
                    .mobile(true),
            ),
            Arc::new(Tool::new("wb", "Bench", ToolKind::Workbench, Dimensions::new(60.0, 20.0, 34.0))),
        ]
    }

    #[test]
    fn grid_layout_centres_tools_in_cells() {
        let shop = Workshop::new("w", "Shop", Dimensions::new(200.0, 100.0, 96.0));
        let tools = tools();
        let set = ConstraintSet::default();
        let config = SearchConfig::default();
        let ctx = SearchContext::new(&shop, &tools, &set, &config);

        let layout = grid_layout(&ctx);
        assert_eq!(layout.len(), 3);
        // 2 columns x 2 rows of 100 x 50 cells.
        assert_eq!(layout.placements[0].position, Position::planar(30.0, 15.0));
        assert_eq!(layout.placements[1].position, Position::planar(140.0, 15.0));
        assert_eq!(layout.placements[2].position, Position::planar(20.0, 65.0));
        assert!(layout.placements[0].parked_position.is_none());
        assert_eq!(layout.placements[1].parked_position, Some(Position::planar(0.0, 15.0)));
    }

    #[test]
    fn moves_keep_footprints_on_the_floor() {
        let shop = Workshop::new("w", "Shop", Dimensions::new(200.0, 100.0, 96.0));
        let tools = tools();
        let set = ConstraintSet::default();
        let config = SearchConfig::default();
        let ctx = SearchContext::new(&shop, &tools, &set, &config);
        let layout = grid_layout(&ctx);

        let pushed = displaced(&ctx, &layout, 0, 500.0, -500.0);
        assert_eq!(pushed.placements[0].position, Position::planar(160.0, 0.0));

        let swapped = swapped(&ctx, &layout, 0, 2);
        assert_eq!(footprint_centre(&swapped.placements[0]), Vector2::new(50.0, 75.0));
        assert_eq!(footprint_centre(&swapped.placements[2]), Vector2::new(50.0, 25.0));
    }

    #[test]
    fn grid_layout_of_no_tools_is_empty() {
        let shop = Workshop::new("w", "Shop", Dimensions::new(0.0, 0.0, 0.0));
        let set = ConstraintSet::default();
        let config = SearchConfig::default();
        let ctx = SearchContext::new(&shop, &[], &set, &config);
        assert!(grid_layout(&ctx).is_empty());
    }
}
