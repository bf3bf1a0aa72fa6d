use crate::core::models::geometry::{Dimensions, Position};
use nalgebra::Point2;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Front, Side::Back, Side::Left, Side::Right];
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Front => "front",
            Side::Back => "back",
            Side::Left => "left",
            Side::Right => "right",
        };
        f.write_str(name)
    }
}

/// Free floor space between an axis-aligned footprint and each workshop wall.
///
/// `x` runs along the workshop length (back wall at `x = 0`), `y` along the width
/// (left wall at `y = 0`). Values go negative when the footprint crosses a wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideClearances {
    pub front: f64,
    pub back: f64,
    pub left: f64,
    pub right: f64,
}

impl SideClearances {
    pub fn around(position: &Position, footprint: &Dimensions, floor: &Dimensions) -> Self {
        Self {
            front: floor.length - position.x - footprint.length,
            back: position.x,
            left: position.y,
            right: floor.width - position.y - footprint.width,
        }
    }

    #[inline]
    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Front => self.front,
            Side::Back => self.back,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, f64)> + '_ {
        Side::ALL.into_iter().map(move |side| (side, self.get(side)))
    }

    pub fn min(&self) -> f64 {
        self.front.min(self.back).min(self.left).min(self.right)
    }
}

#[inline]
pub fn planar_point(position: &Position) -> Point2<f64> {
    Point2::new(position.x, position.y)
}

/// Euclidean distance on the floor plane. Height is ignored.
#[inline]
pub fn planar_distance(a: &Position, b: &Position) -> f64 {
    nalgebra::distance(&planar_point(a), &planar_point(b))
}

/// Clamps a footprint's origin so it stays on the floor. When the footprint is larger
/// than the floor along an axis, the origin is pinned to that axis' wall at zero.
pub fn clamp_to_floor(position: Position, footprint: &Dimensions, floor: &Dimensions) -> Position {
    let max_x = (floor.length - footprint.length).max(0.0);
    let max_y = (floor.width - footprint.width).max(0.0);
    Position::new(
        position.x.clamp(0.0, max_x),
        position.y.clamp(0.0, max_y),
        position.z,
    )
}
