use serde::{Deserialize, Serialize};

/// Box extents in inches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    #[inline]
    pub fn footprint_area(&self) -> f64 {
        self.length * self.width
    }

    pub fn is_finite(&self) -> bool {
        self.length.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Workshop-local coordinates in inches, origin at the back-left floor corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Orientation {
    pub rotation_degrees: f64,
}

/// Minimum free floor space per side of a tool, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Clearance {
    pub front: f64,
    pub back: f64,
    pub left: f64,
    pub right: f64,
    #[serde(default)]
    pub top: f64,
}

impl Clearance {
    pub fn new(front: f64, back: f64, left: f64, right: f64, top: f64) -> Self {
        Self {
            front,
            back,
            left,
            right,
            top,
        }
    }

    /// Mean of the four floor-level sides; `top` does not occupy floor space.
    pub fn mean_floor_side(&self) -> f64 {
        (self.front + self.back + self.left + self.right) / 4.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprint_area_ignores_height() {
        let dims = Dimensions::new(84.0, 48.0, 34.0);
        assert_eq!(dims.footprint_area(), 4032.0);
    }

    #[test]
    fn is_finite_rejects_nan_and_infinity() {
        assert!(Dimensions::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Dimensions::new(f64::NAN, 2.0, 3.0).is_finite());
        assert!(!Dimensions::new(1.0, f64::INFINITY, 3.0).is_finite());
    }

    #[test]
    fn mean_floor_side_excludes_top_clearance() {
        let clearance = Clearance::new(48.0, 96.0, 24.0, 36.0, 1000.0);
        assert_eq!(clearance.mean_floor_side(), 51.0);
    }

    #[test]
    fn planar_position_has_zero_height() {
        let p = Position::planar(3.0, 4.0);
        assert_eq!(p, Position::new(3.0, 4.0, 0.0));
    }
}
