use super::geometry::Dimensions;
use serde::{Deserialize, Serialize};

/// The rectangular floor tools are placed on. Fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workshop {
    pub id: String,
    pub name: String,
    pub dimensions: Dimensions,
}

impl Workshop {
    pub fn new(id: &str, name: &str, dimensions: Dimensions) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            dimensions,
        }
    }

    #[inline]
    pub fn floor_area(&self) -> f64 {
        self.dimensions.footprint_area()
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.floor_area() > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_area_is_length_times_width() {
        let shop = Workshop::new("w1", "Garage", Dimensions::new(213.0, 103.0, 96.0));
        assert_eq!(shop.floor_area(), 21939.0);
        assert!(!shop.is_degenerate());
    }

    #[test]
    fn zero_or_nan_area_is_degenerate() {
        assert!(Workshop::new("w", "", Dimensions::new(0.0, 100.0, 96.0)).is_degenerate());
        assert!(Workshop::new("w", "", Dimensions::new(f64::NAN, 100.0, 96.0)).is_degenerate());
    }
}
