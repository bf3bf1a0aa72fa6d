use serde::{Deserialize, Serialize};

const INCHES_PER_FOOT: f64 = 12.0;
const INCHES_PER_METER: f64 = 39.37;
const INCHES_PER_CENTIMETER: f64 = 0.3937;
const FALLBACK_DISTANCE_INCHES: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    #[serde(alias = "inch", alias = "inches")]
    In,
    #[serde(alias = "foot", alias = "feet")]
    Ft,
    #[serde(alias = "meter", alias = "meters")]
    M,
    #[serde(alias = "centimeter", alias = "centimeters")]
    Cm,
}

impl LengthUnit {
    #[inline]
    pub fn to_inches(self, value: f64) -> f64 {
        match self {
            LengthUnit::In => value,
            LengthUnit::Ft => value * INCHES_PER_FOOT,
            LengthUnit::M => value * INCHES_PER_METER,
            LengthUnit::Cm => value * INCHES_PER_CENTIMETER,
        }
    }
}

/// A clearance figure from the research data: the hard minimum and the recommended value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub min: f64,
    #[serde(default)]
    pub ideal: Option<f64>,
    #[serde(default)]
    pub unit: LengthUnit,
}

impl Measurement {
    pub const fn inches(min: f64, ideal: f64) -> Self {
        Self {
            min,
            ideal: Some(ideal),
            unit: LengthUnit::In,
        }
    }

    pub fn min_inches(&self) -> f64 {
        self.unit.to_inches(self.min)
    }

    pub fn ideal_inches(&self) -> Option<f64> {
        self.ideal.map(|v| self.unit.to_inches(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    #[serde(default)]
    pub unit: LengthUnit,
}

impl Distance {
    pub const fn inches(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::In,
        }
    }

    pub fn to_inches(&self) -> f64 {
        self.unit.to_inches(self.value)
    }

    pub fn to_feet(&self) -> f64 {
        self.to_inches() / INCHES_PER_FOOT
    }
}

/// Reads the first integer in a free-text distance such as `"6 ft"`, `"within 30in"` or
/// `"2 m"` and converts it to inches. A bare number is taken as feet. Text without any
/// digits yields 72 inches.
pub fn parse_distance(text: &str) -> f64 {
    let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
        return FALLBACK_DISTANCE_INCHES;
    };
    let rest = &text[start..];
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let Ok(value) = rest[..digits_end].parse::<u64>() else {
        return FALLBACK_DISTANCE_INCHES;
    };
    let value = value as f64;

    let suffix = rest[digits_end..].trim_start();
    if suffix.starts_with("ft") {
        LengthUnit::Ft.to_inches(value)
    } else if suffix.starts_with("in") {
        value
    } else if suffix.starts_with('m') {
        LengthUnit::M.to_inches(value)
    } else {
        LengthUnit::Ft.to_inches(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_distance_handles_each_unit() {
        assert_eq!(parse_distance("6 ft"), 72.0);
        assert_eq!(parse_distance("30in"), 30.0);
        assert!((parse_distance("2 m") - 78.74).abs() < 1e-9);
    }

    #[test]
    fn parse_distance_defaults_to_feet_and_reads_first_number() {
        assert_eq!(parse_distance("within 8"), 96.0);
        assert_eq!(parse_distance("4-6 ft"), 48.0);
    }

    #[test]
    fn parse_distance_falls_back_when_no_number_is_present() {
        assert_eq!(parse_distance("adjacent"), 72.0);
        assert_eq!(parse_distance(""), 72.0);
    }

    #[test]
    fn measurement_converts_units_to_inches() {
        let m = Measurement {
            min: 3.0,
            ideal: Some(4.0),
            unit: LengthUnit::Ft,
        };
        assert_eq!(m.min_inches(), 36.0);
        assert_eq!(m.ideal_inches(), Some(48.0));
    }

    #[test]
    fn distance_reports_feet() {
        assert_eq!(Distance::inches(240.0).to_feet(), 20.0);
    }

    #[test]
    fn unit_aliases_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            unit: LengthUnit,
        }
        let w: Wrapper = toml::from_str(r#"unit = "feet""#).unwrap();
        assert_eq!(w.unit, LengthUnit::Ft);
    }
}
