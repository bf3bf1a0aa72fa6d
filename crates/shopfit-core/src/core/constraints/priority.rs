use serde::{Deserialize, Serialize};
use std::fmt;

/// Importance of a constraint. Ordered so that `Required` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    #[serde(alias = "low", alias = "Low")]
    Low,
    #[serde(alias = "medium", alias = "Medium")]
    Medium,
    #[serde(alias = "high", alias = "High")]
    High,
    #[serde(alias = "required", alias = "Required")]
    Required,
}

impl Priority {
    pub const DESCENDING: [Priority; 4] = [
        Priority::Required,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Multiplier applied to a constraint's score in category averages and penalty sums.
    #[inline]
    pub fn weight(self) -> f64 {
        match self {
            Priority::Required => 4.0,
            Priority::High => 3.0,
            Priority::Medium => 2.0,
            Priority::Low => 1.0,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Required => "REQUIRED",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        };
        f.write_str(name)
    }
}
