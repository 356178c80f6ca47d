// =============================================================================
// Shared types used across the SVF dashboard
// =============================================================================

use serde::{Deserialize, Serialize};

/// One plottable column of a daily price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Indicator {
    /// Every indicator in the order the form lists them.
    pub const ALL: [Indicator; 5] = [
        Indicator::Open,
        Indicator::High,
        Indicator::Low,
        Indicator::Close,
        Indicator::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Indicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown indicator '{s}'"))
    }
}
