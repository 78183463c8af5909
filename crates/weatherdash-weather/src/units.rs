//! Unit-system preference and display-value selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage key for the unit-system preference
pub const UNIT_SYSTEM_KEY: &str = "unitSystem";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    /// Display suffixes for this system
    pub fn labels(self) -> UnitLabels {
        match self {
            Self::Metric => UnitLabels {
                temperature: "°C",
                speed: "km/h",
                distance: "km",
                pressure: "hPa",
                precipitation: "mm",
            },
            Self::Imperial => UnitLabels {
                temperature: "°F",
                speed: "mph",
                distance: "mi",
                pressure: "inHg",
                precipitation: "in",
            },
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = UnknownUnitSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            other => Err(UnknownUnitSystem(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized unit system: {0}")]
pub struct UnknownUnitSystem(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitLabels {
    pub temperature: &'static str,
    pub speed: &'static str,
    pub distance: &'static str,
    pub pressure: &'static str,
    pub precipitation: &'static str,
}

/// Round to the nearest integer, ties toward positive infinity.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Pick the pre-computed value for `system` and round it for display.
pub fn select_rounded(metric: f64, imperial: f64, system: UnitSystem) -> i32 {
    match system {
        UnitSystem::Metric => round_half_up(metric),
        UnitSystem::Imperial => round_half_up(imperial),
    }
}
