//! US EPA air-quality index categories.

use serde::{Deserialize, Serialize};

/// Severity category of the standardized 1-6 index.
///
/// Total over all integers: anything at or below 1 is `Good`, anything above
/// 5 is `Hazardous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AirQualityLevel {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AirQualityLevel {
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=1 => Self::Good,
            2 => Self::Moderate,
            3 => Self::UnhealthySensitive,
            4 => Self::Unhealthy,
            5 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    /// Translation key of the category
    pub fn key(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::UnhealthySensitive => "unhealthySensitive",
            Self::Unhealthy => "unhealthy",
            Self::VeryUnhealthy => "veryUnhealthy",
            Self::Hazardous => "hazardous",
        }
    }

    /// Theme color token of the category
    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "success",
            Self::Moderate => "warning",
            Self::UnhealthySensitive => "orange",
            Self::Unhealthy => "error",
            Self::VeryUnhealthy => "deep-purple",
            Self::Hazardous => "brown",
        }
    }

    /// English label
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

pub fn get_air_quality_level(index: i32) -> &'static str {
    AirQualityLevel::from_index(index).key()
}

pub fn get_air_quality_color(index: i32) -> &'static str {
    AirQualityLevel::from_index(index).color()
}
