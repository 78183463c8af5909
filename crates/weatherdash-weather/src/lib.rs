//! Weather data access for weatherdash
//!
//! Provides the weatherapi.com client, the shared weather store and the pure
//! helpers the view layer uses to format its data.

pub mod air_quality;
pub mod calendar;
pub mod client;
pub mod error;
pub mod store;
pub mod types;
pub mod units;

pub use air_quality::{get_air_quality_color, get_air_quality_level, AirQualityLevel};
pub use calendar::{day_label, forecast_day_labels, upcoming_hours, DayLabel, HourSlot};
pub use client::WeatherApiClient;
pub use error::{ClientError, ErrorCode};
pub use store::{WeatherState, WeatherStore};
pub use types::*;
pub use units::{round_half_up, select_rounded, UnitLabels, UnitSystem};
