//! Weather API data model.
//!
//! Field names follow the weatherapi.com JSON payloads. Every measurement is
//! delivered in both unit systems; nothing here converts between them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of `localtime` and hourly `time` fields
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// City search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    /// URL-safe slug, usable as a fetch query
    #[serde(default)]
    pub url: String,
}

impl City {
    /// "Name, Region, Country", skipping empty parts
    pub fn display_name(&self) -> String {
        [&self.name, &self.region, &self.country]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Protocol-relative icon URL (`//cdn.weatherapi.com/...`)
    pub icon: String,
    pub code: i32,
}

impl Condition {
    /// Icon URL with an explicit https scheme
    pub fn icon_url(&self) -> String {
        if self.icon.starts_with("//") {
            format!("https:{}", self.icon)
        } else {
            self.icon.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tz_id: String,
    #[serde(default)]
    pub localtime_epoch: i64,
    /// Local wall-clock time, "YYYY-MM-DD HH:MM"
    #[serde(default)]
    pub localtime: String,
}

impl Location {
    /// The location's local time, if `localtime` is well formed
    pub fn local_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.localtime, LOCAL_TIME_FORMAT).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AirQuality {
    #[serde(default)]
    pub co: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub o3: f64,
    #[serde(default)]
    pub so2: f64,
    #[serde(default)]
    pub pm2_5: f64,
    #[serde(default)]
    pub pm10: f64,
    /// US EPA standard index, 1-6
    #[serde(rename = "us-epa-index", default)]
    pub us_epa_index: i32,
    /// UK DEFRA index, 1-10
    #[serde(rename = "gb-defra-index", default)]
    pub gb_defra_index: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub temp_f: f64,
    #[serde(default)]
    pub is_day: u8,
    #[serde(default)]
    pub condition: Condition,
    pub wind_mph: f64,
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_degree: i32,
    #[serde(default)]
    pub wind_dir: String,
    #[serde(default)]
    pub pressure_mb: f64,
    #[serde(default)]
    pub pressure_in: f64,
    #[serde(default)]
    pub precip_mm: f64,
    #[serde(default)]
    pub precip_in: f64,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub cloud: u8,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub vis_km: f64,
    pub vis_miles: f64,
    #[serde(default)]
    pub uv: f64,
    #[serde(default)]
    pub gust_mph: f64,
    #[serde(default)]
    pub gust_kph: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<AirQuality>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub maxtemp_f: f64,
    pub mintemp_c: f64,
    pub mintemp_f: f64,
    #[serde(default)]
    pub avgtemp_c: f64,
    #[serde(default)]
    pub avgtemp_f: f64,
    #[serde(default)]
    pub maxwind_mph: f64,
    #[serde(default)]
    pub maxwind_kph: f64,
    #[serde(default)]
    pub totalprecip_mm: f64,
    #[serde(default)]
    pub totalprecip_in: f64,
    #[serde(default)]
    pub totalsnow_cm: f64,
    #[serde(default)]
    pub avgvis_km: f64,
    #[serde(default)]
    pub avgvis_miles: f64,
    #[serde(default)]
    pub avghumidity: f64,
    #[serde(default)]
    pub daily_will_it_rain: u8,
    #[serde(default)]
    pub daily_chance_of_rain: u8,
    #[serde(default)]
    pub daily_will_it_snow: u8,
    #[serde(default)]
    pub daily_chance_of_snow: u8,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub uv: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
    #[serde(default)]
    pub moonrise: String,
    #[serde(default)]
    pub moonset: String,
    #[serde(default)]
    pub moon_phase: String,
    /// Percentage, 0-100
    #[serde(default)]
    pub moon_illumination: f64,
    #[serde(default)]
    pub is_moon_up: u8,
    #[serde(default)]
    pub is_sun_up: u8,
}

impl Astro {
    /// Illumination as a fraction in [0, 1]
    pub fn moon_illumination_fraction(&self) -> f64 {
        (self.moon_illumination / 100.0).clamp(0.0, 1.0)
    }

    pub fn moon_up(&self) -> bool {
        self.is_moon_up != 0
    }

    pub fn sun_up(&self) -> bool {
        self.is_sun_up != 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HourForecast {
    pub time_epoch: i64,
    /// Local wall-clock time, "YYYY-MM-DD HH:MM"
    pub time: String,
    pub temp_c: f64,
    pub temp_f: f64,
    #[serde(default)]
    pub is_day: u8,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub wind_mph: f64,
    #[serde(default)]
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_degree: i32,
    #[serde(default)]
    pub wind_dir: String,
    #[serde(default)]
    pub pressure_mb: f64,
    #[serde(default)]
    pub pressure_in: f64,
    #[serde(default)]
    pub precip_mm: f64,
    #[serde(default)]
    pub precip_in: f64,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub cloud: u8,
    #[serde(default)]
    pub feelslike_c: f64,
    #[serde(default)]
    pub feelslike_f: f64,
    #[serde(default)]
    pub windchill_c: f64,
    #[serde(default)]
    pub windchill_f: f64,
    #[serde(default)]
    pub heatindex_c: f64,
    #[serde(default)]
    pub heatindex_f: f64,
    #[serde(default)]
    pub dewpoint_c: f64,
    #[serde(default)]
    pub dewpoint_f: f64,
    #[serde(default)]
    pub will_it_rain: u8,
    #[serde(default)]
    pub chance_of_rain: u8,
    #[serde(default)]
    pub will_it_snow: u8,
    #[serde(default)]
    pub chance_of_snow: u8,
    #[serde(default)]
    pub vis_km: f64,
    #[serde(default)]
    pub vis_miles: f64,
    #[serde(default)]
    pub gust_mph: f64,
    #[serde(default)]
    pub gust_kph: f64,
    #[serde(default)]
    pub uv: f64,
}

impl HourForecast {
    pub fn local_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.time, LOCAL_TIME_FORMAT).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastDay {
    /// ISO date, "YYYY-MM-DD"
    pub date: String,
    #[serde(default)]
    pub date_epoch: i64,
    pub day: DaySummary,
    #[serde(default)]
    pub astro: Astro,
    #[serde(default)]
    pub hour: Vec<HourForecast>,
}

impl ForecastDay {
    pub fn naive_date(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

/// Complete current + forecast payload for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
    #[serde(default)]
    pub forecast: Forecast,
}

impl WeatherSnapshot {
    pub fn forecast_days(&self) -> &[ForecastDay] {
        &self.forecast.forecastday
    }

    /// US EPA index of the current air quality, when reported
    pub fn us_epa_index(&self) -> Option<i32> {
        self.current.air_quality.as_ref().map(|aq| aq.us_epa_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn london_json() -> serde_json::Value {
        serde_json::json!({
            "location": {
                "name": "London",
                "region": "City of London, Greater London",
                "country": "United Kingdom",
                "lat": 51.52,
                "lon": -0.11,
                "tz_id": "Europe/London",
                "localtime_epoch": 1705325400,
                "localtime": "2024-01-15 14:30"
            },
            "current": {
                "temp_c": 12.0, "temp_f": 54.0, "is_day": 1,
                "condition": { "text": "Partly cloudy", "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png", "code": 1003 },
                "wind_mph": 10.0, "wind_kph": 16.0, "wind_degree": 220, "wind_dir": "SW",
                "pressure_mb": 1015.0, "pressure_in": 30.0, "precip_mm": 0.0, "precip_in": 0.0,
                "humidity": 72, "cloud": 50, "feelslike_c": 10.0, "feelslike_f": 50.0,
                "vis_km": 10.0, "vis_miles": 6.0, "uv": 3.0, "gust_mph": 15.0, "gust_kph": 24.0,
                "air_quality": {
                    "co": 200.0, "no2": 10.0, "o3": 50.0, "so2": 5.0, "pm2_5": 8.0, "pm10": 12.0,
                    "us-epa-index": 2, "gb-defra-index": 1
                }
            },
            "forecast": { "forecastday": [] }
        })
    }

    #[test]
    fn test_snapshot_deserializes_air_quality_indices() {
        let snapshot: WeatherSnapshot = serde_json::from_value(london_json()).unwrap();
        assert_eq!(snapshot.location.name, "London");
        assert_eq!(snapshot.current.wind_dir, "SW");
        assert_eq!(snapshot.us_epa_index(), Some(2));
        assert_eq!(snapshot.current.air_quality.as_ref().map(|a| a.gb_defra_index), Some(1));
        assert!(snapshot.forecast_days().is_empty());
    }

    #[test]
    fn test_snapshot_without_forecast_or_air_quality() {
        let mut json = london_json();
        json["current"].as_object_mut().unwrap().remove("air_quality");
        json.as_object_mut().unwrap().remove("forecast");

        let snapshot: WeatherSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.us_epa_index(), None);
        assert!(snapshot.forecast_days().is_empty());
    }

    #[test]
    fn test_air_quality_serializes_with_hyphenated_keys() {
        let aq = AirQuality {
            us_epa_index: 3,
            ..AirQuality::default()
        };
        let json = serde_json::to_value(&aq).unwrap();
        assert_eq!(json["us-epa-index"], 3);
        assert!(json.get("us_epa_index").is_none());
    }

    #[test]
    fn test_location_local_time() {
        let snapshot: WeatherSnapshot = serde_json::from_value(london_json()).unwrap();
        let local = snapshot.location.local_time().unwrap();
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(local.hour(), 14);
        assert_eq!(local.minute(), 30);
    }

    #[test]
    fn test_city_display_name_skips_empty_parts() {
        let city = City {
            id: 1,
            name: "London".into(),
            region: String::new(),
            country: "UK".into(),
            lat: 51.52,
            lon: -0.11,
            url: "london".into(),
        };
        assert_eq!(city.display_name(), "London, UK");
    }

    #[test]
    fn test_condition_icon_url_adds_scheme() {
        let condition = Condition {
            text: "Sunny".into(),
            icon: "//cdn.weatherapi.com/weather/64x64/day/113.png".into(),
            code: 1000,
        };
        assert_eq!(
            condition.icon_url(),
            "https://cdn.weatherapi.com/weather/64x64/day/113.png"
        );
    }

    #[test]
    fn test_moon_illumination_fraction_is_clamped() {
        let full = Astro {
            moon_illumination: 100.0,
            ..Astro::default()
        };
        let bogus = Astro {
            moon_illumination: 140.0,
            ..Astro::default()
        };
        assert_eq!(full.moon_illumination_fraction(), 1.0);
        assert_eq!(bogus.moon_illumination_fraction(), 1.0);
        assert_eq!(Astro::default().moon_illumination_fraction(), 0.0);
    }
}
