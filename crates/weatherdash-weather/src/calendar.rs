//! Date and hour bucketing for forecast display.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::types::{ForecastDay, HourForecast};

/// Heading of a forecast day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayLabel {
    Today,
    Tomorrow,
    Weekday(Weekday),
    /// Date could not be parsed
    Unknown,
}

impl DayLabel {
    /// Translation key (`days.*`)
    pub fn key(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::Weekday(Weekday::Mon) => "monday",
            Self::Weekday(Weekday::Tue) => "tuesday",
            Self::Weekday(Weekday::Wed) => "wednesday",
            Self::Weekday(Weekday::Thu) => "thursday",
            Self::Weekday(Weekday::Fri) => "friday",
            Self::Weekday(Weekday::Sat) => "saturday",
            Self::Weekday(Weekday::Sun) => "sunday",
            Self::Unknown => "unknown",
        }
    }
}

/// Label for the forecast entry at `index`: first is today, second tomorrow,
/// the rest by weekday of `date`.
pub fn day_label(index: usize, date: Option<NaiveDate>) -> DayLabel {
    match index {
        0 => DayLabel::Today,
        1 => DayLabel::Tomorrow,
        _ => date
            .map(|d| DayLabel::Weekday(d.weekday()))
            .unwrap_or(DayLabel::Unknown),
    }
}

pub fn forecast_day_labels(days: &[ForecastDay]) -> Vec<DayLabel> {
    days.iter()
        .enumerate()
        .map(|(i, day)| day_label(i, day.naive_date()))
        .collect()
}

/// An hour retained for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourSlot<'a> {
    pub hour: &'a HourForecast,
    pub is_now: bool,
}

/// Hours starting at or after the beginning of `now`'s hour, in input order.
/// The hour containing `now` is flagged `is_now`. Hours whose `time` does not
/// parse are skipped.
pub fn upcoming_hours(hours: &[HourForecast], now: NaiveDateTime) -> Vec<HourSlot<'_>> {
    let current_hour = truncate_to_hour(now);

    hours
        .iter()
        .filter_map(|hour| {
            let start = truncate_to_hour(hour.local_time()?);
            (start >= current_hour).then_some(HourSlot {
                hour,
                is_now: start == current_hour,
            })
        })
        .collect()
}

fn truncate_to_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}
