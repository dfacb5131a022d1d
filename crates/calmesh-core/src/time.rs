//! Time types used on the wire.
//!
//! This module provides [`TimeOfDay`], the `HH:mm` wall-clock value used by
//! working-hours settings, and the date encoding helpers used for query
//! parameters. Every helper that depends on a time zone takes it as an
//! argument; nothing here reads the process-wide local zone.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Accepted `HH:mm` format: optional leading zero on the hour, two-digit minutes.
static TIME_OF_DAY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]?[0-9]|2[0-3]):([0-5][0-9])$").expect("Invalid time-of-day regex")
});

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Error returned when a string is not a valid `HH:mm` time of day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time of day '{input}': expected HH:mm between 00:00 and 23:59")]
pub struct TimeOfDayError {
    input: String,
}

/// A wall-clock time of day with minute precision.
///
/// Stored as minutes since midnight, which is the canonical form. Decoding
/// accepts a single-digit hour (`"9:05"`) but encoding always zero-pads
/// (`"09:05"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight, `00:00`.
    pub const MIDNIGHT: Self = Self(0);

    /// Creates a time of day from minutes since midnight.
    ///
    /// Returns `None` if `minutes` is 1440 or more.
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Creates a time of day from an hour and minute.
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self(u16::from(hour) * 60 + u16::from(minute)))
    }

    /// Returns the minutes since midnight, in `0..=1439`.
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Returns the hour component.
    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    /// Returns the minute component.
    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeOfDayError {
            input: s.to_string(),
        };
        let caps = TIME_OF_DAY_REGEX.captures(s).ok_or_else(invalid)?;
        let hour: u8 = caps[1].parse().map_err(|_| invalid())?;
        let minute: u8 = caps[2].parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Formats a UTC instant as ISO-8601 with millisecond precision and a `Z` suffix.
///
/// This is the format the API expects for every date-time query parameter,
/// e.g. `2024-01-01T00:00:00.000Z`.
pub fn to_iso8601(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Returns the calendar date of `dt` as observed in `tz`.
pub fn local_date<Tz: TimeZone>(dt: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    dt.with_timezone(tz).date_naive()
}

/// Formats the calendar date of `dt` in `tz` as `YYYY-MM-DD`.
pub fn format_local_date<Tz: TimeZone>(dt: &DateTime<Utc>, tz: &Tz) -> String {
    local_date(dt, tz).format("%Y-%m-%d").to_string()
}
