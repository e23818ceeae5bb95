//! Julian Day arithmetic on the proleptic Gregorian calendar.
//!
//! Forward and inverse conversions follow Meeus, *Astronomical Algorithms*,
//! chapter 7. The inverse is exact to well below a millisecond for any date
//! the engine handles, which is what the round-trip checks rely on.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};

/// Julian Day of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;

/// Days per Julian century.
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Continuous day count; the fractional part encodes the time of day
/// (0.0 is noon, 0.5 is midnight).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JulianDay(pub f64);

/// Calendar date plus decimal UT hours, as produced by [`JulianDay::to_calendar`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Decimal hours in [0, 24)
    pub hours: f64,
}

impl JulianDay {
    /// Julian Day for a Gregorian calendar date and decimal UT hours.
    ///
    /// `hours` may lie outside [0, 24); the excess simply shifts the day count.
    pub fn from_calendar(year: i32, month: u32, day: u32, hours: f64) -> Self {
        let (mut y, mut m) = (year as f64, month as f64);
        if month <= 2 {
            y -= 1.0;
            m += 12.0;
        }
        let a = (y / 100.0).floor();
        let b = 2.0 - a + (a / 4.0).floor();
        let day_fraction = day as f64 + hours / 24.0;
        let jd = (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day_fraction + b
            - 1524.5;
        Self(jd)
    }

    /// Inverse of [`JulianDay::from_calendar`].
    pub fn to_calendar(self) -> CalendarDate {
        let jd = self.0 + 0.5;
        let z = jd.floor();
        let f = jd - z;
        let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
        let a = z + 1.0 + alpha - (alpha / 4.0).floor();
        let b = a + 1524.0;
        let c = ((b - 122.1) / 365.25).floor();
        let d = (365.25 * c).floor();
        let e = ((b - d) / 30.6001).floor();

        let day = b - d - (30.6001 * e).floor();
        let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
        let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };

        CalendarDate {
            year: year as i32,
            month: month as u32,
            day: day as u32,
            hours: f * 24.0,
        }
    }

    /// Julian centuries elapsed since J2000.0.
    pub fn centuries_since_j2000(self) -> f64 {
        (self.0 - J2000_JD) / DAYS_PER_CENTURY
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Shift by a (possibly fractional) number of hours.
    pub fn add_hours(self, hours: f64) -> Self {
        Self(self.0 + hours / 24.0)
    }

    /// Convert back to a UTC timestamp, rounded to the nearest second.
    pub fn to_datetime(self) -> Result<DateTime<Utc>> {
        let cal = self.to_calendar();
        let total_seconds = (cal.hours * 3600.0).round() as i64;
        let date = NaiveDate::from_ymd_opt(cal.year, cal.month, cal.day).ok_or_else(|| {
            ChartError::invalid_input(format!("Julian Day {} is outside the calendar range", self.0))
        })?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| ChartError::invalid_input("invalid midnight"))?;
        let naive = midnight + chrono::Duration::seconds(total_seconds);
        Ok(Utc.from_utc_datetime(&naive))
    }
}

impl From<DateTime<Utc>> for JulianDay {
    fn from(dt: DateTime<Utc>) -> Self {
        let hours = dt.hour() as f64
            + dt.minute() as f64 / 60.0
            + (dt.second() as f64 + dt.nanosecond() as f64 / 1e9) / 3600.0;
        JulianDay::from_calendar(dt.year(), dt.month(), dt.day(), hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn j2000_epoch() {
        let jd = JulianDay::from_calendar(2000, 1, 1, 12.0);
        assert!((jd.0 - J2000_JD).abs() < 1e-9);
    }

    #[test]
    fn meeus_reference_dates() {
        // Meeus example 7.a: 1957 October 4.81
        let jd = JulianDay::from_calendar(1957, 10, 4, 0.81 * 24.0);
        assert!((jd.0 - 2_436_116.31).abs() < 1e-6);
        // 1987 June 19.5
        let jd = JulianDay::from_calendar(1987, 6, 19, 12.0);
        assert!((jd.0 - 2_446_966.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_recovers_calendar() {
        let cal = JulianDay(2_436_116.31).to_calendar();
        assert_eq!((cal.year, cal.month, cal.day), (1957, 10, 4));
        assert!((cal.hours - 0.81 * 24.0).abs() < 1e-6);
    }

    #[test]
    fn chrono_conversion_matches_calendar() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 22, 18, 16, 0).single().unwrap();
        let jd = JulianDay::from(dt);
        let expected = JulianDay::from_calendar(2024, 5, 22, 18.0 + 16.0 / 60.0);
        assert!((jd.0 - expected.0).abs() < 1e-9);
        assert_eq!(jd.to_datetime().unwrap(), dt);
    }
}
