use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::julian::JulianDay;
use super::offset::UtcOffset;
use crate::error::{ChartError, Result};

/// Local civil date and wall-clock time, as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CivilDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    #[serde(default)]
    pub second: f64,
}

/// A civil moment re-expressed on the UTC day it falls on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtcInstant {
    pub date: NaiveDate,
    /// Decimal UT hours in [0, 24)
    pub hours: f64,
}

impl UtcInstant {
    pub fn julian_day(&self) -> JulianDay {
        use chrono::Datelike;
        JulianDay::from_calendar(self.date.year(), self.date.month(), self.date.day(), self.hours)
    }
}

impl CivilDateTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Parse the `"YYYY-MM-DD"` and `"HH:MM[:SS]"` strings collected by a form.
    pub fn parse(date: &str, time: &str) -> Result<Self> {
        let invalid = |what: &str, text: &str| {
            ChartError::invalid_input(format!("Cannot parse {what} '{text}'"))
        };

        let mut date_parts = date.trim().splitn(3, '-');
        let mut next_date = || date_parts.next().map(str::trim).unwrap_or("");
        let year: i32 = next_date().parse().map_err(|_| invalid("date", date))?;
        let month: u32 = next_date().parse().map_err(|_| invalid("date", date))?;
        let day: u32 = next_date().parse().map_err(|_| invalid("date", date))?;

        let fields: Vec<&str> = time.trim().split(':').collect();
        if fields.len() < 2 || fields.len() > 3 {
            return Err(invalid("time", time));
        }
        let hour: u32 = fields[0].parse().map_err(|_| invalid("time", time))?;
        let minute: u32 = fields[1].parse().map_err(|_| invalid("time", time))?;
        let second: f64 = match fields.get(2) {
            Some(s) => s.parse().map_err(|_| invalid("time", time))?,
            None => 0.0,
        };

        let civil = Self::new(year, month, day, hour, minute, second);
        civil.validate()?;
        Ok(civil)
    }

    pub fn date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            ChartError::invalid_input(format!(
                "{:04}-{:02}-{:02} is not a valid Gregorian date",
                self.year, self.month, self.day
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.date()?;
        if self.hour > 23 || self.minute > 59 || !(0.0..60.0).contains(&self.second) {
            return Err(ChartError::invalid_input(format!(
                "{:02}:{:02}:{} is not a valid time of day",
                self.hour, self.minute, self.second
            )));
        }
        Ok(())
    }

    /// Decimal local hours.
    pub fn local_hours(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0 + self.second / 3600.0
    }

    /// Shift onto the UTC day, rolling the calendar day when the offset
    /// crosses midnight.
    pub fn to_utc(&self, offset: UtcOffset) -> Result<UtcInstant> {
        self.validate()?;
        let date = self.date()?;
        let adjusted = self.local_hours() - offset.hours();

        let (date, hours) = if adjusted >= 24.0 {
            (date.succ_opt(), adjusted - 24.0)
        } else if adjusted < 0.0 {
            (date.pred_opt(), adjusted + 24.0)
        } else {
            (Some(date), adjusted)
        };
        let date = date.ok_or_else(|| ChartError::invalid_input("date rolls outside the calendar range"))?;

        log::debug!(
            "normalized {:?} at {} to {} {:.6}h UT",
            self,
            offset,
            date,
            hours
        );
        Ok(UtcInstant { date, hours })
    }

    /// Julian Day of this local time under the given offset.
    pub fn julian_day(&self, offset: UtcOffset) -> Result<JulianDay> {
        Ok(self.to_utc(offset)?.julian_day())
    }
}

/// Normalize a local civil moment plus a decimal-hours UTC offset to a Julian Day.
pub fn normalize(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: f64,
    utc_offset_hours: f64,
) -> Result<JulianDay> {
    let offset = UtcOffset::from_hours(utc_offset_hours)?;
    CivilDateTime::new(year, month, day, hour, minute, second).julian_day(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn west_of_greenwich_stays_on_same_day() {
        let civil = CivilDateTime::new(2024, 5, 22, 10, 16, 0.0);
        let utc = civil.to_utc(UtcOffset::parse("UTC-08:00").unwrap()).unwrap();
        assert_eq!(utc.date, NaiveDate::from_ymd_opt(2024, 5, 22).unwrap());
        assert!((utc.hours - (18.0 + 16.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn rolls_across_month_boundaries() {
        let civil = CivilDateTime::new(2024, 2, 29, 20, 0, 0.0);
        let utc = civil.to_utc(UtcOffset::parse("UTC-05:00").unwrap()).unwrap();
        assert_eq!(utc.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!((utc.hours - 1.0).abs() < 1e-9);

        let civil = CivilDateTime::new(2025, 1, 1, 3, 0, 0.0);
        let utc = civil.to_utc(UtcOffset::parse("UTC+09:00").unwrap()).unwrap();
        assert_eq!(utc.date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert!((utc.hours - 18.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(normalize(2024, 4, 31, 12, 0, 0.0, 0.0).is_err());
        assert!(normalize(2023, 2, 29, 12, 0, 0.0, 0.0).is_err());
        assert!(normalize(2024, 13, 1, 12, 0, 0.0, 0.0).is_err());
        assert!(normalize(2024, 1, 1, 24, 0, 0.0, 0.0).is_err());
    }

    #[test]
    fn parses_form_strings() {
        let civil = CivilDateTime::parse("1990-07-14", "06:45").unwrap();
        assert_eq!(civil, CivilDateTime::new(1990, 7, 14, 6, 45, 0.0));
        let civil = CivilDateTime::parse("1990-07-14", "06:45:30").unwrap();
        assert_eq!(civil.second, 30.0);
        assert!(CivilDateTime::parse("1990/07/14", "06:45").is_err());
        assert!(CivilDateTime::parse("1990-07-14", "6").is_err());
    }
}
