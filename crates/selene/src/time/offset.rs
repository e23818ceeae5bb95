use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};

lazy_static::lazy_static! {
    static ref OFFSET_PATTERN: Regex =
        Regex::new(r"^(?i)\s*(?:utc|gmt)?\s*(?:([+-])\s*(\d{1,2})(?::?(\d{2}))?)?\s*$")
            .expect("offset pattern is valid");
}

/// Largest offset in use anywhere (Line Islands, UTC+14:00).
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Fixed offset from UTC, stored in whole minutes. Serialized as `"UTC±HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UtcOffset {
    minutes: i32,
}

impl UtcOffset {
    pub const UTC: UtcOffset = UtcOffset { minutes: 0 };

    pub fn from_minutes(minutes: i32) -> Result<Self> {
        if minutes.unsigned_abs() > MAX_OFFSET_MINUTES.unsigned_abs() {
            return Err(ChartError::invalid_input(format!(
                "UTC offset of {minutes} minutes is out of range"
            )));
        }
        Ok(Self { minutes })
    }

    /// Offset from decimal hours, rounded to the nearest minute.
    pub fn from_hours(hours: f64) -> Result<Self> {
        if !hours.is_finite() {
            return Err(ChartError::invalid_input("UTC offset must be finite"));
        }
        if hours.abs() * 60.0 > MAX_OFFSET_MINUTES as f64 + 0.5 {
            return Err(ChartError::invalid_input(format!(
                "UTC offset of {hours} hours is out of range"
            )));
        }
        Self::from_minutes((hours * 60.0).round() as i32)
    }

    /// Parse `"UTC±HH:MM"`, `"±HH:MM"`, `"UTC±H"` or a bare `"UTC"`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || ChartError::invalid_input(format!("Cannot parse UTC offset '{text}'"));
        if text.trim().is_empty() {
            return Err(invalid());
        }
        let caps = OFFSET_PATTERN.captures(text).ok_or_else(invalid)?;

        let Some(sign) = caps.get(1) else {
            return Ok(Self::UTC);
        };
        let hours: i32 = caps[2].parse().map_err(|_| invalid())?;
        let minutes: i32 = match caps.get(3) {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0,
        };
        if minutes >= 60 {
            return Err(invalid());
        }
        let total = hours * 60 + minutes;
        Self::from_minutes(if sign.as_str() == "-" { -total } else { total })
    }

    pub fn minutes(self) -> i32 {
        self.minutes
    }

    pub fn hours(self) -> f64 {
        self.minutes as f64 / 60.0
    }
}

impl FromStr for UtcOffset {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UtcOffset {
    type Error = ChartError;

    fn try_from(text: String) -> Result<Self> {
        Self::parse(&text)
    }
}

impl From<UtcOffset> for String {
    fn from(offset: UtcOffset) -> String {
        offset.to_string()
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minutes < 0 { '-' } else { '+' };
        let abs = self.minutes.abs();
        write!(f, "UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
    }
}
