use std::fmt;

use serde::{Deserialize, Serialize};

/// Degrees, arc-minutes and arc-seconds of a non-negative angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dms {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Dms {
    /// Round to the nearest arc-second and split.
    ///
    /// Working on whole seconds means a rounding carry propagates into the
    /// minutes and degrees, so `59.9999″` becomes `1′ 0″`, never `60″`.
    pub fn from_degrees(angle: f64) -> Self {
        let total_seconds = (angle.abs() * 3600.0).round() as u64;
        let degrees = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        Self {
            degrees: degrees as u32,
            minutes: minutes as u32,
            seconds: seconds as u32,
        }
    }

    pub fn to_degrees(self) -> f64 {
        self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds as f64 / 3600.0
    }
}

impl fmt::Display for Dms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°{:02}′{:02}″", self.degrees, self.minutes, self.seconds)
    }
}
