use std::fmt;

use serde::{Deserialize, Serialize};

use crate::angle::normalize_degrees;
use crate::error::{ChartError, Result};

/// The eight 45°-wide phases of the lunar cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseName {
    #[serde(rename = "New Moon")]
    NewMoon,
    #[serde(rename = "Waxing Crescent")]
    WaxingCrescent,
    #[serde(rename = "First Quarter")]
    FirstQuarter,
    #[serde(rename = "Waxing Gibbous")]
    WaxingGibbous,
    #[serde(rename = "Full Moon")]
    FullMoon,
    #[serde(rename = "Waning Gibbous")]
    WaningGibbous,
    #[serde(rename = "Last Quarter")]
    LastQuarter,
    #[serde(rename = "Waning Crescent")]
    WaningCrescent,
}

/// Phase buckets: (phase, start angle, end angle), half-open
const MOON_PHASES: [(PhaseName, f64, f64); 8] = [
    (PhaseName::NewMoon, 0.0, 45.0),
    (PhaseName::WaxingCrescent, 45.0, 90.0),
    (PhaseName::FirstQuarter, 90.0, 135.0),
    (PhaseName::WaxingGibbous, 135.0, 180.0),
    (PhaseName::FullMoon, 180.0, 225.0),
    (PhaseName::WaningGibbous, 225.0, 270.0),
    (PhaseName::LastQuarter, 270.0, 315.0),
    (PhaseName::WaningCrescent, 315.0, 360.0),
];

impl PhaseName {
    pub fn name(self) -> &'static str {
        match self {
            PhaseName::NewMoon => "New Moon",
            PhaseName::WaxingCrescent => "Waxing Crescent",
            PhaseName::FirstQuarter => "First Quarter",
            PhaseName::WaxingGibbous => "Waxing Gibbous",
            PhaseName::FullMoon => "Full Moon",
            PhaseName::WaningGibbous => "Waning Gibbous",
            PhaseName::LastQuarter => "Last Quarter",
            PhaseName::WaningCrescent => "Waning Crescent",
        }
    }

    /// Whether the lit fraction is growing
    pub fn is_waxing(self) -> bool {
        matches!(
            self,
            PhaseName::NewMoon
                | PhaseName::WaxingCrescent
                | PhaseName::FirstQuarter
                | PhaseName::WaxingGibbous
        )
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named phase and Sun-Moon elongation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonPhase {
    pub name: PhaseName,
    /// (Moon − Sun) in [0, 360)
    pub angle: f64,
}

/// Elongation of the Moon east of the Sun, in [0, 360).
pub fn phase_angle(moon_longitude: f64, sun_longitude: f64) -> f64 {
    normalize_degrees(moon_longitude - sun_longitude)
}

/// Bucket an elongation into its named phase.
pub fn lookup_phase(angle: f64) -> Result<PhaseName> {
    MOON_PHASES
        .iter()
        .find(|(_, start, end)| angle >= *start && angle < *end)
        .map(|(name, ..)| *name)
        .ok_or(ChartError::PhaseLookup { angle })
}

/// Phase for a Moon/Sun longitude pair, failing on a lookup miss.
pub fn try_phase(moon_longitude: f64, sun_longitude: f64) -> Result<MoonPhase> {
    let angle = phase_angle(moon_longitude, sun_longitude);
    Ok(MoonPhase {
        name: lookup_phase(angle)?,
        angle,
    })
}

/// Phase for a Moon/Sun longitude pair.
///
/// A lookup miss can only come from a non-finite longitude; it is logged
/// and reported as New Moon rather than aborting the caller.
pub fn phase(moon_longitude: f64, sun_longitude: f64) -> MoonPhase {
    try_phase(moon_longitude, sun_longitude).unwrap_or_else(|err| {
        log::warn!("{err}; reporting New Moon");
        MoonPhase {
            name: PhaseName::NewMoon,
            angle: phase_angle(moon_longitude, sun_longitude),
        }
    })
}
