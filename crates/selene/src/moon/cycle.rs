//! Scanning the phase angle over time: hourly series, new-moon crossings
//! and the point where a lunation loops back on itself.

use serde::{Deserialize, Serialize};

use super::phase::phase_angle;
use crate::angle::separation;
use crate::ephemeris::{Body, CalcFlags, EphemerisProvider};
use crate::error::Result;
use crate::time::JulianDay;

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.53;

/// Phase angle from the oracle's Sun and Moon at `jd`.
pub fn phase_angle_at(provider: &dyn EphemerisProvider, jd: JulianDay, flags: CalcFlags) -> Result<f64> {
    let moon = provider.calc_body(jd, Body::Moon, flags)?;
    let sun = provider.calc_body(jd, Body::Sun, flags)?;
    Ok(phase_angle(moon.longitude, sun.longitude))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseSample {
    /// Hours since the start of the series
    pub hour: usize,
    pub julian_day: JulianDay,
    pub angle: f64,
}

/// Phase angle sampled once per hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSeries {
    pub start: JulianDay,
    samples: Vec<PhaseSample>,
}

impl PhaseSeries {
    /// Sample `hours` consecutive hours starting at `start`.
    pub fn hourly(
        provider: &dyn EphemerisProvider,
        start: JulianDay,
        hours: usize,
        flags: CalcFlags,
    ) -> Result<Self> {
        let samples = (0..hours)
            .map(|hour| {
                let julian_day = start.add_hours(hour as f64);
                phase_angle_at(provider, julian_day, flags).map(|angle| PhaseSample {
                    hour,
                    julian_day,
                    angle,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!("sampled {} hourly phase angles from JD {}", samples.len(), start.value());
        Ok(Self { start, samples })
    }

    pub fn samples(&self) -> &[PhaseSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// First sample after each wrap of the phase angle from ~360° to ~0°.
    pub fn new_moons(&self) -> Vec<PhaseSample> {
        self.samples
            .windows(2)
            .filter(|w| w[0].angle - w[1].angle > 180.0)
            .map(|w| w[1])
            .collect()
    }
}

/// Where to look for a lunation's loop point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopSearch {
    /// Hours either side of one synodic month
    pub window_hours: i64,
    pub step_hours: i64,
    /// Largest acceptable phase mismatch in degrees
    pub max_difference: f64,
}

impl Default for LoopSearch {
    fn default() -> Self {
        Self {
            window_hours: 72,
            step_hours: 6,
            max_difference: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopPoint {
    /// Hours after the start whose phase best matches the start
    pub offset_hours: i64,
    pub start_angle: f64,
    pub angle: f64,
    /// Separation between the two angles
    pub difference: f64,
}

impl LoopPoint {
    /// Offset rounded to the nearest whole day, for loops that must restart
    /// on a day boundary.
    pub fn whole_day_hours(&self) -> i64 {
        (self.offset_hours as f64 / 24.0).round() as i64 * 24
    }
}

/// Find the offset, near one synodic month after `start`, whose phase angle is
/// closest to the phase at `start`. `None` when even the best candidate misses
/// by more than `search.max_difference`.
pub fn find_loop_point(
    provider: &dyn EphemerisProvider,
    start: JulianDay,
    search: &LoopSearch,
    flags: CalcFlags,
) -> Result<Option<LoopPoint>> {
    let start_angle = phase_angle_at(provider, start, flags)?;
    let base_hours = (SYNODIC_MONTH_DAYS * 24.0) as i64;
    let step = search.step_hours.max(1);

    let mut best: Option<LoopPoint> = None;
    for hours in (base_hours - search.window_hours)..(base_hours + search.window_hours) {
        if hours % step != 0 {
            continue;
        }
        let angle = phase_angle_at(provider, start.add_hours(hours as f64), flags)?;
        let difference = separation(angle, start_angle);
        if best.map_or(true, |b| difference < b.difference) {
            best = Some(LoopPoint {
                offset_hours: hours,
                start_angle,
                angle,
                difference,
            });
        }
    }

    match best {
        Some(point) if point.difference <= search.max_difference => Ok(Some(point)),
        Some(point) => {
            log::info!(
                "best loop candidate at +{}h misses by {:.2}°",
                point.offset_hours,
                point.difference
            );
            Ok(None)
        }
        None => Ok(None),
    }
}
