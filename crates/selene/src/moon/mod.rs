//! Moon phase, sky position and lunar cycle scans.

pub mod cycle;
pub mod phase;
pub mod sky;

pub use cycle::{find_loop_point, phase_angle_at, LoopPoint, LoopSearch, PhaseSample, PhaseSeries};
pub use phase::{lookup_phase, phase, phase_angle, try_phase, MoonPhase, PhaseName};
pub use sky::{horizontal, topocentric, SkyPosition};

use serde::Serialize;

use crate::ephemeris::{Atmosphere, AzAltMode, Body, CalcFlags, EphemerisSource, GeoPosition};
use crate::error::Result;
use crate::time::JulianDay;
use crate::zodiac::{classify, ZodiacPlacement};

/// Where the Moon is right now, in sign, phase and (optionally) sky terms
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoonPosition {
    pub julian_day: JulianDay,
    pub moon_longitude: f64,
    pub moon_latitude: f64,
    pub moon_distance: f64,
    pub moon_phase: MoonPhase,
    pub zodiac_sign: ZodiacPlacement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sky: Option<SkyPosition>,
}

/// Moon position report for one instant. Opens and releases one oracle session.
pub fn moon_position(
    source: &dyn EphemerisSource,
    jd: JulianDay,
    observer: Option<(&GeoPosition, &Atmosphere)>,
    flags: CalcFlags,
) -> Result<MoonPosition> {
    let provider = source.open()?;
    let moon = provider.calc_body(jd, Body::Moon, flags)?;
    let sun = provider.calc_body(jd, Body::Sun, flags)?;

    let sky = match observer {
        Some((geo, atmosphere)) => Some(horizontal(
            provider.as_ref(),
            AzAltMode::EclipticToHorizontal,
            [moon.longitude, moon.latitude, moon.distance],
            jd,
            geo,
            atmosphere,
        )?),
        None => None,
    };

    let position = MoonPosition {
        julian_day: jd,
        moon_longitude: moon.longitude,
        moon_latitude: moon.latitude,
        moon_distance: moon.distance,
        moon_phase: phase(moon.longitude, sun.longitude),
        zodiac_sign: classify(moon.longitude),
        sky,
    };
    log::debug!(
        "moon at JD {}: {} {} ({})",
        jd.value(),
        position.zodiac_sign.sign,
        position.zodiac_sign.dms,
        position.moon_phase.name
    );
    Ok(position)
}
