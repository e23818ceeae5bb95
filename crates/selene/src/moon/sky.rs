//! Horizontal (azimuth/altitude) position for an observer.
//!
//! The spherical transform itself belongs to the oracle. This module only
//! marshals inputs (degrees, east-positive longitude) and checks the triple
//! that comes back.

use serde::{Deserialize, Serialize};

use crate::angle::normalize_degrees;
use crate::ephemeris::{Atmosphere, AzAltMode, EphemerisProvider, GeoPosition};
use crate::error::{ChartError, Result};
use crate::time::JulianDay;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkyPosition {
    /// Degrees in [0, 360)
    pub azimuth: f64,
    /// Geometric altitude, degrees in [-90, 90]
    pub true_altitude: f64,
    /// Altitude including refraction, degrees in [-90, 90]
    pub apparent_altitude: f64,
}

/// Sky position of a body given in equatorial coordinates (RA, Dec in degrees).
pub fn topocentric(
    provider: &dyn EphemerisProvider,
    equatorial_longitude: f64,
    equatorial_latitude: f64,
    jd: JulianDay,
    geo: &GeoPosition,
    atmosphere: &Atmosphere,
) -> Result<SkyPosition> {
    horizontal(
        provider,
        AzAltMode::EquatorialToHorizontal,
        [equatorial_longitude, equatorial_latitude, 1.0],
        jd,
        geo,
        atmosphere,
    )
}

/// Sky position for coordinates in either frame.
pub fn horizontal(
    provider: &dyn EphemerisProvider,
    mode: AzAltMode,
    coords: [f64; 3],
    jd: JulianDay,
    geo: &GeoPosition,
    atmosphere: &Atmosphere,
) -> Result<SkyPosition> {
    geo.validate()?;
    if coords[..2].iter().any(|c| !c.is_finite()) {
        return Err(ChartError::invalid_input(format!(
            "non-finite coordinates {coords:?}"
        )));
    }
    let coords = [normalize_degrees(coords[0]), coords[1], coords[2]];

    let [azimuth, true_altitude, apparent_altitude] =
        provider.az_alt(jd, mode, geo, atmosphere, coords)?;
    validate_triple(jd, azimuth, true_altitude, apparent_altitude)
}

fn validate_triple(
    jd: JulianDay,
    azimuth: f64,
    true_altitude: f64,
    apparent_altitude: f64,
) -> Result<SkyPosition> {
    let in_altitude_range = |a: f64| (-90.0..=90.0).contains(&a);
    if !azimuth.is_finite() || !in_altitude_range(true_altitude) || !in_altitude_range(apparent_altitude) {
        return Err(ChartError::oracle(
            "azalt",
            jd.value(),
            format!(
                "horizontal coordinates out of range: az {azimuth}, alt {true_altitude}, apparent {apparent_altitude}"
            ),
        ));
    }
    Ok(SkyPosition {
        azimuth: normalize_degrees(azimuth),
        true_altitude,
        apparent_altitude,
    })
}
