use super::types::{AzAltMode, Atmosphere, Body, CalcFlags, EclipticPosition, GeoPosition, RawHouses};
use crate::error::Result;
use crate::time::JulianDay;

/// The numerical ephemeris oracle the engine sits downstream of.
///
/// Implementations report failures as [`crate::ChartError::Oracle`]; the engine
/// never retries them.
pub trait EphemerisProvider {
    /// Ecliptic position and daily speeds of one body.
    fn calc_body(&self, jd: JulianDay, body: Body, flags: CalcFlags) -> Result<EclipticPosition>;

    /// House cusps for a quadrant system, identified by its one-letter code.
    fn calc_houses(&self, jd: JulianDay, lat: f64, lon: f64, system_code: char) -> Result<RawHouses>;

    /// Horizontal coordinates `[azimuth, true altitude, apparent altitude]`.
    fn az_alt(
        &self,
        jd: JulianDay,
        mode: AzAltMode,
        geo: &GeoPosition,
        atmosphere: &Atmosphere,
        coords: [f64; 3],
    ) -> Result<[f64; 3]>;
}

impl<P: EphemerisProvider + ?Sized> EphemerisProvider for &P {
    fn calc_body(&self, jd: JulianDay, body: Body, flags: CalcFlags) -> Result<EclipticPosition> {
        (**self).calc_body(jd, body, flags)
    }

    fn calc_houses(&self, jd: JulianDay, lat: f64, lon: f64, system_code: char) -> Result<RawHouses> {
        (**self).calc_houses(jd, lat, lon, system_code)
    }

    fn az_alt(
        &self,
        jd: JulianDay,
        mode: AzAltMode,
        geo: &GeoPosition,
        atmosphere: &Atmosphere,
        coords: [f64; 3],
    ) -> Result<[f64; 3]> {
        (**self).az_alt(jd, mode, geo, atmosphere, coords)
    }
}

/// Hands out request-scoped oracle sessions.
///
/// A session is opened once per chart and released when dropped; sessions
/// must not be shared between requests.
pub trait EphemerisSource {
    fn open(&self) -> Result<Box<dyn EphemerisProvider + '_>>;
}
