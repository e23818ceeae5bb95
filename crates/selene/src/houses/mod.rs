//! House cusps and house assignment.

pub mod assign;
pub mod cusps;
pub mod equal;
pub mod system;

pub use assign::{equal_sign_house, house_of, HouseAssignment};
pub use cusps::{check_monotonic, HouseCusps};
pub use equal::{equal_ascendant, equal_houses, greenwich_sidereal_degrees, local_sidereal_degrees};
pub use system::HouseSystem;

use crate::ephemeris::{EphemerisProvider, GeoPosition};
use crate::error::{ChartError, Result};
use crate::time::JulianDay;

/// Cusps for `system` at `jd` seen from `geo`.
///
/// Equal houses never touch the oracle. Delegated systems turn any oracle
/// failure or malformed cusp set into [`ChartError::HouseCalculation`].
pub fn compute_houses(
    provider: &dyn EphemerisProvider,
    system: HouseSystem,
    jd: JulianDay,
    geo: &GeoPosition,
) -> Result<HouseCusps> {
    if !system.is_delegated() {
        return Ok(equal_houses(jd, geo.lon));
    }

    log::debug!(
        "requesting {} cusps at JD {} for ({}, {})",
        system,
        jd.value(),
        geo.lat,
        geo.lon
    );
    let raw = provider
        .calc_houses(jd, geo.lat, geo.lon, system.code())
        .map_err(|e| match e {
            ChartError::Oracle { message, .. } => {
                ChartError::house_calculation(format!("{system} cusps: {message}"))
            }
            other => other,
        })?;
    HouseCusps::from_raw(system, raw)
}
