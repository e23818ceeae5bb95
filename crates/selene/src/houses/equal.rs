//! Equal houses from mean sidereal time.

use crate::angle::normalize_degrees;
use crate::time::{JulianDay, J2000_JD};

use super::cusps::HouseCusps;
use super::system::HouseSystem;

/// Greenwich Mean Sidereal Time in degrees, [0, 360).
///
/// Meeus, *Astronomical Algorithms*, eq. 12.4.
pub fn greenwich_sidereal_degrees(jd: JulianDay) -> f64 {
    let t = jd.centuries_since_j2000();
    let gmst = 280.460_618_37 + 360.985_647_366_29 * (jd.value() - J2000_JD) + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    normalize_degrees(gmst)
}

/// Local sidereal time in degrees for an east-positive longitude.
pub fn local_sidereal_degrees(jd: JulianDay, longitude: f64) -> f64 {
    normalize_degrees(greenwich_sidereal_degrees(jd) + longitude)
}

/// Simplified ascendant: local sidereal time plus a quarter turn.
pub fn equal_ascendant(jd: JulianDay, longitude: f64) -> f64 {
    normalize_degrees(local_sidereal_degrees(jd, longitude) + 90.0)
}

/// Twelve 30° houses starting at the simplified ascendant.
pub fn equal_houses(jd: JulianDay, longitude: f64) -> HouseCusps {
    let ascendant = equal_ascendant(jd, longitude);
    let mut cusps = [0.0; 12];
    for (i, cusp) in cusps.iter_mut().enumerate() {
        *cusp = normalize_degrees(ascendant + i as f64 * 30.0);
    }
    log::debug!("equal houses at JD {}: ascendant {:.6}", jd.value(), ascendant);
    HouseCusps::from_validated(HouseSystem::Equal, cusps, ascendant, cusps[9])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmst_at_j2000() {
        let gmst = greenwich_sidereal_degrees(JulianDay(J2000_JD));
        assert!((gmst - 280.460_618_37).abs() < 1e-9);
    }

    #[test]
    fn gmst_meeus_example() {
        // Meeus example 12.a: 1987 April 10, 0h UT -> 13h10m46.3668s
        let gmst = greenwich_sidereal_degrees(JulianDay(2_446_895.5));
        let expected = (13.0 + 10.0 / 60.0 + 46.3668 / 3600.0) * 15.0;
        assert!((gmst - expected).abs() < 1e-4, "gmst = {gmst}");
    }

    #[test]
    fn cusps_step_by_thirty_degrees() {
        let houses = equal_houses(JulianDay(2_460_453.26), -118.24);
        let cusps = houses.cusps();
        for i in 0..12 {
            let next = cusps[(i + 1) % 12];
            let step = normalize_degrees(next - cusps[i]);
            assert!((step - 30.0).abs() < 1e-9);
        }
        assert_eq!(houses.ascendant, cusps[0]);
    }
}
