use serde::{Deserialize, Serialize};

use crate::angle::{in_arc, normalize_degrees};

/// House a longitude falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseAssignment {
    /// 1-12
    pub house: u8,
    /// Set when no cusp interval matched and house 1 was substituted
    pub fallback: bool,
}

impl HouseAssignment {
    fn matched(house: u8) -> Self {
        Self {
            house,
            fallback: false,
        }
    }
}

/// Place a longitude between consecutive cusps, wrapping through 0°.
///
/// House 12 runs from its cusp to the Ascendant and is tested first since it
/// is the interval that most often straddles 0°. If nothing matches, which
/// only happens with corrupt cusps or a non-finite longitude, house 1 is
/// returned with `fallback` set.
pub fn house_of(longitude: f64, cusps: &[f64; 12]) -> HouseAssignment {
    let lon = normalize_degrees(longitude);
    let cusps = cusps.map(normalize_degrees);

    if in_arc(lon, cusps[11], cusps[0]) {
        return HouseAssignment::matched(12);
    }
    for i in 0..11 {
        if in_arc(lon, cusps[i], cusps[i + 1]) {
            return HouseAssignment::matched(i as u8 + 1);
        }
    }

    log::warn!(
        "no house interval contains longitude {} (cusps {:?}); assigning house 1",
        longitude,
        cusps
    );
    HouseAssignment {
        house: 1,
        fallback: true,
    }
}

/// Degraded mode without cusps: whole signs counted from 0° Aries.
pub fn equal_sign_house(longitude: f64) -> u8 {
    ((normalize_degrees(longitude) / 30.0).floor() as u8 % 12) + 1
}
