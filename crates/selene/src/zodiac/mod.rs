//! Zodiac placement of ecliptic longitudes.

pub mod dms;
pub mod sign;

pub use dms::Dms;
pub use sign::{Sign, SIGNS};

use serde::{Deserialize, Serialize};

use crate::angle::normalize_degrees;

/// Sign, intra-sign degree and DMS position of a longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZodiacPlacement {
    pub sign: Sign,
    /// Normalized ecliptic longitude in [0, 360)
    pub longitude: f64,
    /// Degrees past the start of the sign, in [0, 30)
    pub degrees_in_sign: f64,
    pub dms: Dms,
}

impl ZodiacPlacement {
    pub fn symbol(&self) -> &'static str {
        self.sign.symbol()
    }
}

/// Classify an ecliptic longitude. Total over all finite inputs.
pub fn classify(longitude: f64) -> ZodiacPlacement {
    let normalized = normalize_degrees(longitude);
    let index = ((normalized / 30.0).floor() as usize).min(11);
    let sign = Sign::from_index(index);
    let degrees_in_sign = normalized - index as f64 * 30.0;

    ZodiacPlacement {
        sign,
        longitude: normalized,
        degrees_in_sign,
        dms: Dms::from_degrees(degrees_in_sign),
    }
}
