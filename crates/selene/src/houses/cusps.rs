use serde::Serialize;

use crate::angle::normalize_degrees;
use crate::ephemeris::RawHouses;
use crate::error::{ChartError, Result};

use super::assign::{house_of, HouseAssignment};
use super::system::HouseSystem;

/// Slack allowed when checking that cusp arcs close the circle.
const CLOSURE_TOLERANCE: f64 = 1e-6;

/// A validated set of twelve house cusps.
///
/// Cusps are normalized to [0, 360) and increase monotonically modulo 360°
/// when walked from house 1 through house 12 and back to house 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HouseCusps {
    pub system: HouseSystem,
    cusps: [f64; 12],
    pub ascendant: f64,
    pub midheaven: f64,
}

impl HouseCusps {
    pub fn new(system: HouseSystem, cusps: [f64; 12], ascendant: f64, midheaven: f64) -> Result<Self> {
        if let Some(bad) = cusps.iter().chain([&ascendant, &midheaven]).find(|v| !v.is_finite()) {
            return Err(ChartError::house_calculation(format!("non-finite cusp value {bad}")));
        }
        let cusps = cusps.map(normalize_degrees);
        check_monotonic(&cusps)?;
        Ok(Self::from_validated(
            system,
            cusps,
            normalize_degrees(ascendant),
            normalize_degrees(midheaven),
        ))
    }

    /// Validate oracle output. A cusp list that is not exactly twelve long is
    /// fatal; a missing Ascendant or Midheaven falls back to cusp 1 or 10.
    pub fn from_raw(system: HouseSystem, raw: RawHouses) -> Result<Self> {
        let cusps: [f64; 12] = raw.cusps.as_slice().try_into().map_err(|_| {
            ChartError::house_calculation(format!(
                "expected 12 house cusps from {system}, got {}",
                raw.cusps.len()
            ))
        })?;
        let ascendant = raw.ascendant.unwrap_or(cusps[0]);
        let midheaven = raw.midheaven.unwrap_or(cusps[9]);
        Self::new(system, cusps, ascendant, midheaven)
    }

    pub(crate) fn from_validated(
        system: HouseSystem,
        cusps: [f64; 12],
        ascendant: f64,
        midheaven: f64,
    ) -> Self {
        Self {
            system,
            cusps,
            ascendant,
            midheaven,
        }
    }

    pub fn cusps(&self) -> &[f64; 12] {
        &self.cusps
    }

    /// Cusp of house `number` (1-12).
    pub fn cusp(&self, number: usize) -> Option<f64> {
        number.checked_sub(1).and_then(|i| self.cusps.get(i)).copied()
    }

    pub fn descendant(&self) -> f64 {
        normalize_degrees(self.ascendant + 180.0)
    }

    pub fn imum_coeli(&self) -> f64 {
        normalize_degrees(self.midheaven + 180.0)
    }

    /// `(house number, cusp longitude)` pairs in house order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.cusps.iter().enumerate().map(|(i, c)| (i as u8 + 1, *c))
    }

    pub fn house_of(&self, longitude: f64) -> HouseAssignment {
        house_of(longitude, &self.cusps)
    }
}

/// Every forward arc between consecutive cusps is positive and together they
/// cover exactly one turn.
pub fn check_monotonic(cusps: &[f64; 12]) -> Result<()> {
    let mut total = 0.0;
    for i in 0..12 {
        let arc = normalize_degrees(cusps[(i + 1) % 12] - cusps[i]);
        if arc <= 0.0 {
            return Err(ChartError::house_calculation(format!(
                "cusps {} and {} coincide at {:.6}",
                i + 1,
                (i + 1) % 12 + 1,
                cusps[i]
            )));
        }
        total += arc;
    }
    if (total - 360.0).abs() > CLOSURE_TOLERANCE {
        return Err(ChartError::house_calculation(format!(
            "cusps are not monotonic modulo 360 (arcs sum to {total:.6})"
        )));
    }
    Ok(())
}
