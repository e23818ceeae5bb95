//! Deterministic in-memory oracle.
//!
//! Each body moves linearly from its tabulated position at `epoch` with its
//! tabulated daily speed. Cusps and horizontal coordinates are returned as
//! configured. Useful wherever chart logic must be exercised without the real
//! solver and its data files.

use std::collections::HashMap;

use super::provider::{EphemerisProvider, EphemerisSource};
use super::types::{AzAltMode, Atmosphere, Body, CalcFlags, EclipticPosition, GeoPosition, RawHouses};
use crate::error::{ChartError, Result};
use crate::time::JulianDay;

#[derive(Debug, Clone, Default)]
pub struct TableEphemeris {
    epoch: f64,
    bodies: HashMap<Body, EclipticPosition>,
    body_errors: HashMap<Body, String>,
    houses: Option<std::result::Result<RawHouses, String>>,
    horizontal: Option<[f64; 3]>,
}

impl TableEphemeris {
    pub fn new(epoch: JulianDay) -> Self {
        Self {
            epoch: epoch.value(),
            ..Self::default()
        }
    }

    pub fn with_body(self, body: Body, longitude: f64, speed: f64) -> Self {
        self.with_position(
            body,
            EclipticPosition {
                longitude,
                longitude_speed: speed,
                distance: 1.0,
                ..EclipticPosition::default()
            },
        )
    }

    pub fn with_position(mut self, body: Body, position: EclipticPosition) -> Self {
        self.bodies.insert(body, position);
        self
    }

    pub fn with_body_error(mut self, body: Body, message: impl Into<String>) -> Self {
        self.body_errors.insert(body, message.into());
        self
    }

    pub fn with_houses(mut self, houses: RawHouses) -> Self {
        self.houses = Some(Ok(houses));
        self
    }

    /// Twelve cusps with Ascendant and Midheaven taken from cusps 1 and 10.
    pub fn with_cusps(self, cusps: [f64; 12]) -> Self {
        self.with_houses(RawHouses {
            cusps: cusps.to_vec(),
            ascendant: Some(cusps[0]),
            midheaven: Some(cusps[9]),
        })
    }

    pub fn with_house_error(mut self, message: impl Into<String>) -> Self {
        self.houses = Some(Err(message.into()));
        self
    }

    pub fn with_horizontal(mut self, az_alt: [f64; 3]) -> Self {
        self.horizontal = Some(az_alt);
        self
    }
}

impl EphemerisProvider for TableEphemeris {
    fn calc_body(&self, jd: JulianDay, body: Body, _flags: CalcFlags) -> Result<EclipticPosition> {
        if let Some(message) = self.body_errors.get(&body) {
            return Err(ChartError::oracle(body.name(), jd.value(), message.clone()));
        }
        let base = self
            .bodies
            .get(&body)
            .ok_or_else(|| ChartError::oracle(body.name(), jd.value(), "body not tabulated"))?;

        let dt = jd.value() - self.epoch;
        Ok(EclipticPosition {
            longitude: base.longitude + base.longitude_speed * dt,
            latitude: base.latitude + base.latitude_speed * dt,
            distance: base.distance + base.distance_speed * dt,
            ..*base
        })
    }

    fn calc_houses(&self, jd: JulianDay, _lat: f64, _lon: f64, system_code: char) -> Result<RawHouses> {
        let context = format!("houses ({system_code})");
        match &self.houses {
            Some(Ok(houses)) => Ok(houses.clone()),
            Some(Err(message)) => Err(ChartError::oracle(context, jd.value(), message.clone())),
            None => Err(ChartError::oracle(context, jd.value(), "no house data tabulated")),
        }
    }

    fn az_alt(
        &self,
        jd: JulianDay,
        _mode: AzAltMode,
        _geo: &GeoPosition,
        _atmosphere: &Atmosphere,
        _coords: [f64; 3],
    ) -> Result<[f64; 3]> {
        self.horizontal
            .ok_or_else(|| ChartError::oracle("azalt", jd.value(), "no horizontal data tabulated"))
    }
}

impl EphemerisSource for TableEphemeris {
    fn open(&self) -> Result<Box<dyn EphemerisProvider + '_>> {
        Ok(Box::new(self))
    }
}
