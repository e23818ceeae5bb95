use serde::{Deserialize, Serialize};

use crate::ephemeris::{Body, GeoPosition};
use crate::error::{ChartError, Result};
use crate::houses::HouseSystem;
use crate::time::{CivilDateTime, UtcOffset};

/// Everything one chart computation needs from the caller.
///
/// `house_system` and `bodies` fall back to the engine configuration when
/// absent. Without `geo` the chart is computed in degraded mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub instant: CivilDateTime,
    #[serde(default)]
    pub utc_offset: UtcOffset,
    #[serde(default)]
    pub geo: Option<GeoPosition>,
    #[serde(default)]
    pub house_system: Option<HouseSystem>,
    #[serde(default)]
    pub bodies: Option<Vec<Body>>,
}

impl ChartRequest {
    pub fn new(instant: CivilDateTime, utc_offset: UtcOffset) -> Self {
        Self {
            instant,
            utc_offset,
            geo: None,
            house_system: None,
            bodies: None,
        }
    }

    /// Build from the raw strings a birth-data form collects.
    pub fn parse(date: &str, time: &str, utc_offset: &str) -> Result<Self> {
        Ok(Self::new(
            CivilDateTime::parse(date, time)?,
            UtcOffset::parse(utc_offset)?,
        ))
    }

    pub fn with_geo(mut self, geo: GeoPosition) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn with_house_system(mut self, system: HouseSystem) -> Self {
        self.house_system = Some(system);
        self
    }

    pub fn with_bodies(mut self, bodies: impl Into<Vec<Body>>) -> Self {
        self.bodies = Some(bodies.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.instant.validate()?;
        if let Some(geo) = &self.geo {
            geo.validate()?;
        }
        if let Some(bodies) = &self.bodies {
            if bodies.is_empty() {
                return Err(ChartError::invalid_input("body list must not be empty"));
            }
            for (i, body) in bodies.iter().enumerate() {
                if bodies[..i].contains(body) {
                    return Err(ChartError::invalid_input(format!("{body} requested twice")));
                }
            }
        }
        Ok(())
    }
}
