use serde::Serialize;

use super::request::ChartRequest;
use crate::angle::normalize_degrees;
use crate::aspects::{Aspect, AspectCalculator};
use crate::config::EngineConfig;
use crate::ephemeris::{Body, BodyPosition, CalcFlags, EclipticPosition, EphemerisProvider, EphemerisSource, GeoPosition};
use crate::error::{ChartError, Result};
use crate::houses::{compute_houses, equal_sign_house, HouseAssignment, HouseCusps, HouseSystem};
use crate::moon::{self, phase, MoonPhase, MoonPosition};
use crate::time::{JulianDay, UtcInstant};
use crate::zodiac::{classify, ZodiacPlacement};

/// One body of a chart with everything derived from its longitude
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBody {
    pub position: BodyPosition,
    pub placement: ZodiacPlacement,
    pub house: HouseAssignment,
}

/// A fully computed chart. Either every part is present or the computation failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub utc: UtcInstant,
    pub julian_day: JulianDay,
    pub geo: Option<GeoPosition>,
    pub house_system: HouseSystem,
    pub bodies: Vec<PlacedBody>,
    /// `None` in degraded mode
    pub houses: Option<HouseCusps>,
    pub aspects: Vec<Aspect>,
    /// Present when both the Sun and the Moon are in the chart
    pub moon_phase: Option<MoonPhase>,
}

impl Chart {
    pub fn body(&self, body: Body) -> Option<&PlacedBody> {
        self.bodies.iter().find(|placed| placed.position.body == body)
    }

    /// Whether houses were assigned by whole signs for lack of a location.
    pub fn is_degraded(&self) -> bool {
        self.houses.is_none()
    }
}

/// Runs the whole chart pipeline against an ephemeris source.
///
/// Holds no per-request state, so one calculator can serve many threads.
#[derive(Debug, Clone)]
pub struct ChartCalculator {
    config: EngineConfig,
    flags: CalcFlags,
    aspects: AspectCalculator,
}

impl ChartCalculator {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let flags = config.ephemeris.calc_flags()?;
        let aspects = AspectCalculator::new(config.chart.aspect_settings()?);
        Ok(Self {
            config,
            flags,
            aspects,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Moon report using the configured flags and `[sky]` atmosphere.
    pub fn moon_position(
        &self,
        source: &dyn EphemerisSource,
        jd: JulianDay,
        geo: Option<&GeoPosition>,
    ) -> Result<MoonPosition> {
        let observer = geo.map(|geo| (geo, &self.config.sky));
        moon::moon_position(source, jd, observer, self.flags)
    }

    pub fn compute(&self, source: &dyn EphemerisSource, request: &ChartRequest) -> Result<Chart> {
        request.validate()?;
        let utc = request.instant.to_utc(request.utc_offset)?;
        let jd = utc.julian_day();
        let house_system = request.house_system.unwrap_or(self.config.chart.house_system);
        let requested = request.bodies.as_deref().unwrap_or(self.config.chart.bodies.as_slice());
        log::debug!(
            "computing chart at JD {} ({} bodies, {} houses)",
            jd.value(),
            requested.len(),
            house_system
        );

        let (positions, houses) = {
            let provider = source.open()?;
            let positions = self.calc_bodies(provider.as_ref(), jd, requested)?;
            let houses = match &request.geo {
                Some(geo) => Some(compute_houses(provider.as_ref(), house_system, jd, geo)?),
                None => {
                    log::warn!("no observer location; assigning houses by whole signs from 0° Aries");
                    None
                }
            };
            (positions, houses)
        };

        let bodies: Vec<PlacedBody> = positions
            .iter()
            .map(|position| PlacedBody {
                position: *position,
                placement: classify(position.longitude),
                house: match &houses {
                    Some(cusps) => cusps.house_of(position.longitude),
                    None => HouseAssignment {
                        house: equal_sign_house(position.longitude),
                        fallback: false,
                    },
                },
            })
            .collect();

        let aspects = self.aspects.detect(&positions);
        let moon_phase = match (find(&positions, Body::Moon), find(&positions, Body::Sun)) {
            (Some(moon), Some(sun)) => Some(phase(moon.longitude, sun.longitude)),
            _ => None,
        };

        log::info!(
            "chart at JD {:.6}: {} bodies, {} aspects, {}",
            jd.value(),
            bodies.len(),
            aspects.len(),
            if houses.is_some() { house_system.name() } else { "degraded houses" }
        );

        Ok(Chart {
            utc,
            julian_day: jd,
            geo: request.geo,
            house_system,
            bodies,
            houses,
            aspects,
            moon_phase,
        })
    }

    /// Oracle positions in request order. The south node is mirrored from
    /// the north node rather than asked for.
    fn calc_bodies(
        &self,
        provider: &dyn EphemerisProvider,
        jd: JulianDay,
        bodies: &[Body],
    ) -> Result<Vec<BodyPosition>> {
        let mut north_node: Option<EclipticPosition> = None;
        let mut positions = Vec::with_capacity(bodies.len());

        for &body in bodies {
            let raw = if body == Body::SouthNode {
                let node = match north_node {
                    Some(node) => node,
                    None => self.calc_body(provider, jd, Body::NorthNode)?,
                };
                north_node = Some(node);
                EclipticPosition {
                    longitude: normalize_degrees(node.longitude + 180.0),
                    latitude: -node.latitude,
                    ..node
                }
            } else {
                let raw = self.calc_body(provider, jd, body)?;
                if body == Body::NorthNode {
                    north_node = Some(raw);
                }
                raw
            };
            positions.push(BodyPosition::from_ecliptic(body, &raw));
        }
        Ok(positions)
    }

    fn calc_body(&self, provider: &dyn EphemerisProvider, jd: JulianDay, body: Body) -> Result<EclipticPosition> {
        let raw = provider.calc_body(jd, body, self.flags)?;
        if !raw.longitude.is_finite() || !raw.longitude_speed.is_finite() {
            return Err(ChartError::oracle(
                body.name(),
                jd.value(),
                format!("non-finite position {raw:?}"),
            ));
        }
        Ok(raw)
    }
}

impl Default for ChartCalculator {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            flags: CalcFlags::SPEED | CalcFlags::SWIEPH,
            aspects: AspectCalculator::default(),
            config,
        }
    }
}

fn find(positions: &[BodyPosition], body: Body) -> Option<&BodyPosition> {
    positions.iter().find(|p| p.body == body)
}
