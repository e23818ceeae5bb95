//! Presentation DTOs handed to rendering and storage layers.
//!
//! Display degrees are rounded to `display_decimals`, raw longitudes and
//! speeds to `raw_decimals`.

use serde::Serialize;

use super::calculator::{Chart, PlacedBody};
use crate::aspects::Aspect;
use crate::config::OutputConfig;
use crate::zodiac::classify;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetEntry {
    pub name: String,
    pub sign: String,
    /// Degrees within the sign
    pub position: f64,
    #[serde(rename = "positionDMS")]
    pub position_dms: String,
    pub house: u8,
    pub longitude: f64,
    pub speed: f64,
    pub retrograde: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseEntry {
    pub number: u8,
    pub sign: String,
    pub position: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectEntry {
    pub planet1: String,
    pub planet2: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Measured separation between the two bodies
    pub angle: f64,
    pub orb: f64,
    pub symbol: String,
    pub applying: bool,
    pub exact: bool,
}

/// Ascendant or Midheaven
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleEntry {
    pub sign: String,
    pub position: f64,
    #[serde(rename = "positionDMS")]
    pub position_dms: String,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseEntry {
    pub name: String,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartReport {
    pub julian_day: f64,
    pub utc_date: String,
    pub utc_hours: f64,
    pub house_system: String,
    /// Houses assigned by whole signs because no location was given
    pub degraded: bool,
    pub planets: Vec<PlanetEntry>,
    pub houses: Vec<HouseEntry>,
    pub aspects: Vec<AspectEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascendant: Option<AngleEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midheaven: Option<AngleEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moon_phase: Option<PhaseEntry>,
}

impl ChartReport {
    pub fn from_chart(chart: &Chart, output: &OutputConfig) -> Self {
        let display = |v: f64| round_to(v, output.display_decimals);
        let raw = |v: f64| round_to(v, output.raw_decimals);

        let angle_entry = |longitude: f64| {
            let placement = classify(longitude);
            AngleEntry {
                sign: placement.sign.name().to_string(),
                position: display(placement.degrees_in_sign),
                position_dms: placement.dms.to_string(),
                longitude: raw(placement.longitude),
            }
        };

        let planets = chart
            .bodies
            .iter()
            .map(|placed| planet_entry(placed, &display, &raw))
            .collect();

        let houses = chart
            .houses
            .iter()
            .flat_map(|cusps| cusps.iter())
            .map(|(number, longitude)| {
                let placement = classify(longitude);
                HouseEntry {
                    number,
                    sign: placement.sign.name().to_string(),
                    position: display(placement.degrees_in_sign),
                    longitude: raw(longitude),
                }
            })
            .collect();

        let aspects = chart
            .aspects
            .iter()
            .map(|aspect| aspect_entry(aspect, &display))
            .collect();

        Self {
            julian_day: raw(chart.julian_day.value()),
            utc_date: chart.utc.date.to_string(),
            utc_hours: raw(chart.utc.hours),
            house_system: chart.house_system.name().to_string(),
            degraded: chart.is_degraded(),
            planets,
            houses,
            aspects,
            ascendant: chart.houses.as_ref().map(|h| angle_entry(h.ascendant)),
            midheaven: chart.houses.as_ref().map(|h| angle_entry(h.midheaven)),
            moon_phase: chart.moon_phase.map(|p| PhaseEntry {
                name: p.name.name().to_string(),
                angle: display(p.angle),
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn planet_entry(placed: &PlacedBody, display: &dyn Fn(f64) -> f64, raw: &dyn Fn(f64) -> f64) -> PlanetEntry {
    PlanetEntry {
        name: placed.position.body.name().to_string(),
        sign: placed.placement.sign.name().to_string(),
        position: display(placed.placement.degrees_in_sign),
        position_dms: placed.placement.dms.to_string(),
        house: placed.house.house,
        longitude: raw(placed.position.longitude),
        speed: raw(placed.position.longitude_speed),
        retrograde: placed.position.is_retrograde(),
    }
}

fn aspect_entry(aspect: &Aspect, display: &dyn Fn(f64) -> f64) -> AspectEntry {
    AspectEntry {
        planet1: aspect.body_a.name().to_string(),
        planet2: aspect.body_b.name().to_string(),
        kind: aspect.kind.name().to_string(),
        angle: display(aspect.separation),
        orb: display(aspect.orb),
        symbol: aspect.symbol().to_string(),
        applying: aspect.applying,
        exact: aspect.exact,
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
