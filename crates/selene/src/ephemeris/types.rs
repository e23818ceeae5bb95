use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};

/// Bodies the engine knows how to place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Chiron,
    /// Mean lunar apogee
    BlackMoonLilith,
    /// True lunar node
    NorthNode,
    /// Derived from the north node, never requested from the oracle
    SouthNode,
}

/// Planet catalogue: (body, display name, id, Swiss Ephemeris body code)
const BODY_TABLE: &[(Body, &str, &str, i32)] = &[
    (Body::Sun, "Sun", "sun", 0),
    (Body::Moon, "Moon", "moon", 1),
    (Body::Mercury, "Mercury", "mercury", 2),
    (Body::Venus, "Venus", "venus", 3),
    (Body::Mars, "Mars", "mars", 4),
    (Body::Jupiter, "Jupiter", "jupiter", 5),
    (Body::Saturn, "Saturn", "saturn", 6),
    (Body::Uranus, "Uranus", "uranus", 7),
    (Body::Neptune, "Neptune", "neptune", 8),
    (Body::Pluto, "Pluto", "pluto", 9),
    (Body::Chiron, "Chiron", "chiron", 15),
    (Body::BlackMoonLilith, "Black Moon Lilith", "black_moon_lilith", 13),
    (Body::NorthNode, "North Node", "north_node", 11),
    (Body::SouthNode, "South Node", "south_node", -1),
];

impl Body {
    /// The ten classical chart bodies, Sun through Pluto.
    pub const PLANETS: [Body; 10] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    fn entry(self) -> &'static (Body, &'static str, &'static str, i32) {
        // Every variant has a row
        &BODY_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn id(self) -> &'static str {
        self.entry().2
    }

    /// Swiss Ephemeris body number, `None` for derived points.
    pub fn swe_code(self) -> Option<i32> {
        let code = self.entry().3;
        (code >= 0).then_some(code)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        BODY_TABLE
            .iter()
            .find(|(_, name, id, _)| *id == key || name.eq_ignore_ascii_case(s.trim()))
            .map(|(body, ..)| *body)
            .ok_or_else(|| ChartError::invalid_input(format!("Unknown body: {s}")))
    }
}

/// Raw oracle output for one body at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EclipticPosition {
    /// Ecliptic longitude in degrees; may arrive un-normalized
    pub longitude: f64,
    pub latitude: f64,
    /// Distance in AU
    pub distance: f64,
    /// Degrees per day
    pub longitude_speed: f64,
    pub latitude_speed: f64,
    pub distance_speed: f64,
}

/// A body's position for one chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub body: Body,
    /// Normalized to [0, 360)
    pub longitude: f64,
    pub latitude: f64,
    pub distance: f64,
    pub longitude_speed: f64,
}

impl BodyPosition {
    pub fn from_ecliptic(body: Body, pos: &EclipticPosition) -> Self {
        Self {
            body,
            longitude: crate::angle::normalize_degrees(pos.longitude),
            latitude: pos.latitude,
            distance: pos.distance,
            longitude_speed: pos.longitude_speed,
        }
    }

    pub fn is_retrograde(&self) -> bool {
        self.longitude_speed < 0.0
    }
}

/// Observer location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
    /// Metres above sea level
    #[serde(default)]
    pub altitude: f64,
}

impl GeoPosition {
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        Self::with_altitude(lat, lon, 0.0)
    }

    pub fn with_altitude(lat: f64, lon: f64, altitude: f64) -> Result<Self> {
        let geo = Self { lat, lon, altitude };
        geo.validate()?;
        Ok(geo)
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(ChartError::invalid_input(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(ChartError::invalid_input(format!(
                "longitude {} outside [-180, 180]",
                self.lon
            )));
        }
        if !self.altitude.is_finite() {
            return Err(ChartError::invalid_input("altitude must be finite"));
        }
        Ok(())
    }
}

/// House data as handed back by the oracle, before validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawHouses {
    pub cusps: Vec<f64>,
    pub ascendant: Option<f64>,
    pub midheaven: Option<f64>,
}

/// Calculation flag bits understood by the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalcFlags(pub u32);

impl CalcFlags {
    pub const NONE: CalcFlags = CalcFlags(0);
    /// Use Swiss Ephemeris data files
    pub const SWIEPH: CalcFlags = CalcFlags(2);
    /// Use the built-in Moshier theory
    pub const MOSEPH: CalcFlags = CalcFlags(4);
    pub const SIDEREAL: CalcFlags = CalcFlags(64);
    /// Also compute daily speeds
    pub const SPEED: CalcFlags = CalcFlags(256);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: CalcFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Resolve a configuration flag name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "speed" => Ok(Self::SPEED),
            "swiss" | "swieph" => Ok(Self::SWIEPH),
            "moshier" | "moseph" => Ok(Self::MOSEPH),
            "sidereal" => Ok(Self::SIDEREAL),
            other => Err(ChartError::config(format!("Unknown calculation flag: {other}"))),
        }
    }
}

impl BitOr for CalcFlags {
    type Output = CalcFlags;

    fn bitor(self, rhs: CalcFlags) -> CalcFlags {
        CalcFlags(self.0 | rhs.0)
    }
}

/// Input frame for the horizontal transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AzAltMode {
    EclipticToHorizontal,
    EquatorialToHorizontal,
}

impl AzAltMode {
    /// Swiss Ephemeris `SE_ECL2HOR` / `SE_EQU2HOR`
    pub fn swe_code(self) -> i32 {
        match self {
            AzAltMode::EclipticToHorizontal => 0,
            AzAltMode::EquatorialToHorizontal => 1,
        }
    }
}

/// Atmospheric conditions used for refraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Atmosphere {
    /// Millibar
    pub pressure: f64,
    /// Degrees Celsius
    pub temperature: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            pressure: 1013.25,
            temperature: 15.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_table_is_indexed_by_variant() {
        for (i, (body, ..)) in BODY_TABLE.iter().enumerate() {
            assert_eq!(*body as usize, i);
        }
    }

    #[test]
    fn parses_names_and_ids() {
        assert_eq!("Sun".parse::<Body>().unwrap(), Body::Sun);
        assert_eq!("north_node".parse::<Body>().unwrap(), Body::NorthNode);
        assert_eq!("Black Moon Lilith".parse::<Body>().unwrap(), Body::BlackMoonLilith);
        assert!("vulcan".parse::<Body>().is_err());
    }

    #[test]
    fn south_node_has_no_oracle_code() {
        assert_eq!(Body::SouthNode.swe_code(), None);
        assert_eq!(Body::Chiron.swe_code(), Some(15));
    }

    #[test]
    fn geo_position_rejects_out_of_range() {
        assert!(GeoPosition::new(91.0, 0.0).is_err());
        assert!(GeoPosition::new(0.0, -181.0).is_err());
        assert!(GeoPosition::new(f64::NAN, 0.0).is_err());
        assert!(GeoPosition::new(34.05, -118.24).is_ok());
    }
}
