use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ephemeris::Body;
use crate::error::ChartError;

/// Classical aspect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectKind {
    Conjunction,
    Opposition,
    Trine,
    Square,
    Sextile,
    Quincunx,
    SemiSextile,
}

/// Catalogue in priority order: (kind, name, exact angle, default orb, symbol)
const ASPECT_TABLE: &[(AspectKind, &str, f64, f64, &str)] = &[
    (AspectKind::Conjunction, "Conjunction", 0.0, 8.0, "☌"),
    (AspectKind::Opposition, "Opposition", 180.0, 8.0, "☍"),
    (AspectKind::Trine, "Trine", 120.0, 8.0, "△"),
    (AspectKind::Square, "Square", 90.0, 7.0, "□"),
    (AspectKind::Sextile, "Sextile", 60.0, 6.0, "⚹"),
    (AspectKind::Quincunx, "Quincunx", 150.0, 5.0, "⚻"),
    (AspectKind::SemiSextile, "Semi-Sextile", 30.0, 3.0, "⚺"),
];

impl AspectKind {
    /// All kinds, in the order they are tested.
    pub const PRIORITY: [AspectKind; 7] = [
        AspectKind::Conjunction,
        AspectKind::Opposition,
        AspectKind::Trine,
        AspectKind::Square,
        AspectKind::Sextile,
        AspectKind::Quincunx,
        AspectKind::SemiSextile,
    ];

    fn entry(self) -> &'static (AspectKind, &'static str, f64, f64, &'static str) {
        &ASPECT_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn angle(self) -> f64 {
        self.entry().2
    }

    pub fn default_orb(self) -> f64 {
        self.entry().3
    }

    pub fn symbol(self) -> &'static str {
        self.entry().4
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AspectKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        ASPECT_TABLE
            .iter()
            .find(|(_, name, ..)| name.to_lowercase().replace('-', "_") == key)
            .map(|(kind, ..)| *kind)
            .ok_or_else(|| ChartError::invalid_input(format!("Unknown aspect type: {s}")))
    }
}

/// How to pick between several aspect types whose orbs all admit a separation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectPolicy {
    /// First kind in priority order whose orb is satisfied
    #[default]
    FirstMatch,
    /// Kind with the smallest orb; ties resolve in priority order
    TightestOrb,
}

/// Settings for aspect calculations
#[derive(Debug, Clone, Default)]
pub struct AspectSettings {
    /// Orb overrides per aspect type; kinds not listed use their default orb
    pub orb_settings: HashMap<AspectKind, f64>,
    pub policy: AspectPolicy,
}

impl AspectSettings {
    pub fn orb_for(&self, kind: AspectKind) -> f64 {
        self.orb_settings
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_orb())
    }
}

/// An aspect between two bodies of one chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub body_a: Body,
    pub body_b: Body,
    pub kind: AspectKind,
    /// Shortest angular separation of the two bodies, [0, 180]
    pub separation: f64,
    /// Exact angle for this aspect type
    pub exact_angle: f64,
    /// Deviation from the exact angle
    pub orb: f64,
    /// Whether the separation is closing on the exact angle
    pub applying: bool,
    /// Whether the orb is under 0.1°
    pub exact: bool,
    /// Whether either body is retrograde
    pub retrograde: bool,
}

impl Aspect {
    pub fn symbol(&self) -> &'static str {
        self.kind.symbol()
    }

    /// Whether this aspect joins `a` and `b`, in either order.
    pub fn involves(&self, a: Body, b: Body) -> bool {
        (self.body_a == a && self.body_b == b) || (self.body_a == b && self.body_b == a)
    }
}
