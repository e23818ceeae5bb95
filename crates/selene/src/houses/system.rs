use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChartError;

/// House division systems.
///
/// `Equal` is computed in-engine from sidereal time; every other system is
/// delegated to the ephemeris oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    Equal,
    #[default]
    Placidus,
    Koch,
    Regiomontanus,
    Campanus,
    Porphyry,
    Alcabitius,
    Morinus,
    WholeSign,
}

/// House system mapping: (system, config name, oracle code)
const HOUSE_SYSTEMS: &[(HouseSystem, &str, char)] = &[
    (HouseSystem::Equal, "equal", 'E'),
    (HouseSystem::Placidus, "placidus", 'P'),
    (HouseSystem::Koch, "koch", 'K'),
    (HouseSystem::Regiomontanus, "regiomontanus", 'R'),
    (HouseSystem::Campanus, "campanus", 'C'),
    (HouseSystem::Porphyry, "porphyry", 'O'),
    (HouseSystem::Alcabitius, "alcabitius", 'B'),
    (HouseSystem::Morinus, "morinus", 'M'),
    (HouseSystem::WholeSign, "whole_sign", 'W'),
];

impl HouseSystem {
    fn entry(self) -> &'static (HouseSystem, &'static str, char) {
        &HOUSE_SYSTEMS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// One-letter code understood by the oracle.
    pub fn code(self) -> char {
        self.entry().2
    }

    /// Whether cusps come from the oracle rather than the engine.
    pub fn is_delegated(self) -> bool {
        self != HouseSystem::Equal
    }
}

impl fmt::Display for HouseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HouseSystem {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        HOUSE_SYSTEMS
            .iter()
            .find(|(_, name, _)| *name == key)
            .map(|(system, ..)| *system)
            .ok_or_else(|| {
                ChartError::invalid_input(format!(
                    "Invalid house system: {s}. Valid systems: {:?}",
                    HOUSE_SYSTEMS.iter().map(|(_, name, _)| *name).collect::<Vec<_>>()
                ))
            })
    }
}
