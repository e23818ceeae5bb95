//! Engine configuration loaded from TOML.
//!
//! ```toml
//! [ephemeris]
//! path = "/usr/local/share/swisseph"
//! flags = ["speed", "swiss"]
//!
//! [chart]
//! house_system = "placidus"
//! bodies = ["sun", "moon", "mercury"]
//! aspect_policy = "first_match"
//!
//! [chart.orbs]
//! conjunction = 10.0
//!
//! [output]
//! display_decimals = 2
//! raw_decimals = 6
//!
//! [sky]
//! pressure = 1013.25
//! temperature = 15.0
//! ```
//!
//! Every section and key is optional. Nothing is read from the environment.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::aspects::{AspectKind, AspectPolicy, AspectSettings};
use crate::ephemeris::{Atmosphere, Body, CalcFlags};
use crate::error::{ChartError, Result};
use crate::houses::HouseSystem;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EphemerisConfig {
    /// Directory holding the oracle's data files
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,
}

fn default_flags() -> Vec<String> {
    vec!["speed".to_string(), "swiss".to_string()]
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            path: None,
            flags: default_flags(),
        }
    }
}

impl EphemerisConfig {
    /// OR together the named flags.
    pub fn calc_flags(&self) -> Result<CalcFlags> {
        self.flags
            .iter()
            .try_fold(CalcFlags::NONE, |acc, name| Ok(acc | CalcFlags::from_name(name)?))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub house_system: HouseSystem,
    #[serde(default = "default_bodies")]
    pub bodies: Vec<Body>,
    #[serde(default)]
    pub aspect_policy: AspectPolicy,
    /// Orb overrides keyed by aspect name
    #[serde(default)]
    pub orbs: HashMap<String, f64>,
}

fn default_bodies() -> Vec<Body> {
    Body::PLANETS.to_vec()
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            house_system: HouseSystem::default(),
            bodies: default_bodies(),
            aspect_policy: AspectPolicy::default(),
            orbs: HashMap::new(),
        }
    }
}

impl ChartConfig {
    pub fn aspect_settings(&self) -> Result<AspectSettings> {
        let mut orb_settings = HashMap::new();
        for (name, orb) in &self.orbs {
            let kind: AspectKind = name
                .parse()
                .map_err(|_| ChartError::config(format!("Unknown aspect in [chart.orbs]: {name}")))?;
            if !orb.is_finite() || *orb < 0.0 {
                return Err(ChartError::config(format!("Orb for {name} must be a non-negative number")));
            }
            orb_settings.insert(kind, *orb);
        }
        Ok(AspectSettings {
            orb_settings,
            policy: self.aspect_policy,
        })
    }
}

/// Rounding applied when building reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_display_decimals")]
    pub display_decimals: u32,
    #[serde(default = "default_raw_decimals")]
    pub raw_decimals: u32,
}

fn default_display_decimals() -> u32 {
    2
}

fn default_raw_decimals() -> u32 {
    6
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            display_decimals: default_display_decimals(),
            raw_decimals: default_raw_decimals(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub ephemeris: EphemerisConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sky: Atmosphere,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)
            .map_err(|e| ChartError::config(format!("Failed to parse engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ChartError::config(format!("Could not read {}: {e}", path.display())))?;
        log::debug!("loading engine config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Resolve every named value so errors surface at load time.
    pub fn validate(&self) -> Result<()> {
        self.ephemeris.calc_flags()?;
        self.chart.aspect_settings()?;
        if self.chart.bodies.is_empty() {
            return Err(ChartError::config("[chart] bodies must not be empty"));
        }
        if self.output.display_decimals > 12 || self.output.raw_decimals > 12 {
            return Err(ChartError::config("[output] decimals must be at most 12"));
        }
        if !self.sky.pressure.is_finite() || !self.sky.temperature.is_finite() {
            return Err(ChartError::config("[sky] pressure and temperature must be finite"));
        }
        Ok(())
    }
}
