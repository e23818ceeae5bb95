//! Astrological chart engine.
//!
//! Everything downstream of a numerical ephemeris: civil time to Julian Day,
//! zodiac placement, house cusps and assignment, aspects, and moon phase /
//! sky position. The ephemeris itself is injected through
//! [`ephemeris::EphemerisSource`].

pub mod angle;
pub mod aspects;
pub mod chart;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod houses;
pub mod moon;
pub mod time;
pub mod zodiac;

pub use chart::{Chart, ChartCalculator, ChartReport, ChartRequest};
pub use config::EngineConfig;
pub use error::{ChartError, Result};

#[cfg(feature = "swiss-ephemeris")]
pub use ephemeris::SwissEphemerisAdapter;
pub use ephemeris::{EphemerisProvider, EphemerisSource, TableEphemeris};
