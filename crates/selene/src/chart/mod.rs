//! Whole-chart pipeline: normalize the instant, query the oracle once per
//! body, derive houses, aspects and the moon phase, and shape the report.

pub mod calculator;
pub mod report;
pub mod request;

pub use calculator::{Chart, ChartCalculator, PlacedBody};
pub use report::{AngleEntry, AspectEntry, ChartReport, HouseEntry, PhaseEntry, PlanetEntry};
pub use request::ChartRequest;
