pub mod calculator;
pub mod types;

pub use calculator::AspectCalculator;
pub use types::{Aspect, AspectKind, AspectPolicy, AspectSettings};

use crate::ephemeris::BodyPosition;

/// Aspects with the default catalogue orbs and first-match policy.
pub fn detect_aspects(bodies: &[BodyPosition]) -> Vec<Aspect> {
    AspectCalculator::default().detect(bodies)
}
