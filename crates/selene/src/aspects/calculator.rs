use crate::angle::{separation, signed_difference};
use crate::aspects::types::{Aspect, AspectKind, AspectPolicy, AspectSettings};
use crate::ephemeris::BodyPosition;

/// Orb below which an aspect counts as exact
const EXACT_ORB: f64 = 0.1;

/// Relative speeds below this (degrees/day) are treated as stationary
const STATIONARY_SPEED: f64 = 0.01;

/// Aspect calculator
#[derive(Debug, Clone, Default)]
pub struct AspectCalculator {
    settings: AspectSettings,
}

impl AspectCalculator {
    pub fn new(settings: AspectSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AspectSettings {
        &self.settings
    }

    /// Aspects between every unordered pair, at most one per pair.
    ///
    /// Output follows the input order: pairs `(i, j)` with `i < j`, `i` outer.
    pub fn detect(&self, bodies: &[BodyPosition]) -> Vec<Aspect> {
        let mut aspects = Vec::new();
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                if let Some(aspect) = self.calculate_aspect(&bodies[i], &bodies[j]) {
                    aspects.push(aspect);
                }
            }
        }
        aspects
    }

    /// Aspect between two bodies, if any orb admits their separation.
    pub fn calculate_aspect(&self, a: &BodyPosition, b: &BodyPosition) -> Option<Aspect> {
        let angle_diff = separation(a.longitude, b.longitude);
        let (kind, orb) = self.match_separation(angle_diff)?;

        Some(Aspect {
            body_a: a.body,
            body_b: b.body,
            kind,
            separation: angle_diff,
            exact_angle: kind.angle(),
            orb,
            applying: is_aspect_applying(
                a.longitude,
                b.longitude,
                a.longitude_speed,
                b.longitude_speed,
                kind.angle(),
            ),
            exact: orb < EXACT_ORB,
            retrograde: a.is_retrograde() || b.is_retrograde(),
        })
    }

    /// Aspect type and orb for a separation in [0, 180].
    pub fn match_separation(&self, angle_diff: f64) -> Option<(AspectKind, f64)> {
        let candidates = AspectKind::PRIORITY.iter().filter_map(|&kind| {
            let orb = (angle_diff - kind.angle()).abs();
            (orb <= self.settings.orb_for(kind)).then_some((kind, orb))
        });

        match self.settings.policy {
            AspectPolicy::FirstMatch => candidates.into_iter().next(),
            AspectPolicy::TightestOrb => candidates.fold(None, |best, (kind, orb)| match best {
                Some((_, best_orb)) if best_orb <= orb => best,
                _ => Some((kind, orb)),
            }),
        }
    }
}

/// Whether the separation is moving towards the exact aspect angle.
fn is_aspect_applying(lon1: f64, lon2: f64, speed1: f64, speed2: f64, aspect_angle: f64) -> bool {
    let relative_speed = speed1 - speed2;
    if relative_speed.abs() < STATIONARY_SPEED {
        return false;
    }

    let current_distance = (signed_difference(lon1, lon2).abs() - aspect_angle).abs();

    // Project a short step forward and see whether the gap narrows
    let time_step = 0.1;
    let future_signed = signed_difference(lon1 + speed1 * time_step, lon2 + speed2 * time_step);
    let future_distance = (future_signed.abs() - aspect_angle).abs();

    future_distance < current_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faster_body_closing_in_is_applying() {
        // Moon 5° behind the Sun, moving faster
        assert!(is_aspect_applying(95.0, 100.0, 13.0, 1.0, 0.0));
        // Moon 5° past the Sun
        assert!(!is_aspect_applying(105.0, 100.0, 13.0, 1.0, 0.0));
    }

    #[test]
    fn stationary_pair_is_not_applying() {
        assert!(!is_aspect_applying(10.0, 100.0, 1.0, 1.0, 90.0));
    }

    #[test]
    fn tightest_orb_policy_prefers_closer_angle() {
        let mut settings = AspectSettings {
            policy: AspectPolicy::TightestOrb,
            ..AspectSettings::default()
        };
        // Widen orbs so 40° admits both semi-sextile (10° off) and sextile (20° off)
        settings.orb_settings.insert(AspectKind::SemiSextile, 12.0);
        settings.orb_settings.insert(AspectKind::Sextile, 25.0);
        let tight = AspectCalculator::new(settings.clone());
        assert_eq!(tight.match_separation(40.0), Some((AspectKind::SemiSextile, 10.0)));

        settings.policy = AspectPolicy::FirstMatch;
        let first = AspectCalculator::new(settings);
        assert_eq!(first.match_separation(40.0), Some((AspectKind::Sextile, 20.0)));
    }
}
