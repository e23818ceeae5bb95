//! Small helpers for working on the 360° circle.

/// Normalize any angle to [0, 360).
///
/// Uses the double modulo so that negative oracle longitudes land in range,
/// and folds the `360.0` produced by rounding on tiny negatives back to zero.
pub fn normalize_degrees(angle: f64) -> f64 {
    let n = ((angle % 360.0) + 360.0) % 360.0;
    if n >= 360.0 {
        0.0
    } else {
        n
    }
}

/// Shortest unsigned separation between two longitudes, in [0, 180].
pub fn separation(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Signed difference `a - b` folded into (-180, 180].
pub fn signed_difference(a: f64, b: f64) -> f64 {
    let d = normalize_degrees(a - b);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Whether `lon` lies in the half-open arc `[start, end)` walked forward,
/// wrapping through 0° when `end` is numerically smaller than `start`.
pub fn in_arc(lon: f64, start: f64, end: f64) -> bool {
    if start <= end {
        lon >= start && lon < end
    } else {
        lon >= start || lon < end
    }
}
