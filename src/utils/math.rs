// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::Point3;

/// Check if two floats are approximately equal
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Convert degrees to radians
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// Convert radians to degrees
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / std::f64::consts::PI
}

/// Midpoint of two positions
pub fn midpoint(a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    Point3::from((a.coords + b.coords) * 0.5)
}

/// Interior angle at `corner` between the edges to `prev` and `next`.
///
/// Returns `None` when either edge is shorter than `min_length`.
pub fn corner_angle(
    prev: &Point3<f64>,
    corner: &Point3<f64>,
    next: &Point3<f64>,
    min_length: f64,
) -> Option<f64> {
    let to_prev = prev - corner;
    let to_next = next - corner;
    let (len_prev, len_next) = (to_prev.norm(), to_next.norm());
    if len_prev <= min_length || len_next <= min_length {
        return None;
    }
    let cos = (to_prev.dot(&to_next) / (len_prev * len_next)).clamp(-1.0, 1.0);
    Some(cos.acos())
}

/// Smallest interior angle of a polygon loop.
///
/// Corners with a leg shorter than `min_length` are skipped; `None` when
/// every corner is skipped.
pub fn min_corner_angle(points: &[Point3<f64>], min_length: f64) -> Option<f64> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    (0..n)
        .filter_map(|i| corner_angle(&points[(i + n - 1) % n], &points[i], &points[(i + 1) % n], min_length))
        .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(1.0, 1.0001, 0.001));
        assert!(!approx_eq(1.0, 1.1, 0.001));
    }

    #[test]
    fn test_angle_conversion() {
        let rad = deg_to_rad(180.0);
        assert!(approx_eq(rad, std::f64::consts::PI, 1e-12));
        assert!(approx_eq(rad_to_deg(rad), 180.0, 1e-9));
    }

    #[test]
    fn test_min_corner_angle() {
        let right = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let angle = min_corner_angle(&right, 1e-6).map(rad_to_deg);
        assert!(approx_eq(angle.unwrap_or_default(), 45.0, 1e-9));

        let collapsed = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        // Only the corner at (0, 1) keeps both legs
        let angle = min_corner_angle(&collapsed, 1e-6).map(rad_to_deg);
        assert!(approx_eq(angle.unwrap_or_default(), 0.0, 1e-9));

        let point = [Point3::origin(); 3];
        assert!(min_corner_angle(&point, 1e-6).is_none());
    }
}
