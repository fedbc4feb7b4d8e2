// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon triangulation by ear clipping
//!
//! Works on the polygon projected along its dominant normal axis. When no
//! ear can be found (self-overlapping or degenerate loops) the remaining
//! corners are fanned from the corner that leaves the fewest zero-area
//! triangles, so an n-gon always yields n - 2 triangles.

use nalgebra::{Point3, Vector3};

/// Triangulate a polygon loop, returning triangles as local corner indices
/// that preserve the loop's winding.
pub fn triangulate_polygon(points: &[Point3<f64>]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    if n == 3 {
        return vec![[0, 1, 2]];
    }

    let normal = polygon_normal(points);
    if normal.norm_squared() <= f64::EPSILON {
        return fan(points, &(0..n).collect::<Vec<_>>());
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let count = remaining.len();
        let ear = (0..count).find(|&i| {
            let prev = remaining[(i + count - 1) % count];
            let curr = remaining[i];
            let next = remaining[(i + 1) % count];
            is_ear(points, &remaining, prev, curr, next, &normal)
        });

        match ear {
            Some(i) => {
                let prev = remaining[(i + count - 1) % count];
                let next = remaining[(i + 1) % count];
                triangles.push([prev, remaining[i], next]);
                remaining.remove(i);
            }
            None => {
                triangles.extend(fan(points, &remaining));
                return triangles;
            }
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

/// Newell normal of a polygon loop (not normalized)
pub fn polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal
}

/// Twice the area of a triangle below which it counts as collapsed
const COLLAPSED_AREA: f64 = 1e-12;

fn fan(points: &[Point3<f64>], corners: &[usize]) -> Vec<[usize; 3]> {
    let n = corners.len();
    let fan_from = |root: usize| -> Vec<[usize; 3]> {
        (1..n.saturating_sub(1))
            .map(|i| [corners[root], corners[(root + i) % n], corners[(root + i + 1) % n]])
            .collect()
    };
    let collapsed = |tris: &[[usize; 3]]| {
        tris.iter()
            .filter(|t| {
                (points[t[1]] - points[t[0]])
                    .cross(&(points[t[2]] - points[t[0]]))
                    .norm()
                    <= COLLAPSED_AREA
            })
            .count()
    };

    let mut best = fan_from(0);
    let mut best_collapsed = collapsed(&best);
    for root in 1..n {
        if best_collapsed == 0 {
            break;
        }
        let candidate = fan_from(root);
        let count = collapsed(&candidate);
        if count < best_collapsed {
            best = candidate;
            best_collapsed = count;
        }
    }
    best
}

fn is_ear(
    points: &[Point3<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    normal: &Vector3<f64>,
) -> bool {
    let a = points[prev];
    let b = points[curr];
    let c = points[next];

    // Convex corner with respect to the polygon winding
    if (b - a).cross(&(c - b)).dot(normal) <= 0.0 {
        return false;
    }

    let project = projector(normal);
    let (a2, b2, c2) = (project(&a), project(&b), project(&c));
    let flip = orient_2d(a2, b2, c2) < 0.0;

    remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .all(|&idx| !strictly_inside(project(&points[idx]), a2, b2, c2, flip))
}

/// Drop the coordinate most aligned with `normal`
fn projector(normal: &Vector3<f64>) -> impl Fn(&Point3<f64>) -> (f64, f64) {
    let abs = normal.abs();
    let axis = if abs.x >= abs.y && abs.x >= abs.z {
        0
    } else if abs.y >= abs.z {
        1
    } else {
        2
    };
    move |p: &Point3<f64>| match axis {
        0 => (p.y, p.z),
        1 => (p.z, p.x),
        _ => (p.x, p.y),
    }
}

fn orient_2d(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn strictly_inside(
    p: (f64, f64),
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
    flip: bool,
) -> bool {
    let sign = if flip { -1.0 } else { 1.0 };
    orient_2d(a, b, p) * sign > 0.0
        && orient_2d(b, c, p) * sign > 0.0
        && orient_2d(c, a, p) * sign > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winding_matches(points: &[Point3<f64>], tris: &[[usize; 3]]) -> bool {
        let normal = polygon_normal(points);
        tris.iter().all(|t| {
            let n = (points[t[1]] - points[t[0]]).cross(&(points[t[2]] - points[t[0]]));
            n.dot(&normal) >= 0.0
        })
    }

    #[test]
    fn test_square() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let tris = triangulate_polygon(&points);
        assert_eq!(tris.len(), 2);
        assert!(winding_matches(&points, &tris));
    }

    #[test]
    fn test_concave_l_shape() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let tris = triangulate_polygon(&points);
        assert_eq!(tris.len(), 4);
        assert!(winding_matches(&points, &tris));
        // The reflex corner (index 3) never spans the notch
        let area: f64 = tris
            .iter()
            .map(|t| {
                (points[t[1]] - points[t[0]])
                    .cross(&(points[t[2]] - points[t[0]]))
                    .norm()
                    * 0.5
            })
            .sum();
        assert!((area - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_loop_falls_back_to_fan() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ];
        assert_eq!(triangulate_polygon(&points).len(), 2);
    }

    #[test]
    fn test_fan_roots_at_the_off_line_corner() {
        // Corners 0..=3 are collinear; fanning from corner 0 would leave a
        // zero-area triangle (0, 1, 2)
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(1.5, 1.0, 0.0),
        ];
        let tris = fan(&points, &[0, 1, 2, 3, 4]);
        assert_eq!(tris.len(), 3);
        assert!(tris.iter().all(|t| t[0] == 4));
        for t in &tris {
            let twice_area = (points[t[1]] - points[t[0]])
                .cross(&(points[t[2]] - points[t[0]]))
                .norm();
            assert!(twice_area > COLLAPSED_AREA);
        }
    }
}
