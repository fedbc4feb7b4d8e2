// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle-triangle intersection
//!
//! Exact f64 test: each triangle's edges are clipped against the other's
//! plane and the crossing point is tested for containment. Coplanar pairs
//! fall back to a 2D overlap test in the dominant projection plane.

use nalgebra::{Point3, Vector3};

/// Type of triangle-triangle intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionType {
    /// No intersection
    None,
    /// Triangles are coplanar and overlap
    Coplanar,
    /// Triangles cross along a segment (or touch at a point)
    Crossing,
}

/// Classify how two triangles meet.
///
/// Contacts closer than `eps` to a plane are treated as touching rather than
/// crossing, so near-coincident but separate faces do not register.
pub fn classify_triangle_pair(
    tri_a: &[Point3<f64>; 3],
    tri_b: &[Point3<f64>; 3],
    eps: f64,
) -> IntersectionType {
    let Some(plane_b) = Plane::from_triangle(tri_b) else {
        return IntersectionType::None;
    };
    let Some(plane_a) = Plane::from_triangle(tri_a) else {
        return IntersectionType::None;
    };

    let dist_a = tri_a.map(|p| plane_b.distance(&p));
    let dist_b = tri_b.map(|p| plane_a.distance(&p));

    if dist_a.iter().all(|d| d.abs() <= eps) {
        return if coplanar_overlap(tri_a, tri_b, &plane_a.normal) {
            IntersectionType::Coplanar
        } else {
            IntersectionType::None
        };
    }

    // A triangle that only reaches the other plane without passing through it
    // is touching, not crossing
    if !straddles(&dist_a, eps) || !straddles(&dist_b, eps) {
        return IntersectionType::None;
    }

    if edges_pierce(tri_a, &dist_a, tri_b, &plane_b.normal, eps)
        || edges_pierce(tri_b, &dist_b, tri_a, &plane_a.normal, eps)
    {
        IntersectionType::Crossing
    } else {
        IntersectionType::None
    }
}

/// Test if two triangles intersect
pub fn triangles_intersect(tri_a: &[Point3<f64>; 3], tri_b: &[Point3<f64>; 3], eps: f64) -> bool {
    classify_triangle_pair(tri_a, tri_b, eps) != IntersectionType::None
}

struct Plane {
    normal: Vector3<f64>,
    offset: f64,
}

impl Plane {
    fn from_triangle(tri: &[Point3<f64>; 3]) -> Option<Self> {
        let normal = (tri[1] - tri[0])
            .cross(&(tri[2] - tri[0]))
            .try_normalize(1e-300)?;
        if !normal.iter().all(|c| c.is_finite()) {
            return None;
        }
        Some(Self {
            offset: normal.dot(&tri[0].coords),
            normal,
        })
    }

    fn distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }
}

fn straddles(dist: &[f64; 3], eps: f64) -> bool {
    dist.iter().any(|&d| d > eps) && dist.iter().any(|&d| d < -eps)
}

/// Does any edge of `tri` cross the plane of `other` inside `other`?
fn edges_pierce(
    tri: &[Point3<f64>; 3],
    dist: &[f64; 3],
    other: &[Point3<f64>; 3],
    other_normal: &Vector3<f64>,
    eps: f64,
) -> bool {
    (0..3).any(|i| {
        let j = (i + 1) % 3;
        let (d0, d1) = (dist[i], dist[j]);
        let crosses = (d0 > eps && d1 < -eps) || (d0 < -eps && d1 > eps);
        if !crosses {
            return false;
        }
        let t = d0 / (d0 - d1);
        let point = tri[i] + (tri[j] - tri[i]) * t;
        point_in_triangle(&point, other, other_normal)
    })
}

/// Inclusive containment of a point already on the triangle's plane
fn point_in_triangle(point: &Point3<f64>, triangle: &[Point3<f64>; 3], normal: &Vector3<f64>) -> bool {
    let project = projector(normal);
    let p = project(point);
    let (a, b, c) = (project(&triangle[0]), project(&triangle[1]), project(&triangle[2]));

    let denom = (b.1 - c.1) * (a.0 - c.0) + (c.0 - b.0) * (a.1 - c.1);
    if denom.abs() < 1e-300 {
        return false;
    }
    let tol = 1e-12;
    let u = ((b.1 - c.1) * (p.0 - c.0) + (c.0 - b.0) * (p.1 - c.1)) / denom;
    let v = ((c.1 - a.1) * (p.0 - c.0) + (a.0 - c.0) * (p.1 - c.1)) / denom;
    let w = 1.0 - u - v;
    u >= -tol && v >= -tol && w >= -tol
}

/// 2D overlap with positive area; shared boundaries alone do not count
fn coplanar_overlap(tri_a: &[Point3<f64>; 3], tri_b: &[Point3<f64>; 3], normal: &Vector3<f64>) -> bool {
    let project = projector(normal);
    let a = tri_a.map(|p| project(&p));
    let b = tri_b.map(|p| project(&p));

    for i in 0..3 {
        for j in 0..3 {
            if segments_cross(a[i], a[(i + 1) % 3], b[j], b[(j + 1) % 3]) {
                return true;
            }
        }
    }

    let centroid = |t: &[(f64, f64); 3]| ((t[0].0 + t[1].0 + t[2].0) / 3.0, (t[0].1 + t[1].1 + t[2].1) / 3.0);
    a.iter().chain(std::iter::once(&centroid(&a))).any(|&p| strictly_inside(p, &b))
        || b.iter().chain(std::iter::once(&centroid(&b))).any(|&p| strictly_inside(p, &a))
}

/// Drop the coordinate most aligned with `normal`
fn projector(normal: &Vector3<f64>) -> impl Fn(&Point3<f64>) -> (f64, f64) {
    let abs = normal.abs();
    let axis = if abs.x > abs.y && abs.x > abs.z {
        0
    } else if abs.y > abs.z {
        1
    } else {
        2
    };
    move |p: &Point3<f64>| match axis {
        0 => (p.y, p.z),
        1 => (p.x, p.z),
        _ => (p.x, p.y),
    }
}

fn orient(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn segments_cross(p1: (f64, f64), p2: (f64, f64), q1: (f64, f64), q2: (f64, f64)) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn strictly_inside(p: (f64, f64), tri: &[(f64, f64); 3]) -> bool {
    let d1 = orient(tri[0], tri[1], p);
    let d2 = orient(tri[1], tri[2], p);
    let d3 = orient(tri[2], tri[0], p);
    (d1 > 0.0 && d2 > 0.0 && d3 > 0.0) || (d1 < 0.0 && d2 < 0.0 && d3 < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-5;

    fn tri(points: [[f64; 3]; 3]) -> [Point3<f64>; 3] {
        points.map(|p| Point3::new(p[0], p[1], p[2]))
    }

    #[test]
    fn test_triangle_intersection_disjoint() {
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let b = tri([[2.0, 0.0, 0.0], [3.0, 0.0, 0.0], [2.0, 1.0, 0.0]]);
        assert!(!triangles_intersect(&a, &b, EPS));
    }

    #[test]
    fn test_piercing_triangles() {
        let a = tri([[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]);
        let b = tri([[0.5, 0.5, -1.0], [0.5, 0.5, 1.0], [0.6, 0.4, 1.0]]);
        assert_eq!(classify_triangle_pair(&a, &b, EPS), IntersectionType::Crossing);
        assert_eq!(classify_triangle_pair(&b, &a, EPS), IntersectionType::Crossing);
    }

    #[test]
    fn test_parallel_planes_do_not_intersect() {
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let b = tri([[0.0, 0.0, 0.5], [1.0, 0.0, 0.5], [0.0, 1.0, 0.5]]);
        assert!(!triangles_intersect(&a, &b, EPS));
    }

    #[test]
    fn test_touching_within_epsilon_is_ignored() {
        let a = tri([[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]);
        // Apex rests on a's plane from above
        let b = tri([[0.5, 0.5, 0.0], [0.5, 0.5, 1.0], [0.6, 0.4, 1.0]]);
        assert!(!triangles_intersect(&a, &b, EPS));
    }

    #[test]
    fn test_coplanar_overlap() {
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let b = tri([[0.25, 0.25, 0.0], [1.25, 0.25, 0.0], [0.25, 1.25, 0.0]]);
        assert_eq!(classify_triangle_pair(&a, &b, EPS), IntersectionType::Coplanar);
    }

    #[test]
    fn test_coplanar_identical_triangles() {
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert!(triangles_intersect(&a, &a, EPS));
    }

    #[test]
    fn test_coplanar_edge_contact_is_not_overlap() {
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let b = tri([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]]);
        assert!(!triangles_intersect(&a, &b, EPS));
    }

    #[test]
    fn test_degenerate_triangle_is_skipped() {
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let b = tri([[0.5, -1.0, -1.0], [0.5, 1.0, -1.0], [0.5, 0.0, 1.0]]);
        assert!(!triangles_intersect(&a, &b, EPS));
    }
}
