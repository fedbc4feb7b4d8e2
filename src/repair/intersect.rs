// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Self-intersection detection
//!
//! Broad phase: a BVH over face boxes inflated by [`BVH_EPSILON`] is queried
//! against itself. Narrow phase: pairs sharing a vertex are dropped, the rest
//! go through the exact triangle test. Polygons are split into triangles
//! locally for the test; the mesh is not modified.

use crate::geometry::triangle_intersection::triangles_intersect;
use crate::geometry::triangulation::triangulate_polygon;
use crate::geometry::{Mesh, BVH};
use crate::repair::selection::FaceSelection;
use nalgebra::Point3;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Padding applied to face boxes, and the plane tolerance of the narrow phase
pub const BVH_EPSILON: f64 = 1e-5;

type Tri = [Point3<f64>; 3];

fn face_triangles(mesh: &Mesh, face: usize) -> Vec<Tri> {
    let points = mesh.face_positions(face);
    if points.len() == 3 {
        return vec![[points[0], points[1], points[2]]];
    }
    triangulate_polygon(&points)
        .into_iter()
        .map(|[a, b, c]| [points[a], points[b], points[c]])
        .collect()
}

/// Pairs of non-adjacent faces that intersect, as sorted `(lower, higher)`
pub fn intersecting_face_pairs(mesh: &Mesh) -> Vec<(usize, usize)> {
    if mesh.faces.is_empty() {
        return Vec::new();
    }
    if mesh
        .vertices
        .iter()
        .any(|v| !v.position.coords.iter().all(|c| c.is_finite()))
    {
        warn!("mesh has non-finite coordinates, skipping intersection query");
        return Vec::new();
    }

    let items = (0..mesh.face_count())
        .filter(|&face| mesh.faces[face].len() >= 3)
        .map(|face| (face, mesh.face_bounding_box(face).inflated(BVH_EPSILON)))
        .collect();
    let bvh = BVH::build(items);
    let candidates = bvh.overlapping_pairs();

    let triangles: Vec<Vec<Tri>> = (0..mesh.face_count())
        .map(|face| face_triangles(mesh, face))
        .collect();
    let pairs: Vec<(usize, usize)> = candidates
        .into_iter()
        .filter(|&(a, b)| !mesh.faces[a].shares_vertex(&mesh.faces[b]))
        .filter(|&(a, b)| {
            triangles[a].iter().any(|ta| {
                triangles[b]
                    .iter()
                    .any(|tb| triangles_intersect(ta, tb, BVH_EPSILON))
            })
        })
        .collect();

    debug!(
        faces = mesh.face_count(),
        pairs = pairs.len(),
        "self-intersection query"
    );
    pairs
}

/// Indices of every face that takes part in at least one intersection
pub fn find_intersecting_faces(mesh: &Mesh) -> BTreeSet<usize> {
    intersecting_face_pairs(mesh)
        .into_iter()
        .flat_map(|(a, b)| [a, b])
        .collect()
}

pub fn count_intersecting_faces(mesh: &Mesh) -> usize {
    find_intersecting_faces(mesh).len()
}

pub fn has_self_intersections(mesh: &Mesh) -> bool {
    !intersecting_face_pairs(mesh).is_empty()
}

/// Selection of the intersecting faces, without touching the mesh
pub fn select_intersecting_faces(mesh: &Mesh) -> FaceSelection {
    FaceSelection::from_faces(mesh.face_count(), find_intersecting_faces(mesh))
}
