// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sharp-angle face splitting
//!
//! A face whose smallest corner angle is below the threshold gets its two
//! longest edges subdivided at their midpoints; when the two new vertices
//! share a face and are not already joined, that face is cut between them.

use crate::geometry::{Face, Mesh, MeshTopology};
use crate::repair::intersect::find_intersecting_faces;
use crate::utils::math::{deg_to_rad, midpoint, min_corner_angle};
use tracing::debug;

/// Default sharp-angle threshold in degrees
pub const SHARP_ANGLE_DEGREES: f64 = 15.0;

/// Edges and corner legs at or below this length are ignored
pub const MIN_EDGE_LENGTH: f64 = 1e-6;

/// Faces at or below this area are degenerate and never split
pub const MIN_FACE_AREA: f64 = MIN_EDGE_LENGTH * MIN_EDGE_LENGTH;

/// One [`split_intersections`] round stops before the mesh would hold more
/// than this many times its triangle count at the start of the round
pub const MAX_SPLIT_GROWTH: usize = 3;

/// Smallest corner angle of a face, skipping corners with a collapsed leg
pub fn smallest_face_angle(mesh: &Mesh, face: usize) -> Option<f64> {
    min_corner_angle(&mesh.face_positions(face), MIN_EDGE_LENGTH)
}

/// The two longest edges of a face, longest first
fn longest_edges(mesh: &Mesh, face: usize) -> Option<[(usize, usize); 2]> {
    let mut edges: Vec<((usize, usize), f64)> = mesh.faces[face]
        .edges()
        .map(|(a, b)| ((a, b), (mesh.position(a) - mesh.position(b)).norm()))
        .filter(|&(_, length)| length > MIN_EDGE_LENGTH)
        .collect();
    if edges.len() < 2 {
        return None;
    }
    edges.sort_by(|x, y| y.1.total_cmp(&x.1));
    Some([edges[0].0, edges[1].0])
}

/// Triangles the mesh holds once every polygon is triangulated
pub fn triangle_count(mesh: &Mesh) -> usize {
    mesh.faces.iter().map(|face| face.len().saturating_sub(2)).sum()
}

fn edge_owner_count(mesh: &Mesh, (a, b): (usize, usize)) -> usize {
    mesh.faces.iter().filter(|face| face.has_edge(a, b)).count()
}

/// Insert a midpoint vertex into edge `(a, b)` of every face that uses it.
///
/// Returns `None` when no face has the edge.
pub fn subdivide_edge(mesh: &mut Mesh, a: usize, b: usize) -> Option<usize> {
    let owners: Vec<usize> = (0..mesh.face_count())
        .filter(|&f| mesh.faces[f].has_edge(a, b))
        .collect();
    if owners.is_empty() {
        return None;
    }

    let mid = mesh.add_vertex(midpoint(&mesh.position(a), &mesh.position(b)));
    for face in owners {
        let indices = &mut mesh.faces[face].indices;
        let n = indices.len();
        if let Some(pos) = (0..n).find(|&i| {
            let (u, v) = (indices[i], indices[(i + 1) % n]);
            (u == a && v == b) || (u == b && v == a)
        }) {
            indices.insert(pos + 1, mid);
        }
    }
    Some(mid)
}

/// Cut the first face holding both `a` and `b` along a new edge between them.
///
/// Refused when the vertices already share an edge or have no common face.
pub fn connect_vertices(mesh: &mut Mesh, a: usize, b: usize) -> bool {
    if a == b {
        return false;
    }
    let already_joined = mesh.faces.iter().any(|f| f.has_edge(a, b))
        || mesh
            .wire_edges
            .iter()
            .any(|e| (e[0] == a && e[1] == b) || (e[0] == b && e[1] == a));
    if already_joined {
        return false;
    }
    let Some(face) = (0..mesh.face_count()).find(|&f| mesh.faces[f].contains(a) && mesh.faces[f].contains(b)) else {
        return false;
    };

    let indices = mesh.faces[face].indices.clone();
    let n = indices.len();
    let (Some(ia), Some(ib)) = (
        indices.iter().position(|&v| v == a),
        indices.iter().position(|&v| v == b),
    ) else {
        return false;
    };
    let walk = |from: usize, to: usize| -> Vec<usize> {
        let mut out = vec![indices[from]];
        let mut i = from;
        while i != to {
            i = (i + 1) % n;
            out.push(indices[i]);
        }
        out
    };
    let first = walk(ia, ib);
    let second = walk(ib, ia);
    if first.len() < 3 || second.len() < 3 {
        return false;
    }

    let hidden = mesh.faces[face].hidden;
    mesh.faces[face].indices = first;
    mesh.faces.push(Face {
        indices: second,
        hidden,
    });
    true
}

/// Split `face` if its smallest corner angle is below `threshold` (radians).
///
/// Degenerate faces are skipped. Returns true when the midpoints were
/// connected.
pub fn split_face_if_sharp(mesh: &mut Mesh, face: usize, threshold: f64) -> bool {
    split_face_within(mesh, face, threshold, usize::MAX).is_some_and(|(connected, _)| connected)
}

/// Split one face unless that would add more than `budget` triangles.
///
/// Returns `(connected, triangles added)` when the face was subdivided.
fn split_face_within(mesh: &mut Mesh, face: usize, threshold: f64, budget: usize) -> Option<(bool, usize)> {
    if face >= mesh.face_count() || mesh.faces[face].len() < 3 || mesh.face_area(face) <= MIN_FACE_AREA {
        return None;
    }
    match smallest_face_angle(mesh, face) {
        Some(angle) if angle < threshold => {}
        _ => return None,
    }
    let [first_edge, second_edge] = longest_edges(mesh, face)?;

    // Every owner of a subdivided edge gains one corner, hence one triangle
    let added = edge_owner_count(mesh, first_edge) + edge_owner_count(mesh, second_edge);
    if added > budget {
        return None;
    }

    let first = subdivide_edge(mesh, first_edge.0, first_edge.1);
    let second = subdivide_edge(mesh, second_edge.0, second_edge.1);
    let connected = match (first, second) {
        (Some(m1), Some(m2)) => connect_vertices(mesh, m1, m2),
        _ => false,
    };
    Some((connected, added))
}

/// Run [`split_face_if_sharp`] over `faces`; returns how many were split.
///
/// Face indices stay valid throughout because splitting only appends.
pub fn split_sharp_faces(mesh: &mut Mesh, faces: &[usize], threshold: f64) -> usize {
    let split = faces
        .iter()
        .filter(|&&face| split_face_if_sharp(mesh, face, threshold))
        .count();
    if split > 0 {
        debug!(split, candidates = faces.len(), "split sharp faces");
    }
    split
}

/// Split sharp faces among the visible faces of the mesh
pub fn split_visible_sharp_faces(mesh: &mut Mesh, threshold_degrees: f64) -> usize {
    let visible = mesh.visible_faces();
    split_sharp_faces(mesh, &visible, deg_to_rad(threshold_degrees))
}

/// `faces` followed by their edge neighbours, without duplicates, in visit order
pub fn collect_faces_with_neighbors(mesh: &Mesh, faces: &[usize]) -> Vec<usize> {
    let topology = MeshTopology::build(mesh);
    let mut seen = vec![false; mesh.face_count()];
    let mut ordered = Vec::new();

    for &face in faces {
        if face >= mesh.face_count() || seen[face] || mesh.faces[face].len() < 3 {
            continue;
        }
        seen[face] = true;
        ordered.push(face);
        for (a, b) in mesh.faces[face].edges() {
            for &neighbor in topology.link_faces(a, b) {
                if !seen[neighbor] && mesh.faces[neighbor].len() >= 3 {
                    seen[neighbor] = true;
                    ordered.push(neighbor);
                }
            }
        }
    }
    ordered
}

/// One split round around the currently intersecting faces.
///
/// Returns the number of faces split.
pub fn split_intersections(mesh: &mut Mesh) -> usize {
    let hits: Vec<usize> = find_intersecting_faces(mesh).into_iter().collect();
    if hits.is_empty() {
        return 0;
    }
    let candidates = collect_faces_with_neighbors(mesh, &hits);
    let threshold = deg_to_rad(SHARP_ANGLE_DEGREES);
    let start = triangle_count(mesh);
    let mut budget = start.saturating_mul(MAX_SPLIT_GROWTH - 1);

    let mut split = 0;
    for face in candidates {
        if let Some((connected, added)) = split_face_within(mesh, face, threshold, budget) {
            budget -= added;
            split += usize::from(connected);
        }
    }
    debug!(split, start, budget_left = budget, "split round around intersections");
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::classify::NonManifoldReport;
    use crate::utils::math::rad_to_deg;
    use nalgebra::Point3;

    /// Sliver triangle (0, 1, 2) sharing its long edge with a fat neighbour
    fn sliver_pair() -> Mesh {
        let mut mesh = Mesh::new();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(2.0, 0.2, 0.0),
            Point3::new(2.0, -2.0, 0.0),
        ] {
            mesh.add_vertex(p);
        }
        mesh.add_face(vec![0, 1, 2]);
        mesh.add_face(vec![1, 0, 3]);
        mesh
    }

    #[test]
    fn test_smallest_angle() {
        let mesh = sliver_pair();
        let angle = smallest_face_angle(&mesh, 0).map(rad_to_deg).unwrap_or(90.0);
        assert!(angle < 15.0);
        let fat = smallest_face_angle(&mesh, 1).map(rad_to_deg).unwrap_or(0.0);
        assert!(fat > 15.0);
    }

    #[test]
    fn test_split_sliver() {
        let mut mesh = sliver_pair();
        let before = NonManifoldReport::build(&mesh);
        assert!(split_face_if_sharp(&mut mesh, 0, deg_to_rad(15.0)));
        // Two midpoints and one cut
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 3);
        assert!(mesh.validate().is_ok());
        // The neighbour absorbed the midpoint of the shared edge, so the
        // boundary stays the same shape
        let after = NonManifoldReport::build(&mesh);
        assert!(after.multi_face_edges.is_empty());
        assert!(after.non_contiguous_edges.is_empty());
        assert_eq!(after.boundary_edges.len(), before.boundary_edges.len() + 1);
    }

    #[test]
    fn test_fat_face_is_left_alone() {
        let mut mesh = sliver_pair();
        assert!(!split_face_if_sharp(&mut mesh, 1, deg_to_rad(15.0)));
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn test_collapsed_face_is_skipped() {
        let mut mesh = Mesh::new();
        for _ in 0..3 {
            mesh.add_vertex(Point3::new(1.0, 1.0, 1.0));
        }
        mesh.add_face(vec![0, 1, 2]);
        assert_eq!(smallest_face_angle(&mesh, 0), None);
        assert!(!split_face_if_sharp(&mut mesh, 0, deg_to_rad(15.0)));
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_zero_area_face_is_skipped() {
        // Distinct but collinear corners: a 0° corner and no area
        let mut mesh = Mesh::new();
        for x in [0.0, 1.0, 2.0] {
            mesh.add_vertex(Point3::new(x, 0.0, 0.0));
        }
        mesh.add_face(vec![0, 1, 2]);
        assert!(smallest_face_angle(&mesh, 0).is_some_and(|angle| angle < deg_to_rad(15.0)));
        assert!(!split_face_if_sharp(&mut mesh, 0, deg_to_rad(15.0)));
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_split_respects_triangle_budget() {
        let mut mesh = sliver_pair();
        // The long edge has two owners and the next longest has one, so the
        // split adds three triangles
        assert_eq!(split_face_within(&mut mesh, 0, deg_to_rad(15.0), 2), None);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(split_face_within(&mut mesh, 0, deg_to_rad(15.0), 3), Some((true, 3)));
        mesh.triangulate();
        assert_eq!(triangle_count(&mesh), 5);
    }

    #[test]
    fn test_connect_refuses_existing_edge() {
        let mut mesh = sliver_pair();
        assert!(!connect_vertices(&mut mesh, 0, 1));
        assert!(!connect_vertices(&mut mesh, 2, 3));
    }

    #[test]
    fn test_collect_with_neighbors() {
        let mesh = sliver_pair();
        assert_eq!(collect_faces_with_neighbors(&mesh, &[0]), vec![0, 1]);
        assert_eq!(collect_faces_with_neighbors(&mesh, &[1, 0]), vec![1, 0]);
    }
}
