// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topology cleanup: loose elements, interior faces, small islands,
//! degenerate geometry and duplicate vertices

use crate::geometry::{edge_key, Mesh, MeshTopology};
use crate::repair::islands::vertex_islands;
use ahash::{AHashMap, AHashSet};
use nalgebra::{Point3, Vector3};
use tracing::debug;

const MAX_SLIVER_PASSES: usize = 16;

/// Counts removed by [`delete_loose`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LooseRemoved {
    pub vertices: usize,
    pub edges: usize,
}

/// Delete wire edges, then every vertex left without an edge
pub fn delete_loose(mesh: &mut Mesh) -> LooseRemoved {
    let topology = MeshTopology::build(mesh);
    let wire: AHashSet<(usize, usize)> = mesh
        .wire_edges
        .iter()
        .map(|e| edge_key(e[0], e[1]))
        .filter(|&(a, b)| topology.link_faces(a, b).is_empty())
        .collect();
    mesh.wire_edges.clear();

    let isolated = mesh.isolated_vertices();
    let removed = LooseRemoved {
        vertices: mesh.remove_vertices(&isolated),
        edges: wire.len(),
    };
    if removed != LooseRemoved::default() {
        debug!(
            vertices = removed.vertices,
            edges = removed.edges,
            "deleted loose elements"
        );
    }
    removed
}

/// Delete faces enclosed by other faces.
///
/// A face is interior when each of its edges is still shared by at least
/// two other faces. Faces are visited in index order and removals update
/// the edge counts, so one of two coincident shells always survives.
pub fn delete_interior_faces(mesh: &mut Mesh) -> usize {
    let topology = MeshTopology::build(mesh);
    let mut counts: AHashMap<(usize, usize), usize> = topology
        .edges()
        .iter()
        .map(|&(a, b)| ((a, b), topology.link_faces(a, b).len()))
        .collect();

    let mut doomed = vec![false; mesh.face_count()];
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        let interior = face
            .edges()
            .all(|(a, b)| counts.get(&edge_key(a, b)).copied().unwrap_or(0) >= 3);
        if interior {
            doomed[face_idx] = true;
            for (a, b) in face.edges() {
                if let Some(count) = counts.get_mut(&edge_key(a, b)) {
                    *count -= 1;
                }
            }
        }
    }

    let removed = mesh.remove_faces(&doomed);
    if removed > 0 {
        debug!(removed, "deleted interior faces");
    }
    removed
}

/// Delete vertex islands smaller than `threshold` that are also smaller
/// than the largest island. Returns the number of vertices removed.
pub fn delete_small_vertex_islands(mesh: &mut Mesh, threshold: usize) -> usize {
    let islands = vertex_islands(mesh);
    let Some(largest) = islands.iter().map(Vec::len).max() else {
        return 0;
    };

    let mut doomed = vec![false; mesh.vertex_count()];
    let mut dropped = 0;
    for island in islands
        .iter()
        .filter(|island| island.len() < threshold && island.len() < largest)
    {
        dropped += 1;
        for &v in island {
            doomed[v] = true;
        }
    }

    let removed = mesh.remove_vertices(&doomed);
    if removed > 0 {
        debug!(islands = dropped, vertices = removed, largest, "deleted small islands");
    }
    removed
}

/// Collapse edges no longer than `dist` and dissolve sliver triangles whose
/// apex lies within `dist` of the opposite edge. Returns the number of
/// vertices collapsed plus slivers dissolved.
pub fn dissolve_degenerate(mesh: &mut Mesh, dist: f64) -> usize {
    let collapsed = collapse_short_edges(mesh, dist);
    let dissolved = dissolve_slivers(mesh, dist);
    if collapsed + dissolved > 0 {
        debug!(collapsed, dissolved, "dissolved degenerate geometry");
    }
    collapsed + dissolved
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

fn collapse_short_edges(mesh: &mut Mesh, dist: f64) -> usize {
    let mut parent: Vec<usize> = (0..mesh.vertex_count()).collect();
    let mut any = false;
    for (a, b) in mesh.edges() {
        if (mesh.position(a) - mesh.position(b)).norm() <= dist {
            let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
            if ra != rb {
                parent[ra.max(rb)] = ra.min(rb);
                any = true;
            }
        }
    }
    if !any {
        return 0;
    }

    let target: Vec<usize> = (0..parent.len()).map(|v| find(&mut parent, v)).collect();
    let mut sums: AHashMap<usize, (Vector3<f64>, usize)> = AHashMap::new();
    for (v, &root) in target.iter().enumerate() {
        let entry = sums.entry(root).or_insert((Vector3::zeros(), 0));
        entry.0 += mesh.position(v).coords;
        entry.1 += 1;
    }
    for (&root, &(sum, count)) in &sums {
        if count > 1 {
            mesh.set_position(root, Point3::from(sum / count as f64));
        }
    }
    weld(mesh, &target)
}

/// Corner whose distance to the opposite edge is within `dist`, with that edge
fn sliver_apex(points: &[Point3<f64>], dist: f64) -> Option<(usize, usize, usize)> {
    (0..3)
        .filter_map(|i| {
            let apex = points[i];
            let (a, b) = (points[(i + 1) % 3], points[(i + 2) % 3]);
            let base = b - a;
            let length = base.norm();
            if length <= dist {
                return None;
            }
            let height = (apex - a).cross(&base).norm() / length;
            (height <= dist).then_some((i, length))
        })
        .max_by(|x, y| x.1.total_cmp(&y.1))
        .map(|(i, _)| (i, (i + 1) % 3, (i + 2) % 3))
}

fn dissolve_slivers(mesh: &mut Mesh, dist: f64) -> usize {
    let mut dissolved = 0;
    for _ in 0..MAX_SLIVER_PASSES {
        let topology = MeshTopology::build(mesh);
        let mut touched = vec![false; mesh.face_count()];
        let mut doomed = vec![false; mesh.face_count()];
        let mut progress = false;

        for face_idx in 0..mesh.face_count() {
            if touched[face_idx] || !mesh.faces[face_idx].is_triangle() {
                continue;
            }
            let points = mesh.face_positions(face_idx);
            let Some((apex, ia, ib)) = sliver_apex(&points, dist) else {
                continue;
            };
            let corners = &mesh.faces[face_idx].indices;
            let (c, a, b) = (corners[apex], corners[ia], corners[ib]);

            let neighbors: Vec<usize> = topology
                .link_faces(a, b)
                .iter()
                .copied()
                .filter(|&f| f != face_idx)
                .collect();
            match neighbors.as_slice() {
                [] => {}
                [other] if !touched[*other] && !mesh.faces[*other].contains(c) => {
                    let loop_ = &mut mesh.faces[*other].indices;
                    let n = loop_.len();
                    if let Some(pos) = (0..n).find(|&i| {
                        let (u, v) = (loop_[i], loop_[(i + 1) % n]);
                        (u == a && v == b) || (u == b && v == a)
                    }) {
                        loop_.insert(pos + 1, c);
                    }
                    touched[*other] = true;
                }
                _ => continue,
            }
            touched[face_idx] = true;
            doomed[face_idx] = true;
            dissolved += 1;
            progress = true;
        }

        mesh.remove_faces(&doomed);
        if !progress {
            break;
        }
    }
    dissolved
}

/// Merge vertices closer than `dist` into the lowest-index vertex of each
/// cluster. Faces that collapse are removed, duplicate faces are dropped.
/// Returns the number of vertices merged away.
pub fn remove_doubles(mesh: &mut Mesh, dist: f64) -> usize {
    let count = mesh.vertex_count();
    let mut target: Vec<usize> = (0..count).collect();
    let mut grid: AHashMap<(i64, i64, i64), Vec<usize>> = AHashMap::new();

    let cell = |p: &Point3<f64>| -> (i64, i64, i64) {
        if dist > 0.0 {
            (
                (p.x / dist).floor() as i64,
                (p.y / dist).floor() as i64,
                (p.z / dist).floor() as i64,
            )
        } else {
            (p.x.to_bits() as i64, p.y.to_bits() as i64, p.z.to_bits() as i64)
        }
    };

    for v in 0..count {
        let p = mesh.position(v);
        let key = cell(&p);
        let found = if dist > 0.0 {
            let mut found = None;
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(bucket) = grid.get(&(key.0 + dx, key.1 + dy, key.2 + dz)) else {
                            continue;
                        };
                        if let Some(&w) = bucket
                            .iter()
                            .find(|&&w| (mesh.position(w) - p).norm() <= dist)
                        {
                            found = Some(w);
                            break 'search;
                        }
                    }
                }
            }
            found
        } else {
            grid.get(&key).and_then(|bucket| bucket.first().copied())
        };

        match found {
            Some(w) => target[v] = w,
            None => grid.entry(key).or_default().push(v),
        }
    }

    let merged = (0..count).filter(|&v| target[v] != v).count();
    if merged == 0 {
        return 0;
    }
    weld(mesh, &target);
    debug!(merged, "removed doubles");
    merged
}

/// Redirect each vertex to `target[v]`, drop faces and edges that collapse
/// or duplicate, then compact away the redirected vertices.
fn weld(mesh: &mut Mesh, target: &[usize]) -> usize {
    for face in &mut mesh.faces {
        for index in &mut face.indices {
            *index = target[*index];
        }
        face.indices.dedup();
        while face.indices.len() > 1 && face.indices.first() == face.indices.last() {
            face.indices.pop();
        }
    }

    let mut seen: AHashSet<Vec<usize>> = AHashSet::new();
    mesh.faces.retain(|face| {
        let mut key = face.indices.clone();
        key.sort_unstable();
        let distinct = key.windows(2).all(|w| w[0] != w[1]);
        face.len() >= 3 && distinct && seen.insert(key)
    });

    let mut seen_edges: AHashSet<(usize, usize)> = AHashSet::new();
    mesh.wire_edges.retain_mut(|edge| {
        edge[0] = target[edge[0]];
        edge[1] = target[edge[1]];
        edge[0] != edge[1] && seen_edges.insert(edge_key(edge[0], edge[1]))
    });

    let redirected: Vec<bool> = (0..target.len()).map(|v| target[v] != v).collect();
    mesh.remove_vertices(&redirected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use crate::repair::classify::count_non_manifold_vertices;
    use nalgebra::Vector3;

    #[test]
    fn test_delete_loose() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        mesh.add_vertex(Point3::new(5.0, 5.0, 5.0));
        let a = mesh.add_vertex(Point3::new(6.0, 5.0, 5.0));
        let b = mesh.add_vertex(Point3::new(7.0, 5.0, 5.0));
        mesh.add_wire_edge(a, b);

        let removed = delete_loose(&mut mesh);
        assert_eq!(removed, LooseRemoved { vertices: 3, edges: 1 });
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
    }

    #[test]
    fn test_delete_interior_wall() {
        // Two boxes welded along x = 1 leave one wall face inside the shell
        let mut mesh = Primitive::cube(1.0).to_mesh();
        mesh.merge(&Primitive::cube_at(Point3::new(1.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0)).to_mesh());
        assert_eq!(remove_doubles(&mut mesh, 1e-4), 4);
        assert_eq!(mesh.face_count(), 11);

        assert_eq!(delete_interior_faces(&mut mesh), 1);
        assert_eq!(mesh.face_count(), 10);
        assert_eq!(count_non_manifold_vertices(&mesh), 0);
    }

    #[test]
    fn test_delete_duplicate_shell() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        let copy = mesh.faces.clone();
        mesh.faces.extend(copy);
        assert_eq!(delete_interior_faces(&mut mesh), 6);
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(count_non_manifold_vertices(&mesh), 0);
    }

    #[test]
    fn test_delete_small_islands_keeps_largest() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        mesh.merge(&Primitive::cube_at(Point3::new(3.0, 0.0, 0.0), Vector3::new(0.1, 0.1, 0.1)).to_mesh());
        mesh.add_vertex(Point3::new(9.0, 0.0, 0.0));

        // Both cubes have 8 vertices: only the lone vertex is below the largest
        assert_eq!(delete_small_vertex_islands(&mut mesh, 100), 1);
        assert_eq!(mesh.vertex_count(), 16);

        let mut single = Primitive::cube(1.0).to_mesh();
        assert_eq!(delete_small_vertex_islands(&mut single, 100), 0);
    }

    #[test]
    fn test_remove_doubles_welds_split_cube() {
        let cube = Primitive::cube(1.0).to_mesh();
        // Unshare every corner: each face gets its own four vertices
        let mut mesh = Mesh::new();
        for face in &cube.faces {
            let indices = face
                .indices
                .iter()
                .map(|&v| mesh.add_vertex(cube.position(v) + Vector3::new(1e-5, 0.0, 0.0)))
                .collect();
            mesh.add_face(indices);
        }
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(remove_doubles(&mut mesh, 0.001), 16);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(count_non_manifold_vertices(&mesh), 0);
    }

    #[test]
    fn test_collapse_short_edge() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        mesh.triangulate();
        assert_eq!(dissolve_degenerate(&mut mesh, 0.001), 0);

        // Pull vertex 6 next to vertex 5
        mesh.set_position(6, Point3::new(1.0, 1e-4, 1.0));
        assert!(dissolve_degenerate(&mut mesh, 0.001) > 0);
        assert_eq!(mesh.vertex_count(), 7);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_dissolve_sliver_into_neighbor() {
        let mut mesh = Mesh::new();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 0.0001, 0.0),
            Point3::new(1.0, -1.0, 0.0),
        ] {
            mesh.add_vertex(p);
        }
        mesh.add_face(vec![0, 2, 1]);
        mesh.add_face(vec![0, 1, 3]);
        assert_eq!(dissolve_degenerate(&mut mesh, 0.001), 1);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.faces[0].indices, vec![0, 2, 1, 3]);
    }
}
