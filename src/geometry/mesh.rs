// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon mesh representation and utilities
//!
//! Faces are ordered vertex loops of three or more corners. Edges are derived
//! from the face loops; edges that belong to no face ("wire" edges) are kept
//! explicitly in [`Mesh::wire_edges`]. Deletions compact the arrays and
//! rewrite every index, so indices are only stable between structural edits.

use super::triangulation::triangulate_polygon;
use super::BoundingBox;
use crate::error::{RepairError, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>) -> Self {
        Self { position }
    }
}

/// Polygon defined by an ordered loop of vertex indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub indices: Vec<usize>,
    /// Hidden faces are skipped by selection-driven steps until revealed
    #[serde(default)]
    pub hidden: bool,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self {
            indices,
            hidden: false,
        }
    }

    pub fn triangle(a: usize, b: usize, c: usize) -> Self {
        Self::new(vec![a, b, c])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn is_triangle(&self) -> bool {
        self.indices.len() == 3
    }

    /// Directed boundary edges in loop order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |i| (self.indices[i], self.indices[(i + 1) % n]))
    }

    pub fn contains(&self, vertex: usize) -> bool {
        self.indices.contains(&vertex)
    }

    pub fn shares_vertex(&self, other: &Face) -> bool {
        self.indices.iter().any(|v| other.indices.contains(v))
    }

    /// True if `a` and `b` are consecutive corners in either direction
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edges()
            .any(|(u, v)| (u == a && v == b) || (u == b && v == a))
    }

    pub fn flip(&mut self) {
        self.indices.reverse();
    }
}

/// Normalized (min, max) key for an undirected edge
pub fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Polygon mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    /// Edges with no link faces
    #[serde(default)]
    pub wire_edges: Vec<[usize; 2]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            wire_edges: Vec::new(),
        }
    }

    /// Build a mesh from positions and polygon loops, rejecting invalid input
    pub fn from_polygons(positions: Vec<Point3<f64>>, polygons: Vec<Vec<usize>>) -> Result<Self> {
        let mesh = Self {
            vertices: positions.into_iter().map(Vertex::new).collect(),
            faces: polygons.into_iter().map(Face::new).collect(),
            wire_edges: Vec::new(),
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new(position));
        index
    }

    /// Add a face and return its index
    pub fn add_face(&mut self, indices: Vec<usize>) -> usize {
        let index = self.faces.len();
        self.faces.push(Face::new(indices));
        index
    }

    pub fn add_wire_edge(&mut self, a: usize, b: usize) {
        self.wire_edges.push([a, b]);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    pub fn position(&self, vertex: usize) -> Point3<f64> {
        self.vertices[vertex].position
    }

    pub fn set_position(&mut self, vertex: usize, position: Point3<f64>) {
        self.vertices[vertex].position = position;
    }

    pub fn face(&self, face: usize) -> Option<&Face> {
        self.faces.get(face)
    }

    pub fn face_positions(&self, face: usize) -> Vec<Point3<f64>> {
        self.faces[face]
            .indices
            .iter()
            .map(|&v| self.vertices[v].position)
            .collect()
    }

    /// Check index ranges and corner counts
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(RepairError::InvalidFace {
                    face: face_idx,
                    len: face.len(),
                });
            }
            for (corner, &index) in face.indices.iter().enumerate() {
                if index >= vertex_count {
                    return Err(RepairError::InvalidIndex {
                        face: face_idx,
                        index,
                        vertex_count,
                    });
                }
                if face.indices[..corner].contains(&index) {
                    return Err(RepairError::DuplicateCorner { face: face_idx });
                }
            }
        }
        for (edge_idx, edge) in self.wire_edges.iter().enumerate() {
            for &index in edge {
                if index >= vertex_count {
                    return Err(RepairError::InvalidIndex {
                        face: edge_idx,
                        index,
                        vertex_count,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn is_triangulated(&self) -> bool {
        self.faces.iter().all(Face::is_triangle)
    }

    /// Split every polygon with more than three corners into triangles.
    ///
    /// The first triangle of a polygon keeps the polygon's index; the rest
    /// are appended. Returns the number of faces added.
    pub fn triangulate(&mut self) -> usize {
        let original = self.faces.len();
        let mut added = 0;
        for face_idx in 0..original {
            if self.faces[face_idx].len() <= 3 {
                continue;
            }
            let local = triangulate_polygon(&self.face_positions(face_idx));
            let face = &self.faces[face_idx];
            let hidden = face.hidden;
            let triangles: Vec<Vec<usize>> = local
                .iter()
                .map(|tri| tri.iter().map(|&corner| face.indices[corner]).collect())
                .collect();

            let mut triangles = triangles.into_iter();
            if let Some(first) = triangles.next() {
                self.faces[face_idx].indices = first;
            }
            for indices in triangles {
                self.faces.push(Face { indices, hidden });
                added += 1;
            }
        }
        added
    }

    /// Newell area vector (twice the area, along the face normal)
    pub fn face_area_vector(&self, face: usize) -> Vector3<f64> {
        let indices = &self.faces[face].indices;
        let n = indices.len();
        let mut normal = Vector3::zeros();
        for i in 0..n {
            let p = self.vertices[indices[i]].position;
            let q = self.vertices[indices[(i + 1) % n]].position;
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
        }
        normal
    }

    /// Unit face normal, zero for degenerate faces
    pub fn face_normal(&self, face: usize) -> Vector3<f64> {
        self.face_area_vector(face)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn face_area(&self, face: usize) -> f64 {
        self.face_area_vector(face).norm() * 0.5
    }

    pub fn face_centroid(&self, face: usize) -> Point3<f64> {
        let indices = &self.faces[face].indices;
        let sum = indices
            .iter()
            .fold(Vector3::zeros(), |acc, &v| acc + self.vertices[v].position.coords);
        Point3::from(sum / indices.len().max(1) as f64)
    }

    /// Area-weighted vertex normals; isolated vertices get a zero normal
    pub fn vertex_normals(&self) -> Vec<Vector3<f64>> {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];
        for face_idx in 0..self.faces.len() {
            let area = self.face_area_vector(face_idx);
            for &v in &self.faces[face_idx].indices {
                normals[v] += area;
            }
        }
        for normal in &mut normals {
            *normal = normal
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);
        }
        normals
    }

    pub fn face_bounding_box(&self, face: usize) -> BoundingBox {
        BoundingBox::from_points(
            self.faces[face]
                .indices
                .iter()
                .map(|&v| &self.vertices[v].position),
        )
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().map(|v| &v.position))
    }

    /// Hide every face for which `keep_visible` returns false
    pub fn hide_faces(&mut self, keep_visible: impl Fn(usize) -> bool) -> usize {
        let mut hidden = 0;
        for (idx, face) in self.faces.iter_mut().enumerate() {
            if !keep_visible(idx) && !face.hidden {
                face.hidden = true;
                hidden += 1;
            }
        }
        hidden
    }

    /// Unhide all faces, returning how many were hidden
    pub fn reveal(&mut self) -> usize {
        let mut revealed = 0;
        for face in &mut self.faces {
            if face.hidden {
                face.hidden = false;
                revealed += 1;
            }
        }
        revealed
    }

    pub fn visible_faces(&self) -> Vec<usize> {
        (0..self.faces.len())
            .filter(|&idx| !self.faces[idx].hidden)
            .collect()
    }

    /// Remove faces flagged in `doomed`; vertices are left in place
    pub fn remove_faces(&mut self, doomed: &[bool]) -> usize {
        let before = self.faces.len();
        let mut idx = 0;
        self.faces.retain(|_| {
            let keep = !doomed.get(idx).copied().unwrap_or(false);
            idx += 1;
            keep
        });
        before - self.faces.len()
    }

    /// Remove flagged vertices along with every face and wire edge using them.
    ///
    /// Remaining vertices are compacted and all indices are rewritten.
    pub fn remove_vertices(&mut self, doomed: &[bool]) -> usize {
        let is_doomed = |v: usize| doomed.get(v).copied().unwrap_or(false);
        if !(0..self.vertices.len()).any(is_doomed) {
            return 0;
        }

        self.faces
            .retain(|face| !face.indices.iter().any(|&v| is_doomed(v)));
        self.wire_edges
            .retain(|edge| !is_doomed(edge[0]) && !is_doomed(edge[1]));

        let mut remap = vec![usize::MAX; self.vertices.len()];
        let mut kept = Vec::with_capacity(self.vertices.len());
        for (idx, vertex) in self.vertices.iter().enumerate() {
            if !is_doomed(idx) {
                remap[idx] = kept.len();
                kept.push(*vertex);
            }
        }
        let removed = self.vertices.len() - kept.len();
        self.vertices = kept;

        for face in &mut self.faces {
            for index in &mut face.indices {
                *index = remap[*index];
            }
        }
        for edge in &mut self.wire_edges {
            edge[0] = remap[edge[0]];
            edge[1] = remap[edge[1]];
        }
        removed
    }

    /// Drop vertices referenced by nothing, returning how many went
    pub fn remove_unused_vertices(&mut self) -> usize {
        let unused = self.isolated_vertices();
        self.remove_vertices(&unused)
    }

    /// Vertices used by no face and no wire edge
    pub fn isolated_vertices(&self) -> Vec<bool> {
        let mut used = vec![false; self.vertices.len()];
        for face in &self.faces {
            for &v in &face.indices {
                used[v] = true;
            }
        }
        for edge in &self.wire_edges {
            used[edge[0]] = true;
            used[edge[1]] = true;
        }
        used.into_iter().map(|u| !u).collect()
    }

    /// All distinct undirected edges, face edges and wire edges, sorted
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .faces
            .iter()
            .flat_map(|face| face.edges().map(|(a, b)| edge_key(a, b)))
            .chain(self.wire_edges.iter().map(|e| edge_key(e[0], e[1])))
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Merge with another mesh (no welding)
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        for face in &other.faces {
            self.faces.push(Face {
                indices: face.indices.iter().map(|&v| v + offset).collect(),
                hidden: face.hidden,
            });
        }
        for edge in &other.wire_edges {
            self.wire_edges.push([edge[0] + offset, edge[1] + offset]);
        }
    }

    /// Signed enclosed volume of the faces in `faces` (positive when wound outward)
    pub fn signed_volume_of(&self, faces: &[usize]) -> f64 {
        let mut volume = 0.0;
        for &face_idx in faces {
            let indices = &self.faces[face_idx].indices;
            let p0 = self.vertices[indices[0]].position.coords;
            for i in 1..indices.len().saturating_sub(1) {
                let p1 = self.vertices[indices[i]].position.coords;
                let p2 = self.vertices[indices[i + 1]].position.coords;
                volume += p0.dot(&p1.cross(&p2));
            }
        }
        volume / 6.0
    }

    pub fn signed_volume(&self) -> f64 {
        let all: Vec<usize> = (0..self.faces.len()).collect();
        self.signed_volume_of(&all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;

    #[test]
    fn test_validate_rejects_bad_faces() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert!(Mesh::from_polygons(positions.clone(), vec![vec![0, 1, 2]]).is_ok());
        assert!(matches!(
            Mesh::from_polygons(positions.clone(), vec![vec![0, 1]]),
            Err(RepairError::InvalidFace { face: 0, len: 2 })
        ));
        assert!(matches!(
            Mesh::from_polygons(positions.clone(), vec![vec![0, 1, 7]]),
            Err(RepairError::InvalidIndex { index: 7, .. })
        ));
        assert!(matches!(
            Mesh::from_polygons(positions, vec![vec![0, 1, 0]]),
            Err(RepairError::DuplicateCorner { face: 0 })
        ));
    }

    #[test]
    fn test_triangulate_cube_keeps_face_indices() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        assert_eq!(mesh.face_count(), 6);
        let first_quad = mesh.faces[0].indices.clone();
        let added = mesh.triangulate();
        assert_eq!(added, 6);
        assert_eq!(mesh.face_count(), 12);
        assert!(mesh.is_triangulated());
        assert!(mesh.faces[0].indices.iter().all(|v| first_quad.contains(v)));
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_remove_vertices_drops_faces_and_remaps() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        let floating = mesh.add_vertex(Point3::new(5.0, 5.0, 5.0));
        let mut doomed = vec![false; mesh.vertex_count()];
        doomed[0] = true;
        let removed = mesh.remove_vertices(&doomed);
        assert_eq!(removed, 1);
        assert_eq!(mesh.vertex_count(), 8);
        // Vertex 0 touches three cube faces
        assert_eq!(mesh.face_count(), 3);
        assert_eq!(mesh.position(floating - 1), Point3::new(5.0, 5.0, 5.0));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_isolated_vertices() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        let lonely = mesh.add_vertex(Point3::new(3.0, 0.0, 0.0));
        let isolated = mesh.isolated_vertices();
        assert!(isolated[lonely]);
        assert_eq!(isolated.iter().filter(|&&i| i).count(), 1);
    }

    #[test]
    fn test_face_normals_point_outward() {
        let mesh = Primitive::cube(2.0).to_mesh();
        let center = mesh.bounding_box().center();
        for face in 0..mesh.face_count() {
            let outward = mesh.face_centroid(face) - center;
            assert!(mesh.face_normal(face).dot(&outward) > 0.0);
            assert_relative_eq!(mesh.face_area(face), 4.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_hide_and_reveal() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        let hidden = mesh.hide_faces(|face| face < 2);
        assert_eq!(hidden, 4);
        assert_eq!(mesh.visible_faces(), vec![0, 1]);
        assert_eq!(mesh.reveal(), 4);
        assert_eq!(mesh.visible_faces().len(), 6);
    }

    #[test]
    fn test_edges_include_wire() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        assert_eq!(mesh.edges().len(), 12);
        let a = mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
        mesh.add_wire_edge(0, a);
        assert_eq!(mesh.edges().len(), 13);
    }

    #[test]
    fn test_remove_unused_vertices() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        mesh.add_vertex(Point3::new(4.0, 0.0, 0.0));
        assert_eq!(mesh.remove_unused_vertices(), 1);
        assert_eq!(mesh.vertex_count(), 8);
        assert!(mesh.face(5).is_some());
        assert!(mesh.face(6).is_none());
    }
}
