// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge and vertex adjacency derived from face loops
//!
//! Rebuilt from scratch after every structural edit; nothing here tracks
//! mutations.

use super::mesh::{edge_key, Mesh};
use ahash::AHashMap;

/// Adjacency tables for one mesh snapshot
#[derive(Debug, Clone, Default)]
pub struct MeshTopology {
    edges: Vec<(usize, usize)>,
    edge_faces: AHashMap<(usize, usize), Vec<usize>>,
    vertex_faces: Vec<Vec<usize>>,
    vertex_neighbors: Vec<Vec<usize>>,
}

impl MeshTopology {
    pub fn build(mesh: &Mesh) -> Self {
        let vertex_count = mesh.vertex_count();
        let mut edge_faces: AHashMap<(usize, usize), Vec<usize>> = AHashMap::new();
        let mut vertex_faces = vec![Vec::new(); vertex_count];
        let mut vertex_neighbors = vec![Vec::new(); vertex_count];

        for (face_idx, face) in mesh.faces.iter().enumerate() {
            for &v in &face.indices {
                if vertex_faces[v].last() != Some(&face_idx) {
                    vertex_faces[v].push(face_idx);
                }
            }
            for (a, b) in face.edges() {
                let link = edge_faces.entry(edge_key(a, b)).or_default();
                if link.last() != Some(&face_idx) {
                    link.push(face_idx);
                }
            }
        }
        for edge in &mesh.wire_edges {
            edge_faces.entry(edge_key(edge[0], edge[1])).or_default();
        }

        let mut edges: Vec<(usize, usize)> = edge_faces.keys().copied().collect();
        edges.sort_unstable();
        for &(a, b) in &edges {
            vertex_neighbors[a].push(b);
            vertex_neighbors[b].push(a);
        }

        Self {
            edges,
            edge_faces,
            vertex_faces,
            vertex_neighbors,
        }
    }

    /// Every distinct edge, sorted by (min, max)
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edge_faces.contains_key(&edge_key(a, b))
    }

    /// Faces bordering the edge (empty for wire or unknown edges)
    pub fn link_faces(&self, a: usize, b: usize) -> &[usize] {
        self.edge_faces
            .get(&edge_key(a, b))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn vertex_faces(&self, vertex: usize) -> &[usize] {
        &self.vertex_faces[vertex]
    }

    /// Vertices joined to `vertex` by an edge
    pub fn vertex_neighbors(&self, vertex: usize) -> &[usize] {
        &self.vertex_neighbors[vertex]
    }

    /// Faces sharing an edge with `face`, excluding `face` itself
    pub fn face_neighbors(&self, mesh: &Mesh, face: usize) -> Vec<usize> {
        let mut neighbors: Vec<usize> = mesh.faces[face]
            .edges()
            .flat_map(|(a, b)| self.link_faces(a, b).iter().copied())
            .filter(|&other| other != face)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Faces sharing at least one vertex with `face`, excluding `face` itself
    pub fn face_ring(&self, mesh: &Mesh, face: usize) -> Vec<usize> {
        let mut ring: Vec<usize> = mesh.faces[face]
            .indices
            .iter()
            .flat_map(|&v| self.vertex_faces(v).iter().copied())
            .filter(|&other| other != face)
            .collect();
        ring.sort_unstable();
        ring.dedup();
        ring
    }
}
