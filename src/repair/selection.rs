// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face selection with ring-wise grow and shrink
//!
//! A ring is every face sharing at least one vertex with the current
//! selection. Hidden faces are never added and never block a shrink.

use crate::geometry::{Mesh, MeshTopology};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceSelection {
    selected: Vec<bool>,
}

impl FaceSelection {
    pub fn new(face_count: usize) -> Self {
        Self {
            selected: vec![false; face_count],
        }
    }

    pub fn from_faces(face_count: usize, faces: impl IntoIterator<Item = usize>) -> Self {
        let mut selection = Self::new(face_count);
        for face in faces {
            selection.insert(face);
        }
        selection
    }

    pub fn insert(&mut self, face: usize) {
        if let Some(slot) = self.selected.get_mut(face) {
            *slot = true;
        }
    }

    pub fn contains(&self, face: usize) -> bool {
        self.selected.get(face).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.selected.iter().filter(|&&s| s).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.selected.iter().any(|&s| s)
    }

    pub fn faces(&self) -> Vec<usize> {
        (0..self.selected.len()).filter(|&f| self.selected[f]).collect()
    }

    /// Add `rings` face rings around the selection
    pub fn grow(&mut self, mesh: &Mesh, topology: &MeshTopology, rings: usize) {
        for _ in 0..rings {
            let mut next = self.selected.clone();
            for face in self.faces() {
                for &v in &mesh.faces[face].indices {
                    for &other in topology.vertex_faces(v) {
                        if !mesh.faces[other].hidden {
                            next[other] = true;
                        }
                    }
                }
            }
            if next == self.selected {
                break;
            }
            self.selected = next;
        }
    }

    /// Drop `rings` rings of selected faces that touch an unselected face
    pub fn shrink(&mut self, mesh: &Mesh, topology: &MeshTopology, rings: usize) {
        for _ in 0..rings {
            let next: Vec<bool> = (0..self.selected.len())
                .map(|face| {
                    self.selected[face]
                        && !mesh.faces[face].indices.iter().any(|&v| {
                            topology
                                .vertex_faces(v)
                                .iter()
                                .any(|&other| !self.selected[other] && !mesh.faces[other].hidden)
                        })
                })
                .collect();
            if next == self.selected {
                break;
            }
            self.selected = next;
        }
    }

    /// Sorted vertices used by the selected faces
    pub fn vertices(&self, mesh: &Mesh) -> Vec<usize> {
        let mut used = vec![false; mesh.vertex_count()];
        for face in self.faces() {
            for &v in &mesh.faces[face].indices {
                used[v] = true;
            }
        }
        (0..used.len()).filter(|&v| used[v]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;

    fn grid() -> Mesh {
        Primitive::grid(5, 5.0).to_mesh()
    }

    fn cell(row: usize, col: usize) -> usize {
        row * 5 + col
    }

    #[test]
    fn test_grow_by_vertex_ring() {
        let mesh = grid();
        let topology = MeshTopology::build(&mesh);
        let mut selection = FaceSelection::from_faces(mesh.face_count(), [cell(2, 2)]);
        selection.grow(&mesh, &topology, 1);
        assert_eq!(selection.len(), 9);
        selection.grow(&mesh, &topology, 1);
        assert_eq!(selection.len(), 25);
    }

    #[test]
    fn test_shrink_inverts_grow_in_the_interior() {
        let mesh = grid();
        let topology = MeshTopology::build(&mesh);
        let mut selection = FaceSelection::from_faces(mesh.face_count(), [cell(2, 2)]);
        selection.grow(&mesh, &topology, 1);
        selection.shrink(&mesh, &topology, 1);
        assert_eq!(selection.faces(), vec![cell(2, 2)]);
    }

    #[test]
    fn test_hidden_faces_are_not_grown_into() {
        let mut mesh = grid();
        mesh.hide_faces(|face| face != cell(2, 3));
        let topology = MeshTopology::build(&mesh);
        let mut selection = FaceSelection::from_faces(mesh.face_count(), [cell(2, 2)]);
        selection.grow(&mesh, &topology, 1);
        assert_eq!(selection.len(), 8);
        assert!(!selection.contains(cell(2, 3)));
    }

    #[test]
    fn test_selection_vertices() {
        let mesh = grid();
        let selection = FaceSelection::from_faces(mesh.face_count(), [0, 1]);
        assert_eq!(selection.vertices(&mesh), vec![0, 1, 2, 6, 7, 8]);
    }
}
