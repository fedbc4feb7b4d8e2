// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Non-manifold classification of edges and vertices

use crate::geometry::{Mesh, MeshTopology};
use serde::{Deserialize, Serialize};

/// Edge classification by link-face count and winding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// No link faces
    Wire,
    /// One link face
    Boundary,
    /// Two link faces traversing the edge in opposite directions
    Manifold,
    /// Two link faces with clashing winding
    NonContiguous,
    /// Three or more link faces
    MultiFace,
}

impl EdgeKind {
    pub fn is_manifold(self) -> bool {
        self == EdgeKind::Manifold
    }
}

/// Which criteria make a vertex count as non-manifold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonManifoldOptions {
    /// Vertices on wire edges
    pub wire: bool,
    /// Vertices on boundary edges
    pub boundary: bool,
    /// Vertices on edges with three or more faces
    pub multi_face: bool,
    /// Vertices on edges whose two faces disagree on winding
    pub non_contiguous: bool,
    /// Isolated vertices and vertices joining separate face fans
    pub verts: bool,
}

impl NonManifoldOptions {
    /// Criteria behind the reported non-manifold count
    pub const COUNT: Self = Self {
        wire: true,
        boundary: true,
        multi_face: true,
        non_contiguous: false,
        verts: true,
    };

    /// Criteria for vertices the make-manifold loop deletes outright
    pub const DISPOSABLE: Self = Self {
        wire: true,
        boundary: false,
        multi_face: false,
        non_contiguous: false,
        verts: true,
    };

    pub fn all() -> Self {
        Self {
            wire: true,
            boundary: true,
            multi_face: true,
            non_contiguous: true,
            verts: true,
        }
    }

    fn wants(&self, kind: EdgeKind) -> bool {
        match kind {
            EdgeKind::Wire => self.wire,
            EdgeKind::Boundary => self.boundary,
            EdgeKind::MultiFace => self.multi_face,
            EdgeKind::NonContiguous => self.non_contiguous,
            EdgeKind::Manifold => false,
        }
    }
}

/// Classify one edge
pub fn classify_edge(mesh: &Mesh, topology: &MeshTopology, a: usize, b: usize) -> EdgeKind {
    let link = topology.link_faces(a, b);
    match link.len() {
        0 => EdgeKind::Wire,
        1 => EdgeKind::Boundary,
        2 => {
            let forward = |face: usize| {
                mesh.faces[face]
                    .edges()
                    .any(|(u, v)| u == a && v == b)
            };
            if forward(link[0]) != forward(link[1]) {
                EdgeKind::Manifold
            } else {
                EdgeKind::NonContiguous
            }
        }
        _ => EdgeKind::MultiFace,
    }
}

/// Every edge with its classification, in sorted edge order
pub fn classify_edges(mesh: &Mesh) -> Vec<((usize, usize), EdgeKind)> {
    let topology = MeshTopology::build(mesh);
    topology
        .edges()
        .iter()
        .map(|&(a, b)| ((a, b), classify_edge(mesh, &topology, a, b)))
        .collect()
}

/// Number of face fans around a vertex: faces are in one fan when they are
/// joined through edges incident to the vertex.
pub fn vertex_fan_count(topology: &MeshTopology, vertex: usize) -> usize {
    let faces = topology.vertex_faces(vertex);
    if faces.is_empty() {
        return 0;
    }

    let mut parent: Vec<usize> = (0..faces.len()).collect();
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for &neighbor in topology.vertex_neighbors(vertex) {
        let link = topology.link_faces(vertex, neighbor);
        let mut slots = link
            .iter()
            .filter_map(|face| faces.iter().position(|f| f == face));
        if let Some(first) = slots.next() {
            for other in slots {
                let (ra, rb) = (find(&mut parent, first), find(&mut parent, other));
                if ra != rb {
                    parent[ra] = rb;
                }
            }
        }
    }

    (0..faces.len())
        .filter(|&i| find(&mut parent, i) == i)
        .count()
}

/// Per-category breakdown of non-manifold elements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonManifoldReport {
    pub wire_edges: Vec<(usize, usize)>,
    pub boundary_edges: Vec<(usize, usize)>,
    pub multi_face_edges: Vec<(usize, usize)>,
    pub non_contiguous_edges: Vec<(usize, usize)>,
    pub isolated_vertices: Vec<usize>,
    /// Vertices shared by more than one face fan
    pub pinched_vertices: Vec<usize>,
}

impl NonManifoldReport {
    pub fn build(mesh: &Mesh) -> Self {
        let topology = MeshTopology::build(mesh);
        let mut report = Self::default();

        for &(a, b) in topology.edges() {
            match classify_edge(mesh, &topology, a, b) {
                EdgeKind::Wire => report.wire_edges.push((a, b)),
                EdgeKind::Boundary => report.boundary_edges.push((a, b)),
                EdgeKind::MultiFace => report.multi_face_edges.push((a, b)),
                EdgeKind::NonContiguous => report.non_contiguous_edges.push((a, b)),
                EdgeKind::Manifold => {}
            }
        }
        for vertex in 0..mesh.vertex_count() {
            if topology.vertex_neighbors(vertex).is_empty() {
                report.isolated_vertices.push(vertex);
            } else if vertex_fan_count(&topology, vertex) > 1 {
                report.pinched_vertices.push(vertex);
            }
        }
        report
    }

    pub fn is_manifold(&self) -> bool {
        self.wire_edges.is_empty()
            && self.boundary_edges.is_empty()
            && self.multi_face_edges.is_empty()
            && self.isolated_vertices.is_empty()
            && self.pinched_vertices.is_empty()
    }
}

/// Vertices matching any of the enabled criteria, sorted ascending
pub fn select_non_manifold_vertices(mesh: &Mesh, options: NonManifoldOptions) -> Vec<usize> {
    let topology = MeshTopology::build(mesh);
    let mut selected = vec![false; mesh.vertex_count()];

    for &(a, b) in topology.edges() {
        if options.wants(classify_edge(mesh, &topology, a, b)) {
            selected[a] = true;
            selected[b] = true;
        }
    }
    if options.verts {
        for vertex in 0..mesh.vertex_count() {
            if selected[vertex] {
                continue;
            }
            selected[vertex] = topology.vertex_neighbors(vertex).is_empty()
                || vertex_fan_count(&topology, vertex) > 1;
        }
    }

    (0..mesh.vertex_count()).filter(|&v| selected[v]).collect()
}

/// Non-manifold vertex count: wire, boundary, multi-face and vertex criteria
pub fn count_non_manifold_vertices(mesh: &Mesh) -> usize {
    select_non_manifold_vertices(mesh, NonManifoldOptions::COUNT).len()
}
