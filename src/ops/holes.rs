// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Hole detection and filling
//!
//! A hole is a closed loop of boundary edges (edges with one link face).
//! Loops are traced along the reversed boundary half-edges, so a new face
//! built from a loop is wound consistently with its neighbours.

use crate::geometry::{Mesh, MeshTopology};
use ahash::AHashMap;
use tracing::{debug, info};

/// A boundary loop in fill order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    pub vertices: Vec<usize>,
}

impl BoundaryLoop {
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Trace every closed boundary loop.
///
/// Figure-eight boundaries through a pinched vertex are split into separate
/// loops; open chains are dropped.
pub fn detect_holes(mesh: &Mesh) -> Vec<BoundaryLoop> {
    let topology = MeshTopology::build(mesh);

    // Hole half-edges run opposite to the owning face
    let mut outgoing: AHashMap<usize, Vec<usize>> = AHashMap::new();
    let mut half_edges: Vec<(usize, usize)> = Vec::new();
    for face in &mesh.faces {
        for (a, b) in face.edges() {
            if topology.link_faces(a, b).len() == 1 {
                outgoing.entry(b).or_default().push(a);
                half_edges.push((b, a));
            }
        }
    }
    half_edges.sort_unstable();
    if half_edges.is_empty() {
        return Vec::new();
    }
    debug!("found {} boundary edges", half_edges.len());

    let mut used: AHashMap<(usize, usize), bool> =
        half_edges.iter().map(|&edge| (edge, false)).collect();
    let mut loops = Vec::new();

    for &(start, first) in &half_edges {
        if used.get(&(start, first)).copied().unwrap_or(true) {
            continue;
        }
        used.insert((start, first), true);

        let mut path = vec![start];
        let mut current = first;
        loop {
            if let Some(pos) = path.iter().position(|&v| v == current) {
                let cycle: Vec<usize> = path.split_off(pos);
                if cycle.len() >= 3 {
                    loops.push(BoundaryLoop { vertices: cycle });
                }
                if path.is_empty() {
                    break;
                }
                // Inner cycle through a pinched vertex; keep tracing from it
            }
            path.push(current);

            let next = outgoing.get(&current).and_then(|targets| {
                targets
                    .iter()
                    .copied()
                    .find(|&t| !used.get(&(current, t)).copied().unwrap_or(true))
            });
            match next {
                Some(target) => {
                    used.insert((current, target), true);
                    current = target;
                }
                None => break,
            }
        }
    }

    info!(
        "detected {} holes, sizes: {:?}",
        loops.len(),
        loops.iter().map(BoundaryLoop::edge_count).collect::<Vec<_>>()
    );
    loops
}

/// Fill boundary loops with one polygon each.
///
/// `max_sides` limits the loop length; `0` fills holes of any size.
/// Returns the number of faces added.
pub fn fill_holes(mesh: &mut Mesh, max_sides: usize) -> usize {
    let mut filled = 0;
    for hole in detect_holes(mesh) {
        if max_sides != 0 && hole.edge_count() > max_sides {
            continue;
        }
        mesh.add_face(hole.vertices);
        filled += 1;
    }
    if filled > 0 {
        debug!(filled, "filled holes");
    }
    filled
}
