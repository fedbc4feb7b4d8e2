// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Consistent outward face winding

use crate::geometry::{Mesh, MeshTopology};
use nalgebra::Vector3;
use std::collections::VecDeque;
use tracing::debug;

/// Make winding consistent across manifold edges, then turn each connected
/// patch so its normals point away from the patch centre.
///
/// Returns the number of faces flipped.
pub fn make_normals_consistent(mesh: &mut Mesh) -> usize {
    let topology = MeshTopology::build(mesh);
    let count = mesh.face_count();
    let mut flip = vec![false; count];
    let mut visited = vec![false; count];

    for seed in 0..count {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut component = Vec::new();
        let mut queue = VecDeque::from([seed]);

        while let Some(face) = queue.pop_front() {
            component.push(face);
            for (a, b) in mesh.faces[face].edges() {
                let (a, b) = if flip[face] { (b, a) } else { (a, b) };
                let link = topology.link_faces(a, b);
                if link.len() != 2 {
                    continue;
                }
                let other = if link[0] == face { link[1] } else { link[0] };
                if visited[other] {
                    continue;
                }
                // The neighbour must run the shared edge as b -> a
                flip[other] = mesh.faces[other].edges().any(|(u, v)| u == a && v == b);
                visited[other] = true;
                queue.push_back(other);
            }
        }

        if outward_score(mesh, &component, &flip) < 0.0 {
            for &face in &component {
                flip[face] = !flip[face];
            }
        }
    }

    let mut flipped = 0;
    for (face, &should_flip) in mesh.faces.iter_mut().zip(&flip) {
        if should_flip {
            face.flip();
            flipped += 1;
        }
    }
    if flipped > 0 {
        debug!(flipped, "unified face normals");
    }
    flipped
}

/// Positive when the (possibly flipped) normals of `faces` point away from
/// their area-weighted centre
fn outward_score(mesh: &Mesh, faces: &[usize], flip: &[bool]) -> f64 {
    let mut center = Vector3::zeros();
    let mut total_area = 0.0;
    for &face in faces {
        let area = mesh.face_area(face);
        center += mesh.face_centroid(face).coords * area;
        total_area += area;
    }
    if total_area <= f64::EPSILON {
        return 0.0;
    }
    center /= total_area;

    faces
        .iter()
        .map(|&face| {
            let sign = if flip[face] { -1.0 } else { 1.0 };
            sign * mesh
                .face_area_vector(face)
                .dot(&(mesh.face_centroid(face).coords - center))
        })
        .sum()
}
