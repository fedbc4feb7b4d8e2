// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex relaxation and normal-directed offsets

use crate::geometry::{Mesh, MeshTopology};
use nalgebra::{Point3, Vector3};

/// Smallest cosine used for the even-offset correction
const MIN_OFFSET_COS: f64 = 0.1;

/// Laplacian smoothing of `vertices` toward the centroid of their edge
/// neighbours.
///
/// Each pass computes every new position from the previous pass before
/// writing any of them. Neighbours outside `vertices` pull but do not move.
pub fn smooth_vertices(mesh: &mut Mesh, vertices: &[usize], factor: f64, repeat: usize) {
    if vertices.is_empty() || factor == 0.0 {
        return;
    }
    let topology = MeshTopology::build(mesh);

    for _ in 0..repeat {
        let updates: Vec<(usize, Point3<f64>)> = vertices
            .iter()
            .filter_map(|&v| {
                let neighbors = topology.vertex_neighbors(v);
                if neighbors.is_empty() {
                    return None;
                }
                let centroid = neighbors
                    .iter()
                    .fold(Vector3::zeros(), |acc, &n| acc + mesh.position(n).coords)
                    / neighbors.len() as f64;
                let current = mesh.position(v);
                Some((v, current + (Point3::from(centroid) - current) * factor))
            })
            .collect();

        for (v, position) in updates {
            mesh.set_position(v, position);
        }
    }
}

/// Move `vertices` along their vertex normals by `distance`.
///
/// Offsets are scaled by the even-thickness factor `1 / cos`, where `cos`
/// is the mean agreement between the vertex normal and the normals of its
/// faces, so sharp corners keep the shell thickness. Positive distances
/// fatten (move outward), negative ones shrink.
pub fn shrink_fatten(mesh: &mut Mesh, vertices: &[usize], distance: f64) {
    if vertices.is_empty() || distance == 0.0 {
        return;
    }
    let topology = MeshTopology::build(mesh);
    let normals = mesh.vertex_normals();
    let face_normals: Vec<Vector3<f64>> = (0..mesh.face_count()).map(|f| mesh.face_normal(f)).collect();

    let offsets: Vec<(usize, Vector3<f64>)> = vertices
        .iter()
        .filter(|&&v| normals[v] != Vector3::zeros())
        .map(|&v| {
            let faces = topology.vertex_faces(v);
            let mean_cos = faces
                .iter()
                .map(|&f| normals[v].dot(&face_normals[f]))
                .sum::<f64>()
                / faces.len().max(1) as f64;
            let scale = 1.0 / mean_cos.clamp(MIN_OFFSET_COS, 1.0);
            (v, normals[v] * distance * scale)
        })
        .collect();

    for (v, offset) in offsets {
        let moved = mesh.position(v) + offset;
        mesh.set_position(v, moved);
    }
}
