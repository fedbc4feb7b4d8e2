// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Content checksum used for change detection and cache validation
//!
//! Coordinates are quantized to three decimal places before hashing, so
//! jitter below 0.0005 units does not change the digest.
//! The layout is: quantized xyz per vertex in index order, then each face
//! loop followed by a `-1` sentinel, then (only when present) a `-2` marker
//! and the wire edges. Every value is written as a little-endian `i64`.

use crate::geometry::Mesh;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Decimal places kept when quantizing coordinates
pub const CHECKSUM_DECIMALS: i32 = 3;

const FACE_SENTINEL: i64 = -1;
const WIRE_MARKER: i64 = -2;

/// 128-bit mesh digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshChecksum(pub [u8; 16]);

impl MeshChecksum {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for MeshChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn quantize(value: f64) -> i64 {
    let scale = 10f64.powi(CHECKSUM_DECIMALS);
    (value * scale).round() as i64
}

/// Compute the checksum of a mesh
pub fn checksum(mesh: &Mesh) -> MeshChecksum {
    let mut hasher = Sha256::new();

    for vertex in &mesh.vertices {
        let p = vertex.position;
        for coord in [p.x, p.y, p.z] {
            hasher.update(quantize(coord).to_le_bytes());
        }
    }

    for face in &mesh.faces {
        for &index in &face.indices {
            hasher.update((index as i64).to_le_bytes());
        }
        hasher.update(FACE_SENTINEL.to_le_bytes());
    }

    if !mesh.wire_edges.is_empty() {
        hasher.update(WIRE_MARKER.to_le_bytes());
        for edge in &mesh.wire_edges {
            hasher.update((edge[0] as i64).to_le_bytes());
            hasher.update((edge[1] as i64).to_le_bytes());
        }
    }

    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    MeshChecksum(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Point3;

    #[test]
    fn test_empty_mesh_hashes_empty_buffer() {
        let expected = Sha256::digest(b"");
        assert_eq!(checksum(&Mesh::new()).0[..], expected[..16]);
    }

    #[test]
    fn test_checksum_is_stable() {
        let mesh = Primitive::cube(1.0).to_mesh();
        assert_eq!(checksum(&mesh), checksum(&mesh));
        assert_eq!(checksum(&mesh).to_hex().len(), 32);
    }

    #[test]
    fn test_quantization_threshold() {
        let mesh = Primitive::cube(1.0).to_mesh();
        let base = checksum(&mesh);

        let mut nudged = mesh.clone();
        nudged.set_position(6, Point3::new(1.0004, 1.0, 1.0));
        assert_eq!(checksum(&nudged), base);

        let mut moved = mesh.clone();
        moved.set_position(6, Point3::new(1.0006, 1.0, 1.0));
        assert_ne!(checksum(&moved), base);
    }

    #[test]
    fn test_topology_changes_digest() {
        let mesh = Primitive::cube(1.0).to_mesh();
        let mut flipped = mesh.clone();
        flipped.faces[0].flip();
        assert_ne!(checksum(&mesh), checksum(&flipped));

        let mut with_wire = mesh.clone();
        with_wire.add_wire_edge(0, 6);
        assert_ne!(checksum(&mesh), checksum(&with_wire));
    }
}
