// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//!
//! Closed primitives are wound outward and share vertices between faces, so
//! they come out manifold and free of self-intersections.

use super::Mesh;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
pub enum Primitive {
    Cube { origin: Point3<f64>, size: Vector3<f64> },
    Sphere { center: Point3<f64>, r: f64, segments: u32, rings: u32 },
    Grid { cells: u32, size: f64 },
}

impl Primitive {
    /// Axis-aligned cube spanning `[0, size]` on every axis
    pub fn cube(size: f64) -> Self {
        Self::cube_at(Point3::origin(), Vector3::new(size, size, size))
    }

    pub fn cube_at(origin: Point3<f64>, size: Vector3<f64>) -> Self {
        Self::Cube { origin, size }
    }

    pub fn sphere(center: Point3<f64>, r: f64, segments: u32) -> Self {
        let segments = if segments >= 3 { segments } else { 32 };
        Self::Sphere {
            center,
            r,
            segments,
            rings: (segments / 2).max(2),
        }
    }

    /// Open square grid of quads in the XY plane
    pub fn grid(cells: u32, size: f64) -> Self {
        Self::Grid {
            cells: cells.max(1),
            size,
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Cube { origin, size } => generate_cube_mesh(*origin, *size),
            Self::Sphere {
                center,
                r,
                segments,
                rings,
            } => generate_sphere_mesh(*center, *r, *segments, *rings),
            Self::Grid { cells, size } => generate_grid_mesh(*cells, *size),
        }
    }
}

fn generate_cube_mesh(origin: Point3<f64>, size: Vector3<f64>) -> Mesh {
    let mut mesh = Mesh::with_capacity(8, 6);
    let (x0, y0, z0) = (origin.x, origin.y, origin.z);
    let (x1, y1, z1) = (origin.x + size.x, origin.y + size.y, origin.z + size.z);

    for position in [
        Point3::new(x0, y0, z0),
        Point3::new(x1, y0, z0),
        Point3::new(x1, y1, z0),
        Point3::new(x0, y1, z0),
        Point3::new(x0, y0, z1),
        Point3::new(x1, y0, z1),
        Point3::new(x1, y1, z1),
        Point3::new(x0, y1, z1),
    ] {
        mesh.add_vertex(position);
    }

    // -z, +z, -y, +y, -x, +x
    for quad in [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [2, 3, 7, 6],
        [0, 4, 7, 3],
        [1, 2, 6, 5],
    ] {
        mesh.add_face(quad.to_vec());
    }

    mesh
}

fn generate_sphere_mesh(center: Point3<f64>, radius: f64, segments: u32, rings: u32) -> Mesh {
    let segments = segments as usize;
    let rings = rings as usize;
    let mut mesh = Mesh::with_capacity(2 + (rings - 1) * segments, rings * segments);

    let north = mesh.add_vertex(center + Vector3::new(0.0, 0.0, radius));
    for ring in 1..rings {
        let theta = PI * ring as f64 / rings as f64;
        for seg in 0..segments {
            let phi = 2.0 * PI * seg as f64 / segments as f64;
            mesh.add_vertex(
                center
                    + Vector3::new(
                        radius * theta.sin() * phi.cos(),
                        radius * theta.sin() * phi.sin(),
                        radius * theta.cos(),
                    ),
            );
        }
    }
    let south = mesh.add_vertex(center - Vector3::new(0.0, 0.0, radius));

    let ring_vertex = |ring: usize, seg: usize| 1 + (ring - 1) * segments + seg % segments;

    for seg in 0..segments {
        mesh.add_face(vec![north, ring_vertex(1, seg), ring_vertex(1, seg + 1)]);
    }
    for ring in 1..rings - 1 {
        for seg in 0..segments {
            mesh.add_face(vec![
                ring_vertex(ring, seg),
                ring_vertex(ring + 1, seg),
                ring_vertex(ring + 1, seg + 1),
                ring_vertex(ring, seg + 1),
            ]);
        }
    }
    for seg in 0..segments {
        mesh.add_face(vec![
            south,
            ring_vertex(rings - 1, seg + 1),
            ring_vertex(rings - 1, seg),
        ]);
    }

    mesh
}

fn generate_grid_mesh(cells: u32, size: f64) -> Mesh {
    let cells = cells as usize;
    let step = size / cells as f64;
    let mut mesh = Mesh::with_capacity((cells + 1) * (cells + 1), cells * cells);

    for row in 0..=cells {
        for col in 0..=cells {
            mesh.add_vertex(Point3::new(col as f64 * step, row as f64 * step, 0.0));
        }
    }
    let index = |row: usize, col: usize| row * (cells + 1) + col;
    for row in 0..cells {
        for col in 0..cells {
            mesh.add_face(vec![
                index(row, col),
                index(row, col + 1),
                index(row + 1, col + 1),
                index(row + 1, col),
            ]);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_generation() {
        let mesh = Primitive::cube(10.0).to_mesh();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
        assert_relative_eq!(mesh.signed_volume(), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let mesh = Primitive::sphere(Point3::origin(), 1.0, 16).to_mesh();
        assert_eq!(mesh.vertex_count(), 2 + 7 * 16);
        assert!(mesh.signed_volume() > 3.0);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_grid_generation() {
        let mesh = Primitive::grid(4, 2.0).to_mesh();
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.face_count(), 16);
        assert_relative_eq!(mesh.face_normal(0).z, 1.0);
    }
}
