// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export through `stl_io`

use crate::error::Result;
use crate::geometry::Mesh;
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use stl_io::{Normal, Triangle, Vertex as StlVertex};

/// Read binary or ASCII STL. Coincident corners are shared by `stl_io`.
pub fn read_stl(path: &Path) -> Result<Mesh> {
    let mut reader = BufReader::new(File::open(path)?);
    let stl = stl_io::read_stl(&mut reader)?;

    let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());
    for v in &stl.vertices {
        mesh.add_vertex(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
    }
    for face in &stl.faces {
        let [a, b, c] = face.vertices;
        // Zero-area facets that collapse to fewer than three corners are dropped
        if a != b && b != c && a != c {
            mesh.add_face(vec![a, b, c]);
        }
    }
    mesh.validate()?;
    Ok(mesh)
}

/// Write binary STL; polygons are triangulated on the fly
pub fn write_stl(mesh: &Mesh, path: &Path) -> Result<()> {
    let mut triangulated = mesh.clone();
    triangulated.triangulate();

    let triangles: Vec<Triangle> = (0..triangulated.face_count())
        .map(|face| {
            let n = triangulated.face_normal(face);
            let corner = |i: usize| {
                let p = triangulated.position(triangulated.faces[face].indices[i]);
                StlVertex::new([p.x as f32, p.y as f32, p.z as f32])
            };
            Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [corner(0), corner(1), corner(2)],
            }
        })
        .collect();

    let mut writer = BufWriter::new(File::create(path)?);
    stl_io::write_stl(&mut writer, triangles.iter())?;
    Ok(())
}
