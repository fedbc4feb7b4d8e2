// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ subset: `v`, `f` and `l` records.
//!
//! Polygons are kept as-is. Texture and normal references in `f` records
//! are ignored, negative indices count back from the last vertex.

use crate::error::{RepairError, Result};
use crate::geometry::Mesh;
use nalgebra::Point3;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub fn read_obj(path: &Path) -> Result<Mesh> {
    let source = fs::read_to_string(path)?;
    parse_obj(&source)
}

pub fn write_obj(mesh: &Mesh, path: &Path) -> Result<()> {
    fs::write(path, to_obj_string(mesh))?;
    Ok(())
}

pub fn parse_obj(source: &str) -> Result<Mesh> {
    let mut mesh = Mesh::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        let mut tokens = content.split_whitespace();
        let Some(tag) = tokens.next() else {
            continue;
        };
        match tag {
            "v" => {
                let coords = tokens
                    .take(3)
                    .map(|t| t.parse::<f64>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| parse_error(line, e))?;
                if coords.len() != 3 {
                    return Err(parse_error(line, "vertex needs three coordinates"));
                }
                mesh.add_vertex(Point3::new(coords[0], coords[1], coords[2]));
            }
            "f" => {
                let indices = tokens
                    .map(|t| resolve_index(t, mesh.vertex_count(), line))
                    .collect::<Result<Vec<_>>>()?;
                if indices.len() < 3 {
                    return Err(parse_error(line, "face needs at least three corners"));
                }
                mesh.add_face(indices);
            }
            "l" => {
                let indices = tokens
                    .map(|t| resolve_index(t, mesh.vertex_count(), line))
                    .collect::<Result<Vec<_>>>()?;
                for pair in indices.windows(2) {
                    mesh.add_wire_edge(pair[0], pair[1]);
                }
            }
            _ => {}
        }
    }

    mesh.validate()?;
    Ok(mesh)
}

fn resolve_index(token: &str, vertex_count: usize, line: usize) -> Result<usize> {
    let head = token.split('/').next().unwrap_or("");
    let raw: i64 = head.parse().map_err(|e| parse_error(line, e))?;
    let resolved = if raw > 0 {
        raw - 1
    } else {
        vertex_count as i64 + raw
    };
    if raw == 0 || resolved < 0 || resolved >= vertex_count as i64 {
        return Err(parse_error(line, format!("vertex index {raw} out of range")));
    }
    Ok(resolved as usize)
}

fn parse_error(line: usize, message: impl ToString) -> RepairError {
    RepairError::Parse {
        line,
        message: message.to_string(),
    }
}

pub fn to_obj_string(mesh: &Mesh) -> String {
    let mut out = String::new();
    for vertex in &mesh.vertices {
        let p = vertex.position;
        let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
    }
    for face in &mesh.faces {
        out.push('f');
        for &v in &face.indices {
            let _ = write!(out, " {}", v + 1);
        }
        out.push('\n');
    }
    for edge in &mesh.wire_edges {
        let _ = writeln!(out, "l {} {}", edge[0] + 1, edge[1] + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;

    #[test]
    fn test_parse_quads_and_lines() {
        let source = "\
# unit square with a tail
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 2 2 0
f 1/1/1 2/2/1 3/3/1 4/4/1
l 3 -1
";
        let mesh = parse_obj(source).unwrap();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.faces[0].indices, vec![0, 1, 2, 3]);
        assert_eq!(mesh.wire_edges, vec![[2, 4]]);
    }

    #[test]
    fn test_parse_errors_carry_line() {
        match parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 7\n") {
            Err(RepairError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(parse_obj("v 0 x 0\n"), Err(RepairError::Parse { line: 1, .. })));
        assert!(matches!(parse_obj("v 0 0 0\nv 1 1 1\nf 1 2\n"), Err(RepairError::Parse { .. })));
    }

    #[test]
    fn test_obj_text_round_trip() {
        let cube = Primitive::cube(1.0).to_mesh();
        let back = parse_obj(&to_obj_string(&cube)).unwrap();
        assert_eq!(back, cube);
    }
}
