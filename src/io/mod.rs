// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh file import and export

mod obj;
mod stl;

pub use obj::{parse_obj, read_obj, to_obj_string, write_obj};
pub use stl::{read_stl, write_stl};

use crate::error::{RepairError, Result};
use crate::geometry::Mesh;
use std::path::Path;

/// Supported mesh file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
}

impl MeshFormat {
    /// Format from the file extension, case-insensitive
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }
}

fn format_of(path: &Path) -> Result<MeshFormat> {
    MeshFormat::from_path(path)
        .ok_or_else(|| RepairError::invalid_parameter("extension", path.display()))
}

/// Load a mesh, picking the reader by extension
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    match format_of(path)? {
        MeshFormat::Stl => read_stl(path),
        MeshFormat::Obj => read_obj(path),
    }
}

/// Save a mesh, picking the writer by extension
pub fn save_mesh(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match format_of(path)? {
        MeshFormat::Stl => write_stl(mesh, path),
        MeshFormat::Obj => write_obj(mesh, path),
    }
}
