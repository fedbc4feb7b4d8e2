// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh file discovery, loading and saving for the CLI

use crate::batch::MeshObject;
use crate::io::{load_mesh, save_mesh, MeshFormat};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand files and directories into a sorted list of mesh files
pub fn collect_mesh_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).follow_links(true) {
                let entry = entry.with_context(|| format!("Failed to walk {:?}", input))?;
                let path = entry.path();
                if entry.file_type().is_file() && MeshFormat::from_path(path).is_some() {
                    files.push(path.to_path_buf());
                }
            }
        } else if input.is_file() {
            if MeshFormat::from_path(input).is_none() {
                bail!("Unsupported mesh format: {:?}", input);
            }
            files.push(input.clone());
        } else {
            bail!("Input not found: {:?}", input);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Load every file as a [`MeshObject`] named after its path
pub fn load_objects(files: &[PathBuf]) -> Result<Vec<MeshObject>> {
    files
        .iter()
        .map(|path| {
            let mesh = load_mesh(path).with_context(|| format!("Failed to load mesh: {:?}", path))?;
            Ok(MeshObject::new(path.display().to_string(), mesh))
        })
        .collect()
}

/// Write objects into `out_dir`, keeping file names; `None` writes in place
pub fn save_objects(objects: &[MeshObject], files: &[PathBuf], out_dir: Option<&Path>) -> Result<usize> {
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let mut written = 0;
    for (object, source) in objects.iter().zip(files) {
        let target = match (out_dir, source.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => source.clone(),
        };
        save_mesh(&object.mesh, &target).with_context(|| format!("Failed to write mesh: {:?}", target))?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use crate::io::write_obj;
    use tempfile::tempdir;

    #[test]
    fn test_collect_walks_directories() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("parts");
        std::fs::create_dir_all(&nested)?;
        let cube = Primitive::cube(1.0).to_mesh();
        write_obj(&cube, &nested.join("b.obj"))?;
        write_obj(&cube, &dir.path().join("a.obj"))?;
        std::fs::write(dir.path().join("notes.txt"), "ignored")?;

        let files = collect_mesh_files(&[dir.path().to_path_buf()])?;
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.obj"));

        let objects = load_objects(&files)?;
        let out = dir.path().join("out");
        assert_eq!(save_objects(&objects, &files, Some(&out))?, 2);
        assert!(out.join("b.obj").exists());
        Ok(())
    }

    #[test]
    fn test_missing_input_fails() {
        assert!(collect_mesh_files(&[PathBuf::from("/nonexistent/mesh.obj")]).is_err());
    }
}
