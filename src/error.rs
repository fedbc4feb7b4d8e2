// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh repair

use thiserror::Error;

/// Errors raised before a repair touches the mesh.
///
/// Meshes that cannot be fully repaired are not errors; that outcome is
/// reported through the `clean`/`worse` flags of each engine.
#[derive(Debug, Error)]
pub enum RepairError {
    /// A numeric parameter is outside its accepted range.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value, formatted.
        value: String,
    },

    /// A face has fewer than three corners.
    #[error("face {face} has {len} corners, at least 3 are required")]
    InvalidFace {
        /// Face index.
        face: usize,
        /// Number of corners found.
        len: usize,
    },

    /// A face or edge references a vertex that does not exist.
    #[error("face {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    InvalidIndex {
        /// Face index (or wire edge index for loose edges).
        face: usize,
        /// The out-of-range vertex index.
        index: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face uses the same vertex twice.
    #[error("face {face} repeats a vertex")]
    DuplicateCorner {
        /// Face index.
        face: usize,
    },

    /// Mesh file could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// I/O failure while reading or writing a mesh file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RepairError {
    pub(crate) fn invalid_parameter(name: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
        }
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, RepairError>;
