// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh editing primitives used by the repair engines

pub mod cleanup;
pub mod holes;
pub mod normals;
pub mod smooth;

pub use cleanup::{
    delete_interior_faces, delete_loose, delete_small_vertex_islands, dissolve_degenerate,
    remove_doubles, LooseRemoved,
};
pub use holes::{detect_holes, fill_holes, BoundaryLoop};
pub use normals::make_normals_consistent;
pub use smooth::{shrink_fatten, smooth_vertices};
