// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Repair
//!
//! Self-intersection and non-manifold repair for polygon meshes.
//! Detection (BVH self-overlap, edge and vertex classification), the two
//! repair engines, checksum-validated defect caching and a batch driver.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod ops;
pub mod repair;
pub mod utils;

pub use batch::{BatchRunner, CancelToken, MeshObject};
pub use config::RepairConfig;
pub use error::{RepairError, Result};
pub use geometry::{Mesh, Primitive};
pub use repair::{
    analyze, checksum, find_intersecting_faces, repair_non_manifold, repair_self_intersections, DefectReport,
    IntersectionOutcome, IntersectionParams, NonManifoldOutcome, NonManifoldParams, RepairStatus,
};
