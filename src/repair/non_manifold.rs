// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Non-manifold repair pipeline
//!
//! Every step runs unconditionally on a triangulated working copy and is
//! best effort. Progress is measured by the non-manifold vertex count
//! (wire, boundary and multi-face edges plus pinched or isolated vertices)
//! before and after.

use crate::error::{RepairError, Result};
use crate::geometry::Mesh;
use crate::ops::{
    delete_interior_faces, delete_loose, delete_small_vertex_islands, dissolve_degenerate, fill_holes,
    make_normals_consistent, remove_doubles,
};
use crate::repair::checksum::checksum;
use crate::repair::classify::{count_non_manifold_vertices, select_non_manifold_vertices, NonManifoldOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Safety cap on make-manifold rounds
pub const MAX_MANIFOLD_ROUNDS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NonManifoldParams {
    /// Distance for degenerate dissolution and vertex welding
    pub merge_distance: f64,
    /// Vertex islands smaller than this are deleted unless largest
    pub delete_island_threshold: usize,
}

impl Default for NonManifoldParams {
    fn default() -> Self {
        Self {
            merge_distance: 0.001,
            delete_island_threshold: 100,
        }
    }
}

impl NonManifoldParams {
    pub fn validate(&self) -> Result<()> {
        if !self.merge_distance.is_finite() || self.merge_distance < 0.0 {
            return Err(RepairError::invalid_parameter("merge_distance", self.merge_distance));
        }
        if self.delete_island_threshold == 0 {
            return Err(RepairError::invalid_parameter("delete_island_threshold", self.delete_island_threshold));
        }
        Ok(())
    }
}

/// Terminal state of one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairStatus {
    /// Clean and untouched
    Fine,
    /// Clean after changes
    Fixed,
    /// Changed but still defective
    Failed,
    /// Defective and nothing could be changed
    Unresolved,
}

impl fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RepairStatus::Fine => "fine",
            RepairStatus::Fixed => "fixed",
            RepairStatus::Failed => "failed",
            RepairStatus::Unresolved => "unresolved",
        };
        f.write_str(label)
    }
}

/// Per-step counters, mostly for logs and the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub loose_vertices: usize,
    pub loose_edges: usize,
    pub interior_faces: usize,
    pub holes_filled: usize,
    pub island_vertices: usize,
    pub dissolved: usize,
    pub welded: usize,
    pub manifold_rounds: usize,
    pub flipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonManifoldOutcome {
    pub changed: bool,
    pub clean: bool,
    /// More non-manifold vertices than before
    pub worse: bool,
    pub before: usize,
    pub after: usize,
    pub stats: PipelineStats,
}

impl NonManifoldOutcome {
    pub fn status(&self) -> RepairStatus {
        match (self.clean, self.changed) {
            (true, false) => RepairStatus::Fine,
            (true, true) => RepairStatus::Fixed,
            (false, true) => RepairStatus::Failed,
            (false, false) => RepairStatus::Unresolved,
        }
    }
}

/// Repair non-manifold geometry of `mesh` in place.
///
/// Fails on invalid parameters or a malformed mesh, before the mesh is
/// touched.
pub fn repair_non_manifold(mesh: &mut Mesh, params: &NonManifoldParams) -> Result<NonManifoldOutcome> {
    params.validate()?;
    mesh.validate()?;

    let mut working = mesh.clone();
    working.reveal();
    working.triangulate();
    let baseline = checksum(&working);
    let before = count_non_manifold_vertices(&working);

    let mut stats = PipelineStats::default();
    let loose = delete_loose(&mut working);
    stats.loose_vertices = loose.vertices;
    stats.loose_edges = loose.edges;
    stats.interior_faces = delete_interior_faces(&mut working);
    stats.holes_filled = fill_holes(&mut working, 0);
    stats.island_vertices = delete_small_vertex_islands(&mut working, params.delete_island_threshold);
    stats.dissolved = dissolve_degenerate(&mut working, params.merge_distance);
    working.triangulate();
    stats.welded = remove_doubles(&mut working, params.merge_distance);
    debug!(?stats, "cleanup steps done");

    let (rounds, filled) = make_manifold(&mut working);
    stats.manifold_rounds = rounds;
    stats.holes_filled += filled;
    stats.flipped = make_normals_consistent(&mut working);

    let after = count_non_manifold_vertices(&working);
    let changed = checksum(&working) != baseline;
    if changed {
        *mesh = working;
    } else {
        mesh.reveal();
    }

    let outcome = NonManifoldOutcome {
        changed,
        clean: after == 0,
        worse: after > before,
        before,
        after,
        stats,
    };
    if outcome.worse {
        warn!(before, after, "non-manifold repair made the mesh worse");
    }
    info!(before, after, changed, status = %outcome.status(), "non-manifold repair finished");
    Ok(outcome)
}

/// Fill holes and delete wire or isolated vertices until the face count
/// stops changing. Returns `(rounds, holes filled)`.
fn make_manifold(mesh: &mut Mesh) -> (usize, usize) {
    if count_non_manifold_vertices(mesh) == 0 {
        return (0, 0);
    }
    let (mut rounds, mut filled) = (0, 0);
    let mut face_count = mesh.face_count();
    while rounds < MAX_MANIFOLD_ROUNDS {
        rounds += 1;
        filled += fill_holes(mesh, 0);

        let mut doomed = vec![false; mesh.vertex_count()];
        for v in select_non_manifold_vertices(mesh, NonManifoldOptions::DISPOSABLE) {
            doomed[v] = true;
        }
        mesh.remove_vertices(&doomed);

        let now = mesh.face_count();
        debug!(round = rounds, faces = now, "make-manifold round");
        if now == face_count {
            break;
        }
        face_count = now;
    }
    (rounds, filled)
}
