// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Self-intersection repair engine
//!
//! Runs on a triangulated working copy: a bounded split pass around sharp
//! slivers, a bounded smoothing loop over a widened neighbourhood of the
//! intersecting faces, then a shrink/fatten fallback per group of
//! overlapping islands. The caller's mesh is replaced only when the
//! working copy differs from the triangulated input.

use crate::error::{RepairError, Result};
use crate::geometry::{Mesh, MeshTopology};
use crate::ops::{shrink_fatten, smooth_vertices};
use crate::repair::checksum::checksum;
use crate::repair::intersect::find_intersecting_faces;
use crate::repair::islands::{faces_bounding_box, face_islands_within, group_overlapping_islands};
use crate::repair::selection::FaceSelection;
use crate::repair::split::split_intersections;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Upper bound on split rounds
pub const MAX_SPLIT_ROUNDS: usize = 3;

/// Smoothing blend factor toward the neighbour centroid
pub const SMOOTH_FACTOR: f64 = 0.5;

/// Fallback displacement as a fraction of the group extent, tried in order
pub const FALLBACK_SCALES: [f64; 2] = [0.1, 0.2];

/// Displacements at or below this magnitude are not attempted
const MIN_DISPLACEMENT: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionParams {
    /// Smoothing rounds before the fallback, at least 1
    pub max_attempts: usize,
}

impl Default for IntersectionParams {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

impl IntersectionParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(RepairError::invalid_parameter("max_attempts", self.max_attempts));
        }
        Ok(())
    }
}

/// What one run of [`repair_self_intersections`] did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionOutcome {
    /// The mesh content differs from the input
    pub changed: bool,
    /// No intersecting faces remain
    pub clean: bool,
    pub split_rounds: usize,
    pub smooth_rounds: usize,
    pub fallback_groups: usize,
    pub fallback_attempts: usize,
    /// Intersecting faces left at the end
    pub remaining: usize,
}

/// Repair self-intersections of `mesh` in place.
///
/// Fails on invalid parameters or a malformed mesh, before the mesh is
/// touched.
pub fn repair_self_intersections(mesh: &mut Mesh, params: &IntersectionParams) -> Result<IntersectionOutcome> {
    params.validate()?;
    mesh.validate()?;

    let mut working = mesh.clone();
    working.reveal();
    working.triangulate();
    let baseline = checksum(&working);

    let split_rounds = split_pass(&mut working);

    let mut smooth_rounds = 0;
    let mut remaining = find_intersecting_faces(&working);
    for attempt in 1..=params.max_attempts {
        if remaining.is_empty() {
            break;
        }
        smooth_rounds = attempt;
        smooth_round(&mut working, &remaining, attempt);
        remaining = find_intersecting_faces(&working);
        debug!(attempt, remaining = remaining.len(), "smoothing round");
    }

    let (mut fallback_groups, mut fallback_attempts) = (0, 0);
    if !remaining.is_empty() {
        (fallback_groups, fallback_attempts) = shrink_fatten_fallback(&mut working, &remaining);
        remaining = find_intersecting_faces(&working);
    }

    let changed = checksum(&working) != baseline;
    if changed {
        *mesh = working;
    } else {
        // Triangulation alone is not a repair; the input polygons stay
        mesh.reveal();
    }

    let outcome = IntersectionOutcome {
        changed,
        clean: remaining.is_empty(),
        split_rounds,
        smooth_rounds,
        fallback_groups,
        fallback_attempts,
        remaining: remaining.len(),
    };
    info!(
        changed = outcome.changed,
        clean = outcome.clean,
        remaining = outcome.remaining,
        "self-intersection repair finished"
    );
    Ok(outcome)
}

/// Split sharp faces around intersections until a round splits nothing.
///
/// Returns the number of rounds that split at least one face.
fn split_pass(mesh: &mut Mesh) -> usize {
    let mut rounds = 0;
    for _ in 0..MAX_SPLIT_ROUNDS {
        let split = split_intersections(mesh);
        mesh.triangulate();
        if split == 0 {
            break;
        }
        rounds += 1;
    }
    rounds
}

fn smooth_round(mesh: &mut Mesh, intersecting: &BTreeSet<usize>, attempt: usize) {
    let (grow, repeat) = if attempt >= 3 { (3, 3) } else { (2, 2) };
    let topology = MeshTopology::build(mesh);
    let mut selection = FaceSelection::from_faces(mesh.face_count(), intersecting.iter().copied());
    selection.grow(mesh, &topology, grow);
    selection.shrink(mesh, &topology, 1);
    let vertices = selection.vertices(mesh);
    smooth_vertices(mesh, &vertices, SMOOTH_FACTOR, repeat);
}

/// Displace each overlapping island group along its normals until its own
/// faces stop intersecting. Returns `(groups, attempts)`.
fn shrink_fatten_fallback(mesh: &mut Mesh, intersecting: &BTreeSet<usize>) -> (usize, usize) {
    let topology = MeshTopology::build(mesh);
    let mut selection = FaceSelection::from_faces(mesh.face_count(), intersecting.iter().copied());
    selection.grow(mesh, &topology, 1);
    mesh.hide_faces(|face| selection.contains(face));

    let region: Vec<usize> = mesh
        .visible_faces()
        .into_iter()
        .filter(|&face| selection.contains(face))
        .collect();
    let islands = face_islands_within(mesh, &region);
    let groups = group_overlapping_islands(mesh, &islands);
    debug!(islands = islands.len(), groups = groups.len(), "shrink/fatten fallback");

    let mut attempts = 0;
    for group in &groups {
        attempts += displace_group(mesh, group);
    }

    mesh.reveal();
    (groups.len(), attempts)
}

/// Try each displacement on one group, rolling back failures.
///
/// Returns the number of displacements tried.
fn displace_group(mesh: &mut Mesh, group: &[usize]) -> usize {
    let vertices: Vec<usize> = group
        .iter()
        .flat_map(|&face| mesh.faces[face].indices.iter().copied())
        .collect::<BTreeSet<usize>>()
        .into_iter()
        .collect();
    let extent = faces_bounding_box(mesh, group).max_extent();

    let mut attempts = 0;
    for scale in FALLBACK_SCALES {
        for sign in [1.0, -1.0] {
            let distance = sign * scale * extent;
            if distance.abs() <= MIN_DISPLACEMENT {
                continue;
            }
            attempts += 1;

            let snapshot: Vec<Point3<f64>> = vertices.iter().map(|&v| mesh.position(v)).collect();
            shrink_fatten(mesh, &vertices, distance);
            smooth_vertices(mesh, &vertices, SMOOTH_FACTOR, 2);

            let remaining = find_intersecting_faces(mesh);
            if group.iter().all(|face| !remaining.contains(face)) {
                debug!(faces = group.len(), distance, "group resolved");
                return attempts;
            }
            for (&v, &position) in vertices.iter().zip(&snapshot) {
                mesh.set_position(v, position);
            }
        }
    }
    attempts
}
