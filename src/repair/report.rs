// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cached defect counts
//!
//! Each slot remembers the checksum of the mesh it was computed on. A slot
//! is only trusted while the mesh still hashes to that checksum and, when a
//! time-to-live is given, while it is younger than the TTL.

use crate::error::Result;
use crate::geometry::Mesh;
use crate::repair::checksum::{checksum, MeshChecksum};
use crate::repair::classify::count_non_manifold_vertices;
use crate::repair::intersect::count_intersecting_faces;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// TTL used when caching is time limited
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// One cached count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSlot {
    pub count: usize,
    pub checksum: MeshChecksum,
    pub computed_at: DateTime<Utc>,
}

impl CountSlot {
    fn new(mesh: &Mesh, count: usize) -> Self {
        Self {
            count,
            checksum: checksum(mesh),
            computed_at: Utc::now(),
        }
    }

    fn valid_for(&self, current: MeshChecksum, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        if self.checksum != current {
            return false;
        }
        match ttl {
            None => true,
            Some(ttl) => chrono::Duration::from_std(ttl)
                .map(|ttl| now.signed_duration_since(self.computed_at) < ttl)
                .unwrap_or(true),
        }
    }
}

/// Per-object cache of the two defect counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectReport {
    pub non_manifold: Option<CountSlot>,
    pub self_intersection: Option<CountSlot>,
}

impl DefectReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_non_manifold(&mut self, mesh: &Mesh, count: usize) {
        self.non_manifold = Some(CountSlot::new(mesh, count));
    }

    pub fn record_self_intersection(&mut self, mesh: &Mesh, count: usize) {
        self.self_intersection = Some(CountSlot::new(mesh, count));
    }

    /// Cached non-manifold vertex count, if still valid for `mesh`
    pub fn non_manifold_count(&self, mesh: &Mesh, ttl: Option<Duration>) -> Option<usize> {
        lookup(self.non_manifold.as_ref(), mesh, ttl)
    }

    /// Cached intersecting face count, if still valid for `mesh`
    pub fn self_intersection_count(&self, mesh: &Mesh, ttl: Option<Duration>) -> Option<usize> {
        lookup(self.self_intersection.as_ref(), mesh, ttl)
    }

    /// Cached count, or a fresh one that is then stored.
    ///
    /// A malformed mesh is rejected before counting and leaves the slot as is.
    pub fn refresh_non_manifold(&mut self, mesh: &Mesh, ttl: Option<Duration>) -> Result<usize> {
        if let Some(count) = self.non_manifold_count(mesh, ttl) {
            return Ok(count);
        }
        let count = count_non_manifold_vertices(&triangulated(mesh)?);
        self.record_non_manifold(mesh, count);
        Ok(count)
    }

    pub fn refresh_self_intersection(&mut self, mesh: &Mesh, ttl: Option<Duration>) -> Result<usize> {
        if let Some(count) = self.self_intersection_count(mesh, ttl) {
            return Ok(count);
        }
        let count = count_intersecting_faces(&triangulated(mesh)?);
        self.record_self_intersection(mesh, count);
        Ok(count)
    }

    pub fn invalidate(&mut self) {
        self.non_manifold = None;
        self.self_intersection = None;
    }
}

fn lookup(slot: Option<&CountSlot>, mesh: &Mesh, ttl: Option<Duration>) -> Option<usize> {
    let slot = slot?;
    slot.valid_for(checksum(mesh), ttl, Utc::now()).then_some(slot.count)
}

fn triangulated(mesh: &Mesh) -> Result<Mesh> {
    mesh.validate()?;
    let mut copy = mesh.clone();
    copy.triangulate();
    Ok(copy)
}

/// Compute both counts on a triangulated copy and store them against the
/// checksum of `mesh` as given.
pub fn analyze(mesh: &Mesh) -> Result<DefectReport> {
    let copy = triangulated(mesh)?;
    let mut report = DefectReport::new();
    report.record_non_manifold(mesh, count_non_manifold_vertices(&copy));
    report.record_self_intersection(mesh, count_intersecting_faces(&copy));
    Ok(report)
}
