// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Defect detection and the two repair engines

pub mod checksum;
pub mod classify;
pub mod intersect;
pub mod islands;
pub mod non_manifold;
pub mod report;
pub mod selection;
pub mod self_intersection;
pub mod split;

pub use checksum::{checksum, MeshChecksum};
pub use classify::{
    classify_edges, count_non_manifold_vertices, select_non_manifold_vertices, EdgeKind, NonManifoldOptions,
    NonManifoldReport,
};
pub use intersect::{
    count_intersecting_faces, find_intersecting_faces, has_self_intersections, intersecting_face_pairs,
    select_intersecting_faces,
};
pub use islands::{face_islands, face_islands_within, group_overlapping_islands, vertex_islands};
pub use non_manifold::{repair_non_manifold, NonManifoldOutcome, NonManifoldParams, PipelineStats, RepairStatus};
pub use report::{analyze, CountSlot, DefectReport, DEFAULT_CACHE_TTL};
pub use selection::FaceSelection;
pub use self_intersection::{repair_self_intersections, IntersectionOutcome, IntersectionParams};
pub use split::{
    collect_faces_with_neighbors, split_face_if_sharp, split_intersections, split_sharp_faces, triangle_count,
    MAX_SPLIT_GROWTH, SHARP_ANGLE_DEGREES,
};
