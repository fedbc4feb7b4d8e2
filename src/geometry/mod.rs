// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and spatial queries

mod bbox;
pub mod bvh;
mod mesh;
mod primitives;
pub mod topology;
pub mod triangle_intersection;
pub mod triangulation;

pub use bbox::BoundingBox;
pub use bvh::BVH;
pub use mesh::{edge_key, Face, Mesh, Vertex};
pub use primitives::Primitive;
pub use topology::MeshTopology;
