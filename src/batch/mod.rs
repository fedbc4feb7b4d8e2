// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch processing over named mesh objects

mod runner;
mod summary;

pub use runner::{BatchRunner, FilterResult, IntersectionBatch, NonManifoldBatch, ObjectResult};
pub use summary::{BatchSummary, Severity};

use crate::geometry::Mesh;
use crate::repair::DefectReport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A mesh with its name and cached defect counts
#[derive(Debug, Clone)]
pub struct MeshObject {
    pub name: String,
    pub mesh: Mesh,
    pub report: DefectReport,
}

impl MeshObject {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            report: DefectReport::new(),
        }
    }
}

/// Shared cancellation flag, observed between objects
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
