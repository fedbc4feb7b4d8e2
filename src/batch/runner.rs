// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch driver
//!
//! Objects are independent: each runs its engine on its own mesh, and the
//! cancel token is checked before an object starts, never during. With
//! `parallel` set the objects are spread over the rayon pool.

use super::{CancelToken, MeshObject};
use crate::config::RepairConfig;
use crate::error::Result;
use crate::repair::{
    repair_non_manifold, repair_self_intersections, split::split_visible_sharp_faces, IntersectionOutcome,
    NonManifoldOutcome, RepairStatus, SHARP_ANGLE_DEGREES,
};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Outcome for one named object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectResult<T> {
    pub name: String,
    pub outcome: T,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntersectionBatch {
    pub results: Vec<ObjectResult<IntersectionOutcome>>,
    /// Names of objects whose mesh changed
    pub changed_objects: Vec<String>,
    /// Any processed object still intersects itself
    pub remaining_intersections: bool,
    /// Objects the engine refused, with the reason
    pub rejected: Vec<ObjectResult<String>>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NonManifoldBatch {
    pub results: Vec<ObjectResult<NonManifoldOutcome>>,
    pub fine: usize,
    pub fixed: usize,
    pub failed: usize,
    pub unresolved: usize,
    pub worse: usize,
    pub rejected: Vec<ObjectResult<String>>,
    pub cancelled: bool,
}

/// Object names split by whether they have the defect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterResult {
    pub clean: Vec<String>,
    pub defective: Vec<String>,
    /// Objects that could not be counted, with the reason
    pub rejected: Vec<ObjectResult<String>>,
}

pub struct BatchRunner {
    config: RepairConfig,
    cancel: CancelToken,
    progress: Option<ProgressBar>,
}

impl BatchRunner {
    pub fn new(config: RepairConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Apply `job` to each object not reached by a cancellation.
    ///
    /// Slots stay `None` for objects that were skipped.
    fn run_each<T, F>(&self, objects: &mut [MeshObject], job: F) -> Vec<Option<T>>
    where
        T: Send,
        F: Fn(&mut MeshObject) -> T + Sync + Send,
    {
        let step = |object: &mut MeshObject| {
            if self.cancel.is_cancelled() {
                return None;
            }
            if let Some(ref pb) = self.progress {
                pb.set_message(object.name.clone());
            }
            let result = job(object);
            if let Some(ref pb) = self.progress {
                pb.inc(1);
            }
            Some(result)
        };

        if self.config.parallel {
            objects.par_iter_mut().map(step).collect()
        } else {
            objects.iter_mut().map(step).collect()
        }
    }

    /// Run the self-intersection engine on every object
    pub fn clean_intersections(&self, objects: &mut [MeshObject]) -> Result<IntersectionBatch> {
        let params = self.config.intersection_params();
        params.validate()?;

        let outcomes = self.run_each(objects, |object| {
            let outcome = repair_self_intersections(&mut object.mesh, &params);
            if let Ok(ref outcome) = outcome {
                object
                    .report
                    .record_self_intersection(&object.mesh, outcome.remaining);
            }
            outcome
        });

        let mut batch = IntersectionBatch::default();
        for (object, outcome) in objects.iter().zip(outcomes) {
            match outcome {
                None => batch.cancelled = true,
                Some(Err(err)) => {
                    warn!(object = %object.name, %err, "intersection repair rejected");
                    batch.rejected.push(ObjectResult {
                        name: object.name.clone(),
                        outcome: err.to_string(),
                    });
                }
                Some(Ok(outcome)) => {
                    if outcome.changed {
                        batch.changed_objects.push(object.name.clone());
                    }
                    batch.remaining_intersections |= !outcome.clean;
                    batch.results.push(ObjectResult {
                        name: object.name.clone(),
                        outcome,
                    });
                }
            }
        }
        info!(
            processed = batch.results.len(),
            changed = batch.changed_objects.len(),
            rejected = batch.rejected.len(),
            cancelled = batch.cancelled,
            "intersection batch finished"
        );
        Ok(batch)
    }

    /// Run the non-manifold engine on every object
    pub fn clean_non_manifold(&self, objects: &mut [MeshObject]) -> Result<NonManifoldBatch> {
        let params = self.config.non_manifold_params();
        params.validate()?;

        let outcomes = self.run_each(objects, |object| {
            let outcome = repair_non_manifold(&mut object.mesh, &params);
            if let Ok(ref outcome) = outcome {
                object.report.record_non_manifold(&object.mesh, outcome.after);
            }
            outcome
        });

        let mut batch = NonManifoldBatch::default();
        for (object, outcome) in objects.iter().zip(outcomes) {
            match outcome {
                None => batch.cancelled = true,
                Some(Err(err)) => {
                    warn!(object = %object.name, %err, "non-manifold repair rejected");
                    batch.rejected.push(ObjectResult {
                        name: object.name.clone(),
                        outcome: err.to_string(),
                    });
                }
                Some(Ok(outcome)) => {
                    match outcome.status() {
                        RepairStatus::Fine => batch.fine += 1,
                        RepairStatus::Fixed => batch.fixed += 1,
                        RepairStatus::Failed => batch.failed += 1,
                        RepairStatus::Unresolved => batch.unresolved += 1,
                    }
                    if outcome.worse {
                        batch.worse += 1;
                    }
                    batch.results.push(ObjectResult {
                        name: object.name.clone(),
                        outcome,
                    });
                }
            }
        }
        info!(
            fine = batch.fine,
            fixed = batch.fixed,
            failed = batch.failed,
            worse = batch.worse,
            rejected = batch.rejected.len(),
            cancelled = batch.cancelled,
            "non-manifold batch finished"
        );
        Ok(batch)
    }

    /// Partition objects by self-intersection, reusing valid cached counts
    pub fn filter_intersecting(&self, objects: &mut [MeshObject]) -> FilterResult {
        let ttl = self.config.cache_ttl();
        let counts = self.run_each(objects, |object| {
            object.report.refresh_self_intersection(&object.mesh, ttl)
        });
        partition(objects, counts)
    }

    /// Partition objects by non-manifold vertices, reusing valid cached counts
    pub fn filter_non_manifold(&self, objects: &mut [MeshObject]) -> FilterResult {
        let ttl = self.config.cache_ttl();
        let counts = self.run_each(objects, |object| {
            object.report.refresh_non_manifold(&object.mesh, ttl)
        });
        partition(objects, counts)
    }

    /// Triangulate every object; returns how many gained faces
    pub fn triangulate(&self, objects: &mut [MeshObject]) -> usize {
        self.run_each(objects, |object| object.mesh.triangulate() > 0)
            .into_iter()
            .filter(|gained| *gained == Some(true))
            .count()
    }

    /// Split sharp visible faces of every object; returns faces split
    pub fn split_sharp(&self, objects: &mut [MeshObject]) -> usize {
        self.run_each(objects, |object| {
            split_visible_sharp_faces(&mut object.mesh, SHARP_ANGLE_DEGREES)
        })
        .into_iter()
        .flatten()
        .sum()
    }
}

fn partition(objects: &[MeshObject], counts: Vec<Option<Result<usize>>>) -> FilterResult {
    let mut result = FilterResult::default();
    for (object, count) in objects.iter().zip(counts) {
        match count {
            Some(Ok(0)) => result.clean.push(object.name.clone()),
            Some(Ok(_)) => result.defective.push(object.name.clone()),
            Some(Err(err)) => {
                warn!(object = %object.name, %err, "defect count rejected");
                result.rejected.push(ObjectResult {
                    name: object.name.clone(),
                    outcome: err.to_string(),
                });
            }
            None => {}
        }
    }
    result
}
