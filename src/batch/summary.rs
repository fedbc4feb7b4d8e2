// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! User-facing batch summaries

use super::runner::{IntersectionBatch, NonManifoldBatch};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub severity: Severity,
    pub message: String,
}

impl BatchSummary {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Mention refused objects; they are never an info-level outcome
    fn with_rejected(self, rejected: usize) -> Self {
        if rejected == 0 {
            return self;
        }
        Self {
            severity: self.severity.max(Severity::Warning),
            message: format!("{} ({rejected} rejected)", self.message),
        }
    }
}

impl NonManifoldBatch {
    pub fn summary(&self) -> BatchSummary {
        if self.cancelled {
            return BatchSummary::new(Severity::Warning, "Non-manifold cleaning cancelled before completion.");
        }
        let total = self.results.len() + self.rejected.len();
        if total == 0 {
            return BatchSummary::new(Severity::Info, "No mesh objects selected.");
        }

        // `fixed` counts only objects this run made clean; a fixed object
        // outranks a worse one
        let failed = self.failed + self.unresolved;
        let summary = if failed == 0 && self.fixed > 0 && self.worse == 0 {
            BatchSummary::new(Severity::Info, format!("Fixed all on {} objects", self.fixed))
        } else if self.fixed > 0 || (failed > 0 && self.worse == 0) {
            BatchSummary::new(
                Severity::Warning,
                format!("Cleaned {total} objects, {} clean", self.fixed),
            )
        } else if self.worse > 0 {
            BatchSummary::new(
                Severity::Error,
                format!("Cleaned {total} objects, but {} is worse", self.worse),
            )
        } else {
            BatchSummary::new(Severity::Info, format!("All {total} objects were already manifold"))
        };
        summary.with_rejected(self.rejected.len())
    }
}

impl IntersectionBatch {
    pub fn summary(&self) -> BatchSummary {
        if self.cancelled {
            return BatchSummary::new(Severity::Warning, "Intersection cleaning cancelled before completion.");
        }
        let severity = if self.remaining_intersections {
            Severity::Warning
        } else {
            Severity::Info
        };
        if self.changed_objects.is_empty() {
            let message = if self.remaining_intersections {
                "Intersections remain but nothing could be changed."
            } else {
                "No intersecting faces were found."
            };
            return BatchSummary::new(severity, message).with_rejected(self.rejected.len());
        }
        BatchSummary::new(
            severity,
            format!("Smoothed intersections on: {}", self.changed_objects.join(", ")),
        )
        .with_rejected(self.rejected.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ObjectResult;

    #[test]
    fn test_non_manifold_messages() {
        let mut batch = NonManifoldBatch::default();
        assert_eq!(batch.summary().message, "No mesh objects selected.");

        batch.results = vec![Default::default(); 3];
        batch.fine = 3;
        assert_eq!(batch.summary().severity, Severity::Info);

        batch.fine = 1;
        batch.fixed = 2;
        assert_eq!(batch.summary().message, "Fixed all on 2 objects");

        batch.fixed = 1;
        batch.failed = 1;
        let summary = batch.summary();
        assert_eq!(summary.severity, Severity::Warning);
        assert_eq!(summary.message, "Cleaned 3 objects, 1 clean");

        // A fixed object keeps the warning even when another got worse
        batch.worse = 1;
        assert_eq!(batch.summary().severity, Severity::Warning);
        assert_eq!(batch.summary().message, "Cleaned 3 objects, 1 clean");

        batch.fine = 2;
        batch.fixed = 0;
        let summary = batch.summary();
        assert_eq!(summary.severity, Severity::Error);
        assert_eq!(summary.message, "Cleaned 3 objects, but 1 is worse");

        batch.rejected = vec![ObjectResult {
            name: "broken".into(),
            outcome: "face 0 repeats a vertex".into(),
        }];
        assert_eq!(batch.summary().message, "Cleaned 4 objects, but 1 is worse (1 rejected)");

        batch = NonManifoldBatch {
            results: vec![Default::default(); 2],
            fine: 2,
            rejected: batch.rejected.clone(),
            ..Default::default()
        };
        let summary = batch.summary();
        assert_eq!(summary.severity, Severity::Warning);
        assert_eq!(summary.message, "All 3 objects were already manifold (1 rejected)");

        batch.cancelled = true;
        assert_eq!(batch.summary().severity, Severity::Warning);

        batch.cancelled = true;
        assert_eq!(batch.summary().severity, Severity::Warning);
    }

    #[test]
    fn test_intersection_messages() {
        let mut batch = IntersectionBatch::default();
        assert_eq!(batch.summary().message, "No intersecting faces were found.");
        batch.changed_objects = vec!["a".into(), "b".into()];
        batch.remaining_intersections = true;
        let summary = batch.summary();
        assert_eq!(summary.severity, Severity::Warning);
        assert_eq!(summary.message, "Smoothed intersections on: a, b");
    }
}
