// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::batch::{BatchSummary, FilterResult, IntersectionBatch, NonManifoldBatch, ObjectResult, Severity};
use crate::repair::{DefectReport, RepairStatus};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    fn rule() {
        println!("{}", "━".repeat(80).bright_black());
    }

    fn print_rejected(rejected: &[ObjectResult<String>]) {
        for result in rejected {
            println!("  {:<11}{} {}", "rejected".red().bold(), result.name.cyan(), result.outcome.bright_black());
        }
    }

    /// Report cached defect counts of one object
    pub fn report_analysis(name: &str, vertices: usize, faces: usize, report: &DefectReport) {
        let non_manifold = report.non_manifold.map(|s| s.count).unwrap_or(0);
        let intersecting = report.self_intersection.map(|s| s.count).unwrap_or(0);
        let checksum = report
            .non_manifold
            .map(|s| s.checksum.to_hex())
            .unwrap_or_default();

        println!("\n{} {}", "Mesh:".bold(), name.cyan());
        println!(
            "  {} {}  {} {}",
            "Vertices:".bright_black(),
            vertices.to_string().cyan(),
            "Faces:".bright_black(),
            faces.to_string().cyan()
        );
        Self::print_count("Non-manifold vertices", non_manifold);
        Self::print_count("Intersecting faces", intersecting);
        println!("  {} {}", "Checksum:".bright_black(), checksum.bright_black());
    }

    /// Per-object lines of a non-manifold batch
    pub fn report_non_manifold(batch: &NonManifoldBatch, duration: Duration) {
        Self::rule();
        println!("{}", "Non-manifold cleanup".bold());
        Self::rule();
        for result in &batch.results {
            let outcome = &result.outcome;
            let status = match outcome.status() {
                RepairStatus::Fine => "fine".green(),
                RepairStatus::Fixed => "fixed".green().bold(),
                RepairStatus::Failed => "failed".red(),
                RepairStatus::Unresolved => "unresolved".yellow(),
            };
            let worse = if outcome.worse { " worse".red().bold() } else { "".normal() };
            println!(
                "  {:<11}{} {} {}",
                status,
                worse,
                result.name.cyan(),
                format!("({} -> {})", outcome.before, outcome.after).bright_black()
            );
        }
        Self::print_rejected(&batch.rejected);
        println!(
            "\n  {} {}  {} {}  {} {}  {} {}",
            "Fine:".bright_black(),
            batch.fine,
            "Fixed:".bright_black(),
            batch.fixed,
            "Failed:".bright_black(),
            batch.failed + batch.unresolved,
            "Worse:".bright_black(),
            batch.worse
        );
        println!("  {} {}", "Time:".bright_black(), Self::format_duration(duration).yellow());
        Self::report_summary(&batch.summary());
    }

    /// Per-object lines of an intersection batch
    pub fn report_intersections(batch: &IntersectionBatch, duration: Duration) {
        Self::rule();
        println!("{}", "Self-intersection cleanup".bold());
        Self::rule();
        for result in &batch.results {
            let outcome = &result.outcome;
            let status = if outcome.clean { "clean".green() } else { "remaining".red() };
            println!(
                "  {:<10} {} {}",
                status,
                result.name.cyan(),
                format!(
                    "(splits {}, smooth {}, fallback {}/{}, left {})",
                    outcome.split_rounds,
                    outcome.smooth_rounds,
                    outcome.fallback_attempts,
                    outcome.fallback_groups,
                    outcome.remaining
                )
                .bright_black()
            );
        }
        Self::print_rejected(&batch.rejected);
        println!("  {} {}", "Time:".bright_black(), Self::format_duration(duration).yellow());
        Self::report_summary(&batch.summary());
    }

    pub fn report_filter(label: &str, result: &FilterResult) {
        println!("{} {}", label.bold(), format!("({} affected)", result.defective.len()).bright_black());
        for name in &result.defective {
            println!("  {} {}", "✗".red(), name);
        }
        for name in &result.clean {
            println!("  {} {}", "✓".green(), name.bright_black());
        }
        Self::print_rejected(&result.rejected);
    }

    pub fn report_summary(summary: &BatchSummary) {
        match summary.severity {
            Severity::Info => Self::success(&summary.message),
            Severity::Warning => Self::report_warning(&summary.message),
            Severity::Error => Self::report_error(&summary.message),
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_count(name: &str, count: usize) {
        let value = if count == 0 {
            count.to_string().green()
        } else {
            count.to_string().red()
        };
        println!("  {} {}", format!("{}:", name).bright_black(), value);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
