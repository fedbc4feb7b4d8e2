// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Repair CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use polyframe_repair::cli::{collect_mesh_files, load_objects, save_objects, Reporter};
use polyframe_repair::{analyze, BatchRunner, RepairConfig};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "polyframe-repair")]
#[command(about = "Polyframe Repair - self-intersection and non-manifold mesh cleanup", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./polyframe-repair.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Process objects in parallel
    #[arg(long, global = true)]
    parallel: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct Inputs {
    /// Mesh files (.stl, .obj) or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for repaired meshes
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Overwrite the input files
    #[arg(long, conflicts_with = "output_dir")]
    in_place: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Count non-manifold vertices and intersecting faces
    Analyze {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Smooth away self-intersections
    CleanIntersections {
        #[command(flatten)]
        inputs: Inputs,

        /// Smoothing rounds before the shrink/fatten fallback
        #[arg(long)]
        max_attempts: Option<usize>,
    },

    /// Repair non-manifold geometry
    CleanNonManifold {
        #[command(flatten)]
        inputs: Inputs,

        /// Weld and dissolve distance
        #[arg(long)]
        merge_distance: Option<f64>,

        /// Delete vertex islands smaller than this
        #[arg(long)]
        island_threshold: Option<usize>,
    },

    /// Triangulate all faces
    Triangulate {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Split faces with a corner sharper than 15 degrees
    SplitSharp {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// List meshes that have a defect
    Filter {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Filter by non-manifold vertices instead of intersections
        #[arg(long)]
        non_manifold: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => RepairConfig::from_file(path)?,
        None => RepairConfig::load()?,
    };
    if cli.parallel {
        config.parallel = true;
    }

    match &cli.command {
        Commands::Analyze { inputs } => analyze_command(inputs, cli.json),
        Commands::CleanIntersections { inputs, max_attempts } => {
            if let Some(max_attempts) = *max_attempts {
                config.max_attempts = max_attempts;
            }
            clean_intersections_command(inputs, config, &cli)
        }
        Commands::CleanNonManifold {
            inputs,
            merge_distance,
            island_threshold,
        } => {
            if let Some(merge_distance) = *merge_distance {
                config.merge_distance = merge_distance;
            }
            if let Some(threshold) = *island_threshold {
                config.delete_island_threshold = threshold;
            }
            clean_non_manifold_command(inputs, config, &cli)
        }
        Commands::Triangulate { inputs } => {
            edit_command(inputs, config, &cli, "Triangulated", |runner, objects| {
                runner.triangulate(objects)
            })
        }
        Commands::SplitSharp { inputs } => {
            edit_command(inputs, config, &cli, "Split faces", |runner, objects| {
                runner.split_sharp(objects)
            })
        }
        Commands::Filter {
            inputs,
            non_manifold,
        } => filter_command(inputs, *non_manifold, config, cli.json),
        Commands::Version => {
            println!("Polyframe Repair v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn runner_for(config: RepairConfig, total: usize, cli: &Cli) -> BatchRunner {
    let runner = BatchRunner::new(config);
    if cli.json {
        runner
    } else {
        runner.with_progress(progress_bar(total))
    }
}

fn write_back(objects: &[polyframe_repair::MeshObject], files: &[PathBuf], inputs: &Inputs) -> Result<()> {
    if inputs.output_dir.is_none() && !inputs.in_place {
        return Ok(());
    }
    let written = save_objects(objects, files, inputs.output_dir.as_deref())?;
    tracing::info!(written, "meshes written");
    Ok(())
}

fn analyze_command(inputs: &[PathBuf], json: bool) -> Result<()> {
    let files = collect_mesh_files(inputs)?;
    let objects = load_objects(&files)?;
    let mut reports = Vec::with_capacity(objects.len());
    for object in &objects {
        let report = analyze(&object.mesh).with_context(|| format!("Cannot analyze {}", object.name))?;
        if !json {
            Reporter::report_analysis(
                &object.name,
                object.mesh.vertex_count(),
                object.mesh.face_count(),
                &report,
            );
        }
        reports.push((object.name.clone(), report));
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

fn clean_intersections_command(inputs: &Inputs, config: RepairConfig, cli: &Cli) -> Result<()> {
    config.validate().context("Invalid repair settings")?;
    let files = collect_mesh_files(&inputs.inputs)?;
    let mut objects = load_objects(&files)?;
    let runner = runner_for(config, objects.len(), cli);

    let start = Instant::now();
    let batch = runner.clean_intersections(&mut objects)?;
    let duration = start.elapsed();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        Reporter::report_intersections(&batch, duration);
    }
    write_back(&objects, &files, inputs)
}

fn clean_non_manifold_command(inputs: &Inputs, config: RepairConfig, cli: &Cli) -> Result<()> {
    config.validate().context("Invalid repair settings")?;
    let files = collect_mesh_files(&inputs.inputs)?;
    let mut objects = load_objects(&files)?;
    let runner = runner_for(config, objects.len(), cli);

    let start = Instant::now();
    let batch = runner.clean_non_manifold(&mut objects)?;
    let duration = start.elapsed();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        Reporter::report_non_manifold(&batch, duration);
    }
    write_back(&objects, &files, inputs)
}

fn edit_command(
    inputs: &Inputs,
    config: RepairConfig,
    cli: &Cli,
    label: &str,
    edit: impl Fn(&BatchRunner, &mut [polyframe_repair::MeshObject]) -> usize,
) -> Result<()> {
    let files = collect_mesh_files(&inputs.inputs)?;
    let mut objects = load_objects(&files)?;
    let runner = runner_for(config, objects.len(), cli);
    let count = edit(&runner, &mut objects);

    if cli.json {
        println!("{}", serde_json::json!({ "operation": label, "count": count }));
    } else {
        Reporter::report_info(&format!("{label}: {count}"));
    }
    write_back(&objects, &files, inputs)
}

fn filter_command(inputs: &[PathBuf], non_manifold: bool, config: RepairConfig, json: bool) -> Result<()> {
    let files = collect_mesh_files(inputs)?;
    let mut objects = load_objects(&files)?;
    let runner = BatchRunner::new(config);
    let (label, result) = if non_manifold {
        ("Non-manifold meshes", runner.filter_non_manifold(&mut objects))
    } else {
        ("Self-intersecting meshes", runner.filter_intersecting(&mut objects))
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        Reporter::report_filter(label, &result);
    }
    Ok(())
}
