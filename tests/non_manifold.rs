// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Non-manifold classification and repair

use anyhow::Result;
use nalgebra::{Point3, Vector3};
use polyframe_repair::geometry::{Mesh, Primitive};
use polyframe_repair::repair::non_manifold::MAX_MANIFOLD_ROUNDS;
use polyframe_repair::repair::{
    count_non_manifold_vertices, face_islands, vertex_islands, NonManifoldReport,
};
use polyframe_repair::{repair_non_manifold, repair_self_intersections, IntersectionParams, NonManifoldParams, RepairStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_cube_scenario() -> Result<()> {
    let mut mesh = Primitive::cube(1.0).to_mesh();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.face_count(), 6);

    let outcome = repair_non_manifold(&mut mesh, &NonManifoldParams::default())?;
    assert!(outcome.clean);
    assert!(!outcome.changed);
    assert_eq!(outcome.status(), RepairStatus::Fine);
    Ok(())
}

#[test]
fn test_floating_vertex_scenario() -> Result<()> {
    let mut mesh = Primitive::cube(1.0).to_mesh();
    let floating = mesh.add_vertex(Point3::new(3.0, 3.0, 3.0));
    assert_eq!(floating, 8);

    let outcome = repair_non_manifold(&mut mesh, &NonManifoldParams::default())?;
    assert!(outcome.changed);
    assert!(outcome.clean);
    assert_eq!(mesh.vertex_count(), 8);
    assert!(mesh.isolated_vertices().iter().all(|&isolated| !isolated));
    Ok(())
}

#[test]
fn test_clean_mesh_is_not_worsened() -> Result<()> {
    let sphere = Primitive::sphere(Point3::origin(), 2.0, 24).to_mesh();
    assert_eq!(count_non_manifold_vertices(&sphere), 0);

    let mut mesh = sphere.clone();
    let outcome = repair_non_manifold(&mut mesh, &NonManifoldParams::default())?;
    assert!(!outcome.changed);
    assert!(!outcome.worse);
    assert_eq!(mesh, sphere);

    let outcome = repair_self_intersections(&mut mesh, &IntersectionParams::default())?;
    assert!(!outcome.changed);
    assert_eq!(mesh, sphere);
    Ok(())
}

#[test]
fn test_welding_touching_cubes_is_reported_worse() -> Result<()> {
    // The cubes run along a common edge 0.0005 apart; welding joins the two
    // edges into one with four faces, which the pipeline cannot undo
    let mut mesh = Primitive::cube(1.0).to_mesh();
    mesh.merge(&Primitive::cube_at(Point3::new(1.0005, 1.0005, 0.0), Vector3::new(1.0, 1.0, 1.0)).to_mesh());
    assert_eq!(count_non_manifold_vertices(&mesh), 0);

    let outcome = repair_non_manifold(&mut mesh, &NonManifoldParams::default())?;
    assert_eq!(outcome.before, 0);
    assert_eq!(outcome.after, 2);
    assert!(outcome.worse);
    assert!(outcome.changed);
    assert_eq!(outcome.status(), RepairStatus::Failed);
    assert_eq!(outcome.stats.welded, 2);

    // The worse result is committed and visible, not rolled back
    assert_eq!(count_non_manifold_vertices(&mesh), 2);
    assert_eq!(NonManifoldReport::build(&mesh).multi_face_edges.len(), 1);
    Ok(())
}

#[test]
fn test_small_islands_are_removed() -> Result<()> {
    let mut mesh = Primitive::sphere(Point3::origin(), 2.0, 24).to_mesh();
    let sphere_vertices = mesh.vertex_count();
    mesh.merge(&Primitive::cube_at(Point3::new(5.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5)).to_mesh());

    let params = NonManifoldParams::default();
    let outcome = repair_non_manifold(&mut mesh, &params)?;
    assert!(outcome.changed);
    assert!(outcome.clean);
    assert_eq!(outcome.stats.island_vertices, 8);
    assert_eq!(mesh.vertex_count(), sphere_vertices);

    let islands = vertex_islands(&mesh);
    let largest = islands.iter().map(Vec::len).max().unwrap_or(0);
    for island in &islands {
        assert!(island.len() >= params.delete_island_threshold || island.len() == largest);
    }
    Ok(())
}

#[test]
fn test_only_island_survives_below_threshold() -> Result<()> {
    let mut mesh = Primitive::cube(1.0).to_mesh();
    let outcome = repair_non_manifold(&mut mesh, &NonManifoldParams::default())?;
    assert_eq!(outcome.stats.island_vertices, 0);
    assert_eq!(mesh.vertex_count(), 8);
    Ok(())
}

#[test]
fn test_open_grid_terminates() -> Result<()> {
    // A flat sheet can be capped but never made watertight by deletion alone
    let mut mesh = Primitive::grid(4, 1.0).to_mesh();
    let outcome = repair_non_manifold(&mut mesh, &NonManifoldParams::default())?;
    assert!(outcome.stats.manifold_rounds <= MAX_MANIFOLD_ROUNDS);
    assert_eq!(outcome.clean, count_non_manifold_vertices(&mesh) == 0);
    assert_eq!(outcome.after, count_non_manifold_vertices(&mesh));
    Ok(())
}

#[test]
fn test_wire_edge_is_deleted() -> Result<()> {
    let mut mesh = Primitive::cube(1.0).to_mesh();
    let tip = mesh.add_vertex(Point3::new(2.0, 2.0, 2.0));
    mesh.add_wire_edge(6, tip);
    assert!(!NonManifoldReport::build(&mesh).wire_edges.is_empty());

    let outcome = repair_non_manifold(&mut mesh, &NonManifoldParams::default())?;
    assert!(outcome.clean);
    assert_eq!(outcome.stats.loose_edges, 1);
    assert!(mesh.wire_edges.is_empty());
    assert_eq!(mesh.vertex_count(), 8);
    Ok(())
}

#[test]
fn test_island_partition() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..5 {
        let mut mesh = Mesh::new();
        for _ in 0..rng.gen_range(1..6) {
            let origin = Point3::new(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0));
            let part = if rng.gen_bool(0.5) {
                Primitive::cube_at(origin, Vector3::new(1.0, 2.0, 3.0)).to_mesh()
            } else {
                Primitive::sphere(origin, 1.0, rng.gen_range(6..16)).to_mesh()
            };
            mesh.merge(&part);
        }
        for _ in 0..rng.gen_range(0..3) {
            mesh.add_vertex(Point3::new(rng.gen_range(-1.0..1.0), 0.0, 0.0));
        }

        let mut seen = vec![0usize; mesh.face_count()];
        for island in face_islands(&mesh) {
            for face in island {
                seen[face] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));

        let mut seen = vec![0usize; mesh.vertex_count()];
        for island in vertex_islands(&mesh) {
            for vertex in island {
                seen[vertex] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }
}
