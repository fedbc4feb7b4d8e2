// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Point3, Vector3};
use polyframe_repair::geometry::{Mesh, Primitive};
use polyframe_repair::repair::{checksum, count_non_manifold_vertices, find_intersecting_faces};
use polyframe_repair::{repair_non_manifold, NonManifoldParams};

fn overlapping_spheres(segments: u32) -> Mesh {
    let mut mesh = Primitive::sphere(Point3::origin(), 1.0, segments).to_mesh();
    mesh.merge(&Primitive::sphere(Point3::new(0.8, 0.0, 0.0), 1.0, segments).to_mesh());
    mesh.triangulate();
    mesh
}

fn bench_intersections(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersections");

    for segments in [16u32, 32, 64] {
        let mesh = overlapping_spheres(segments);
        group.bench_with_input(BenchmarkId::new("overlapping_spheres", segments), &mesh, |b, mesh| {
            b.iter(|| find_intersecting_faces(black_box(mesh)))
        });
    }

    group.finish();
}

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");

    let grid = Primitive::grid(128, 10.0).to_mesh();
    group.bench_function("grid_128", |b| b.iter(|| checksum(black_box(&grid))));

    let sphere = Primitive::sphere(Point3::origin(), 5.0, 64).to_mesh();
    group.bench_function("sphere_64", |b| b.iter(|| checksum(black_box(&sphere))));

    group.finish();
}

fn bench_non_manifold(c: &mut Criterion) {
    let mut group = c.benchmark_group("non_manifold");

    let sphere = Primitive::sphere(Point3::origin(), 5.0, 48).to_mesh();
    group.bench_function("count_sphere_48", |b| {
        b.iter(|| count_non_manifold_vertices(black_box(&sphere)))
    });

    let mut broken = Primitive::cube_at(Point3::origin(), Vector3::new(2.0, 2.0, 2.0)).to_mesh();
    broken.faces.pop();
    broken.add_vertex(Point3::new(5.0, 5.0, 5.0));
    group.bench_function("repair_open_box", |b| {
        b.iter(|| {
            let mut mesh = broken.clone();
            repair_non_manifold(black_box(&mut mesh), &NonManifoldParams::default())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_intersections, bench_checksum, bench_non_manifold);
criterion_main!(benches);
