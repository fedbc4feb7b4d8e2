// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Connected components over faces and vertices
//!
//! All traversals use an explicit stack. Islands come out in order of their
//! lowest member, each island's members in visit order.

use crate::geometry::{BoundingBox, Mesh, MeshTopology, BVH};

/// Face islands over the whole mesh, joined through shared edges
pub fn face_islands(mesh: &Mesh) -> Vec<Vec<usize>> {
    let all: Vec<usize> = (0..mesh.face_count()).collect();
    face_islands_within(mesh, &all)
}

/// Face islands restricted to `faces`; only members are traversed
pub fn face_islands_within(mesh: &Mesh, faces: &[usize]) -> Vec<Vec<usize>> {
    let topology = MeshTopology::build(mesh);
    let mut member = vec![false; mesh.face_count()];
    for &face in faces {
        member[face] = true;
    }
    let mut visited = vec![false; mesh.face_count()];
    let mut islands = Vec::new();

    let mut seeds: Vec<usize> = faces.to_vec();
    seeds.sort_unstable();
    for seed in seeds {
        if visited[seed] {
            continue;
        }
        let mut island = Vec::new();
        let mut stack = vec![seed];
        while let Some(current) = stack.pop() {
            if visited[current] {
                continue;
            }
            visited[current] = true;
            island.push(current);

            for (a, b) in mesh.faces[current].edges() {
                stack.extend(
                    topology
                        .link_faces(a, b)
                        .iter()
                        .copied()
                        .filter(|&linked| member[linked] && !visited[linked]),
                );
            }
        }
        islands.push(island);
    }
    islands
}

/// Vertex islands joined through edges; isolated vertices form their own island
pub fn vertex_islands(mesh: &Mesh) -> Vec<Vec<usize>> {
    let topology = MeshTopology::build(mesh);
    let mut visited = vec![false; mesh.vertex_count()];
    let mut islands = Vec::new();

    for seed in 0..mesh.vertex_count() {
        if visited[seed] {
            continue;
        }
        let mut island = Vec::new();
        let mut stack = vec![seed];
        while let Some(current) = stack.pop() {
            if visited[current] {
                continue;
            }
            visited[current] = true;
            island.push(current);
            stack.extend(
                topology
                    .vertex_neighbors(current)
                    .iter()
                    .copied()
                    .filter(|&n| !visited[n]),
            );
        }
        islands.push(island);
    }
    islands
}

/// Bounding box around every vertex of the given faces
pub fn faces_bounding_box(mesh: &Mesh, faces: &[usize]) -> BoundingBox {
    faces
        .iter()
        .fold(BoundingBox::empty(), |acc, &face| acc.union(&mesh.face_bounding_box(face)))
}

/// Cluster boxes transitively by overlap (touching counts).
///
/// Returns groups of indices into `boxes`.
pub fn group_overlapping_boxes(boxes: &[BoundingBox]) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); boxes.len()];
    let items = boxes
        .iter()
        .enumerate()
        .filter(|(_, bbox)| !bbox.is_empty())
        .map(|(idx, bbox)| (idx, *bbox))
        .collect();
    for (a, b) in BVH::build(items).overlapping_pairs() {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    let mut visited = vec![false; boxes.len()];
    let mut groups = Vec::new();
    for start in 0..boxes.len() {
        if visited[start] {
            continue;
        }
        let mut group = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if visited[current] {
                continue;
            }
            visited[current] = true;
            group.push(current);
            stack.extend(adjacency[current].iter().copied().filter(|&n| !visited[n]));
        }
        groups.push(group);
    }
    groups
}

/// Merge face islands whose bounding boxes overlap into repair groups
pub fn group_overlapping_islands(mesh: &Mesh, islands: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let boxes: Vec<BoundingBox> = islands
        .iter()
        .map(|island| faces_bounding_box(mesh, island))
        .collect();
    group_overlapping_boxes(&boxes)
        .into_iter()
        .map(|group| {
            let mut faces: Vec<usize> = group
                .into_iter()
                .flat_map(|idx| islands[idx].iter().copied())
                .collect();
            faces.sort_unstable();
            faces
        })
        .collect()
}
