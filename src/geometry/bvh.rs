// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) for spatial acceleration
//! Used to find candidate face pairs for self-intersection tests

use super::BoundingBox;

const MAX_DEPTH: usize = 32;
const MIN_ITEMS: usize = 4;

/// BVH node
#[derive(Debug, Clone)]
pub struct BVHNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BVHNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BVHNode>>,
    /// Items with their own boxes (only for leaf nodes)
    pub items: Vec<(usize, BoundingBox)>,
}

impl BVHNode {
    fn leaf(bbox: BoundingBox, items: Vec<(usize, BoundingBox)>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            items,
        }
    }

    fn internal(bbox: BoundingBox, left: Box<BVHNode>, right: Box<BVHNode>) -> Self {
        Self {
            bbox,
            left: Some(left),
            right: Some(right),
            items: Vec::new(),
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy over indexed boxes (faces, islands)
pub struct BVH {
    root: BVHNode,
    len: usize,
}

impl BVH {
    /// Build BVH from (index, bbox) pairs
    pub fn build(items: Vec<(usize, BoundingBox)>) -> Self {
        let len = items.len();
        if items.is_empty() {
            return Self {
                root: BVHNode::leaf(BoundingBox::empty(), Vec::new()),
                len,
            };
        }

        let root = Self::build_recursive(items, 0);
        Self { root, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn build_recursive(mut items: Vec<(usize, BoundingBox)>, depth: usize) -> BVHNode {
        let bbox = Self::compute_union_bbox(&items);

        if items.len() <= MIN_ITEMS || depth >= MAX_DEPTH {
            return BVHNode::leaf(bbox, items);
        }

        // Median split along the longest axis
        let size = bbox.size();
        let axis = if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        };
        items.sort_by(|(_, a), (_, b)| a.center()[axis].total_cmp(&b.center()[axis]));

        let right_items = items.split_off(items.len() / 2);
        let left = Box::new(Self::build_recursive(items, depth + 1));
        let right = Box::new(Self::build_recursive(right_items, depth + 1));

        BVHNode::internal(bbox, left, right)
    }

    fn compute_union_bbox(items: &[(usize, BoundingBox)]) -> BoundingBox {
        items
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, bbox)| acc.union(bbox))
    }

    /// All unordered pairs of distinct items whose boxes overlap, as
    /// `(lower, higher)` index pairs sorted ascending.
    ///
    /// This is the tree-against-itself query; it never compares subtrees
    /// whose bounds are disjoint.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        Self::self_recursive(&self.root, &mut pairs);
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    fn self_recursive(node: &BVHNode, pairs: &mut Vec<(usize, usize)>) {
        match (&node.left, &node.right) {
            (Some(left), Some(right)) => {
                Self::self_recursive(left, pairs);
                Self::self_recursive(right, pairs);
                Self::cross_recursive(left, right, pairs);
            }
            _ => {
                for (i, (a, box_a)) in node.items.iter().enumerate() {
                    for (b, box_b) in &node.items[i + 1..] {
                        if a != b && box_a.intersects(box_b) {
                            pairs.push(ordered(*a, *b));
                        }
                    }
                }
            }
        }
    }

    fn cross_recursive(a: &BVHNode, b: &BVHNode, pairs: &mut Vec<(usize, usize)>) {
        if !a.bbox.intersects(&b.bbox) {
            return;
        }

        match (a.is_leaf(), b.is_leaf()) {
            (true, true) => {
                for (ia, box_a) in &a.items {
                    for (ib, box_b) in &b.items {
                        if ia != ib && box_a.intersects(box_b) {
                            pairs.push(ordered(*ia, *ib));
                        }
                    }
                }
            }
            (false, _) => {
                for child in [&a.left, &a.right].into_iter().flatten() {
                    Self::cross_recursive(child, b, pairs);
                }
            }
            (true, false) => {
                for child in [&b.left, &b.right].into_iter().flatten() {
                    Self::cross_recursive(a, child, pairs);
                }
            }
        }
    }

    /// Get root node (for testing)
    #[cfg(test)]
    pub fn root(&self) -> &BVHNode {
        &self.root
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use rand::{Rng, SeedableRng};

    fn random_boxes(count: usize, seed: u64) -> Vec<(usize, BoundingBox)> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        (0..count)
            .map(|idx| {
                let min = Point3::new(
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..10.0),
                );
                let max = min + nalgebra::Vector3::new(
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                );
                (idx, BoundingBox::new(min, max))
            })
            .collect()
    }

    #[test]
    fn test_bvh_build() {
        let bvh = BVH::build(random_boxes(100, 7));
        assert_eq!(bvh.len(), 100);
        assert!(!bvh.root().is_leaf());
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = BVH::build(Vec::new());
        assert!(bvh.is_empty());
        assert!(bvh.overlapping_pairs().is_empty());
    }

    #[test]
    fn test_self_query_matches_brute_force() {
        let boxes = random_boxes(300, 42);
        let mut expected = Vec::new();
        for i in 0..boxes.len() {
            for j in i + 1..boxes.len() {
                if boxes[i].1.intersects(&boxes[j].1) {
                    expected.push((i, j));
                }
            }
        }
        let bvh = BVH::build(boxes);
        assert_eq!(bvh.overlapping_pairs(), expected);
    }
}
