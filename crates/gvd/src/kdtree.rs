//! Append-only 2D kd-tree for the nearest point-site face lookup.
//!
//! Nodes are never removed (point-site faces live as long as the diagram), so
//! the tree is a plain insertion-ordered binary tree alternating the split
//! axis per level. No rebalancing: insertion order of typical inputs is
//! random enough, and the lookup only seeds the delete-tree search.

use crate::hedi::FaceId;
use crate::point::Point;

const NONE: u32 = u32::MAX;

#[derive(Clone, Debug)]
struct Node {
    p: Point,
    face: FaceId,
    child: [u32; 2],
}

#[derive(Clone, Debug, Default)]
pub struct KdTree {
    nodes: Vec<Node>,
}

impl KdTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, p: Point, face: FaceId) {
        let idx = self.nodes.len() as u32;
        self.nodes.push(Node { p, face, child: [NONE, NONE] });
        if idx == 0 {
            return;
        }
        let mut u = 0usize;
        let mut axis = 0usize;
        loop {
            let side = (p[axis] >= self.nodes[u].p[axis]) as usize;
            match self.nodes[u].child[side] {
                NONE => {
                    self.nodes[u].child[side] = idx;
                    return;
                }
                c => {
                    u = c as usize;
                    axis ^= 1;
                }
            }
        }
    }

    /// Face of the stored point closest to `p`, `None` on an empty tree.
    pub fn nearest(&self, p: &Point) -> Option<FaceId> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best = (f64::INFINITY, 0usize);
        // sorted input degenerates the tree into a chain, so walk with an explicit stack;
        // entries are (node, split axis, squared distance from p to the node's cell)
        let mut stack = vec![(0u32, 0usize, 0.0f64)];
        while let Some((u, axis, bound)) = stack.pop() {
            if bound >= best.0 {
                continue;
            }
            let node = &self.nodes[u as usize];
            let d_sq = (node.p - p).norm_squared();
            if d_sq < best.0 {
                best = (d_sq, u as usize);
            }
            let d_ax = p[axis] - node.p[axis];
            let near = (d_ax >= 0.0) as usize;
            let far = node.child[near ^ 1];
            if far != NONE {
                stack.push((far, axis ^ 1, bound.max(d_ax * d_ax)));
            }
            if node.child[near] != NONE {
                stack.push((node.child[near], axis ^ 1, bound));
            }
        }
        Some(self.nodes[best.1].face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn empty_tree_has_no_nearest() {
        assert_eq!(KdTree::new().nearest(&vector![0.0, 0.0]), None);
    }

    #[test]
    fn nearest_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        let pts: Vec<Point> =
            (0..200).map(|_| vector![rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)]).collect();
        let mut tree = KdTree::new();
        for (i, p) in pts.iter().enumerate() {
            tree.insert(*p, FaceId(i));
        }
        assert_eq!(tree.len(), 200);
        for _ in 0..100 {
            let q = vector![rng.gen_range(-1.2..1.2), rng.gen_range(-1.2..1.2)];
            let brute = pts
                .iter()
                .enumerate()
                .min_by(|a, b| (a.1 - q).norm().total_cmp(&(b.1 - q).norm()))
                .map(|(i, _)| FaceId(i));
            let found = tree.nearest(&q);
            let dist = |f: Option<FaceId>| f.map(|f| (pts[f.0] - q).norm());
            assert_eq!(dist(found), dist(brute));
        }
    }

    #[test]
    fn sorted_insertion_keeps_lookup_working() {
        let n = 20_000;
        let mut tree = KdTree::new();
        for i in 0..n {
            let x = -0.9 + 1.8 * i as f64 / n as f64;
            tree.insert(vector![x, 0.25], FaceId(i));
        }
        assert_eq!(tree.len(), n);
        assert_eq!(tree.nearest(&vector![0.9, 0.25]), Some(FaceId(n - 1)));
        assert_eq!(tree.nearest(&vector![-1.0, 0.0]), Some(FaceId(0)));
        let i = 12_345;
        let x = -0.9 + 1.8 * i as f64 / n as f64;
        assert_eq!(tree.nearest(&vector![x + 1e-6, 0.3]), Some(FaceId(i)));
    }
}
