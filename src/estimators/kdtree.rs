//! Spatial-index sampling: kd-tree anchor counting.
//!
//! Builds a balanced kd-tree over the full set of template vectors, then
//! estimates the pair count from exact range-count queries around a sampled
//! subset of anchor templates. The per-anchor neighbor counts are exact, so
//! all estimator variance comes from anchor selection alone; with every
//! template used as an anchor the estimate equals the exact matcher's count.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::core::TemplateSet;
use crate::estimators::{CountSampler, Trial};

/// A node of the kd-tree arena.
///
/// Children are arena indices. Every node carries its subtree size and the
/// bounding box of all points below it, so a range count can take whole
/// subtrees without descending into them.
#[derive(Debug, Clone)]
struct Node {
    /// Template index of the point stored at this node.
    point: usize,
    left: Option<usize>,
    right: Option<usize>,
    /// Number of points in this subtree, including `point`.
    size: usize,
    /// Per-axis lower bounds of the subtree.
    min: Vec<f64>,
    /// Per-axis upper bounds of the subtree.
    max: Vec<f64>,
}

/// Balanced kd-tree over a template set.
///
/// Read-only after construction; concurrent queries share it immutably.
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<Node>,
    root: Option<usize>,
    dim: usize,
}

impl KdTree {
    /// Build by recursive median splits, cycling the split axis per level.
    pub fn build(templates: &TemplateSet<'_>) -> Self {
        let dim = templates.template_len();
        let count = templates.count();
        let mut indices: Vec<usize> = (0..count).collect();
        let mut nodes = Vec::with_capacity(count);
        let root = build_node(templates, &mut indices, 0, &mut nodes);
        Self { nodes, root, dim }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Exact count of templates within Chebyshev distance `r_abs` of the
    /// anchor template, the anchor itself included.
    pub fn count_within(&self, templates: &TemplateSet<'_>, anchor: usize, r_abs: f64) -> u64 {
        let mut low = Vec::with_capacity(self.dim);
        let mut high = Vec::with_capacity(self.dim);
        for d in 0..self.dim {
            let c = templates.coord(anchor, d);
            low.push(c - r_abs);
            high.push(c + r_abs);
        }
        self.count_in_box(&low, &high, templates)
    }

    /// Exact count of templates inside the closed box `[low, high]`.
    pub fn count_in_box(&self, low: &[f64], high: &[f64], templates: &TemplateSet<'_>) -> u64 {
        match self.root {
            Some(root) => self.count_node(root, low, high, templates),
            None => 0,
        }
    }

    fn count_node(
        &self,
        node_id: usize,
        low: &[f64],
        high: &[f64],
        templates: &TemplateSet<'_>,
    ) -> u64 {
        let node = &self.nodes[node_id];

        let mut contained = true;
        for d in 0..self.dim {
            if node.min[d] > high[d] || node.max[d] < low[d] {
                return 0;
            }
            if node.min[d] < low[d] || node.max[d] > high[d] {
                contained = false;
            }
        }
        if contained {
            return node.size as u64;
        }

        let mut count = 0;
        let inside = (0..self.dim)
            .all(|d| {
                let c = templates.coord(node.point, d);
                low[d] <= c && c <= high[d]
            });
        if inside {
            count += 1;
        }
        if let Some(left) = node.left {
            count += self.count_node(left, low, high, templates);
        }
        if let Some(right) = node.right {
            count += self.count_node(right, low, high, templates);
        }
        count
    }
}

fn build_node(
    templates: &TemplateSet<'_>,
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<Node>,
) -> Option<usize> {
    if indices.is_empty() {
        return None;
    }
    let dim = templates.template_len();
    let axis = depth % dim;
    let median = indices.len() / 2;
    indices.select_nth_unstable_by(median, |&a, &b| {
        templates
            .coord(a, axis)
            .partial_cmp(&templates.coord(b, axis))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let point = indices[median];

    let (left_slice, rest) = indices.split_at_mut(median);
    let right_slice = &mut rest[1..];
    let left = build_node(templates, left_slice, depth + 1, nodes);
    let right = build_node(templates, right_slice, depth + 1, nodes);

    let mut min: Vec<f64> = (0..dim).map(|d| templates.coord(point, d)).collect();
    let mut max = min.clone();
    for child in [left, right].into_iter().flatten() {
        let child = &nodes[child];
        for d in 0..dim {
            min[d] = min[d].min(child.min[d]);
            max[d] = max[d].max(child.max[d]);
        }
    }
    let size = 1
        + left.map_or(0, |id| nodes[id].size)
        + right.map_or(0, |id| nodes[id].size);

    nodes.push(Node {
        point,
        left,
        right,
        size,
        min,
        max,
    });
    Some(nodes.len() - 1)
}

/// kd-tree anchor-counting sampler.
///
/// Anchors are selected without replacement by a seeded policy, so trials
/// with different seeds are independent and `target_size` equal to the
/// template count selects every anchor exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialIndexSampler;

impl SpatialIndexSampler {
    pub fn new() -> Self {
        Self
    }

    fn run_trial(
        tree: &KdTree,
        templates: &TemplateSet<'_>,
        r_abs: f64,
        target_size: usize,
        trial: Trial,
    ) -> f64 {
        let count = templates.count();
        let target = target_size.min(count);
        if target == 0 {
            return 0.0;
        }
        let mut rng = StdRng::seed_from_u64(trial.seed);
        let anchors = rand::seq::index::sample(&mut rng, count, target);

        let mut neighbor_sum = 0u64;
        for anchor in anchors {
            // Exact per-anchor count; subtract the anchor's self-match.
            neighbor_sum += tree.count_within(templates, anchor, r_abs).saturating_sub(1);
        }
        // Each unordered pair is seen from both ends over a full sweep.
        neighbor_sum as f64 * count as f64 / (2.0 * target as f64)
    }
}

impl CountSampler for SpatialIndexSampler {
    fn estimate(
        &self,
        templates: &TemplateSet<'_>,
        r_abs: f64,
        target_size: usize,
        trial: Trial,
    ) -> f64 {
        let tree = KdTree::build(templates);
        Self::run_trial(&tree, templates, r_abs, target_size, trial)
    }

    fn estimate_trials(
        &self,
        templates: &TemplateSet<'_>,
        r_abs: f64,
        target_size: usize,
        trials: &[Trial],
        parallel: bool,
    ) -> Vec<f64> {
        // One build, shared immutably by every trial's queries.
        let tree = KdTree::build(templates);
        if parallel {
            trials
                .par_iter()
                .map(|&t| Self::run_trial(&tree, templates, r_abs, target_size, t))
                .collect()
        } else {
            trials
                .iter()
                .map(|&t| Self::run_trial(&tree, templates, r_abs, target_size, t))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Series;
    use crate::estimators::ExactMatcher;

    fn fixture(n: usize) -> Series {
        Series::new("s", (0..n).map(|i| ((i * 17 + 3) % 29) as f64).collect()).unwrap()
    }

    #[test]
    fn tree_indexes_every_template() {
        let series = fixture(100);
        let templates = series.templates(3).unwrap();
        let tree = KdTree::build(&templates);
        assert_eq!(tree.len(), templates.count());
    }

    #[test]
    fn range_count_agrees_with_brute_force() {
        let series = fixture(120);
        let templates = series.templates(2).unwrap();
        let tree = KdTree::build(&templates);
        for r_abs in [0.0, 1.0, 4.0, 30.0] {
            for anchor in [0, 7, templates.count() - 1] {
                let brute = (0..templates.count())
                    .filter(|&j| templates.within(anchor, j, r_abs))
                    .count() as u64;
                assert_eq!(
                    tree.count_within(&templates, anchor, r_abs),
                    brute,
                    "anchor {anchor}, r_abs {r_abs}"
                );
            }
        }
    }

    #[test]
    fn full_anchor_coverage_reproduces_exact_count() {
        let series = fixture(150);
        let templates = series.templates(2).unwrap();
        let exact = ExactMatcher::new().count_pairs(&templates, 5.0);
        let estimate = SpatialIndexSampler::new().estimate(
            &templates,
            5.0,
            templates.count(),
            Trial { index: 0, seed: 3 },
        );
        assert_eq!(estimate, exact as f64);
    }

    #[test]
    fn oversized_target_clamps_to_point_count() {
        let series = fixture(80);
        let templates = series.templates(2).unwrap();
        let exact = ExactMatcher::new().count_pairs(&templates, 5.0);
        let estimate = SpatialIndexSampler::new().estimate(
            &templates,
            5.0,
            templates.count() * 10,
            Trial { index: 0, seed: 3 },
        );
        assert_eq!(estimate, exact as f64);
    }

    #[test]
    fn trials_differ_by_anchor_seed() {
        let series = fixture(200);
        let templates = series.templates(2).unwrap();
        let sampler = SpatialIndexSampler::new();
        let estimates: Vec<f64> = (0..6)
            .map(|t| {
                sampler.estimate(&templates, 2.0, 20, Trial { index: t, seed: 100 + t as u64 })
            })
            .collect();
        let distinct = estimates
            .iter()
            .filter(|&&e| (e - estimates[0]).abs() > f64::EPSILON)
            .count();
        assert!(distinct > 0);
    }

    #[test]
    fn batch_trials_match_single_trials() {
        let series = fixture(150);
        let templates = series.templates(2).unwrap();
        let sampler = SpatialIndexSampler::new();
        let trials: Vec<Trial> = (0..4).map(|i| Trial { index: i, seed: i as u64 }).collect();
        let batch = sampler.estimate_trials(&templates, 3.0, 25, &trials, false);
        for (trial, expected) in trials.iter().zip(&batch) {
            assert_eq!(sampler.estimate(&templates, 3.0, 25, *trial), *expected);
        }
    }

    #[test]
    fn zero_tolerance_counts_duplicate_templates_only() {
        let series = Series::new("s", vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 9.0]).unwrap();
        let templates = series.templates(2).unwrap();
        let tree = KdTree::build(&templates);
        // Template [1,2] appears at indices 0, 2, 4 and [2,1] at 1, 3.
        assert_eq!(tree.count_within(&templates, 0, 0.0), 3);
        assert_eq!(tree.count_within(&templates, 1, 0.0), 2);
    }
}
