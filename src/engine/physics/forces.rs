use crate::engine::geometry::{Point, point};
use crate::util::stable_pair_direction;

use super::quadtree::QuadNode;

const COINCIDENT_DISTANCE_SQ: f64 = 1e-18;

#[derive(Clone, Copy)]
pub(super) struct RepulsionParams {
    pub(super) strength: f64,
    pub(super) max_distance_sq: f64,
    pub(super) min_distance_sq: f64,
    pub(super) seed: u64,
}

/// Direction from `b` towards `a` for two nodes sitting on top of each other.
/// Anti-symmetric in its arguments so both nodes get pushed apart.
pub(super) fn tie_break_direction(seed: u64, a: (u64, usize), b: (u64, usize)) -> Point {
    if a <= b {
        let (x, y) = stable_pair_direction(seed, a.0, b.0);
        point(x, y)
    } else {
        -tie_break_direction(seed, b, a)
    }
}

fn repulsion_between(
    from: usize,
    to: usize,
    positions: &[Point],
    keys: &[u64],
    params: RepulsionParams,
) -> Point {
    let delta = positions[from] - positions[to];
    let distance_sq = delta.length_sq();
    if distance_sq > params.max_distance_sq {
        return Point::ZERO;
    }

    let direction = if distance_sq > COINCIDENT_DISTANCE_SQ {
        delta / distance_sq.sqrt()
    } else {
        tie_break_direction(params.seed, (keys[from], from), (keys[to], to))
    };
    direction * (params.strength / distance_sq.max(params.min_distance_sq))
}

fn apply_pair(
    from: usize,
    to: usize,
    positions: &[Point],
    keys: &[u64],
    params: RepulsionParams,
    forces: &mut [Point],
) {
    let push = repulsion_between(from, to, positions, keys, params);
    forces[from] += push;
    forces[to] -= push;
}

/// Visits every unordered pair of points held under `node_a` and `node_b`
/// whose boxes are within the cutoff, accumulating inverse-square repulsion.
pub(super) fn accumulate_repulsion_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Point],
    keys: &[u64],
    params: RepulsionParams,
    forces: &mut [Point],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    apply_pair(from, to, positions, keys, params, forces);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    apply_pair(from, to, positions, keys, params, forces);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_deref() else {
                continue;
            };

            accumulate_repulsion_pairs(child_a, child_a, true, positions, keys, params, forces);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_deref() else {
                    continue;
                };
                accumulate_repulsion_pairs(
                    child_a, child_b, false, positions, keys, params, forces,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_repulsion_pairs(child, node_b, false, positions, keys, params, forces);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_repulsion_pairs(node_a, child, false, positions, keys, params, forces);
        }
    }
}
