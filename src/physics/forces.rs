use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

/// Direction used when two points coincide.
///
/// Antisymmetric in its arguments so both nodes of a pair are pushed
/// apart along the same line.
pub(super) fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let (low, high) = if from < to { (from, to) } else { (to, from) };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * std::f32::consts::TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if from < to { direction } else { -direction }
}

/// Repulsion felt by the node at `point_a` from the node at `point_b`.
pub(super) fn repulsion_between(
    point_a: Vec2,
    point_b: Vec2,
    pair: (usize, usize),
    strength: f32,
    min_distance: f32,
) -> Vec2 {
    let delta = point_a - point_b;
    let distance = delta.length();
    let direction = if distance > f32::EPSILON {
        delta / distance
    } else {
        fallback_direction(pair.0, pair.1)
    };
    let floored = distance.max(min_distance);
    direction * (strength / (floored * floored))
}

pub(super) fn accumulate_pairwise_repulsion(
    positions: &[Vec2],
    strength: f32,
    min_distance: f32,
    forces: &mut [Vec2],
) {
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let force = repulsion_between(positions[i], positions[j], (i, j), strength, min_distance);
            forces[i] += force;
            forces[j] -= force;
        }
    }
}

pub(super) struct BarnesHut {
    pub(super) strength: f32,
    pub(super) min_distance: f32,
    pub(super) theta: f32,
}

impl BarnesHut {
    pub(super) fn accumulate_for_node(
        &self,
        node: &QuadNode,
        index: usize,
        positions: &[Vec2],
        force: &mut Vec2,
    ) {
        if node.mass <= 0.0 {
            return;
        }

        let point = positions[index];

        if node.is_leaf() {
            for &other in &node.indices {
                if other == index {
                    continue;
                }
                *force += repulsion_between(
                    point,
                    positions[other],
                    (index, other),
                    self.strength,
                    self.min_distance,
                );
            }
            return;
        }

        let delta = point - node.center_of_mass;
        let distance = delta.length().max(self.min_distance);
        let can_approximate = !node.bounds.contains(point)
            && (node.bounds.side_length() / distance) < self.theta
            && node.mass > 1.0;

        if can_approximate {
            let direction = delta / delta.length().max(f32::EPSILON);
            *force += direction * (self.strength * node.mass / (distance * distance));
            return;
        }

        for child in node.children.iter().flatten() {
            self.accumulate_for_node(child, index, positions, force);
        }
    }
}
