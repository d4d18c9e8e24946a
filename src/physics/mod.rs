mod forces;
mod quadtree;

use eframe::egui::Vec2;

use crate::config::SimulationConfig;
use crate::graph::{GraphEdge, GraphNode};
use forces::{BarnesHut, accumulate_pairwise_repulsion, fallback_direction};
use quadtree::QuadNode;

/// Buffers reused across steps so a settled loop does not allocate.
#[derive(Debug, Default)]
pub struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    previous: Vec<Vec2>,
}

/// Advances the simulation by one integration step and returns the largest
/// distance any node moved.
pub fn step(
    nodes: &mut [GraphNode],
    edges: &[GraphEdge],
    center: Vec2,
    alpha: f32,
    config: &SimulationConfig,
    scratch: &mut PhysicsScratch,
) -> f32 {
    let node_count = nodes.len();
    if node_count == 0 {
        return 0.0;
    }

    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.previous.clear();
    scratch.positions.clear();
    for node in nodes.iter_mut() {
        scratch.previous.push(node.position);
        if let Some(pin) = node.pin {
            node.position = pin;
            node.velocity = Vec2::ZERO;
        }
        scratch.positions.push(node.position);
    }

    let forces = &mut scratch.forces;
    let positions = &scratch.positions;
    let repulsion = config.repulsion_strength * alpha;
    let spring = config.spring_strength * alpha;
    let gravity = config.gravity_strength * alpha;

    if repulsion > 0.0 && node_count > 1 {
        let approximate =
            node_count >= config.barnes_hut_min_nodes && config.barnes_hut_theta > 0.0;
        let tree = if approximate {
            QuadNode::build(positions)
        } else {
            None
        };
        match tree {
            Some(tree) => {
                let barnes_hut = BarnesHut {
                    strength: repulsion,
                    min_distance: config.min_distance,
                    theta: config.barnes_hut_theta,
                };
                for (index, force) in forces.iter_mut().enumerate() {
                    barnes_hut.accumulate_for_node(&tree, index, positions, force);
                }
            }
            None => {
                accumulate_pairwise_repulsion(positions, repulsion, config.min_distance, forces)
            }
        }
    }

    for edge in edges {
        let (source, target) = (edge.source, edge.target);
        if source >= node_count || target >= node_count || source == target {
            continue;
        }

        let delta = positions[target] - positions[source];
        let distance = delta.length();
        let direction = if distance > f32::EPSILON {
            delta / distance
        } else {
            fallback_direction(source, target)
        };
        let pull = direction * (spring * (distance - config.rest_length));
        forces[source] += pull;
        forces[target] -= pull;
    }

    for (force, position) in forces.iter_mut().zip(positions) {
        *force += (center - *position) * gravity;
    }

    let mut max_displacement = 0.0_f32;
    for (index, node) in nodes.iter_mut().enumerate() {
        if node.pin.is_none() {
            let mut velocity = (node.velocity + forces[index]) * config.damping;
            let speed = velocity.length();
            if speed > config.max_speed {
                velocity *= config.max_speed / speed;
            }
            node.velocity = velocity;
            node.position += velocity;
        }

        max_displacement = max_displacement.max((node.position - scratch.previous[index]).length());
    }

    max_displacement
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn node(id: &str, x: f32, y: f32) -> GraphNode {
        let mut node = GraphNode::new(id.to_owned(), id.to_owned(), false);
        node.position = vec2(x, y);
        node
    }

    fn edge(source: usize, target: usize) -> GraphEdge {
        GraphEdge {
            id: format!("{source}-{target}"),
            source,
            target,
            label: None,
        }
    }

    fn repulsion_only() -> SimulationConfig {
        SimulationConfig {
            spring_strength: 0.0,
            gravity_strength: 0.0,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn empty_graph_is_a_no_op() {
        let mut scratch = PhysicsScratch::default();
        let moved = step(&mut [], &[], Vec2::ZERO, 1.0, &SimulationConfig::default(), &mut scratch);
        assert_eq!(moved, 0.0);
    }

    #[test]
    fn repulsion_pushes_pair_apart_along_their_line() {
        let mut nodes = [node("a", -5.0, 0.0), node("b", 5.0, 0.0)];
        let mut scratch = PhysicsScratch::default();
        let moved = step(&mut nodes, &[], Vec2::ZERO, 1.0, &repulsion_only(), &mut scratch);

        assert!(moved > 0.0);
        assert!(nodes[0].position.x < -5.0);
        assert!(nodes[1].position.x > 5.0);
        assert_eq!(nodes[0].position.y, 0.0);
        assert_eq!(nodes[1].position.y, 0.0);
    }

    #[test]
    fn coincident_nodes_separate_without_nan() {
        let mut nodes = [node("a", 3.0, 3.0), node("b", 3.0, 3.0)];
        let mut scratch = PhysicsScratch::default();
        step(&mut nodes, &[], Vec2::ZERO, 1.0, &repulsion_only(), &mut scratch);

        assert!(nodes.iter().all(|node| node.position.is_finite()));
        assert!((nodes[0].position - nodes[1].position).length() > 0.0);
    }

    #[test]
    fn spring_pulls_long_edges_and_pushes_short_ones() {
        let config = SimulationConfig {
            repulsion_strength: 0.0,
            gravity_strength: 0.0,
            rest_length: 100.0,
            ..SimulationConfig::default()
        };
        let mut scratch = PhysicsScratch::default();

        let mut long = [node("a", 0.0, 0.0), node("b", 300.0, 0.0)];
        step(&mut long, &[edge(0, 1)], Vec2::ZERO, 1.0, &config, &mut scratch);
        assert!(long[1].position.x - long[0].position.x < 300.0);

        let mut short = [node("a", 0.0, 0.0), node("b", 20.0, 0.0)];
        step(&mut short, &[edge(0, 1)], Vec2::ZERO, 1.0, &config, &mut scratch);
        assert!(short[1].position.x - short[0].position.x > 20.0);
    }

    #[test]
    fn gravity_pulls_toward_center() {
        let config = SimulationConfig {
            repulsion_strength: 0.0,
            ..SimulationConfig::default()
        };
        let mut nodes = [node("a", 200.0, -100.0)];
        let mut scratch = PhysicsScratch::default();
        step(&mut nodes, &[], vec2(10.0, 10.0), 1.0, &config, &mut scratch);

        assert!(nodes[0].position.x < 200.0);
        assert!(nodes[0].position.y > -100.0);
    }

    #[test]
    fn pinned_node_lands_exactly_on_pin() {
        let mut nodes = [node("a", 0.0, 0.0), node("b", 40.0, 0.0)];
        nodes[0].velocity = vec2(9.0, 9.0);
        nodes[0].pin = Some(vec2(50.0, 50.0));
        let mut scratch = PhysicsScratch::default();
        let moved = step(
            &mut nodes,
            &[edge(0, 1)],
            Vec2::ZERO,
            1.0,
            &SimulationConfig::default(),
            &mut scratch,
        );

        assert_eq!(nodes[0].position, vec2(50.0, 50.0));
        assert_eq!(nodes[0].velocity, Vec2::ZERO);
        assert!(moved >= vec2(50.0, 50.0).length());
    }

    #[test]
    fn step_is_deterministic() {
        let seed = (0..12)
            .map(|index| node(&index.to_string(), (index * 7 % 5) as f32, (index * 3) as f32))
            .collect::<Vec<_>>();
        let edges = [edge(0, 1), edge(1, 2), edge(4, 9), edge(11, 0)];
        let config = SimulationConfig::default();

        let mut first = seed.clone();
        let mut second = seed;
        let moved_first = step(&mut first, &edges, Vec2::ZERO, 0.8, &config, &mut PhysicsScratch::default());
        let moved_second = step(&mut second, &edges, Vec2::ZERO, 0.8, &config, &mut PhysicsScratch::default());

        assert_eq!(moved_first, moved_second);
        assert_eq!(first, second);
    }

    #[test]
    fn speed_is_clamped() {
        let config = SimulationConfig {
            max_speed: 2.0,
            ..repulsion_only()
        };
        let mut nodes = [node("a", 0.0, 0.0), node("b", 0.5, 0.0)];
        step(&mut nodes, &[], Vec2::ZERO, 1.0, &config, &mut PhysicsScratch::default());
        assert!(nodes[0].velocity.length() <= 2.0 + 1e-5);
    }

    #[test]
    fn large_graphs_use_the_approximation_and_stay_finite() {
        let config = SimulationConfig {
            barnes_hut_min_nodes: 50,
            ..SimulationConfig::default()
        };
        let mut nodes = (0..120)
            .map(|index| node(&index.to_string(), (index % 11) as f32 * 9.0, (index / 11) as f32 * 9.0))
            .collect::<Vec<_>>();
        let edges = (1..120).map(|index| edge(index - 1, index)).collect::<Vec<_>>();
        let mut scratch = PhysicsScratch::default();
        for _ in 0..20 {
            step(&mut nodes, &edges, Vec2::ZERO, 1.0, &config, &mut scratch);
        }
        assert!(nodes.iter().all(|node| node.position.is_finite()));
    }
}
