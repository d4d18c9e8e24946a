use std::collections::HashSet;

use docgraph::physics::{PhysicsScratch, step};
use docgraph::{
    DocumentRecord, GraphNode, LayoutConfig, LayoutController, LayoutPhase, LinkRecord, Schedule,
    SimulationConfig, Transform, build_graph, fit_transform,
};
use eframe::egui::{Vec2, pos2, vec2};
use proptest::prelude::*;

fn documents(count: usize) -> Vec<DocumentRecord> {
    (0..count)
        .map(|index| DocumentRecord {
            id: format!("doc-{index}"),
            title: format!("Document {index}"),
            updated_at: Some(index as i64),
        })
        .collect()
}

/// Link endpoints index past the document list to exercise synthetic targets
/// and unknown sources.
fn links(pairs: &[(usize, usize, u8)]) -> Vec<LinkRecord> {
    pairs
        .iter()
        .map(|&(from, to, id)| LinkRecord {
            id: format!("link-{id}"),
            from_id: Some(format!("doc-{from}")),
            to_id: Some(format!("doc-{to}")),
            link_text: None,
            target_title: None,
        })
        .collect()
}

fn graph_input() -> impl Strategy<Value = (usize, Vec<(usize, usize, u8)>)> {
    (0usize..16).prop_flat_map(|count| {
        (
            Just(count),
            proptest::collection::vec((0usize..20, 0usize..20, any::<u8>()), 0..40),
        )
    })
}

fn quick_layout() -> LayoutConfig {
    LayoutConfig {
        warmup_steps: 30,
        ..LayoutConfig::default()
    }
}

proptest! {
    #[test]
    fn built_edges_resolve_and_degrees_match((count, pairs) in graph_input()) {
        let build = build_graph(&documents(count), &links(&pairs), None);
        let graph = &build.graph;

        let mut ids = HashSet::new();
        let mut incident = vec![0usize; graph.node_count()];
        for edge in graph.edges() {
            prop_assert!(edge.source < graph.node_count());
            prop_assert!(edge.target < graph.node_count());
            prop_assert_ne!(edge.source, edge.target);
            prop_assert!(ids.insert(edge.id.clone()));
            incident[edge.source] += 1;
            incident[edge.target] += 1;
        }
        for (node, expected) in graph.nodes().iter().zip(&incident) {
            prop_assert_eq!(node.degree, *expected);
        }
        prop_assert!(graph.edge_count() + build.dropped_links <= pairs.len());
    }

    #[test]
    fn synthetic_nodes_are_exactly_the_unloaded_targets((count, pairs) in graph_input()) {
        let build = build_graph(&documents(count), &links(&pairs), None);
        for node in build.graph.nodes() {
            let loaded = node
                .id
                .strip_prefix("doc-")
                .and_then(|index| index.parse::<usize>().ok())
                .is_some_and(|index| index < count);
            prop_assert_eq!(node.synthetic, !loaded);
            if node.synthetic {
                prop_assert!(node.degree > 0);
            }
        }
    }

    #[test]
    fn cap_keeps_most_recent((count, pairs) in graph_input(), cap in 0usize..16) {
        let build = build_graph(&documents(count), &links(&pairs), Some(cap));
        prop_assert_eq!(build.was_capped, count > cap);
        let loaded: Vec<&GraphNode> = build.graph.nodes().iter().filter(|node| !node.synthetic).collect();
        prop_assert_eq!(loaded.len(), count.min(cap));
        for node in loaded {
            let index: usize = node.id["doc-".len()..].parse().unwrap();
            prop_assert!(index >= count.saturating_sub(cap));
        }
    }

    #[test]
    fn repulsion_separates_a_pair(
        ax in -200.0f32..200.0, ay in -200.0f32..200.0,
        dx in 1.0f32..80.0, dy in -80.0f32..80.0,
    ) {
        let config = SimulationConfig {
            spring_strength: 0.0,
            gravity_strength: 0.0,
            ..SimulationConfig::default()
        };
        let mut nodes = vec![
            GraphNode::new("a".to_owned(), "a".to_owned(), false),
            GraphNode::new("b".to_owned(), "b".to_owned(), false),
        ];
        nodes[0].position = vec2(ax, ay);
        nodes[1].position = vec2(ax + dx, ay + dy);
        let before = (nodes[0].position - nodes[1].position).length();

        step(&mut nodes, &[], Vec2::ZERO, 1.0, &config, &mut PhysicsScratch::default());

        prop_assert!((nodes[0].position - nodes[1].position).length() > before);
    }

    #[test]
    fn pinned_node_lands_exactly_on_its_pin(
        (count, pairs) in graph_input(),
        px in -500.0f32..500.0, py in -500.0f32..500.0,
    ) {
        let graph = build_graph(&documents(count.max(1)), &links(&pairs), None).graph;
        let mut controller = LayoutController::new(quick_layout(), SimulationConfig::default());
        controller.rebuild(graph);
        controller.pin(0, vec2(px, py));
        controller.tick(0.0);

        prop_assert_eq!(controller.graph().nodes()[0].position, vec2(px, py));
        prop_assert_eq!(controller.graph().nodes()[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn layout_is_deterministic((count, pairs) in graph_input()) {
        let run = || {
            let build = build_graph(&documents(count), &links(&pairs), None);
            let mut controller = LayoutController::new(quick_layout(), SimulationConfig::default());
            controller.rebuild(build.graph);
            for frame in 0..10 {
                controller.tick(frame as f64);
            }
            controller.published_positions().to_vec()
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn settling_always_stops((count, pairs) in graph_input()) {
        let build = build_graph(&documents(count), &links(&pairs), None);
        let mut controller = LayoutController::new(quick_layout(), SimulationConfig::default());
        controller.rebuild(build.graph);

        let mut frames = 0;
        while controller.tick(frames as f64 / 60.0).schedule == Schedule::Continue {
            frames += 1;
            prop_assert!(frames < 1_000);
        }
        prop_assert_eq!(controller.phase(), LayoutPhase::Idle);
        prop_assert!(!controller.needs_tick());
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed(
        x in -400.0f32..400.0, y in -400.0f32..400.0, k in 0.1f32..4.0,
        cx in 0.0f32..1200.0, cy in 0.0f32..900.0,
        zoom_in in any::<bool>(),
    ) {
        let transform = Transform { x, y, k };
        let cursor = pos2(cx, cy);
        let anchored = transform.to_graph(cursor);
        let factor = if zoom_in { 1.1 } else { 1.0 / 1.1 };

        let zoomed = transform.zoomed_at(cursor, factor, 0.05, 6.0);

        prop_assert!(zoomed.k >= 0.05 && zoomed.k <= 6.0);
        prop_assert!(zoomed.to_screen(anchored).distance(cursor) < 0.05);
    }

    #[test]
    fn fitted_view_contains_every_position(
        points in proptest::collection::vec((-2_000.0f32..2_000.0, -2_000.0f32..2_000.0), 1..30),
    ) {
        let positions: Vec<Vec2> = points.iter().map(|&(x, y)| vec2(x, y)).collect();
        let viewport = vec2(800.0, 600.0);
        let transform = fit_transform(&positions, viewport, 40.0, 0.001, 100.0);

        for position in &positions {
            let screen = transform.to_screen(*position);
            prop_assert!(screen.x >= 39.0 && screen.x <= 761.0, "x = {}", screen.x);
            prop_assert!(screen.y >= 39.0 && screen.y <= 561.0, "y = {}", screen.y);
        }
    }
}
