//! Host-facing engine: graph build, layout loop, viewport and filters behind
//! one command surface, with results reported as queued [`GraphEvent`]s.

use eframe::egui::{Pos2, Vec2};
use tracing::info;

use crate::config::{EngineConfig, SimulationConfig};
use crate::graph::{DocGraph, DocumentRecord, LinkRecord, build_graph};
use crate::layout::{LayoutController, LayoutPhase, Schedule};
use crate::viewport::{Transform, fit_transform};

mod filter;
mod interaction;

pub use filter::ViewFilter;
pub use interaction::Hit;
use filter::Visibility;
use interaction::Gesture;

#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
    /// New positions are available from [`GraphEngine::published_positions`].
    NodesUpdated { generation: u64 },
    NodeClicked(String),
    EdgeClicked { edge_id: String, anchor: Pos2 },
    ViewChanged(Transform),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebuildSummary {
    pub generation: u64,
    pub nodes: usize,
    pub edges: usize,
    pub synthetic: usize,
    pub dropped_links: usize,
    pub was_capped: bool,
}

pub struct GraphEngine {
    config: EngineConfig,
    layout: LayoutController,
    transform: Transform,
    viewport_size: Vec2,
    fit_pending: bool,
    gesture: Gesture,
    selected_edge: Option<usize>,
    filter: ViewFilter,
    visibility: Visibility,
    was_capped: bool,
    events: Vec<GraphEvent>,
}

impl GraphEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            layout: LayoutController::new(config.layout, config.simulation),
            config,
            transform: Transform::IDENTITY,
            viewport_size: Vec2::ZERO,
            fit_pending: true,
            gesture: Gesture::Idle,
            selected_edge: None,
            filter: ViewFilter::default(),
            visibility: Visibility::default(),
            was_capped: false,
            events: Vec::new(),
        }
    }

    /// Replaces the whole graph with one built from fresh host data.
    pub fn rebuild(&mut self, documents: &[DocumentRecord], links: &[LinkRecord]) -> RebuildSummary {
        let build = build_graph(documents, links, self.config.max_documents);
        self.was_capped = build.was_capped;
        self.gesture = Gesture::Idle;
        self.selected_edge = None;

        let generation = self.layout.rebuild(build.graph);
        self.refresh_visibility();
        self.events.push(GraphEvent::NodesUpdated { generation });
        if self.viewport_size.x > 0.0 && self.viewport_size.y > 0.0 {
            self.reset_view();
        } else {
            self.fit_pending = true;
        }

        let graph = self.layout.graph();
        let summary = RebuildSummary {
            generation,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            synthetic: graph.synthetic_count(),
            dropped_links: build.dropped_links,
            was_capped: build.was_capped,
        };
        info!(
            nodes = summary.nodes,
            edges = summary.edges,
            synthetic = summary.synthetic,
            was_capped = summary.was_capped,
            "document graph ready"
        );
        summary
    }

    /// Advances the settling loop by one step; call once per rendered frame.
    pub fn tick(&mut self, now_secs: f64) -> Schedule {
        let outcome = self.layout.tick(now_secs);
        if outcome.published {
            self.events.push(GraphEvent::NodesUpdated {
                generation: self.layout.generation(),
            });
        }
        outcome.schedule
    }

    /// Stops the settling loop, e.g. when the host view goes away.
    pub fn cancel(&mut self) {
        self.layout.cancel();
        self.gesture = Gesture::Idle;
    }

    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.viewport_size = size;
        if self.fit_pending && size.x > 0.0 && size.y > 0.0 {
            self.reset_view();
        }
    }

    /// Fits all current node positions into the viewport.
    pub fn reset_view(&mut self) {
        let view = &self.config.viewport;
        let transform = fit_transform(
            self.layout.published_positions(),
            self.viewport_size,
            view.fit_padding,
            view.min_zoom,
            view.max_zoom,
        );
        self.fit_pending = false;
        self.set_transform(transform);
    }

    pub(crate) fn set_transform(&mut self, transform: Transform) {
        if transform != self.transform {
            self.transform = transform;
            self.events.push(GraphEvent::ViewChanged(transform));
        }
    }

    pub fn set_simulation_config(&mut self, simulation: SimulationConfig) {
        self.config.simulation = simulation;
        self.layout.set_simulation_config(simulation);
    }

    pub fn take_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &DocGraph {
        self.layout.graph()
    }

    pub fn published_positions(&self) -> &[Vec2] {
        self.layout.published_positions()
    }

    /// Screen position of a node as last published.
    pub fn node_screen_pos(&self, index: usize) -> Option<Pos2> {
        self.published_positions()
            .get(index)
            .map(|position| self.transform.to_screen(*position))
    }

    /// Graph-space radius of a node, from its degree.
    pub fn node_radius(&self, index: usize) -> f32 {
        let degree = self.graph().node(index).map_or(0, |node| node.degree);
        self.config.viewport.node_radius(degree)
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    pub fn phase(&self) -> LayoutPhase {
        self.layout.phase()
    }

    pub fn alpha(&self) -> f32 {
        self.layout.alpha()
    }

    pub fn needs_tick(&self) -> bool {
        self.layout.needs_tick()
    }

    pub fn was_capped(&self) -> bool {
        self.was_capped
    }
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
