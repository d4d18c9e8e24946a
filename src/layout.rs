use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, trace};

use crate::config::{LayoutConfig, SimulationConfig};
use crate::graph::DocGraph;
use crate::physics::{PhysicsScratch, step};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
    /// Synchronous warm-up of a fresh graph.
    Building,
    Settling,
    Idle,
}

/// Whether the host should call [`LayoutController::tick`] again next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    Continue,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    pub published: bool,
    pub schedule: Schedule,
}

/// Owns the graph and drives the simulation across frames.
pub struct LayoutController {
    config: LayoutConfig,
    simulation: SimulationConfig,
    graph: DocGraph,
    scratch: PhysicsScratch,
    alpha: f32,
    phase: LayoutPhase,
    generation: u64,
    published: Vec<Vec2>,
    last_publish_secs: Option<f64>,
    pending_publish: bool,
    settle_ticks: u64,
}

impl LayoutController {
    pub fn new(config: LayoutConfig, simulation: SimulationConfig) -> Self {
        Self {
            config,
            simulation,
            graph: DocGraph::default(),
            scratch: PhysicsScratch::default(),
            alpha: 0.0,
            phase: LayoutPhase::Idle,
            generation: 0,
            published: Vec::new(),
            last_publish_secs: None,
            pending_publish: false,
            settle_ticks: 0,
        }
    }

    fn center(&self) -> Vec2 {
        vec2(self.config.center[0], self.config.center[1])
    }

    /// Replaces the graph, seeds it on a circle and runs the warm-up steps.
    ///
    /// Any loop still running for the previous graph is cancelled first, so
    /// old and new node arrays are never mixed.
    pub fn rebuild(&mut self, graph: DocGraph) -> u64 {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        self.phase = LayoutPhase::Building;
        self.graph = graph;
        self.seed_circle();

        let center = self.center();
        let mut alpha = 1.0_f32;
        for _ in 0..self.config.warmup_steps {
            step(
                &mut self.graph.nodes,
                &self.graph.edges,
                center,
                alpha,
                &self.simulation,
                &mut self.scratch,
            );
            alpha *= self.config.alpha_decay;
        }

        self.publish(None);
        self.settle_ticks = 0;
        if self.graph.is_empty() {
            self.phase = LayoutPhase::Idle;
        } else {
            self.alpha = self.config.settle_alpha;
            self.phase = LayoutPhase::Settling;
        }

        debug!(
            generation = self.generation,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            warmup_steps = self.config.warmup_steps,
            "layout rebuilt"
        );
        self.generation
    }

    fn seed_circle(&mut self) {
        let center = self.center();
        let count = self.graph.nodes.len();
        let radius = if count > 1 {
            self.simulation.rest_length * (count as f32).sqrt() * 0.5
        } else {
            0.0
        };

        for (index, node) in self.graph.nodes.iter_mut().enumerate() {
            let angle = (index as f32 / count as f32) * TAU;
            node.position = center + vec2(angle.cos(), angle.sin()) * radius;
            node.velocity = Vec2::ZERO;
            node.pin = None;
        }
    }

    fn publish(&mut self, now_secs: Option<f64>) {
        self.published.clear();
        self.published
            .extend(self.graph.nodes.iter().map(|node| node.position));
        self.last_publish_secs = now_secs;
        self.pending_publish = false;
    }

    /// Runs at most one simulation step.
    pub fn tick(&mut self, now_secs: f64) -> TickOutcome {
        if self.phase != LayoutPhase::Settling {
            return TickOutcome {
                published: false,
                schedule: Schedule::Stop,
            };
        }

        let center = self.center();
        let displacement = step(
            &mut self.graph.nodes,
            &self.graph.edges,
            center,
            self.alpha,
            &self.simulation,
            &mut self.scratch,
        );
        self.alpha *= self.config.alpha_decay;
        self.settle_ticks += 1;

        if displacement > self.config.publish_threshold {
            self.pending_publish = true;
        }

        let interval_elapsed = self.last_publish_secs.is_none_or(|last| {
            now_secs - last >= self.config.publish_min_interval_secs
        });
        let settled = self.alpha < self.config.alpha_min;

        let mut published = false;
        if self.pending_publish && (interval_elapsed || settled) {
            self.publish(Some(now_secs));
            trace!(displacement, alpha = self.alpha, "published node positions");
            published = true;
        }

        if settled {
            self.phase = LayoutPhase::Idle;
            debug!(ticks = self.settle_ticks, "layout settled");
            return TickOutcome {
                published,
                schedule: Schedule::Stop,
            };
        }

        TickOutcome {
            published,
            schedule: Schedule::Continue,
        }
    }

    /// Restarts settling with a moderate alpha, without another warm-up.
    pub fn reheat(&mut self) {
        if self.graph.is_empty() {
            return;
        }
        if self.phase != LayoutPhase::Settling {
            debug!(generation = self.generation, "layout reheated");
            self.settle_ticks = 0;
        }
        self.alpha = self.alpha.max(self.config.reheat_alpha);
        self.phase = LayoutPhase::Settling;
    }

    pub fn pin(&mut self, index: usize, position: Vec2) {
        let Some(node) = self.graph.nodes.get_mut(index) else {
            return;
        };
        node.pin = Some(position);
        self.reheat();
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.graph.nodes.get_mut(index) {
            node.pin = None;
        }
    }

    /// Stops the loop; later ticks do nothing until the next reheat or rebuild.
    pub fn cancel(&mut self) {
        self.phase = LayoutPhase::Idle;
        self.pending_publish = false;
    }

    pub fn set_simulation_config(&mut self, simulation: SimulationConfig) {
        self.simulation = simulation;
        self.reheat();
    }

    pub fn graph(&self) -> &DocGraph {
        &self.graph
    }

    /// Positions as of the last publication, indexed like the graph's nodes.
    pub fn published_positions(&self) -> &[Vec2] {
        &self.published
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn phase(&self) -> LayoutPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn needs_tick(&self) -> bool {
        self.phase == LayoutPhase::Settling
    }
}
