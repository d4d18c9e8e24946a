//! Force-directed layout for graphs of linked documents.
//!
//! [`graph::build_graph`] turns document and link records into a flat node
//! arena, [`physics::step`] advances the simulation, [`layout::LayoutController`]
//! runs warm-up and the throttled settling loop, and [`engine::GraphEngine`]
//! adds viewport, pointer interaction and filtering for an interactive host.

pub mod config;
pub mod engine;
pub mod graph;
pub mod layout;
pub mod physics;
pub mod viewport;

pub use config::{ConfigError, EngineConfig, LayoutConfig, SimulationConfig, ViewportConfig};
pub use engine::{GraphEngine, GraphEvent, Hit, RebuildSummary, ViewFilter};
pub use graph::{DocGraph, DocumentRecord, GraphBuild, GraphEdge, GraphNode, LinkRecord, build_graph};
pub use layout::{LayoutController, LayoutPhase, Schedule, TickOutcome};
pub use viewport::{Transform, ZoomDirection, fit_transform};
