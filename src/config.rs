use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Force constants for a single integration step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub repulsion_strength: f32,
    pub spring_strength: f32,
    /// Edge length at which the spring force vanishes.
    pub rest_length: f32,
    pub gravity_strength: f32,
    /// Velocity multiplier applied every step, strictly between 0 and 1.
    pub damping: f32,
    /// Floor for pair distances before dividing.
    pub min_distance: f32,
    pub max_speed: f32,
    pub barnes_hut_theta: f32,
    /// Node count at which repulsion switches to the quadtree approximation.
    pub barnes_hut_min_nodes: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            repulsion_strength: 6_000.0,
            spring_strength: 0.06,
            rest_length: 110.0,
            gravity_strength: 0.012,
            damping: 0.6,
            min_distance: 1.0,
            max_speed: 40.0,
            barnes_hut_theta: 0.72,
            barnes_hut_min_nodes: 600,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub warmup_steps: usize,
    pub alpha_decay: f32,
    pub settle_alpha: f32,
    pub reheat_alpha: f32,
    pub alpha_min: f32,
    pub publish_threshold: f32,
    pub publish_min_interval_secs: f64,
    pub center: [f32; 2],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            warmup_steps: 120,
            alpha_decay: 0.97,
            settle_alpha: 0.1,
            reheat_alpha: 0.3,
            alpha_min: 0.005,
            publish_threshold: 0.1,
            publish_min_interval_secs: 1.0 / 30.0,
            center: [0.0, 0.0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    /// Screen pixels kept free around the graph by a view fit.
    pub fit_padding: f32,
    /// Pointer travel in pixels after which a press becomes a drag.
    pub click_slop: f32,
    pub node_hit_padding: f32,
    pub edge_hit_tolerance: f32,
    pub node_base_radius: f32,
    pub node_radius_per_degree: f32,
    pub node_max_radius: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.05,
            max_zoom: 6.0,
            zoom_in_factor: 1.1,
            zoom_out_factor: 1.0 / 1.1,
            fit_padding: 40.0,
            click_slop: 3.0,
            node_hit_padding: 3.0,
            edge_hit_tolerance: 5.0,
            node_base_radius: 5.0,
            node_radius_per_degree: 2.0,
            node_max_radius: 24.0,
        }
    }
}

impl ViewportConfig {
    /// Graph-space radius of a node with the given degree.
    pub fn node_radius(&self, degree: usize) -> f32 {
        (self.node_base_radius + self.node_radius_per_degree * (degree as f32).sqrt())
            .min(self.node_max_radius)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Most recent documents kept when the input is larger.
    pub max_documents: Option<usize>,
    pub simulation: SimulationConfig,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !(sim.damping > 0.0 && sim.damping < 1.0) {
            return Err(invalid("simulation.damping", "must be in (0, 1)"));
        }
        if !(sim.min_distance > 0.0) {
            return Err(invalid("simulation.min_distance", "must be positive"));
        }
        if !(sim.max_speed > 0.0) {
            return Err(invalid("simulation.max_speed", "must be positive"));
        }
        if sim.rest_length < 0.0 {
            return Err(invalid("simulation.rest_length", "must not be negative"));
        }
        for (field, value) in [
            ("simulation.repulsion_strength", sim.repulsion_strength),
            ("simulation.spring_strength", sim.spring_strength),
            ("simulation.gravity_strength", sim.gravity_strength),
            ("simulation.barnes_hut_theta", sim.barnes_hut_theta),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("{value} is not a finite non-negative number")));
            }
        }

        let layout = &self.layout;
        if !(layout.alpha_decay > 0.0 && layout.alpha_decay < 1.0) {
            return Err(invalid("layout.alpha_decay", "must be in (0, 1)"));
        }
        if !(layout.alpha_min > 0.0) {
            return Err(invalid("layout.alpha_min", "must be positive"));
        }
        if layout.settle_alpha < 0.0 || layout.reheat_alpha < 0.0 {
            return Err(invalid("layout.settle_alpha", "residual alphas must not be negative"));
        }
        if layout.publish_min_interval_secs < 0.0 {
            return Err(invalid("layout.publish_min_interval_secs", "must not be negative"));
        }

        let view = &self.viewport;
        if !(view.min_zoom > 0.0) || view.min_zoom > view.max_zoom {
            return Err(invalid(
                "viewport.min_zoom",
                format!("zoom range [{}, {}] is empty", view.min_zoom, view.max_zoom),
            ));
        }
        if !(view.zoom_in_factor > 1.0) {
            return Err(invalid("viewport.zoom_in_factor", "must be greater than 1"));
        }
        if !(view.zoom_out_factor > 0.0 && view.zoom_out_factor < 1.0) {
            return Err(invalid("viewport.zoom_out_factor", "must be in (0, 1)"));
        }

        if self.max_documents == Some(0) {
            return Err(invalid("max_documents", "must be at least 1"));
        }

        Ok(())
    }
}
