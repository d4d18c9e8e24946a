use docgraph::{EngineConfig, GraphEngine, LayoutPhase, SimulationConfig};
use eframe::egui::{self, Align, Color32, Context, Layout, RichText, Ui};
use tracing::info;

use crate::dataset::{Dataset, DatasetSource};

use super::ViewModel;

impl ViewModel {
    pub(super) fn new(dataset: Dataset, config: EngineConfig) -> Self {
        let mut engine = GraphEngine::new(config);
        let summary = engine.rebuild(&dataset.documents, &dataset.links);

        Self {
            engine,
            dataset,
            summary,
            min_degree: 0,
            focus_query: String::new(),
            simulation: config.simulation,
            opened: None,
            status: None,
        }
    }

    /// Swaps in freshly loaded records; filters carry over to the new graph.
    pub(super) fn replace_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.rebuild_graph();
        info!(generation = self.summary.generation, "dataset reloaded");
    }

    fn rebuild_graph(&mut self) {
        self.summary = self
            .engine
            .rebuild(&self.dataset.documents, &self.dataset.links);
        if self
            .opened
            .as_deref()
            .is_some_and(|id| self.engine.graph().index_of(id).is_none())
        {
            self.opened = None;
        }
    }

    pub(super) fn show(
        &mut self,
        ctx: &Context,
        source: &DatasetSource,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("docgraph");
                    ui.separator();
                    ui.label(format!("dataset: {}", source.dataset.display()));
                    ui.label(format!("documents: {}", self.dataset.documents.len()));
                    ui.label(format!("links: {}", self.summary.edges));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload dataset"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Rebuild graph").clicked() {
                        self.rebuild_graph();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "visible graph: {} nodes / {} edges",
                            self.engine.visible_node_count(),
                            self.engine.visible_edge_count()
                        ));
                        if let Some(status) = &self.status {
                            ui.label(status.as_str());
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("View");
        ui.add_space(6.0);

        ui.label("Focus");
        let focus = ui
            .add(egui::TextEdit::singleline(&mut self.focus_query).hint_text("Find a document"))
            .on_hover_text("Show matching documents and their direct links.");
        if focus.changed() {
            self.engine.set_focus_query(&self.focus_query);
        }
        if !self.focus_query.trim().is_empty() {
            ui.small(format!("{} matches", self.engine.focus_matches().len()));
        }

        let max_degree = self.engine.graph().max_degree().max(1);
        let min_degree_slider = ui
            .add(egui::Slider::new(&mut self.min_degree, 0..=max_degree).text("Min links"))
            .on_hover_text("Hide documents with fewer links than this.");
        if min_degree_slider.changed() {
            self.engine.set_min_degree(self.min_degree);
        }

        ui.horizontal(|ui| {
            if ui.button("Fit view").clicked() {
                self.engine.reset_view();
            }
            if ui.button("Clear filters").clicked() {
                self.min_degree = 0;
                self.focus_query.clear();
                self.engine.set_min_degree(0);
                self.engine.set_focus_query("");
            }
        });

        ui.separator();

        ui.collapsing("Physics tuning", |ui| {
            let mut changed = false;
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.simulation.repulsion_strength, 200.0..=30_000.0)
                        .logarithmic(true)
                        .text("Repulsion"),
                )
                .on_hover_text("How strongly documents push away from each other.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.simulation.spring_strength, 0.005..=0.4)
                        .logarithmic(true)
                        .text("Link spring"),
                )
                .on_hover_text("How strongly links pull their endpoints together.")
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut self.simulation.rest_length, 10.0..=400.0).text("Link length"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut self.simulation.gravity_strength, 0.0..=0.1).text("Gravity"))
                .on_hover_text("Pull toward the layout center.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.simulation.damping, 0.05..=0.95)
                        .text("Damping")
                        .clamping(egui::SliderClamping::Always),
                )
                .changed();

            if ui.button("Reset physics").clicked() {
                self.simulation = SimulationConfig::default();
                changed = true;
            }
            if changed {
                self.engine.set_simulation_config(self.simulation);
            }
        });

        ui.separator();
        ui.label(RichText::new("Layout").strong());
        let phase = match self.engine.phase() {
            LayoutPhase::Building => "building",
            LayoutPhase::Settling => "settling",
            LayoutPhase::Idle => "idle",
        };
        ui.label(format!("phase: {phase}  alpha: {:.3}", self.engine.alpha()));
        ui.label(format!("generation: {}", self.summary.generation));
        ui.label(format!(
            "nodes: {}  ({} not loaded)",
            self.summary.nodes, self.summary.synthetic
        ));
        ui.label(format!("edges: {}", self.summary.edges));
        if self.summary.dropped_links > 0 {
            ui.label(format!("dropped links: {}", self.summary.dropped_links));
        }
        if self.summary.was_capped {
            ui.colored_label(
                Color32::from_rgb(241, 146, 94),
                format!(
                    "Showing the {} most recent documents only.",
                    self.engine.config().max_documents.unwrap_or_default()
                ),
            );
        }
    }

    fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Document");
        ui.add_space(6.0);

        let Some(opened) = self.opened.clone() else {
            ui.label("Click a document in the graph to open it.");
            return;
        };
        let graph = self.engine.graph();
        let Some(index) = graph.index_of(&opened) else {
            ui.label("The opened document is no longer in the graph.");
            return;
        };
        let Some(node) = graph.node(index) else {
            return;
        };

        ui.label(RichText::new(node.title.as_str()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);
        ui.label(format!("Links: {}", node.degree));
        if node.synthetic {
            ui.label("Only known from links; the document itself was not loaded.");
        }

        ui.separator();
        ui.label(RichText::new("Linked documents").strong());
        let neighbors: Vec<(String, String, bool)> = graph
            .neighbors(index)
            .iter()
            .filter_map(|&neighbor| graph.node(neighbor))
            .map(|node| (node.id.clone(), node.title.clone(), node.synthetic))
            .collect();
        if neighbors.is_empty() {
            ui.label("No links.");
            return;
        }

        let mut open = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (id, title, synthetic) in &neighbors {
                    let text = if *synthetic {
                        RichText::new(title.as_str()).weak()
                    } else {
                        RichText::new(title.as_str())
                    };
                    if ui.link(text).on_hover_text(id.as_str()).clicked() {
                        open = Some(id.clone());
                    }
                }
            });
        if let Some(id) = open {
            self.open_document(id);
        }
    }
}
