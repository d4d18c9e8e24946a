use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use docgraph::{EngineConfig, GraphEngine, RebuildSummary, SimulationConfig};
use eframe::egui::{self, Context};
use tracing::warn;

use crate::dataset::{Dataset, DatasetSource, load_dataset};

mod canvas;
mod panels;
mod render_utils;

pub struct DocGraphApp {
    source: DatasetSource,
    config: EngineConfig,
    state: AppState,
    reload_rx: Option<Receiver<Result<Dataset, String>>>,
}

enum AppState {
    Loading { rx: Receiver<Result<Dataset, String>> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: GraphEngine,
    dataset: Dataset,
    summary: RebuildSummary,
    min_degree: usize,
    focus_query: String,
    simulation: SimulationConfig,
    /// Last document the user asked to open.
    opened: Option<String>,
    status: Option<String>,
}

impl DocGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: DatasetSource,
        config: EngineConfig,
    ) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: DatasetSource) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: DatasetSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready(&self, result: Result<Dataset, String>) -> AppState {
        match result {
            Ok(dataset) => AppState::Ready(Box::new(ViewModel::new(dataset, self.config))),
            Err(error) => {
                warn!(%error, "dataset load failed");
                AppState::Error(error)
            }
        }
    }
}

impl eframe::App for DocGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading documents...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load documents");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.source.clone());
                    return;
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(dataset)) => model.replace_dataset(dataset),
                        Ok(Err(error)) => transition = Some(Err(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.ready(result);
        }
    }
}
