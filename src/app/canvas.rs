use docgraph::{GraphEvent, Hit, Schedule, ZoomDirection};
use eframe::egui::{self, Align2, Color32, FontId, Rect, RichText, Sense, Stroke, Ui, Vec2, vec2};
use tracing::{debug, info, trace};

use super::ViewModel;
use super::render_utils::{
    FOCUS_COLOR, HOVER_COLOR, SELECTED_COLOR, SYNTHETIC_COLOR, blend_color, circle_visible,
    degree_color, dim_color, draw_background, edge_visible,
};

enum PopoverAction {
    Open(String),
    Close,
}

impl ViewModel {
    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.engine.set_viewport_size(rect.size());
        let origin = rect.min.to_vec2();

        self.handle_pointer(ui, rect, &response);

        if matches!(self.engine.tick(ui.input(|input| input.time)), Schedule::Continue) {
            ui.ctx().request_repaint();
        }
        self.drain_events();

        let painter = ui.painter_at(rect);
        let transform = self.engine.transform();
        draw_background(&painter, rect, transform);

        let hovered = response
            .hover_pos()
            .and_then(|pointer| self.engine.hit_test(pointer - origin));
        let graph = self.engine.graph();
        let zoom_sqrt = transform.k.sqrt();
        let selected_edge = self.engine.selected_edge();
        let focus_active = !self.engine.filter().focus_query.trim().is_empty();

        for (index, edge) in graph.edges().iter().enumerate() {
            if !self.engine.is_edge_visible(index) {
                continue;
            }
            let (Some(start), Some(end)) = (
                self.engine.node_screen_pos(edge.source),
                self.engine.node_screen_pos(edge.target),
            ) else {
                continue;
            };
            let (start, end) = (start + origin, end + origin);
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }

            let is_selected = selected_edge == Some(index);
            let is_hovered = hovered == Some(Hit::Edge(index));
            let (width, color) = if is_selected {
                ((2.6 * zoom_sqrt).clamp(1.4, 4.6), SELECTED_COLOR)
            } else if is_hovered {
                ((2.2 * zoom_sqrt).clamp(1.2, 4.0), HOVER_COLOR)
            } else {
                (
                    (1.1 * zoom_sqrt).clamp(0.6, 3.2),
                    Color32::from_rgba_unmultiplied(96, 104, 116, 170),
                )
            };
            painter.line_segment([start, end], Stroke::new(width, color));
        }

        let max_degree = graph.max_degree();
        let dragged = self.engine.dragged_node();
        for (index, node) in graph.nodes().iter().enumerate() {
            if !self.engine.is_node_visible(index) {
                continue;
            }
            let Some(position) = self.engine.node_screen_pos(index) else {
                continue;
            };
            let position = position + origin;
            let radius = self.engine.node_radius(index) * transform.k;
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_hovered = hovered == Some(Hit::Node(index)) || dragged == Some(index);
            let is_match = self.engine.focus_matches().contains(&index);
            let is_opened = self.opened.as_deref() == Some(node.id.as_str());

            let base_color = if node.synthetic {
                SYNTHETIC_COLOR
            } else {
                degree_color(node.degree, max_degree)
            };
            let color = if is_hovered {
                HOVER_COLOR
            } else if is_opened {
                blend_color(base_color, SELECTED_COLOR, 0.75)
            } else if is_match {
                blend_color(base_color, FOCUS_COLOR, 0.68)
            } else if focus_active {
                dim_color(base_color, 0.45)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if is_opened || is_match { 1.8 } else { 1.0 },
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190),
                ),
            );

            let should_draw_label =
                is_hovered || is_opened || is_match || radius > 12.0 || transform.k > 1.35;
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.title.as_str(),
                    FontId::proportional(12.0),
                    if node.synthetic {
                        Color32::from_gray(170)
                    } else {
                        Color32::from_gray(238)
                    },
                );
            }
        }

        if let Some(Hit::Node(index)) = hovered
            && let Some(node) = graph.node(index)
        {
            let panel_text = format!(
                "{}  |  {}  |  links {}{}",
                node.title,
                node.id,
                node.degree,
                if node.synthetic { "  |  not loaded" } else { "" }
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if graph.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No documents to show",
                FontId::proportional(16.0),
                Color32::from_gray(180),
            );
        }

        self.draw_edge_popover(ui, origin);
    }

    /// Forwards egui pointer state to the engine in canvas-local coordinates.
    fn handle_pointer(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        let origin = rect.min.to_vec2();
        let (pressed, released, pointer) = ui.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.pointer.interact_pos(),
            )
        });
        let gesture_active = self.engine.dragged_node().is_some() || self.engine.is_panning();

        let Some(pointer) = pointer else {
            if gesture_active {
                self.engine.pointer_leave();
            }
            return;
        };
        let local = pointer - origin;

        if pressed && response.hovered() {
            self.engine.pointer_down(local);
        } else if gesture_active {
            self.engine.pointer_move(local);
        }
        if released && (self.engine.dragged_node().is_some() || self.engine.is_panning()) {
            self.engine.pointer_up(local);
        }

        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll > f32::EPSILON {
                self.engine.zoom_at(local, ZoomDirection::In);
            } else if scroll < -f32::EPSILON {
                self.engine.zoom_at(local, ZoomDirection::Out);
            }
        }
    }

    pub(super) fn drain_events(&mut self) {
        for event in self.engine.take_events() {
            match event {
                GraphEvent::NodesUpdated { generation } => {
                    trace!(generation, "positions published");
                }
                GraphEvent::NodeClicked(id) => self.open_document(id),
                GraphEvent::EdgeClicked { edge_id, anchor } => {
                    debug!(%edge_id, x = anchor.x, y = anchor.y, "link selected");
                }
                GraphEvent::ViewChanged(_) => {}
            }
        }
    }

    pub(super) fn open_document(&mut self, id: String) {
        let title = self
            .engine
            .graph()
            .node_by_id(&id)
            .map(|node| node.title.clone())
            .unwrap_or_else(|| id.clone());
        info!(document = %id, "open document");
        self.status = Some(format!("Opened \"{title}\""));
        self.opened = Some(id);
    }

    fn draw_edge_popover(&mut self, ui: &Ui, origin: Vec2) {
        let Some(index) = self.engine.selected_edge() else {
            return;
        };
        let Some(anchor) = self.engine.edge_anchor(index) else {
            return;
        };
        let graph = self.engine.graph();
        let Some(edge) = graph.edges().get(index) else {
            return;
        };
        let (Some(source), Some(target)) = (graph.node(edge.source), graph.node(edge.target)) else {
            return;
        };

        let mut action = None;
        egui::Area::new(ui.make_persistent_id("edge-popover"))
            .order(egui::Order::Foreground)
            .fixed_pos(anchor + origin + vec2(8.0, 8.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(280.0);
                    ui.label(RichText::new(format!("{} → {}", source.title, target.title)).strong());
                    if let Some(label) = &edge.label {
                        ui.label(format!("\"{label}\""));
                    }
                    ui.horizontal(|ui| {
                        if ui.button("Open source").clicked() {
                            action = Some(PopoverAction::Open(source.id.clone()));
                        }
                        let open_target = ui.add_enabled(!target.synthetic, egui::Button::new("Open target"));
                        if open_target.clicked() {
                            action = Some(PopoverAction::Open(target.id.clone()));
                        }
                        if ui.button("Close").clicked() {
                            action = Some(PopoverAction::Close);
                        }
                    });
                });
            });

        match action {
            Some(PopoverAction::Open(id)) => self.open_document(id),
            Some(PopoverAction::Close) => self.engine.clear_edge_selection(),
            None => {}
        }
    }
}
