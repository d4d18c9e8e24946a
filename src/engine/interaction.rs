use eframe::egui::Pos2;

use crate::viewport::{ZoomDirection, distance_to_segment, midpoint};

use super::{GraphEngine, GraphEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Node(usize),
    Edge(usize),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum Gesture {
    Idle,
    Pan {
        origin: Pos2,
        last: Pos2,
        moved: bool,
        pressed_edge: Option<usize>,
    },
    Drag {
        node: usize,
        origin: Pos2,
        moved: bool,
    },
}

impl GraphEngine {
    /// Topmost visible node or edge under a screen position; nodes win.
    pub fn hit_test(&self, screen: Pos2) -> Option<Hit> {
        let view = &self.config.viewport;
        let graph = self.graph();
        let positions = self.published_positions();

        let node = graph
            .nodes()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.is_node_visible(*index))
            .filter_map(|(index, node)| {
                let center = self.transform.to_screen(*positions.get(index)?);
                let distance = center.distance(screen);
                let reach = view.node_radius(node.degree) * self.transform.k + view.node_hit_padding;
                (distance <= reach).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = node {
            return Some(Hit::Node(index));
        }

        graph
            .edges()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.is_edge_visible(*index))
            .filter_map(|(index, edge)| {
                let start = self.transform.to_screen(*positions.get(edge.source)?);
                let end = self.transform.to_screen(*positions.get(edge.target)?);
                let distance = distance_to_segment(screen, start, end);
                (distance <= view.edge_hit_tolerance).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| Hit::Edge(index))
    }

    pub fn pointer_down(&mut self, screen: Pos2) {
        self.gesture = match self.hit_test(screen) {
            Some(Hit::Node(node)) => {
                let graph_pos = self.transform.to_graph(screen);
                self.layout.pin(node, graph_pos);
                Gesture::Drag {
                    node,
                    origin: screen,
                    moved: false,
                }
            }
            hit => Gesture::Pan {
                origin: screen,
                last: screen,
                moved: false,
                pressed_edge: match hit {
                    Some(Hit::Edge(edge)) => Some(edge),
                    _ => None,
                },
            },
        };
    }

    pub fn pointer_move(&mut self, screen: Pos2) {
        let slop = self.config.viewport.click_slop;
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Pan {
                origin,
                last,
                moved,
                ..
            } => {
                let delta = screen - *last;
                *last = screen;
                *moved |= screen.distance(*origin) > slop;
                let transform = self.transform.panned(delta);
                self.set_transform(transform);
            }
            Gesture::Drag {
                node,
                origin,
                moved,
            } => {
                *moved |= screen.distance(*origin) > slop;
                let node = *node;
                let graph_pos = self.transform.to_graph(screen);
                self.layout.pin(node, graph_pos);
            }
        }
    }

    pub fn pointer_up(&mut self, screen: Pos2) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}
            Gesture::Pan {
                moved,
                pressed_edge,
                ..
            } => {
                if moved {
                    return;
                }
                match pressed_edge {
                    Some(edge) if self.hit_test(screen) == Some(Hit::Edge(edge)) => {
                        self.select_edge(edge);
                    }
                    _ => self.selected_edge = None,
                }
            }
            Gesture::Drag { node, moved, .. } => {
                self.layout.unpin(node);
                if !moved && let Some(id) = self.graph().node(node).map(|node| node.id.clone()) {
                    self.events.push(GraphEvent::NodeClicked(id));
                }
            }
        }
    }

    /// Ends any gesture without producing a click.
    pub fn pointer_leave(&mut self) {
        if let Gesture::Drag { node, .. } = std::mem::replace(&mut self.gesture, Gesture::Idle) {
            self.layout.unpin(node);
        }
    }

    pub fn zoom_at(&mut self, cursor: Pos2, direction: ZoomDirection) {
        let view = &self.config.viewport;
        let factor = match direction {
            ZoomDirection::In => view.zoom_in_factor,
            ZoomDirection::Out => view.zoom_out_factor,
        };
        let transform = self
            .transform
            .zoomed_at(cursor, factor, view.min_zoom, view.max_zoom);
        self.set_transform(transform);
    }

    fn select_edge(&mut self, edge: usize) {
        let Some(anchor) = self.edge_anchor(edge) else {
            return;
        };
        let Some(edge_id) = self.graph().edges().get(edge).map(|edge| edge.id.clone()) else {
            return;
        };
        self.selected_edge = Some(edge);
        self.events.push(GraphEvent::EdgeClicked { edge_id, anchor });
    }

    /// Screen-space midpoint of an edge, where its detail popover is anchored.
    pub fn edge_anchor(&self, edge: usize) -> Option<Pos2> {
        let edge = self.graph().edges().get(edge)?;
        let start = self.node_screen_pos(edge.source)?;
        let end = self.node_screen_pos(edge.target)?;
        Some(midpoint(start, end))
    }

    pub fn selected_edge(&self) -> Option<usize> {
        self.selected_edge
    }

    pub fn clear_edge_selection(&mut self) {
        self.selected_edge = None;
    }

    pub fn dragged_node(&self) -> Option<usize> {
        match self.gesture {
            Gesture::Drag { node, .. } => Some(node),
            _ => None,
        }
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Pan { .. })
    }
}
