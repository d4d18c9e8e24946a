use eframe::egui::{Pos2, Vec2, pos2};

/// Maps graph space to screen space as `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn translation(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn to_screen(self, graph: Vec2) -> Pos2 {
        (graph * self.k + self.translation()).to_pos2()
    }

    pub fn to_graph(self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translation()) / self.k
    }

    pub fn panned(self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            k: self.k,
        }
    }

    /// Rescales by `factor` while keeping the graph point under `cursor` fixed.
    pub fn zoomed_at(self, cursor: Pos2, factor: f32, min_zoom: f32, max_zoom: f32) -> Self {
        let k = (self.k * factor).clamp(min_zoom, max_zoom);
        let ratio = k / self.k;
        let cursor = cursor.to_vec2();
        let translation = cursor - (cursor - self.translation()) * ratio;
        Self {
            x: translation.x,
            y: translation.y,
            k,
        }
    }

    /// Keeps the scale and moves `graph` to the middle of a viewport.
    pub fn centered_on(self, graph: Vec2, viewport: Vec2) -> Self {
        let translation = viewport * 0.5 - graph * self.k;
        Self {
            x: translation.x,
            y: translation.y,
            k: self.k,
        }
    }
}

/// Scale and translation that fit every position into the viewport.
pub fn fit_transform(
    positions: &[Vec2],
    viewport: Vec2,
    padding: f32,
    min_zoom: f32,
    max_zoom: f32,
) -> Transform {
    let Some(first) = positions.first() else {
        return Transform::IDENTITY.centered_on(Vec2::ZERO, viewport);
    };

    let (min, max) = positions
        .iter()
        .fold((*first, *first), |(min, max), position| {
            (min.min(*position), max.max(*position))
        });

    let extent = (max - min).max(Vec2::splat(1.0));
    let available = (viewport - Vec2::splat(padding * 2.0)).max(Vec2::splat(1.0));
    let k = (available.x / extent.x)
        .min(available.y / extent.y)
        .clamp(min_zoom, max_zoom);

    Transform { k, ..Transform::IDENTITY }.centered_on((min + max) * 0.5, viewport)
}

pub(crate) fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

pub(crate) fn midpoint(start: Pos2, end: Pos2) -> Pos2 {
    pos2((start.x + end.x) * 0.5, (start.y + end.y) * 0.5)
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn screen_and_graph_mappings_invert_each_other() {
        let transform = Transform {
            x: 120.0,
            y: -40.0,
            k: 2.5,
        };
        let graph = vec2(13.0, -7.0);
        let screen = transform.to_screen(graph);
        assert_eq!(screen, pos2(152.5, -57.5));
        assert!((transform.to_graph(screen) - graph).length() < 1e-4);
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let transform = Transform {
            x: 30.0,
            y: 10.0,
            k: 1.2,
        };
        let cursor = pos2(300.0, 180.0);
        let under_cursor = transform.to_graph(cursor);

        let zoomed = transform.zoomed_at(cursor, 1.1, 0.05, 6.0);
        assert!((zoomed.k - 1.32).abs() < 1e-5);
        assert!(zoomed.to_screen(under_cursor).distance(cursor) < 1e-3);
    }

    #[test]
    fn zoom_is_clamped_and_still_anchored() {
        let transform = Transform {
            x: 0.0,
            y: 0.0,
            k: 5.8,
        };
        let cursor = pos2(64.0, 64.0);
        let under_cursor = transform.to_graph(cursor);

        let zoomed = transform.zoomed_at(cursor, 1.1, 0.05, 6.0);
        assert_eq!(zoomed.k, 6.0);
        assert!(zoomed.to_screen(under_cursor).distance(cursor) < 1e-3);
    }

    #[test]
    fn fit_contains_all_positions() {
        let positions = [vec2(-300.0, 20.0), vec2(150.0, -90.0), vec2(40.0, 260.0)];
        let viewport = vec2(800.0, 600.0);
        let fit = fit_transform(&positions, viewport, 40.0, 0.05, 6.0);

        for position in positions {
            let screen = fit.to_screen(position);
            assert!(screen.x >= 39.9 && screen.x <= 760.1, "{screen:?}");
            assert!(screen.y >= 39.9 && screen.y <= 560.1, "{screen:?}");
        }
    }

    #[test]
    fn fit_of_nothing_centers_origin() {
        let fit = fit_transform(&[], vec2(800.0, 600.0), 40.0, 0.05, 6.0);
        assert_eq!(fit, Transform { x: 400.0, y: 300.0, k: 1.0 });
    }

    #[test]
    fn fit_of_single_node_is_clamped() {
        let fit = fit_transform(&[vec2(10.0, 10.0)], vec2(800.0, 600.0), 40.0, 0.05, 6.0);
        assert_eq!(fit.k, 6.0);
        assert_eq!(fit.to_screen(vec2(10.0, 10.0)), pos2(400.0, 300.0));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let start = pos2(0.0, 0.0);
        let end = pos2(10.0, 0.0);
        assert_eq!(distance_to_segment(pos2(5.0, 3.0), start, end), 3.0);
        assert_eq!(distance_to_segment(pos2(-4.0, 3.0), start, end), 5.0);
        assert_eq!(distance_to_segment(pos2(2.0, 2.0), start, start), 8.0_f32.sqrt());
    }
}
