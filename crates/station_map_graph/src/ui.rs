// SPDX-License-Identifier: MIT OR Apache-2.0
//! Map rendering with path highlighting.
//!
//! Features:
//! - Edges drawn as straight lines annotated with their weight
//! - Nodes drawn as labelled boxes at their positions
//! - Highlighting of the edges and nodes of a [`PathResult`]
//! - Fit-to-canvas with pan/zoom navigation
//! - Node hover and click reporting

use crate::map::{MapBounds, Position, StationMap};
use crate::path::PathResult;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};
use serde::{Deserialize, Serialize};

/// Margin kept free around the map when fitting it to the canvas
const FIT_MARGIN: f32 = 16.0;
/// Grid spacing in map units
const GRID_SPACING: f32 = 100.0;
/// Smallest font size drawn, in points
const MIN_FONT_SIZE: f32 = 6.0;

const MIN_ZOOM: f32 = 0.25;
const MAX_ZOOM: f32 = 4.0;

/// Colours and sizes used to draw the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyle {
    /// Canvas background
    pub background: [u8; 3],
    /// Grid lines
    pub grid: [u8; 3],
    /// Regular edge colour
    pub edge: [u8; 3],
    /// Edge colour when part of the path
    pub path_edge: [u8; 3],
    /// Regular edge width (map units)
    pub edge_width: f32,
    /// Edge width when part of the path (map units)
    pub path_edge_width: f32,
    /// Weight annotation colour
    pub weight: [u8; 3],
    /// Regular node fill
    pub node_fill: [u8; 3],
    /// Node fill when part of the path
    pub path_node_fill: [u8; 3],
    /// Node outline
    pub node_border: [u8; 3],
    /// Node label colour
    pub label: [u8; 3],
    /// Node box size (map units)
    pub node_size: [f32; 2],
    /// Label font size (map units)
    pub label_size: f32,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            background: [255, 255, 255],
            grid: [235, 235, 235],
            edge: [170, 170, 170],
            path_edge: [0, 0, 255],
            edge_width: 1.0,
            path_edge_width: 3.0,
            weight: [0, 0, 0],
            node_fill: [76, 175, 80],
            path_node_fill: [255, 87, 34],
            node_border: [51, 51, 51],
            label: [255, 255, 255],
            node_size: [80.0, 40.0],
            label_size: 12.0,
        }
    }
}

impl MapStyle {
    /// Stroke for the edge between `a` and `b` (width in map units)
    pub fn edge_stroke(&self, result: Option<&PathResult>, a: &str, b: &str) -> Stroke {
        if result.is_some_and(|r| r.contains_edge(a, b)) {
            Stroke::new(self.path_edge_width, rgb(self.path_edge))
        } else {
            Stroke::new(self.edge_width, rgb(self.edge))
        }
    }

    /// Fill colour for a node
    pub fn node_fill(&self, result: Option<&PathResult>, name: &str) -> Color32 {
        if result.is_some_and(|r| r.contains_node(name)) {
            rgb(self.path_node_fill)
        } else {
            rgb(self.node_fill)
        }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Mapping between map coordinates and screen coordinates for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapTransform {
    /// Map point drawn at the canvas center
    pub center: Position,
    /// Screen position of the canvas center
    pub screen_center: Pos2,
    /// Screen points per map unit
    pub scale: f32,
}

impl MapTransform {
    /// Convert a map position to a screen position
    pub fn to_screen(&self, position: Position) -> Pos2 {
        Pos2::new(
            self.screen_center.x + (position.x - self.center.x) * self.scale,
            self.screen_center.y + (position.y - self.center.y) * self.scale,
        )
    }

    /// Convert a screen position to a map position
    pub fn to_map(&self, screen: Pos2) -> Position {
        Position::new(
            (screen.x - self.screen_center.x) / self.scale + self.center.x,
            (screen.y - self.screen_center.y) / self.scale + self.center.y,
        )
    }
}

/// What happened in the map view this frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapViewResponse {
    /// Node under the pointer
    pub hovered_node: Option<String>,
    /// Node clicked with the primary button
    pub clicked_node: Option<String>,
}

/// Map view UI state
#[derive(Debug, Clone)]
pub struct MapViewState {
    /// Pan offset (map units)
    pub pan: Vec2,
    /// Zoom on top of the fit-to-canvas scale
    pub zoom: f32,
    /// Draw the weight of every edge
    pub show_weights: bool,
    /// Draw the background grid
    pub show_grid: bool,
    /// Draw the status line
    pub show_status: bool,
}

impl MapViewState {
    /// Create a new map view state
    pub fn new() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            show_weights: true,
            show_grid: false,
            show_status: true,
        }
    }

    /// Reset pan and zoom to fit the whole map
    pub fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Compute the map-to-screen transform for a canvas
    pub fn transform(&self, bounds: MapBounds, style: &MapStyle, rect: Rect) -> MapTransform {
        // Node boxes extend past their centers
        let width = bounds.width() + style.node_size[0];
        let height = bounds.height() + style.node_size[1];
        let available = (rect.size() - Vec2::splat(2.0 * FIT_MARGIN)).max(Vec2::splat(1.0));
        let fit = (available.x / width.max(1.0)).min(available.y / height.max(1.0));

        let center = bounds.center();
        MapTransform {
            center: Position::new(center.x - self.pan.x, center.y - self.pan.y),
            screen_center: rect.center(),
            scale: fit * self.zoom,
        }
    }

    /// Find the node whose box contains a screen position
    pub fn node_at<'a>(
        &self,
        map: &'a StationMap,
        style: &MapStyle,
        transform: &MapTransform,
        screen: Pos2,
    ) -> Option<&'a str> {
        let size = Vec2::new(style.node_size[0], style.node_size[1]) * transform.scale;
        // Later nodes are drawn on top
        let names: Vec<&str> = map.node_names().collect();
        names.into_iter().rev().find(|name| {
            map.position(name).is_some_and(|position| {
                Rect::from_center_size(transform.to_screen(position), size).contains(screen)
            })
        })
    }

    /// Render the map, highlighting `result` if given
    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        map: &StationMap,
        style: &MapStyle,
        result: Option<&PathResult>,
    ) -> MapViewResponse {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        painter.rect_filled(rect, 0.0, rgb(style.background));

        let Some(bounds) = map.bounds() else {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Map has no locations",
                egui::FontId::proportional(14.0),
                Color32::GRAY,
            );
            return MapViewResponse::default();
        };

        self.handle_input(ui, &response, bounds, style, rect);
        let transform = self.transform(bounds, style, rect);

        if self.show_grid {
            self.draw_grid(&painter, style, &transform, rect);
        }

        // Edges first (below nodes)
        self.draw_edges(&painter, map, style, &transform, result);

        let hovered_node = response
            .hover_pos()
            .and_then(|pos| self.node_at(map, style, &transform, pos))
            .map(str::to_string);

        self.draw_nodes(&painter, map, style, &transform, result, hovered_node.as_deref());

        if self.show_status {
            self.draw_status_bar(&painter, map, rect, result);
        }

        let clicked_node = if response.clicked() {
            response
                .interact_pointer_pos()
                .and_then(|pos| self.node_at(map, style, &transform, pos))
                .map(str::to_string)
        } else {
            None
        };

        MapViewResponse {
            hovered_node,
            clicked_node,
        }
    }

    fn handle_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        bounds: MapBounds,
        style: &MapStyle,
        rect: Rect,
    ) {
        if response.double_clicked() {
            self.reset_view();
            return;
        }

        // Zoom with scroll wheel, keeping the point under the cursor fixed
        if let Some(mouse_pos) = response.hover_pos() {
            let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
            if scroll_delta != 0.0 {
                let before = self.transform(bounds, style, rect);
                let anchor = before.to_map(mouse_pos);

                self.zoom = (self.zoom * (1.0 + scroll_delta * 0.001)).clamp(MIN_ZOOM, MAX_ZOOM);

                let after = self.transform(bounds, style, rect);
                let drift = after.to_map(mouse_pos);
                self.pan.x += drift.x - anchor.x;
                self.pan.y += drift.y - anchor.y;
            }
        }

        // Pan with any drag
        if response.dragged() {
            let scale = self.transform(bounds, style, rect).scale;
            self.pan += response.drag_delta() / scale;
        }
    }

    fn draw_grid(&self, painter: &egui::Painter, style: &MapStyle, transform: &MapTransform, rect: Rect) {
        let stroke = Stroke::new(1.0, rgb(style.grid));
        let top_left = transform.to_map(rect.min);
        let bottom_right = transform.to_map(rect.max);

        let mut x = (top_left.x / GRID_SPACING).floor() * GRID_SPACING;
        while x <= bottom_right.x {
            let sx = transform.to_screen(Position::new(x, 0.0)).x;
            painter.line_segment([Pos2::new(sx, rect.top()), Pos2::new(sx, rect.bottom())], stroke);
            x += GRID_SPACING;
        }

        let mut y = (top_left.y / GRID_SPACING).floor() * GRID_SPACING;
        while y <= bottom_right.y {
            let sy = transform.to_screen(Position::new(0.0, y)).y;
            painter.line_segment([Pos2::new(rect.left(), sy), Pos2::new(rect.right(), sy)], stroke);
            y += GRID_SPACING;
        }
    }

    fn draw_edges(
        &self,
        painter: &egui::Painter,
        map: &StationMap,
        style: &MapStyle,
        transform: &MapTransform,
        result: Option<&PathResult>,
    ) {
        let font = egui::FontId::proportional((style.label_size * transform.scale).max(MIN_FONT_SIZE));

        for edge in map.edges() {
            let (Some(a), Some(b)) = (map.position(edge.a), map.position(edge.b)) else {
                continue;
            };

            let mut stroke = style.edge_stroke(result, edge.a, edge.b);
            stroke.width = (stroke.width * transform.scale).max(1.0);
            painter.line_segment([transform.to_screen(a), transform.to_screen(b)], stroke);

            if self.show_weights {
                painter.text(
                    transform.to_screen(a.midpoint(b)),
                    egui::Align2::CENTER_CENTER,
                    edge.weight.to_string(),
                    font.clone(),
                    rgb(style.weight),
                );
            }
        }
    }

    fn draw_nodes(
        &self,
        painter: &egui::Painter,
        map: &StationMap,
        style: &MapStyle,
        transform: &MapTransform,
        result: Option<&PathResult>,
        hovered: Option<&str>,
    ) {
        let size = Vec2::new(style.node_size[0], style.node_size[1]) * transform.scale;
        let font = egui::FontId::proportional((style.label_size * transform.scale).max(MIN_FONT_SIZE));

        for name in map.node_names() {
            let Some(position) = map.position(name) else {
                continue;
            };
            let node_rect = Rect::from_center_size(transform.to_screen(position), size);

            painter.rect_filled(node_rect, 0.0, style.node_fill(result, name));

            let border_width = if hovered == Some(name) { 2.5 } else { 1.0 };
            painter.rect_stroke(node_rect, 0.0, Stroke::new(border_width, rgb(style.node_border)));

            painter.text(
                node_rect.center(),
                egui::Align2::CENTER_CENTER,
                name,
                font.clone(),
                rgb(style.label),
            );
        }
    }

    fn draw_status_bar(&self, painter: &egui::Painter, map: &StationMap, rect: Rect, result: Option<&PathResult>) {
        let path_info = match result {
            Some(r) if r.is_reachable() => format!(" | Path: {} stops", r.nodes.len()),
            _ => String::new(),
        };

        painter.text(
            Pos2::new(rect.left() + 5.0, rect.bottom() - 10.0),
            egui::Align2::LEFT_CENTER,
            format!(
                "{} | Locations: {} | Connections: {} | Zoom: {:.0}%{}",
                map.name,
                map.node_count(),
                map.edge_count(),
                self.zoom * 100.0,
                path_info,
            ),
            egui::FontId::proportional(11.0),
            Color32::from_gray(110),
        );
    }
}

impl Default for MapViewState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::shortest_path;

    fn canvas() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_transform_round_trip() {
        let map = StationMap::station().unwrap();
        let mut view = MapViewState::new();
        view.zoom = 1.5;
        view.pan = Vec2::new(20.0, -40.0);

        let transform = view.transform(map.bounds().unwrap(), &MapStyle::default(), canvas());
        let position = map.position("Platform 9").unwrap();
        let back = transform.to_map(transform.to_screen(position));

        assert!((back.x - position.x).abs() < 1e-3);
        assert!((back.y - position.y).abs() < 1e-3);
    }

    #[test]
    fn test_fit_keeps_map_on_canvas() {
        let map = StationMap::station().unwrap();
        let style = MapStyle::default();
        let view = MapViewState::new();
        let transform = view.transform(map.bounds().unwrap(), &style, canvas());

        // Map center lands on the canvas center
        assert_eq!(transform.to_screen(map.bounds().unwrap().center()), canvas().center());

        let half = Vec2::new(style.node_size[0], style.node_size[1]) * transform.scale / 2.0;
        for name in map.node_names() {
            let center = transform.to_screen(map.position(name).unwrap());
            assert!(canvas().contains(center - half), "{name}");
            assert!(canvas().contains(center + half), "{name}");
        }
    }

    #[test]
    fn test_node_hit_testing() {
        let map = StationMap::station().unwrap();
        let style = MapStyle::default();
        let view = MapViewState::new();
        let transform = view.transform(map.bounds().unwrap(), &style, canvas());

        let on_node = transform.to_screen(map.position("Restroom 2").unwrap());
        assert_eq!(view.node_at(&map, &style, &transform, on_node), Some("Restroom 2"));

        // Halfway between Platform 1 and Restroom 1 there is only an edge
        let gap = transform.to_screen(Position::new(100.0, 200.0));
        assert_eq!(view.node_at(&map, &style, &transform, gap), None);
    }

    #[test]
    fn test_path_highlighting() {
        let map = StationMap::station().unwrap();
        let style = MapStyle::default();
        let result = shortest_path(&map, "Platform 1", "Platform 3").unwrap();

        assert_eq!(style.node_fill(Some(&result), "Platform 2"), rgb(style.path_node_fill));
        assert_eq!(style.node_fill(Some(&result), "Restroom 1"), rgb(style.node_fill));
        assert_eq!(style.node_fill(None, "Platform 2"), rgb(style.node_fill));

        let on_path = style.edge_stroke(Some(&result), "Platform 3", "Platform 2");
        assert_eq!(on_path, Stroke::new(style.path_edge_width, rgb(style.path_edge)));

        let off_path = style.edge_stroke(Some(&result), "Platform 1", "Restroom 1");
        assert_eq!(off_path, Stroke::new(style.edge_width, rgb(style.edge)));
        assert!(on_path.width > off_path.width);
    }

    #[test]
    fn test_style_partial_ron() {
        let style: MapStyle = ron::from_str("(path_edge: (255, 0, 0), path_edge_width: 5.0)").unwrap();
        assert_eq!(style.path_edge, [255, 0, 0]);
        assert_eq!(style.path_edge_width, 5.0);
        assert_eq!(style.node_fill, MapStyle::default().node_fill);
    }
}
