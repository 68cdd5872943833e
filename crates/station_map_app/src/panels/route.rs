// SPDX-License-Identifier: MIT OR Apache-2.0
//! Route panel - start/end selection and the result display.

use station_map_graph::{shortest_path, PathResult, StationMap};

/// Shown when the selection cannot be routed
pub const SELECTION_MESSAGE: &str = "Please select different start and end locations.";

/// Why a start/end selection was rejected before searching
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Start or end not selected
    #[error("{}", SELECTION_MESSAGE)]
    Missing,

    /// Start and end are the same location
    #[error("{}", SELECTION_MESSAGE)]
    Identical,
}

/// Check a selection before handing it to the route search
pub fn validate_selection<'a>(
    start: Option<&'a str>,
    end: Option<&'a str>,
) -> Result<(&'a str, &'a str), SelectionError> {
    match (start, end) {
        (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
            if start == end {
                Err(SelectionError::Identical)
            } else {
                Ok((start, end))
            }
        }
        _ => Err(SelectionError::Missing),
    }
}

/// The route panel
#[derive(Debug, Default)]
pub struct RoutePanel {
    /// Selected start location
    pub start: Option<String>,
    /// Selected end location
    pub end: Option<String>,
    /// Last computed route
    result: Option<PathResult>,
    /// Result display text
    message: String,
}

impl RoutePanel {
    /// Create a new route panel with nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Route to highlight on the map
    pub fn result(&self) -> Option<&PathResult> {
        self.result.as_ref()
    }

    /// Result display text
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Validate the selection and search for the shortest route
    pub fn find_path(&mut self, map: &StationMap) {
        let (start, end) = match validate_selection(self.start.as_deref(), self.end.as_deref()) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::debug!("Route request rejected: {e:?}");
                self.result = None;
                self.message = e.to_string();
                return;
            }
        };

        match shortest_path(map, start, end) {
            Ok(result) => {
                self.message = if result.is_reachable() {
                    format!("Shortest distance from {start} to {end}: {}", result.distance)
                } else {
                    format!("No path exists from {start} to {end}.")
                };
                tracing::info!("{}", self.message);
                self.result = Some(result);
            }
            Err(e) => {
                tracing::error!("Route search failed: {e}");
                self.message = e.to_string();
                self.result = None;
            }
        }
    }

    /// Clear the selection and the highlighted route
    pub fn reset(&mut self) {
        self.start = None;
        self.end = None;
        self.result = None;
        self.message.clear();
    }

    /// Handle a click on a map node: fill start, then end, then start over
    pub fn select_node(&mut self, name: &str) {
        match (&self.start, &self.end) {
            (None, _) => self.start = Some(name.to_string()),
            (Some(_), None) => self.end = Some(name.to_string()),
            (Some(_), Some(_)) => {
                self.start = Some(name.to_string());
                self.end = None;
            }
        }
    }

    /// Render the route panel
    pub fn ui(&mut self, ui: &mut egui::Ui, map: &StationMap) {
        ui.heading("Route");
        ui.add_space(4.0);

        egui::Grid::new("route_selection")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Start:");
                location_combo(ui, "route_start", &mut self.start, map);
                ui.end_row();

                ui.label("End:");
                location_combo(ui, "route_end", &mut self.end, map);
                ui.end_row();
            });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui.button("Find Shortest Path").clicked() {
                self.find_path(map);
            }
            if ui.button("Reset").clicked() {
                self.reset();
            }
        });

        if !self.message().is_empty() {
            ui.add_space(6.0);
            let color = match self.result() {
                Some(result) if result.is_reachable() => ui.visuals().text_color(),
                _ => ui.visuals().warn_fg_color,
            };
            ui.label(egui::RichText::new(self.message()).color(color));
        }

        if let Some(result) = self.result().filter(|r| r.is_reachable()) {
            ui.add_space(6.0);
            ui.separator();
            ui.label(egui::RichText::new("Stops").strong());

            let mut total = 0u64;
            for (i, stop) in result.nodes.iter().enumerate() {
                if let Some(previous) = i.checked_sub(1).and_then(|p| result.nodes.get(p)) {
                    total += u64::from(map.weight(previous, stop).unwrap_or_default());
                }
                ui.label(format!("{}. {stop} ({total})", i + 1));
            }
        }
    }
}

fn location_combo(ui: &mut egui::Ui, id: &str, selection: &mut Option<String>, map: &StationMap) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(selection.as_deref().unwrap_or("Select location"))
        .width(160.0)
        .show_ui(ui, |ui| {
            for name in map.node_names() {
                ui.selectable_value(selection, Some(name.to_string()), name);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(start: &str, end: &str) -> RoutePanel {
        RoutePanel {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            ..RoutePanel::default()
        }
    }

    #[test]
    fn test_validate_selection() {
        assert_eq!(validate_selection(Some("A"), Some("B")), Ok(("A", "B")));
        assert_eq!(validate_selection(Some("A"), Some("A")), Err(SelectionError::Identical));
        assert_eq!(validate_selection(None, Some("B")), Err(SelectionError::Missing));
        assert_eq!(validate_selection(Some("A"), Some("")), Err(SelectionError::Missing));
        assert_eq!(SelectionError::Identical.to_string(), SELECTION_MESSAGE);
    }

    #[test]
    fn test_find_path_message() {
        let map = StationMap::station().unwrap();
        let mut panel = panel("Platform 1", "Ticket Counter");

        panel.find_path(&map);

        assert_eq!(panel.message(), "Shortest distance from Platform 1 to Ticket Counter: 7");
        let result = panel.result().unwrap();
        assert_eq!(result.nodes, vec!["Platform 1", "Restroom 1", "Ticket Counter"]);
    }

    #[test]
    fn test_same_location_rejected() {
        let map = StationMap::station().unwrap();
        let mut panel = panel("Platform 3", "Platform 3");

        panel.find_path(&map);

        assert_eq!(panel.message(), "Please select different start and end locations.");
        assert!(panel.result().is_none());
    }

    #[test]
    fn test_rejection_clears_previous_route() {
        let map = StationMap::station().unwrap();
        let mut panel = panel("Platform 1", "Platform 3");
        panel.find_path(&map);
        assert!(panel.result().is_some());

        panel.end = None;
        panel.find_path(&map);
        assert!(panel.result().is_none());
        assert_eq!(panel.message(), SELECTION_MESSAGE);
    }

    #[test]
    fn test_unknown_location_reported() {
        let map = StationMap::station().unwrap();
        let mut panel = panel("Platform 1", "Platform 42");

        panel.find_path(&map);

        assert!(panel.result().is_none());
        assert!(panel.message().contains("Platform 42"));
    }

    #[test]
    fn test_unreachable_message() {
        let definition = station_map_graph::MapDefinition::default()
            .with_node("Gate A", 0.0, 0.0)
            .with_node("Gate B", 100.0, 0.0);
        let map = StationMap::from_definition("Gates", definition).unwrap();
        let mut panel = panel("Gate A", "Gate B");

        panel.find_path(&map);

        assert_eq!(panel.message(), "No path exists from Gate A to Gate B.");
        assert!(!panel.result().unwrap().is_reachable());
    }

    #[test]
    fn test_node_clicks_fill_selection() {
        let mut panel = RoutePanel::new();

        panel.select_node("Platform 1");
        assert_eq!(panel.start.as_deref(), Some("Platform 1"));
        assert_eq!(panel.end, None);

        panel.select_node("Platform 7");
        assert_eq!(panel.end.as_deref(), Some("Platform 7"));

        panel.select_node("Restroom 2");
        assert_eq!(panel.start.as_deref(), Some("Restroom 2"));
        assert_eq!(panel.end, None);

        panel.reset();
        assert!(panel.start.is_none());
        assert!(panel.message().is_empty());
    }
}
