// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in station map.
//!
//! Eighteen locations (ten platforms, three restrooms, four food courts and
//! the ticket counter) on an 800x1000 canvas.

use crate::map::{MapDefinition, MapError, StationMap};

/// Name of the built-in map
pub const STATION_MAP_NAME: &str = "Central Station";

/// Create the definition of the built-in station map
pub fn create_station_definition() -> MapDefinition {
    MapDefinition::default()
        // Nodes, in display order
        .with_node("Platform 1", 100.0, 100.0)
        .with_node("Platform 2", 300.0, 100.0)
        .with_node("Platform 3", 500.0, 100.0)
        .with_node("Restroom 1", 100.0, 300.0)
        .with_node("Ticket Counter", 300.0, 300.0)
        .with_node("Food Court 1", 500.0, 300.0)
        .with_node("Platform 4", 700.0, 100.0)
        .with_node("Platform 5", 700.0, 300.0)
        .with_node("Restroom 2", 100.0, 500.0)
        .with_node("Food Court 2", 300.0, 500.0)
        .with_node("Platform 6", 500.0, 500.0)
        .with_node("Platform 7", 700.0, 500.0)
        .with_node("Food Court 3", 100.0, 700.0)
        .with_node("Restroom 3", 300.0, 700.0)
        .with_node("Platform 8", 500.0, 700.0)
        .with_node("Platform 9", 700.0, 700.0)
        .with_node("Platform 10", 500.0, 900.0)
        .with_node("Food Court 4", 700.0, 900.0)
        // Concourse
        .with_edge("Platform 1", "Platform 2", 4)
        .with_edge("Platform 1", "Restroom 1", 3)
        .with_edge("Platform 2", "Platform 3", 2)
        .with_edge("Platform 2", "Ticket Counter", 5)
        .with_edge("Platform 3", "Food Court 1", 6)
        .with_edge("Platform 3", "Platform 4", 2)
        .with_edge("Restroom 1", "Ticket Counter", 4)
        .with_edge("Ticket Counter", "Food Court 1", 7)
        .with_edge("Food Court 1", "Platform 5", 3)
        // Middle level
        .with_edge("Platform 4", "Food Court 2", 4)
        .with_edge("Platform 5", "Restroom 2", 2)
        .with_edge("Platform 5", "Platform 6", 3)
        .with_edge("Restroom 2", "Food Court 2", 5)
        .with_edge("Food Court 2", "Platform 7", 6)
        .with_edge("Platform 6", "Food Court 3", 4)
        // Lower level
        .with_edge("Platform 7", "Platform 8", 4)
        .with_edge("Food Court 3", "Restroom 3", 2)
        .with_edge("Restroom 3", "Platform 9", 3)
        .with_edge("Platform 8", "Platform 9", 2)
        .with_edge("Platform 9", "Platform 10", 5)
        .with_edge("Platform 10", "Food Court 4", 6)
}

impl StationMap {
    /// Build the built-in station map
    pub fn station() -> Result<Self, MapError> {
        Self::from_definition(STATION_MAP_NAME, create_station_definition())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_map_is_valid() {
        let map = StationMap::station().unwrap();
        assert_eq!(map.name, STATION_MAP_NAME);
        assert_eq!(map.node_count(), 18);
        assert_eq!(map.edge_count(), 21);
    }

    #[test]
    fn test_station_map_is_symmetric() {
        let map = StationMap::station().unwrap();
        for node in map.node_names() {
            for (neighbor, weight) in map.neighbors(node).unwrap() {
                assert_eq!(map.weight(neighbor, node), Some(*weight), "{node} <-> {neighbor}");
            }
        }
    }

    #[test]
    fn test_station_map_order_and_positions() {
        let map = StationMap::station().unwrap();
        let names: Vec<_> = map.node_names().collect();
        assert_eq!(names.first(), Some(&"Platform 1"));
        assert_eq!(names.last(), Some(&"Food Court 4"));

        let pos = map.position("Ticket Counter").unwrap();
        assert_eq!((pos.x, pos.y), (300.0, 300.0));
        assert_eq!(map.neighbors("Food Court 4").unwrap().len(), 1);
    }
}
