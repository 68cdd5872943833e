// SPDX-License-Identifier: MIT OR Apache-2.0
//! Station map data structure: nodes, weighted edges and display positions.
//!
//! A [`StationMap`] is built once from a [`MapDefinition`] and never mutated
//! afterwards. All validation happens at construction time, so every query
//! on a built map can assume the adjacency is symmetric and every node has a
//! position.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Weight of a single edge (physical distance between two locations)
pub type Weight = u32;

/// Display position of a node on the map canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Position {
    /// Create a new position
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint between two positions
    pub fn midpoint(self, other: Position) -> Position {
        Position::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Serializable description of a map, as written in RON map files.
///
/// `adjacency` maps each node to its neighbors and the weight of the edge to
/// each of them. Both directions of every edge must be listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapDefinition {
    /// Node name -> (neighbor name -> weight)
    pub adjacency: IndexMap<String, IndexMap<String, Weight>>,
    /// Node name -> display position
    pub positions: IndexMap<String, Position>,
}

impl MapDefinition {
    /// Add an undirected edge, mirroring it into both adjacency entries
    pub fn with_edge(mut self, a: &str, b: &str, weight: Weight) -> Self {
        self.adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), weight);
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string(), weight);
        self
    }

    /// Declare a node with its position (and no edges yet)
    pub fn with_node(mut self, name: &str, x: f32, y: f32) -> Self {
        self.adjacency.entry(name.to_string()).or_default();
        self.positions.insert(name.to_string(), Position::new(x, y));
        self
    }
}

/// A node of a built map
#[derive(Debug, Clone)]
struct MapNode {
    position: Position,
    neighbors: IndexMap<String, Weight>,
}

/// An undirected edge of a built map, reported once per node pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapEdge<'a> {
    /// First endpoint (in definition order)
    pub a: &'a str,
    /// Second endpoint
    pub b: &'a str,
    /// Edge weight
    pub weight: Weight,
}

/// Axis-aligned bounding box of all node positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    /// Minimum corner
    pub min: Position,
    /// Maximum corner
    pub max: Position,
}

impl MapBounds {
    /// Width of the box
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the box
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Center of the box
    pub fn center(&self) -> Position {
        self.min.midpoint(self.max)
    }
}

/// Immutable weighted undirected station map
#[derive(Debug, Clone)]
pub struct StationMap {
    /// Map name (shown in the window and status line)
    pub name: String,
    nodes: IndexMap<String, MapNode>,
}

impl StationMap {
    /// Build a map from a definition, validating it.
    pub fn from_definition(
        name: impl Into<String>,
        definition: MapDefinition,
    ) -> Result<Self, MapError> {
        let MapDefinition {
            adjacency,
            mut positions,
        } = definition;

        for (node, neighbors) in &adjacency {
            if node.is_empty() {
                return Err(MapError::EmptyName);
            }
            for (neighbor, &weight) in neighbors {
                if neighbor == node {
                    return Err(MapError::SelfLoop(node.clone()));
                }
                if weight == 0 {
                    return Err(MapError::ZeroWeight {
                        from: node.clone(),
                        to: neighbor.clone(),
                    });
                }
                let Some(reverse) = adjacency.get(neighbor) else {
                    return Err(MapError::UnknownNeighbor {
                        node: node.clone(),
                        neighbor: neighbor.clone(),
                    });
                };
                let mirrored = reverse.get(node).copied();
                if mirrored != Some(weight) {
                    return Err(MapError::AsymmetricEdge {
                        from: node.clone(),
                        to: neighbor.clone(),
                        weight,
                        reverse: mirrored,
                    });
                }
            }
        }

        if let Some(stray) = positions.keys().find(|name| !adjacency.contains_key(*name)) {
            return Err(MapError::UnknownPosition(stray.clone()));
        }

        let mut nodes = IndexMap::with_capacity(adjacency.len());
        for (node, neighbors) in adjacency {
            let position = positions
                .swap_remove(&node)
                .ok_or_else(|| MapError::MissingPosition(node.clone()))?;
            nodes.insert(node, MapNode { position, neighbors });
        }

        Ok(Self {
            name: name.into(),
            nodes,
        })
    }

    /// Load and validate a map from a RON file containing a [`MapDefinition`].
    ///
    /// The map is named after the file stem.
    pub fn load_ron(path: &Path) -> Result<Self, MapError> {
        let content = std::fs::read_to_string(path)?;
        let definition: MapDefinition = ron::from_str(&content)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Station Map".to_string());
        let map = Self::from_definition(name, definition)?;
        tracing::debug!(
            "Loaded map '{}' from {}: {} nodes, {} edges",
            map.name,
            path.display(),
            map.node_count(),
            map.edge_count()
        );
        Ok(map)
    }

    /// Convert back into a serializable definition
    pub fn to_definition(&self) -> MapDefinition {
        MapDefinition {
            adjacency: self
                .nodes
                .iter()
                .map(|(name, node)| (name.clone(), node.neighbors.clone()))
                .collect(),
            positions: self
                .nodes
                .iter()
                .map(|(name, node)| (name.clone(), node.position))
                .collect(),
        }
    }

    /// All node names, in definition order
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Neighbors of a node with the weight of the edge to each
    pub fn neighbors(&self, name: &str) -> Option<&IndexMap<String, Weight>> {
        self.nodes.get(name).map(|node| &node.neighbors)
    }

    /// Display position of a node
    pub fn position(&self, name: &str) -> Option<Position> {
        self.nodes.get(name).map(|node| node.position)
    }

    /// Whether a node with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Weight of the edge between two nodes, if they are adjacent
    pub fn weight(&self, a: &str, b: &str) -> Option<Weight> {
        self.neighbors(a)?.get(b).copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.neighbors.len()).sum::<usize>() / 2
    }

    /// Every undirected edge exactly once.
    ///
    /// An edge is reported from the endpoint that comes first in definition
    /// order.
    pub fn edges(&self) -> impl Iterator<Item = MapEdge<'_>> {
        self.nodes.iter().enumerate().flat_map(move |(index, (name, node))| {
            node.neighbors.iter().filter_map(move |(neighbor, &weight)| {
                let neighbor_index = self.nodes.get_index_of(neighbor)?;
                (neighbor_index > index).then_some(MapEdge {
                    a: name.as_str(),
                    b: neighbor.as_str(),
                    weight,
                })
            })
        })
    }

    /// Bounding box of all positions, `None` for an empty map
    pub fn bounds(&self) -> Option<MapBounds> {
        let mut positions = self.nodes.values().map(|n| n.position);
        let first = positions.next()?;
        let bounds = positions.fold(
            MapBounds {
                min: first,
                max: first,
            },
            |b, p| MapBounds {
                min: Position::new(b.min.x.min(p.x), b.min.y.min(p.y)),
                max: Position::new(b.max.x.max(p.x), b.max.y.max(p.y)),
            },
        );
        Some(bounds)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.nodes.get_index_of(name)
    }

    pub(crate) fn name_at(&self, index: usize) -> Option<&str> {
        self.nodes.get_index(index).map(|(name, _)| name.as_str())
    }

    /// Neighbors of the node at `index`, resolved to indices
    pub(crate) fn neighbor_indices(
        &self,
        index: usize,
    ) -> impl Iterator<Item = (usize, Weight)> + '_ {
        self.nodes
            .get_index(index)
            .into_iter()
            .flat_map(move |(_, node)| {
                node.neighbors
                    .iter()
                    .filter_map(move |(name, &weight)| Some((self.nodes.get_index_of(name)?, weight)))
            })
    }
}

/// Error when building a map
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// A node has an empty name
    #[error("Node names must not be empty")]
    EmptyName,

    /// An adjacency entry points at a node that is not declared
    #[error("Node '{node}' lists unknown neighbor '{neighbor}'")]
    UnknownNeighbor {
        /// Node whose adjacency is broken
        node: String,
        /// The undeclared neighbor
        neighbor: String,
    },

    /// A node lists itself as a neighbor
    #[error("Self-loop not allowed: '{0}'")]
    SelfLoop(String),

    /// Edge weight is zero
    #[error("Edge '{from}' -> '{to}' has zero weight")]
    ZeroWeight {
        /// Source node
        from: String,
        /// Target node
        to: String,
    },

    /// The mirror of an edge is missing or has a different weight
    #[error("Edge '{from}' -> '{to}' (weight {weight}) is not mirrored (reverse: {reverse:?})")]
    AsymmetricEdge {
        /// Source node
        from: String,
        /// Target node
        to: String,
        /// Weight in the source's adjacency
        weight: Weight,
        /// Weight found in the target's adjacency, if any
        reverse: Option<Weight>,
    },

    /// A node has no display position
    #[error("Node '{0}' has no position")]
    MissingPosition(String),

    /// A position was given for a node that is not declared
    #[error("Position given for unknown node '{0}'")]
    UnknownPosition(String),

    /// Map file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Map file is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
