// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shortest-path search over a [`StationMap`].
//!
//! Dijkstra's algorithm with a binary min-heap frontier. Relaxing a node
//! pushes a fresh frontier entry instead of decreasing the old one; stale
//! entries are skipped when popped because their node is already finalized.

use crate::map::StationMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

/// Accumulated path cost
pub type Cost = u64;

/// Total distance of a path, or the unreachable sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    /// A path exists with this total weight
    Reachable(Cost),
    /// No path connects the two nodes
    Unreachable,
}

impl Distance {
    /// Get the numeric distance, if reachable
    pub fn cost(self) -> Option<Cost> {
        match self {
            Self::Reachable(cost) => Some(cost),
            Self::Unreachable => None,
        }
    }

    /// Check if a path exists
    pub fn is_reachable(self) -> bool {
        matches!(self, Self::Reachable(_))
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable(cost) => write!(f, "{cost}"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// An undirected edge traversed by a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEdge {
    /// Endpoint closer to the start
    pub from: String,
    /// Endpoint closer to the end
    pub to: String,
}

impl PathEdge {
    /// Check if this edge joins `a` and `b`, in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// Result of a shortest-path query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    /// Total distance from start to end
    pub distance: Distance,
    /// Nodes from start to end inclusive; empty when unreachable
    pub nodes: Vec<String>,
    /// Traversed edges in path order; empty when unreachable
    pub edges: Vec<PathEdge>,
}

impl PathResult {
    /// Result for an end node that cannot be reached
    pub fn unreachable() -> Self {
        Self {
            distance: Distance::Unreachable,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Check if a path was found
    pub fn is_reachable(&self) -> bool {
        self.distance.is_reachable()
    }

    /// Check if the path visits a node
    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n == name)
    }

    /// Check if the path traverses the edge between `a` and `b`
    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        self.edges.iter().any(|e| e.connects(a, b))
    }
}

/// Find the minimum-weight path from `start` to `end`.
///
/// Both names must exist in the map. An unreachable `end` is not an error:
/// it yields [`Distance::Unreachable`] with empty node and edge lists.
pub fn shortest_path(map: &StationMap, start: &str, end: &str) -> Result<PathResult, PathError> {
    let start_index = map
        .index_of(start)
        .ok_or_else(|| PathError::UnknownNode(start.to_string()))?;
    let end_index = map
        .index_of(end)
        .ok_or_else(|| PathError::UnknownNode(end.to_string()))?;

    let node_count = map.node_count();
    let mut distances: Vec<Option<Cost>> = vec![None; node_count];
    let mut previous: Vec<Option<usize>> = vec![None; node_count];
    let mut visited = vec![false; node_count];
    let mut frontier = BinaryHeap::new();
    let mut finalized = 0usize;

    distances[start_index] = Some(0);
    frontier.push(Reverse((0, start_index)));

    while let Some(Reverse((cost, current))) = frontier.pop() {
        if visited[current] {
            continue;
        }
        visited[current] = true;
        finalized += 1;

        // Nothing popped later can improve a finalized node
        if current == end_index {
            break;
        }

        for (neighbor, weight) in map.neighbor_indices(current) {
            let candidate = cost + Cost::from(weight);
            if distances[neighbor].map_or(true, |best| candidate < best) {
                distances[neighbor] = Some(candidate);
                previous[neighbor] = Some(current);
                frontier.push(Reverse((candidate, neighbor)));
            }
        }
    }

    let Some(distance) = distances[end_index] else {
        tracing::debug!("No path from '{}' to '{}' ({} nodes finalized)", start, end, finalized);
        return Ok(PathResult::unreachable());
    };

    // Walk predecessors back from the end until a node without one
    let mut chain = vec![end_index];
    let mut current = end_index;
    while let Some(predecessor) = previous[current] {
        chain.push(predecessor);
        current = predecessor;
    }
    chain.reverse();
    debug_assert_eq!(chain.first(), Some(&start_index));

    let nodes: Vec<String> = chain
        .iter()
        .filter_map(|&index| map.name_at(index))
        .map(str::to_string)
        .collect();
    let edges = nodes
        .windows(2)
        .map(|pair| PathEdge {
            from: pair[0].clone(),
            to: pair[1].clone(),
        })
        .collect();

    tracing::debug!(
        "Shortest path '{}' -> '{}': distance {}, {} hops ({} nodes finalized)",
        start,
        end,
        distance,
        nodes.len().saturating_sub(1),
        finalized
    );

    Ok(PathResult {
        distance: Distance::Reachable(distance),
        nodes,
        edges,
    })
}

/// Error during a shortest-path query
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Start or end is not a node of the map
    #[error("Unknown node: '{0}'")]
    UnknownNode(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapDefinition;

    fn station() -> StationMap {
        StationMap::station().unwrap()
    }

    fn path_weight(map: &StationMap, result: &PathResult) -> Cost {
        result
            .nodes
            .windows(2)
            .map(|pair| Cost::from(map.weight(&pair[0], &pair[1]).unwrap()))
            .sum()
    }

    /// Bellman-Ford style relaxation over all edges, used as a reference
    fn reference_distance(map: &StationMap, start: &str, end: &str) -> Option<Cost> {
        let mut best: std::collections::HashMap<&str, Cost> = std::collections::HashMap::new();
        best.insert(start, 0);
        loop {
            let mut changed = false;
            for edge in map.edges() {
                for (from, to) in [(edge.a, edge.b), (edge.b, edge.a)] {
                    if let Some(&d) = best.get(from) {
                        let candidate = d + Cost::from(edge.weight);
                        if best.get(to).map_or(true, |&current| candidate < current) {
                            best.insert(to, candidate);
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                return best.get(end).copied();
            }
        }
    }

    #[test]
    fn test_adjacent_platforms() {
        let result = shortest_path(&station(), "Platform 1", "Platform 3").unwrap();
        assert_eq!(result.distance, Distance::Reachable(6));
        assert_eq!(result.nodes, vec!["Platform 1", "Platform 2", "Platform 3"]);
        assert!(result.contains_edge("Platform 2", "Platform 1"));
        assert!(result.contains_edge("Platform 2", "Platform 3"));
        assert_eq!(result.edges.len(), 2);
    }

    #[test]
    fn test_route_through_restroom_beats_platform() {
        let result = shortest_path(&station(), "Platform 1", "Ticket Counter").unwrap();
        assert_eq!(result.distance, Distance::Reachable(7));
        assert_eq!(result.nodes, vec!["Platform 1", "Restroom 1", "Ticket Counter"]);
    }

    #[test]
    fn test_long_chain_to_food_court() {
        let map = station();
        let result = shortest_path(&map, "Food Court 4", "Platform 1").unwrap();

        assert_eq!(result.distance, Distance::Reachable(35));
        assert_eq!(
            result.nodes,
            vec![
                "Food Court 4",
                "Platform 10",
                "Platform 9",
                "Platform 8",
                "Platform 7",
                "Food Court 2",
                "Platform 4",
                "Platform 3",
                "Platform 2",
                "Platform 1",
            ]
        );
        assert!(!result.contains_node("Restroom 3"));
        assert_eq!(path_weight(&map, &result), 35);
    }

    #[test]
    fn test_same_start_and_end() {
        let result = shortest_path(&station(), "Platform 5", "Platform 5").unwrap();
        assert_eq!(result.distance, Distance::Reachable(0));
        assert_eq!(result.nodes, vec!["Platform 5"]);
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_unknown_node() {
        let map = station();
        assert_eq!(
            shortest_path(&map, "Platform 11", "Platform 1"),
            Err(PathError::UnknownNode("Platform 11".to_string()))
        );
        assert_eq!(
            shortest_path(&map, "Platform 1", ""),
            Err(PathError::UnknownNode(String::new()))
        );
    }

    #[test]
    fn test_unreachable_is_not_an_error() {
        let definition = MapDefinition::default()
            .with_node("North", 0.0, 0.0)
            .with_node("South", 0.0, 10.0)
            .with_node("Island", 20.0, 5.0)
            .with_edge("North", "South", 2);
        let map = StationMap::from_definition("Split", definition).unwrap();

        let result = shortest_path(&map, "North", "Island").unwrap();
        assert_eq!(result, PathResult::unreachable());
        assert_eq!(result.distance.to_string(), "unreachable");
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_equal_cost_routes() {
        let definition = MapDefinition::default()
            .with_node("A", 0.0, 0.0)
            .with_node("B", 1.0, 0.0)
            .with_node("C", 0.0, 1.0)
            .with_node("D", 1.0, 1.0)
            .with_edge("A", "B", 1)
            .with_edge("B", "D", 1)
            .with_edge("A", "C", 1)
            .with_edge("C", "D", 1);
        let map = StationMap::from_definition("Square", definition).unwrap();

        let result = shortest_path(&map, "A", "D").unwrap();
        assert_eq!(result.distance, Distance::Reachable(2));
        assert_eq!(result.nodes.len(), 3);
        assert_eq!(path_weight(&map, &result), 2);
    }

    #[test]
    fn test_all_pairs_match_reference() {
        let map = station();
        let names: Vec<_> = map.node_names().collect();

        for &start in &names {
            for &end in &names {
                let result = shortest_path(&map, start, end).unwrap();
                let cost = result.distance.cost().unwrap();

                assert_eq!(Some(cost), reference_distance(&map, start, end), "{start} -> {end}");
                assert_eq!(result.nodes.first().map(String::as_str), Some(start));
                assert_eq!(result.nodes.last().map(String::as_str), Some(end));
                assert_eq!(path_weight(&map, &result), cost);
                assert_eq!(result.edges.len() + 1, result.nodes.len());

                // Idempotent
                assert_eq!(shortest_path(&map, start, end).unwrap().distance, result.distance);
                // Undirected
                assert_eq!(shortest_path(&map, end, start).unwrap().distance, result.distance);
            }
        }
    }

    #[test]
    fn test_triangle_inequality() {
        let map = station();
        let names: Vec<_> = map.node_names().collect();
        let cost = |a: &str, b: &str| shortest_path(&map, a, b).unwrap().distance.cost().unwrap();

        for &a in &names {
            for &b in &names {
                for &c in &names {
                    assert!(cost(a, c) <= cost(a, b) + cost(b, c), "{a} {b} {c}");
                }
            }
        }
    }
}
