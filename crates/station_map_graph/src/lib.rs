// SPDX-License-Identifier: MIT OR Apache-2.0
//! Station map model and route finding.
//!
//! This crate provides:
//! - An immutable weighted undirected map of named locations
//! - A built-in station map
//! - Shortest-path search (Dijkstra)
//! - An egui renderer that highlights a found route
//!
//! ## Architecture
//!
//! The [`StationMap`] is validated once at construction and only read
//! afterwards. [`shortest_path`] is a pure function of the map and two node
//! names; its [`PathResult`] is handed to the renderer in [`ui`].

pub mod map;
pub mod path;
pub mod station;
pub mod ui;

pub use map::{MapDefinition, MapError, Position, StationMap, Weight};
pub use path::{shortest_path, Distance, PathEdge, PathError, PathResult};
pub use ui::{MapStyle, MapViewResponse, MapViewState};
