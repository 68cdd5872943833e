// SPDX-License-Identifier: MIT OR Apache-2.0
//! Station Map - pick two locations and see the shortest route between them.
//!
//! The viewer shows a station map (platforms, restrooms, food courts and the
//! ticket counter) with the distance of every connection. Choosing a start
//! and an end location highlights the shortest route on the map.
//!
//! ## Configuration
//!
//! Settings are read from `station_map.ron` in the working directory, or the
//! file named by `STATION_MAP_SETTINGS`. A settings file can point `map_path`
//! at a RON map definition to replace the built-in map.

mod app;
mod panels;
mod settings;

use app::MapApp;
use panels::LogBridge;
use settings::ViewerSettings;
use station_map_graph::{MapError, StationMap};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "station_map_app=debug,station_map_graph=debug,wgpu=warn,naga=warn";

fn load_map(settings: &ViewerSettings) -> Result<StationMap, MapError> {
    match &settings.map_path {
        Some(path) => {
            tracing::info!("Loading map from {}", path.display());
            StationMap::load_ron(path)
        }
        None => StationMap::station(),
    }
}

fn main() {
    // Create the activity log bridge (channel pair)
    let (bridge_layer, log_rx) = LogBridge::new();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(bridge_layer)
        .init();

    tracing::info!("Starting Station Map v{}", env!("CARGO_PKG_VERSION"));

    let settings_path = ViewerSettings::default_path();
    let settings = ViewerSettings::load_or_default(&settings_path);

    let map = match load_map(&settings) {
        Ok(map) => map,
        Err(e) => {
            tracing::error!("Invalid map: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = MapApp::new(map, settings, settings_path, Some(log_rx)).run() {
        tracing::error!("Viewer crashed: {e}");
        std::process::exit(1);
    }
}
