// SPDX-License-Identifier: MIT OR Apache-2.0
//! Side panel implementations.

pub mod log;
pub mod route;

pub use log::{LogBridge, LogPanel};
pub use route::RoutePanel;
