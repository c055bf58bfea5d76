// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material Editor - node editor demo
//!
//! A single window with two panes:
//! - a left pane listing nodes, per-node state snapshots and the selection
//! - a blueprint canvas with nodes, links, flow animation and context menus
//!
//! ## Configuration
//!
//! Settings are read from `material_editor.ron` in the working directory, or
//! from the path in `MATERIAL_EDITOR_CONFIG`. A missing file means defaults.

mod app;
mod config;
mod host;
mod panels;
mod runner;

use config::AppConfig;
use runner::Runner;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "material_editor_app=debug,material_editor_graph=info,wgpu=warn,naga=warn";

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Material Editor v{}", env!("CARGO_PKG_VERSION"));

    let config_path = AppConfig::default_path();
    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Using default configuration: {e}");
            AppConfig::default()
        }
    };

    if let Err(e) = Runner::run(config) {
        tracing::error!("Editor crashed: {e}");
        std::process::exit(1);
    }
}
