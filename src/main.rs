mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::{anyhow, Context};
use app::DashboardApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::default();

    // Load once; every interaction derives its views from this snapshot.
    let log = data::loader::load_file(&config.data_path)
        .with_context(|| format!("loading {}", config.data_path.display()))
        .inspect_err(|e| log::error!("Failed to load access log: {e:#}"))?;
    log::info!(
        "Loaded {} rows from {} ({} dropped)",
        log.len(),
        config.data_path.display(),
        log.dropped
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    let state = AppState::new(Arc::new(log), config);

    eframe::run_native(
        "E-Commerce Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}
