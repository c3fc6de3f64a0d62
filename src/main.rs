mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::anyhow;
use app::DashboardApp;
use clap::Parser;
use config::{Cli, DashboardConfig};
use data::filter::FilterState;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::from(Cli::parse());

    // The dataset is required; without it there is nothing to show.
    let store = data::store::load_once(&config.data_path).inspect_err(|e| {
        log::error!("Failed to load {}: {e:#}", config.data_path.display());
    })?;

    if config.print_summary {
        let year = config.reference_year.resolve();
        let all = data::filter::apply(store.articles(), &FilterState::all(store));
        let summary = data::aggregate::summarize(&all, year);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let source = config
        .data_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.data_path.display().to_string());
    let state = AppState::new(store, config.reference_year);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    eframe::run_native(
        "Qualis Dashboard – Scientific Articles",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state, source)))),
    )
    .map_err(|e| anyhow!("UI error: {e}"))
}
