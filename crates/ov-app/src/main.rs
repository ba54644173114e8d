//! Main application entry point

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use eframe::egui;
use tracing::info;

use ov_expander::ExpanderConfig;

mod app;
mod tree_panel;

use app::ObjectViewerApp;

#[derive(Parser)]
#[command(name = "objview")]
#[command(about = "Explore an object graph as a lazily expanded tree")]
struct Cli {
    /// JSON document to explore; the built-in sample graph if omitted
    file: Option<PathBuf>,

    /// Expander configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ExpanderConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExpanderConfig::default(),
    };

    info!("Starting object viewer");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    let file = cli.file;
    eframe::run_native(
        "Object Viewer",
        options,
        Box::new(move |cc| Box::new(ObjectViewerApp::new(cc, config, file))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
