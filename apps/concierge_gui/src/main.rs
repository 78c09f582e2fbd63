use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{load_settings, ConciergeClient};
use crossbeam_channel::bounded;
use tracing_subscriber::EnvFilter;

use crate::{
    backend_bridge::{commands::BackendCommand, runtime},
    controller::events::UiEvent,
    ui::ConciergeApp,
};

#[derive(Parser, Debug)]
#[command(name = "concierge_gui", about = "Desktop assistant for an Obsidian vault")]
struct Args {
    /// Base URL of the concierge API, e.g. http://localhost:8000/api/v1
    #[arg(long)]
    api_base_url: Option<String>,
    /// Settings file; defaults to concierge.toml in the working or config directory
    #[arg(long)]
    config: Option<PathBuf>,
    /// Page to open on startup
    #[arg(long)]
    page: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings =
        load_settings(args.config.as_deref()).context("failed to load concierge settings")?;
    if let Some(api_base_url) = args.api_base_url {
        settings.api_base_url = api_base_url;
    }

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let client = ConciergeClient::from_settings(&settings).context("invalid API configuration")?;
    tracing::info!(api_base_url = client.base_url(), "starting concierge gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(Arc::new(client), cmd_rx, ui_tx);

    let app = ConciergeApp::new(cmd_tx, ui_rx, args.page.as_deref())
        .context("page layout is missing required elements")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Obsidian Concierge")
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Obsidian Concierge",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|err| anyhow!("failed to run the window: {err}"))
}
