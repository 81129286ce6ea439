use std::path::PathBuf;

use clap::Parser;
use client_core::Settings;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{RentManagerApp, UiPreferences, PREFS_STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(name = "rentmanager-desktop", about = "RentManager desktop client")]
struct Args {
    /// TOML settings file; defaults to ./rentmanager.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides `api_base_url` from the settings.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = &args.api_url {
        settings = settings.with_api_base_url(url)?;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let api_url = settings.api_base_url.clone();
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("RentManager")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([860.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "RentManager",
        options,
        Box::new(move |cc| {
            let prefs = cc.storage.and_then(|storage| {
                storage
                    .get_string(PREFS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<UiPreferences>(&text).ok())
            });
            Ok(Box::new(RentManagerApp::new(cmd_tx, ui_rx, api_url, prefs)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("desktop window failed: {err}"))
}
