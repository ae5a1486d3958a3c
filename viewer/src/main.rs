use clap::Parser;
use config::{ViewerConfig, DEFAULT_BASE_URL};
use shelfcore::prelude::DEFAULT_STATS_WINDOW_DAYS;
use std::path::PathBuf;

mod app;
mod config;
mod views;

use app::Viewer;

#[derive(Parser)]
#[command(author, version, about = "Desktop client for the bookshelf analyzer service")]
struct Args {
    /// Load the viewer config from YAML (overrides the flags below)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the detection and statistics service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Trailing window of the statistics chart, in days
    #[arg(long, default_value_t = DEFAULT_STATS_WINDOW_DAYS)]
    stats_days: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.config {
        ViewerConfig::load(path)?
    } else {
        ViewerConfig::from_args(args.base_url, args.stats_days)?
    };
    log::info!(
        "viewer using {} with a {}-day stats window",
        config.base_url,
        config.stats_window_days
    );

    iced::application(
        move || Viewer::boot(config.clone()),
        Viewer::update,
        Viewer::view,
    )
    .title(application_title)
    .theme(application_theme)
    .run()
    .map_err(|err| anyhow::anyhow!("viewer window failed: {err}"))
}

fn application_title(_: &Viewer) -> String {
    "Анализатор книжного шкафа".into()
}

fn application_theme(_: &Viewer) -> iced::Theme {
    iced::Theme::Light
}
