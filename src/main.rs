mod api;
mod app;
mod cache;
mod config;
mod controller;
mod event;
mod logging;
mod ui;
mod validation;

use clap::Parser;
use color_eyre::Result;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::api::{EmployeeApi, HttpEmployeeClient};
use crate::cache::{PageCache, PageKey};
use crate::controller::Controller;

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "A terminal UI for managing employee records over a REST API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/roster/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the employee API
  #[arg(short, long)]
  url: Option<String>,

  /// Records per page
  #[arg(short, long)]
  page_size: Option<NonZeroU32>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over file and environment
  if let Some(url) = args.url {
    config.api.url = url;
    config.api.base_url()?;
  }
  if let Some(page_size) = args.page_size {
    config.page_size = page_size;
  }

  let _log_guard = logging::init(&config.log_level)?;
  info!(url = %config.api.url, page_size = config.page_size.get(), "starting roster");

  let api: Arc<dyn EmployeeApi> = Arc::new(HttpEmployeeClient::new(&config)?);
  let mut cache = PageCache::new(Arc::clone(&api));
  if let Some(secs) = config.stale_after_secs {
    cache = cache.with_stale_time(chrono::Duration::seconds(i64::from(secs)));
  }
  let controller = Controller::new(api, cache, PageKey::new(0, config.page_size));

  // Initialize and run the app
  let mut app = app::App::new(config, controller);
  app.run().await?;

  Ok(())
}
