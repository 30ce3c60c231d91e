use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  /// Records per page in the listing
  pub page_size: NonZeroU32,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
  /// Log filter used when RUST_LOG is not set
  pub log_level: String,
  /// Cached pages older than this are refetched; unset means only writes
  /// expire them
  pub stale_after_secs: Option<u32>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig::default(),
      page_size: NonZeroU32::new(8).unwrap_or(NonZeroU32::MIN),
      title: None,
      log_level: "info".to_string(),
      stale_after_secs: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Base URL the `employees` resource lives under
  pub url: String,
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: DEFAULT_BASE_URL.to_string(),
      timeout_secs: 10,
    }
  }
}

impl ApiConfig {
  /// Parsed base URL, always ending in `/` so relative paths join beneath it.
  pub fn base_url(&self) -> Result<Url> {
    let mut raw = self.url.trim().to_string();
    if !raw.ends_with('/') {
      raw.push('/');
    }
    let url = Url::parse(&raw).map_err(|e| eyre!("Invalid API url {}: {}", self.url, e))?;
    if url.cannot_be_a_base() {
      return Err(eyre!("API url {} cannot be used as a base", self.url));
    }
    Ok(url)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./roster.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/roster/config.yaml
  ///
  /// Without a file the defaults apply. `ROSTER_API_URL` overrides the url.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var("ROSTER_API_URL") {
      config.api.url = url;
    }

    // Fail early on a bad url rather than on the first request
    config.api.base_url()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("roster.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("roster").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> serde_yaml::Result<Self> {
    serde_yaml::from_str(contents)
  }

  /// Header title: configured title or the API host
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    self
      .api
      .base_url()
      .ok()
      .and_then(|u| {
        let host = u.host_str()?.to_string();
        Some(match u.port() {
          Some(port) => format!("{}:{}", host, port),
          None => host,
        })
      })
      .unwrap_or_else(|| self.api.url.clone())
  }
}
