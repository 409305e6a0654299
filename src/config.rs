use std::path::PathBuf;

use dirs::home_dir;
use log::error;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
  #[error(
    "No map access token configured. Set REGIONMAP_ACCESS_TOKEN or 'access_token' in the config file."
  )]
  MissingAccessToken,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Config {
  pub config_path: Option<PathBuf>,
  /// Credential of the map rendering backend.
  #[serde(default)]
  pub access_token: Option<String>,
  #[serde(default)]
  pub style_url: Option<String>,
  /// Base url or directory holding the boundary documents.
  #[serde(default)]
  pub asset_root: Option<String>,
}

const DEFAULT_STYLE_URL: &str = "mapbox://styles/pbhandare/cmirquboo000j01s686300mvt";
const DEFAULT_ASSET_ROOT: &str = "public";

impl Config {
  #[must_use]
  pub fn new() -> Self {
    let from_env = Self::from_env();
    let from_file = Self::from_file();
    let default = Self::default();

    let mut merged = from_env;
    if let Some(from_file) = &from_file {
      merged = merged.merge(from_file);
    }
    merged = merged.merge(&default);

    if merged.config_path.is_some() && from_file.is_none() {
      merged.init_cfg_file();
    }

    merged
  }

  /// The backend credential, which the map cannot do without.
  pub fn access_token(&self) -> Result<&str, ConfigError> {
    self
      .access_token
      .as_deref()
      .filter(|t| !t.trim().is_empty())
      .ok_or(ConfigError::MissingAccessToken)
  }

  #[must_use]
  pub fn style_url(&self) -> &str {
    self.style_url.as_deref().unwrap_or(DEFAULT_STYLE_URL)
  }

  #[must_use]
  pub fn asset_root(&self) -> &str {
    self.asset_root.as_deref().unwrap_or(DEFAULT_ASSET_ROOT)
  }

  fn from_env() -> Self {
    Self {
      config_path: std::env::var("REGIONMAP_CONFIG").ok().map(PathBuf::from),
      access_token: std::env::var("REGIONMAP_ACCESS_TOKEN").ok(),
      style_url: std::env::var("REGIONMAP_STYLE_URL").ok(),
      asset_root: std::env::var("REGIONMAP_ASSET_ROOT").ok(),
    }
  }

  /// Fills everything not set in `self` from `other`.
  fn merge(mut self, other: &Self) -> Self {
    self.config_path = self.config_path.or(other.config_path.clone());
    self.access_token = self.access_token.or(other.access_token.clone());
    self.style_url = self.style_url.or(other.style_url.clone());
    self.asset_root = self.asset_root.or(other.asset_root.clone());
    self
  }

  fn from_file() -> Option<Self> {
    let config_path = std::env::var("REGIONMAP_CONFIG")
      .ok()
      .map(PathBuf::from)
      .or_else(|| home_dir().map(|p| p.join(".config").join("regionmap")))?;
    let config_path = config_path.join("config.json");

    serde_json::from_str(&std::fs::read_to_string(&config_path).ok()?)
      .inspect_err(|e| error!("Failed to read config file: {e}"))
      .ok()?
  }

  fn init_cfg_file(&self) {
    let Some(path) = &self.config_path else {
      return;
    };
    if !path.exists() {
      let _ = std::fs::create_dir_all(path).inspect_err(|e| {
        error!("Failed to create config directory: {e}");
      });
    }

    let path = path.join("config.json");
    if path.exists() {
      return;
    }
    // The token stays out of the generated file.
    let template = Self {
      access_token: None,
      ..self.clone()
    };
    match serde_json::to_string_pretty(&template) {
      Ok(config) => {
        let _ = std::fs::write(path, config).inspect_err(|e| {
          error!("Failed to write config file: {e}");
        });
      }
      Err(e) => error!("Failed to serialize config: {e}"),
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      config_path: home_dir().map(|p| p.join(".config").join("regionmap")),
      access_token: None,
      style_url: Some(DEFAULT_STYLE_URL.to_string()),
      asset_root: Some(DEFAULT_ASSET_ROOT.to_string()),
    }
  }
}
