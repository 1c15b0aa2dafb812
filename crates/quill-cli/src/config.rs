//! Layered settings: TOML file, then `QUILL_*` environment, then flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_STORE_PATH: &str = "~/.local/share/quill/storage.db";
const DEFAULT_LOG_FILE: &str = "~/.local/share/quill/quill.log";

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Everything the binary needs to reach the backend and keep its session.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// Backend address, e.g. `http://localhost:8080`.
  pub base_url:     String,
  /// Sent as `x-api-key` on every request.
  #[serde(default)]
  pub api_key:      Option<String>,
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default = "default_log_file")]
  pub log_file:     PathBuf,
  #[serde(default = "default_login_path")]
  pub login_path:   String,
  #[serde(default)]
  pub routes:       RouteOverrides,
}

/// Per-collection route overrides, keyed by the collection's plural noun.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteOverrides {
  #[serde(default, alias = "blogs")]
  pub posts:    Option<RouteOverride>,
  #[serde(default, alias = "careers")]
  pub listings: Option<RouteOverride>,
}

/// Any subset of a collection's routes. `{id}` is substituted in `update`
/// and `remove`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteOverride {
  pub list:     Option<String>,
  pub list_key: Option<String>,
  pub create:   Option<String>,
  pub update:   Option<String>,
  pub remove:   Option<String>,
}

fn default_store_path() -> PathBuf { PathBuf::from(DEFAULT_STORE_PATH) }

fn default_timeout_secs() -> u64 { 30 }

fn default_log_file() -> PathBuf { PathBuf::from(DEFAULT_LOG_FILE) }

fn default_login_path() -> String { "/login".to_owned() }

// ─── Loading ──────────────────────────────────────────────────────────────────

/// Command-line values that take precedence over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub url:      Option<String>,
  pub api_key:  Option<String>,
  pub store:    Option<PathBuf>,
  pub log_file: Option<PathBuf>,
}

fn path_value(path: Option<PathBuf>) -> Option<String> {
  path.map(|p| p.to_string_lossy().into_owned())
}

/// Build [`Settings`] from `file` (optional), the environment and `flags`.
pub fn load(file: &Path, flags: Overrides) -> Result<Settings> {
  let mut settings: Settings = config::Config::builder()
    .add_source(config::File::from(file).required(false))
    .add_source(
      config::Environment::with_prefix("QUILL")
        .prefix_separator("_")
        .separator("__"),
    )
    .set_override_option("base_url", flags.url)?
    .set_override_option("api_key", flags.api_key)?
    .set_override_option("store_path", path_value(flags.store))?
    .set_override_option("log_file", path_value(flags.log_file))?
    .build()
    .with_context(|| format!("failed to read config from {}", file.display()))?
    .try_deserialize()
    .context("invalid configuration (is base_url set?)")?;

  settings.store_path = expand_tilde(&settings.store_path);
  settings.log_file = expand_tilde(&settings.log_file);
  Ok(settings)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
