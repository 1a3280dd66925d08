//! Runtime settings for the `folio` binary.
//!
//! Layered lowest to highest: built-in defaults, the optional TOML file,
//! `FOLIO_*` environment variables. Command-line flags override the result.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path:   PathBuf,
  /// Months covered by `trend` and by windows given only a start.
  pub trend_months: u32,
}

impl Settings {
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings: Self = config::Config::builder()
      .set_default("store_path", "folio.db")?
      .set_default("trend_months", 6)?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("FOLIO"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")?;

    Ok(Self {
      store_path: expand_tilde(&settings.store_path),
      ..settings
    })
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let settings =
      Settings::load(Path::new("/nonexistent/folio-config.toml")).unwrap();
    assert_eq!(settings.trend_months, 6);
    assert_eq!(settings.store_path, PathBuf::from("folio.db"));
  }

  #[test]
  fn file_values_override_defaults() {
    let path = std::env::temp_dir()
      .join(format!("folio-settings-{}.toml", std::process::id()));
    std::fs::write(&path, "store_path = \"/var/lib/folio.db\"\ntrend_months = 12\n")
      .unwrap();

    let settings = Settings::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(settings.trend_months, 12);
    assert_eq!(settings.store_path, PathBuf::from("/var/lib/folio.db"));
  }

  #[test]
  fn paths_without_tilde_are_untouched() {
    assert_eq!(expand_tilde(Path::new("data/folio.db")), PathBuf::from("data/folio.db"));
  }
}
