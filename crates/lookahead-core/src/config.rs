//! Configuration types for lookahead.
//!
//! [`Config::load`] reads `~/.config/lookahead/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).

use crate::error::ConfigError;
use crate::pipeline::PipelineOptions;
use crate::types::Strategy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[search]
debounce_ms = 400
strategy    = "switch"
dedupe      = true
trim        = false
min_len     = 0

[catalog]
limit = 10

[ui]
show_latency    = true
show_generation = true
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/lookahead/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// `[search]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "default_dedupe")]
    pub dedupe: bool,
    #[serde(default)]
    pub trim: bool,
    #[serde(default)]
    pub min_len: usize,
}

fn default_debounce_ms() -> u64 { 400 }
fn default_dedupe() -> bool { true }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            strategy: Strategy::default(),
            dedupe: default_dedupe(),
            trim: false,
            min_len: 0,
        }
    }
}

impl SearchConfig {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            strategy: self.strategy,
            dedupe: self.dedupe,
            trim: self.trim,
            min_len: self.min_len,
        }
    }
}

/// `[catalog]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize { 10 }

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { limit: default_limit() }
    }
}

/// `[ui]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_latency: bool,
    #[serde(default = "default_true")]
    pub show_generation: bool,
}

fn default_true() -> bool { true }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_latency: true,
            show_generation: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/lookahead/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load from an explicit path layered on top of the built-in defaults.
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("lookahead")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert_eq!(cfg.search.debounce_ms, 400);
        assert_eq!(cfg.search.strategy, Strategy::Switch);
        assert!(cfg.search.dedupe);
        assert_eq!(cfg.catalog.limit, 10);
        assert!(cfg.ui.show_latency);
    }

    #[test]
    fn defaults_match_pipeline_defaults() {
        assert_eq!(
            Config::defaults().search.pipeline_options(),
            PipelineOptions::default()
        );
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[search]\ndebounce_ms = 250\nstrategy = \"merge\"\n\n[catalog]\nlimit = 3\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.search.debounce_ms, 250);
        assert_eq!(cfg.search.strategy, Strategy::Merge);
        assert!(cfg.search.dedupe, "untouched keys keep their defaults");
        assert_eq!(cfg.catalog.limit, 3);
        assert_eq!(
            cfg.search.pipeline_options().debounce,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.search.debounce_ms, 400);
    }

    #[test]
    fn invalid_strategy_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\nstrategy = \"concat\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
