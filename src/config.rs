use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_APP_ID: &str = "my-expense-app-v1";
const DEFAULT_LOG: &str = "warn";
const ENV_PREFIX: &str = "GASTOS";

/// Runtime settings: `config.toml` in the config directory, then `GASTOS_*`
/// environment variables on top.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Config {
    /// Namespace segment of every document path.
    pub app_id: String,
    pub data_dir: PathBuf,
    /// `tracing` filter directive, e.g. `warn` or `gastos=debug`.
    pub log: String,
}

impl Config {
    pub(crate) fn load() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("com", "gastos", "Gastos")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Self::load_from(
            &dirs.config_dir().join("config.toml"),
            dirs.data_dir(),
            None,
        )
    }

    /// `env` replaces the process environment when given.
    fn load_from(
        file: &Path,
        default_data_dir: &Path,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("app_id", DEFAULT_APP_ID)?
            .set_default("data_dir", default_data_dir.to_string_lossy().into_owned())?
            .set_default("log", DEFAULT_LOG)?
            .add_source(config::File::from(file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(env))
            .build()
            .with_context(|| format!("Failed to read config: {}", file.display()))?;
        let cfg: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        if cfg.app_id.trim().is_empty() || cfg.app_id.contains('/') {
            anyhow::bail!("Invalid app id: '{}'", cfg.app_id);
        }
        Ok(cfg)
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.data_dir.join("gastos.db")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
