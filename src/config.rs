// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Layers, lowest first: built-in defaults, the TOML config file,
//! `BOMTREE_*` environment variables.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys accepted in the config file
pub const KEYS: &[&str] = &["data_dir", "log_level", "strict_targets", "color"];

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the document store
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Fail operations whose target item does not exist
    pub strict_targets: bool,
    /// Colored terminal output
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: project_dirs()
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".bomtree")),
            log_level: "info".to_string(),
            strict_targets: true,
            color: true,
        }
    }
}

impl Config {
    /// Effective value of `key` as text
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(self.data_dir.display().to_string()),
            "log_level" => Some(self.log_level.clone()),
            "strict_targets" => Some(self.strict_targets.to_string()),
            "color" => Some(self.color.to_string()),
            _ => None,
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "hyperpolymath", "bomtree")
}

/// Default location of the config file
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration from `path` (or the default location) and the
/// environment, on top of the defaults
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = Config::default();
    let mut builder = ::config::Config::builder()
        .set_default("data_dir", defaults.data_dir.display().to_string())?
        .set_default("log_level", defaults.log_level)?
        .set_default("strict_targets", defaults.strict_targets)?
        .set_default("color", defaults.color)?;

    if let Some(file) = path.map(Path::to_path_buf).or_else(default_path) {
        builder = builder.add_source(
            ::config::File::from(file)
                .format(::config::FileFormat::Toml)
                .required(false),
        );
    }

    builder
        .add_source(::config::Environment::with_prefix("BOMTREE"))
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Invalid configuration")
}

/// Write `key = value` into the TOML file at `path`, keeping other keys
pub fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut table = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        content
            .parse::<toml::Table>()
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        toml::Table::new()
    };

    let parsed = match key {
        "strict_targets" | "color" => toml::Value::Boolean(
            value
                .parse()
                .with_context(|| format!("{key} expects true or false, got {value}"))?,
        ),
        "data_dir" | "log_level" => toml::Value::String(value.to_string()),
        other => bail!("Unknown config key: {}. Valid: {}", other, KEYS.join(", ")),
    };
    table.insert(key.to_string(), parsed);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(&table).context("Failed to serialize config")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
