// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - read the effective configuration or persist a value

use crate::config::{self, Config};
use anyhow::{anyhow, Result};
use std::path::Path;

/// Print `key`, or write `key = value` to the config file
pub fn run(config_path: Option<&Path>, effective: &Config, key: &str, value: Option<String>) -> Result<()> {
    match value {
        None => {
            let current = effective.get(key).ok_or_else(|| {
                anyhow!("Unknown config key: {}. Valid: {}", key, config::KEYS.join(", "))
            })?;
            println!("{current}");
        }
        Some(value) => {
            let path = config_path
                .map(Path::to_path_buf)
                .or_else(config::default_path)
                .ok_or_else(|| anyhow!("No config location available. Pass --config <file>"))?;
            config::set_value(&path, key, &value)?;
            tracing::info!(key, value = %value, path = %path.display(), "config updated");
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}
