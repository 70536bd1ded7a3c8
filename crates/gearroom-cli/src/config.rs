use anyhow::{Context, Result};
use confyg::{env, Confygery};
use gearroom_core::{FormColumns, ItemColumns};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for gearroom.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (GEAR_* prefix)
/// 3. Config file (~/.config/gearroom/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Spreadsheet column layout for booking and inventory rows.
    #[serde(default)]
    pub columns: Columns,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of: trace, debug, info, warn, error.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_coloured")]
    pub coloured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            coloured: default_coloured(),
        }
    }
}

impl LoggingConfig {
    /// The configured level; unknown names fall back to info.
    pub fn level(&self) -> twyg::LogLevel {
        match self.level.to_ascii_lowercase().as_str() {
            "trace" => twyg::LogLevel::Trace,
            "debug" => twyg::LogLevel::Debug,
            "warn" | "warning" => twyg::LogLevel::Warn,
            "error" => twyg::LogLevel::Error,
            _ => twyg::LogLevel::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Columns {
    #[serde(default)]
    pub forms: FormColumns,

    #[serde(default)]
    pub items: ItemColumns,
}

fn default_level() -> String {
    String::from("info")
}

const fn default_coloured() -> bool {
    true
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/gearroom/config.toml
    /// Reads environment variables with GEAR_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("gear");
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        Ok(config)
    }
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/gearroom/config.toml
/// - macOS: ~/Library/Application Support/gearroom/config.toml
/// - Windows: %APPDATA%\gearroom\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gearroom")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Gearroom Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (GEAR_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

[logging]
# One of: trace, debug, info, warn, error
level = "info"
coloured = true

# Zero-based column offsets of a booking row in the bookings sheet.
# The defaults match the order gearroom exports with `gearroom export`.
[columns.forms]
id = 0
start_time = 1
end_time = 2
location = 3
booking_id = 4
booked_students = 5
contact = 6
project = 7
tape = 8
overnight = 9
students = 10
items = 11
notes = 12

# Zero-based column offsets of an inventory row.
[columns.items]
barcode = 0
id = 1
make = 2
model = 3
description = 4
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.coloured);
        assert_eq!(config.columns.forms, FormColumns::default());
        assert_eq!(config.columns.items, ItemColumns::default());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.columns.forms, FormColumns::default());
        assert_eq!(config.columns.items, ItemColumns::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[columns.items]\ndescription = 9\n").unwrap();
        assert_eq!(config.columns.items.description, 9);
        assert_eq!(config.columns.items.barcode, 0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let logging = LoggingConfig {
            level: String::from("loud"),
            coloured: false,
        };
        assert!(matches!(logging.level(), twyg::LogLevel::Info));
    }
}
