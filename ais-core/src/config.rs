//! Configuration file management for ais-decode.
//!
//! Reads/writes `~/.ais-decode/config.yaml` with decoder settings, the UDP
//! listen address, and the default log level.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::sentence::ChecksumMode;
use crate::types::{AisError, Result};

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub decoder: DecoderConfig,
    pub listen: ListenConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    pub checksum: ChecksumMode,
    /// Source id attached to every decoded message.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            decoder: DecoderConfig {
                checksum: ChecksumMode::Permissive,
                source: "default".into(),
            },
            listen: ListenConfig {
                host: "0.0.0.0".into(),
                port: 10110,
            },
            log: LogConfig {
                level: "info".into(),
            },
        }
    }
}

/// Get the config directory path (`~/.ais-decode/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".ais-decode")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.ais-decode/config.yaml`.
///
/// Returns default config if the file doesn't exist or can't be read.
pub fn load_config() -> Config {
    load_config_from(&config_file())
}

/// Load config from an explicit path, falling back to defaults.
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
            Config::default()
        }
    }
}

/// Save config to `~/.ais-decode/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf> {
    let path = config_file();
    save_config_to(&path, config)?;
    Ok(path)
}

/// Save config to an explicit path, creating parent directories.
pub fn save_config_to(path: &Path, config: &Config) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| AisError::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config)).map_err(|e| AisError::Config(e.to_string()))
}

/// Parse simple YAML-like config text. Unknown keys and bad values are
/// skipped, leaving the default in place.
fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = val.is_empty().then(|| key.to_string());
            continue;
        }

        let Some(section) = current_section.as_deref() else {
            continue;
        };
        match (section, key) {
            ("decoder", "checksum") => match val.parse::<ChecksumMode>() {
                Ok(mode) => config.decoder.checksum = mode,
                Err(e) => warn!(value = val, error = %e, "ignoring decoder.checksum"),
            },
            ("decoder", "source") => {
                if let Some(v) = parse_string_value(val) {
                    config.decoder.source = v;
                }
            }
            ("listen", "host") => {
                if let Some(v) = parse_string_value(val) {
                    config.listen.host = v;
                }
            }
            ("listen", "port") => match val.parse::<u16>() {
                Ok(v) => config.listen.port = v,
                Err(_) => warn!(value = val, "ignoring listen.port"),
            },
            ("log", "level") => {
                if let Some(v) = parse_string_value(val) {
                    config.log.level = v;
                }
            }
            _ => {}
        }
    }

    config
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let lines = [
        "# ais-decode configuration".to_string(),
        String::new(),
        "decoder:".into(),
        format!("  checksum: {}", config.decoder.checksum),
        format!("  source: \"{}\"", config.decoder.source),
        String::new(),
        "listen:".into(),
        format!("  host: \"{}\"", config.listen.host),
        format!("  port: {}", config.listen.port),
        String::new(),
        "log:".into(),
        format!("  level: \"{}\"", config.log.level),
    ];
    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
