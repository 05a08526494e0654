use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{Error, Result, schema::LookoutConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "lookout.toml",
    "lookout.yaml",
    "lookout.yml",
    "lookout.json",
];

const APP_NAME: &str = "lookout";

/// Env var holding the Discord bot token.
pub const TOKEN_ENV: &str = "LOOKOUT_DISCORD_TOKEN";
/// Accepted when [`TOKEN_ENV`] is unset; older deployments export this name.
pub const LEGACY_TOKEN_ENV: &str = "TOKEN";
pub const CHANNELS_PATH_ENV: &str = "LOOKOUT_CHANNELS_PATH";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<LookoutConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./lookout.{toml,yaml,yml,json}` (project-local)
/// 2. `<config_dir>/lookout.{toml,yaml,yml,json}` (user-global)
///
/// Returns `LookoutConfig::default()` if no config file is found or the one
/// found cannot be parsed. Env overrides are applied either way.
pub fn discover_and_load() -> LookoutConfig {
    let mut config = match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                LookoutConfig::default()
            })
        },
        None => {
            debug!("no config file found, using defaults");
            LookoutConfig::default()
        },
    };
    apply_env_overrides(&mut config);
    config
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (e.g. `~/.config/lookout/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|d| d.config_dir().to_path_buf())
}

/// Returns the user data directory, or `.` when the platform has none.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Overlay values from the process environment onto `config`.
pub fn apply_env_overrides(config: &mut LookoutConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

/// Implementation behind [`apply_env_overrides`], testable without touching
/// the process environment.
fn apply_env_overrides_with(config: &mut LookoutConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty(TOKEN_ENV).or_else(|| non_empty(LEGACY_TOKEN_ENV)) {
        config.discord.token = Some(Secret::new(token.trim().to_string()));
    }
    if let Some(path) = non_empty(CHANNELS_PATH_ENV) {
        config.storage.channels_path = Some(PathBuf::from(path));
    }
}

fn parse_config(raw: &str, path: &Path) -> Result<LookoutConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}
