//! Configuration loading
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Unparseable values at one level are logged and skipped, so resolution
//! falls through to the next level.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::params::ScaleMode;
use crate::{Error, Result};

pub const ENV_DATA_ROOT: &str = "HEATMAP_DATA_ROOT";
pub const ENV_HOST: &str = "HEATMAP_HOST";
pub const ENV_PORT: &str = "HEATMAP_COMPARE_PORT";
pub const ENV_DEFAULT_SCALE: &str = "HEATMAP_DEFAULT_SCALE";
pub const ENV_WIDTH: &str = "HEATMAP_WIDTH";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_WIDTH: f64 = 900.0;

/// Where series documents are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRoot {
    Directory(PathBuf),
    /// Base URL, stored without a trailing slash
    Url(String),
}

impl DataRoot {
    /// `http://` and `https://` prefixes select a URL root, anything else a directory
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataRoot::Url(trimmed.trim_end_matches('/').to_string())
        } else {
            DataRoot::Directory(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for DataRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataRoot::Directory(path) => write!(f, "{}", path.display()),
            DataRoot::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub data_root: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub default_scale: Option<String>,
    pub width: Option<f64>,
}

impl FileConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_root: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub default_scale: Option<String>,
    pub width: Option<f64>,
    /// Explicit config file; must exist when given
    pub config_file: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapConfig {
    pub data_root: DataRoot,
    pub host: String,
    pub port: u16,
    pub default_scale: ScaleMode,
    /// Renderer viewport width in pixels
    pub width: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            data_root: DataRoot::Directory(default_data_root()),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            default_scale: ScaleMode::default(),
            width: DEFAULT_WIDTH,
        }
    }
}

impl HeatmapConfig {
    /// Resolve every setting from CLI, environment, config file and defaults
    pub fn resolve(cli: &ConfigOverrides) -> Result<Self> {
        let file = match &cli.config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!("Config file not found: {}", path.display())));
                }
                FileConfig::load(path)?
            }
            None => match find_config_file() {
                Some(path) => {
                    debug!(path = %path.display(), "Loading config file");
                    FileConfig::load(&path).unwrap_or_else(|e| {
                        warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                        FileConfig::default()
                    })
                }
                None => FileConfig::default(),
            },
        };
        Ok(Self::resolve_with(cli, &file))
    }

    /// Resolve against an already loaded config file
    pub fn resolve_with(cli: &ConfigOverrides, file: &FileConfig) -> Self {
        let defaults = Self::default();

        let data_root = cli
            .data_root
            .clone()
            .or_else(|| env_string(ENV_DATA_ROOT))
            .or_else(|| file.data_root.clone())
            .map(|s| DataRoot::parse(&s))
            .unwrap_or(defaults.data_root);

        let host = cli
            .host
            .clone()
            .or_else(|| env_string(ENV_HOST))
            .or_else(|| file.host.clone())
            .unwrap_or(defaults.host);

        let port = cli
            .port
            .or_else(|| env_parsed(ENV_PORT))
            .or(file.port)
            .unwrap_or(defaults.port);

        let default_scale = cli
            .default_scale
            .as_deref()
            .and_then(|s| parse_scale("command line", s))
            .or_else(|| env_string(ENV_DEFAULT_SCALE).and_then(|s| parse_scale(ENV_DEFAULT_SCALE, &s)))
            .or_else(|| file.default_scale.as_deref().and_then(|s| parse_scale("config file", s)))
            .unwrap_or(defaults.default_scale);

        let width = cli
            .width
            .or_else(|| env_parsed(ENV_WIDTH))
            .or(file.width)
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(defaults.width);

        Self {
            data_root,
            host,
            port,
            default_scale,
            width,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_string(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}

fn parse_scale(origin: &str, value: &str) -> Option<ScaleMode> {
    let mode = ScaleMode::from_str(value);
    if mode.is_none() {
        warn!(origin, value, "Ignoring unknown scale mode");
    }
    mode
}

/// Config file location: user config dir first, then `/etc` on Linux
pub fn find_config_file() -> Option<PathBuf> {
    let user = dirs::config_dir().map(|d| d.join("heatmaps").join("config.toml"));
    if let Some(path) = user.filter(|p| p.exists()) {
        return Some(path);
    }
    if cfg!(target_os = "linux") {
        let system = PathBuf::from("/etc/heatmaps/config.toml");
        if system.exists() {
            return Some(system);
        }
    }
    None
}

/// Compiled default data directory
pub fn default_data_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("heatmaps").join("data"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}
