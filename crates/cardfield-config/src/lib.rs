//! Loading the user's cardfield config file.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use cardfield_core::{CellSize, FieldConfig, ManifestConfig};
use color_eyre::eyre::{ContextCompat as _, Result, WrapErr as _, bail};
use directories::ProjectDirs;
use serde::Deserialize;

/// Written to the user's config directory the first time cardfield starts.
pub static DEFAULT_CONFIG: &str = include_str!("../default_config.toml");

/// Name of the main config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The valid log levels, following `tracing`'s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    /// No logging.
    #[default]
    Off,
}

impl LogLevel {
    /// The level as a `tracing` filter directive.
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
            Self::Off => "off",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            "off" => Ok(Self::Off),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Everything in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Frames, and physics steps, per second.
    pub frame_rate: u32,
    pub log_level: LogLevel,
    /// The location of the log file.
    pub log_path: PathBuf,
    pub field: FieldConfig,
    pub manifest: ManifestConfig,
    pub cell: CellSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            log_level: LogLevel::Off,
            log_path: default_log_path(),
            field: FieldConfig::default(),
            manifest: ManifestConfig::default(),
            cell: CellSize::default(),
        }
    }
}

impl AppConfig {
    /// Parse and validate config file contents.
    pub fn parse(data: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(data).wrap_err("Couldn't parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_rate == 0 {
            bail!("frame_rate must be at least 1");
        }
        if !(self.cell.width > 0.0 && self.cell.height > 0.0) {
            bail!(
                "Cell size must be positive: {}x{}",
                self.cell.width,
                self.cell.height
            );
        }
        self.field.validate()
    }

    /// Load the config at `path`, writing the default config there first if it doesn't
    /// exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(directory) = path.parent() {
                std::fs::create_dir_all(directory)?;
            }
            std::fs::write(path, DEFAULT_CONFIG)
                .wrap_err_with(|| format!("Couldn't write default config to {path:?}"))?;
            tracing::info!("Wrote default config to {path:?}");
        }

        tracing::info!("Loading config from: {path:?}");
        let data = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Couldn't read config at {path:?}"))?;
        tracing::trace!("Using config file:\n{data}");
        Self::parse(&data).wrap_err_with(|| format!("Invalid config at {path:?}"))
    }

    /// Load from the platform's standard config location.
    pub fn load_default() -> Result<Self> {
        Self::load_or_init(&default_config_path()?)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "cardfield")
}

/// Stable location of the config file on the user's system.
pub fn default_config_path() -> Result<PathBuf> {
    let dirs = project_dirs().context("Couldn't get standard config directory")?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Platform state directory, falling back to the working directory.
fn default_log_path() -> PathBuf {
    let directory = project_dirs()
        .and_then(|dirs| dirs.state_dir().map(Path::to_path_buf))
        .or_else(|| project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("./"));
    directory.join("cardfield.log")
}
