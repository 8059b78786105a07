//! Log file setup. The terminal belongs to the UI, so logs go to a file.

use color_eyre::eyre::{Result, WrapErr as _};
use tracing_subscriber::{
    EnvFilter, Layer as _, filter::LevelFilter, layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
};

use cardfield_config::{AppConfig, LogLevel};

/// Crates whose events are written to the log.
const LOGGED_CRATES: &[&str] = &[
    "cardfield",
    "cardfield_core",
    "cardfield_config",
    "cardfield_field",
];

/// Install the file logger. Returns whether logging is enabled.
pub fn setup(config: &AppConfig) -> Result<bool> {
    if config.log_level == LogLevel::Off {
        return Ok(false);
    }

    if let Some(directory) = config.log_path.parent() {
        std::fs::create_dir_all(directory)?;
    }
    let file = std::fs::File::create(&config.log_path)
        .wrap_err_with(|| format!("Couldn't create log file at {:?}", config.log_path))?;

    let level = config.log_level.as_directive();
    let mut filters = EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .from_env_lossy();
    for name in LOGGED_CRATES {
        filters = filters.add_directive(format!("{name}={level}").parse()?);
    }

    let logfile_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_filter(filters);

    tracing_subscriber::registry().with(logfile_layer).try_init()?;
    tracing::debug!("Logging to {:?} at {level}", config.log_path);

    Ok(true)
}
