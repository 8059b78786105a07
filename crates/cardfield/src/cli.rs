//! Command line arguments.

use std::path::PathBuf;

use cardfield_config::{AppConfig, LogLevel};
use color_eyre::eyre::Result;

/// Drifting, colliding card particles as a terminal background.
#[derive(clap::Parser, Debug, Clone, Default)]
#[command(version, about)]
pub struct CliArgs {
    /// Path to the config file. Defaults to the platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of cards.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// A card image to use instead of the manifest. `#rrggbb` draws a flat card.
    /// Repeat for more cards.
    #[arg(short, long = "asset")]
    pub assets: Vec<String>,

    /// Scheme and host serving the card manifest.
    #[arg(long)]
    pub manifest_url: Option<String>,

    /// One of error, warn, info, debug, trace or off.
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Frames per second.
    #[arg(long)]
    pub frame_rate: Option<u32>,
}

impl CliArgs {
    /// Load the config file and apply any overrides from the command line.
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_or_init(path)?,
            None => AppConfig::load_default()?,
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut AppConfig) {
        if let Some(count) = self.count {
            config.field.particle_count = Some(count);
        }
        if !self.assets.is_empty() {
            config.field.card_images = self.assets.clone();
        }
        if let Some(url) = &self.manifest_url {
            config.manifest.base_url = url.clone();
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(frame_rate) = self.frame_rate {
            config.frame_rate = frame_rate;
        }
    }
}
