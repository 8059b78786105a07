//! Tunables for the particle field and the asset manifest.

use color_eyre::eyre::{Result, bail};
use serde::Deserialize;

/// All the numeric tunables of the particle field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of cards. `None` picks a random count in 3..=19 at seeding time.
    pub particle_count: Option<usize>,
    /// Smallest card width, in field units.
    pub min_size: f32,
    /// Largest card width, in field units.
    pub max_size: f32,
    pub min_opacity: f32,
    pub max_opacity: f32,
    /// Kept for config compatibility; only `max_speed` shapes initial velocity.
    pub min_speed: f32,
    /// Upper bound of each initial velocity component, in units per tick.
    pub max_speed: f32,
    /// Distance from the cursor under which cards are pushed away.
    pub cursor_repel_radius: f32,
    pub cursor_repel_force: f32,
    /// Kept for config compatibility; collisions use per-card elasticity.
    pub collision_damping: f32,
    /// Explicit asset list. When non-empty the manifest is never fetched.
    pub card_images: Vec<String>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: None,
            min_size: 40.0,
            max_size: 160.0,
            min_opacity: 0.8,
            max_opacity: 1.0,
            min_speed: 0.7,
            max_speed: 1.5,
            cursor_repel_radius: 180.0,
            cursor_repel_force: 1.5,
            collision_damping: 0.85,
            card_images: Vec::new(),
        }
    }
}

impl FieldConfig {
    /// Reject ranges the simulator can't sample from.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_size", self.min_size),
            ("max_size", self.max_size),
            ("min_opacity", self.min_opacity),
            ("max_opacity", self.max_opacity),
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
            ("cursor_repel_radius", self.cursor_repel_radius),
            ("cursor_repel_force", self.cursor_repel_force),
            ("collision_damping", self.collision_damping),
        ] {
            if !value.is_finite() {
                bail!("{name} must be a finite number, got {value}");
            }
        }

        if !(self.min_size > 0.0)
            || self.min_size > self.max_size
            || !(self.max_size - self.min_size).is_finite()
        {
            bail!(
                "Card size range is invalid: min_size={} max_size={}",
                self.min_size,
                self.max_size
            );
        }
        if !(0.0..=1.0).contains(&self.min_opacity)
            || !(0.0..=1.0).contains(&self.max_opacity)
            || self.min_opacity > self.max_opacity
        {
            bail!(
                "Opacity range must lie within 0.0-1.0: min_opacity={} max_opacity={}",
                self.min_opacity,
                self.max_opacity
            );
        }
        // Velocity is drawn from -max_speed..max_speed, so twice the bound must fit.
        if self.min_speed < 0.0
            || self.min_speed > self.max_speed
            || !(2.0 * self.max_speed).is_finite()
        {
            bail!(
                "Speed range is invalid: min_speed={} max_speed={}",
                self.min_speed,
                self.max_speed
            );
        }
        if self.cursor_repel_radius < 0.0 || self.cursor_repel_force < 0.0 {
            bail!("Cursor repel radius and force can't be negative");
        }
        Ok(())
    }
}

/// Where the card image manifest lives and how often to poll it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Scheme and host the manifest and images are served from.
    pub base_url: String,
    /// Path of the JSON array of image file names.
    pub list_path: String,
    /// Directory that the file names in the manifest are relative to.
    pub image_dir: String,
    /// Timeout for a single manifest request.
    pub timeout_secs: u64,
    /// How often to look for newly published cards. Zero disables refreshing.
    pub refresh_secs: u64,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            list_path: "/static/card-list.json".to_string(),
            image_dir: "/static/images/cards/".to_string(),
            timeout_secs: 10,
            refresh_secs: 300,
        }
    }
}

impl ManifestConfig {
    /// Full URL of the manifest.
    pub fn list_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.list_path)
    }

    /// Full URL of an image named in the manifest.
    pub fn image_url(&self, name: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url.trim_end_matches('/'),
            self.image_dir,
            name
        )
    }
}

/// Size of one terminal cell in field units.
///
/// Terminal cells are roughly twice as tall as they are wide, so the default
/// keeps cards looking like cards.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CellSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 16.0,
        }
    }
}

impl CellSize {
    /// Convert a terminal size in cells to field units.
    pub fn field_size(&self, columns: u16, rows: u16) -> (f32, f32) {
        (
            f32::from(columns) * self.width,
            f32::from(rows) * self.height,
        )
    }

    /// Field coordinates of the centre of a terminal cell.
    pub fn cell_center(&self, column: u16, row: u16) -> (f32, f32) {
        (
            (f32::from(column) + 0.5) * self.width,
            (f32::from(row) + 0.5) * self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(FieldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_ranges_rejected() {
        let config = FieldConfig {
            min_size: 200.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FieldConfig {
            max_opacity: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FieldConfig {
            min_size: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        for config in [
            FieldConfig {
                max_size: f32::NAN,
                ..Default::default()
            },
            FieldConfig {
                max_size: f32::INFINITY,
                ..Default::default()
            },
            FieldConfig {
                min_opacity: f32::NAN,
                ..Default::default()
            },
            FieldConfig {
                max_speed: f32::INFINITY,
                ..Default::default()
            },
            FieldConfig {
                cursor_repel_radius: f32::NAN,
                ..Default::default()
            },
            FieldConfig {
                cursor_repel_force: f32::NEG_INFINITY,
                ..Default::default()
            },
            FieldConfig {
                collision_damping: f32::NAN,
                ..Default::default()
            },
        ] {
            assert!(config.validate().is_err(), "accepted {config:?}");
        }
    }

    #[test]
    fn test_overflowing_ranges_rejected() {
        // Finite on their own, but the sampled span overflows f32.
        let config = FieldConfig {
            max_speed: 3.0e38,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FieldConfig {
            min_size: 1.0,
            max_size: f32::MAX,
            ..Default::default()
        };
        assert!(config.validate().is_ok(), "span of f32::MAX - 1 still fits");

        let config: FieldConfig = toml::from_str("max_size = inf").unwrap();
        assert!(config.validate().is_err());
        let config: FieldConfig = toml::from_str("cursor_repel_radius = nan").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: FieldConfig = toml::from_str("particle_count = 7\nmax_size = 90.0").unwrap();
        assert_eq!(config.particle_count, Some(7));
        assert_eq!(config.max_size, 90.0);
        assert_eq!(config.min_size, 40.0);
        assert_eq!(config.cursor_repel_radius, 180.0);
    }

    #[test]
    fn test_manifest_urls() {
        let manifest = ManifestConfig {
            base_url: "https://cards.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            manifest.list_url(),
            "https://cards.example.com/static/card-list.json"
        );
        assert_eq!(
            manifest.image_url("visa.png"),
            "https://cards.example.com/static/images/cards/visa.png"
        );
    }

    #[test]
    fn test_cell_geometry() {
        let cell = CellSize::default();
        assert_eq!(cell.field_size(80, 24), (640.0, 384.0));
        assert_eq!(cell.cell_center(0, 0), (4.0, 8.0));
    }
}
