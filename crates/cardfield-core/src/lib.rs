//! Core types shared by the cardfield crates.
//!
//! Configuration for the particle field, asset references (card images and
//! generated placeholders) and the small colour helpers used to tint cards.

mod asset;
mod color;
mod config;

pub use asset::{AssetRef, AssetSource, PLACEHOLDER_PALETTE, placeholder_assets, resolve};
pub use color::{Rgb, hsl_to_rgb};
pub use config::{CellSize, FieldConfig, ManifestConfig};
