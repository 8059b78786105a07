//! Card asset references and the resolution order for the asset list.

use std::fmt::Display;

use crate::color::Rgb;
use crate::config::ManifestConfig;

/// Fill colours of the generated placeholder cards.
pub const PLACEHOLDER_PALETTE: [&str; 6] = [
    "#1a73e8", "#ea4335", "#34a853", "#fbbc04", "#673ab7", "#ff6d00",
];

/// A reference to the image a card is drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetRef {
    /// A card image at some URL or path.
    Image(String),
    /// A flat rounded rectangle generated locally.
    Placeholder {
        /// Fill colour.
        color: Rgb,
        /// SVG data URI of the rendered placeholder.
        uri: String,
    },
}

impl AssetRef {
    /// Build a generated placeholder: a 200x125 rounded rectangle filled with `color`.
    pub fn placeholder(color: Rgb) -> Self {
        let fill = color.to_hex().replace('#', "%23");
        let uri = format!(
            "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='200' \
             height='125' viewBox='0 0 200 125'%3E%3Crect width='200' height='125' rx='8' \
             fill='{fill}' /%3E%3C/svg%3E"
        );
        Self::Placeholder { color, uri }
    }

    /// Interpret a user-supplied reference. A bare `#rrggbb` becomes a placeholder card
    /// of that colour, anything else is treated as an image reference.
    pub fn from_reference(reference: &str) -> Self {
        match Rgb::from_hex(reference) {
            Some(color) => Self::placeholder(color),
            None => Self::Image(reference.to_string()),
        }
    }

    /// The reference as it would be handed to an image renderer.
    pub fn uri(&self) -> &str {
        match self {
            Self::Image(url) => url,
            Self::Placeholder { uri, .. } => uri,
        }
    }

    /// The colour a terminal draws this card with.
    pub fn color(&self) -> Rgb {
        match self {
            Self::Image(url) => Rgb::from_name(url),
            Self::Placeholder { color, .. } => *color,
        }
    }
}

/// Where a resolved asset list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    /// The config or command line named the assets.
    Explicit,
    /// The remote manifest listed them.
    Manifest,
    /// The manifest was unusable so placeholders were generated.
    Placeholders,
}

/// The six generated placeholder cards.
pub fn placeholder_assets() -> Vec<AssetRef> {
    PLACEHOLDER_PALETTE
        .iter()
        .filter_map(|hex| Rgb::from_hex(hex))
        .map(AssetRef::placeholder)
        .collect()
}

/// Resolve the asset list: explicit references win, then the manifest, then placeholders.
///
/// `fetch` is only called when there are no explicit references. An empty manifest is
/// treated the same as a failed one, since it would leave nothing to draw.
pub fn resolve<E, F>(
    explicit: &[String],
    manifest: &ManifestConfig,
    fetch: F,
) -> (Vec<AssetRef>, AssetSource)
where
    E: Display,
    F: FnOnce() -> Result<Vec<String>, E>,
{
    if !explicit.is_empty() {
        let assets = explicit
            .iter()
            .map(|reference| AssetRef::from_reference(reference))
            .collect();
        return (assets, AssetSource::Explicit);
    }

    match fetch() {
        Ok(names) if !names.is_empty() => {
            tracing::debug!("Manifest listed {} card images", names.len());
            let assets = names
                .iter()
                .map(|name| AssetRef::Image(manifest.image_url(name)))
                .collect();
            (assets, AssetSource::Manifest)
        }
        Ok(_) => {
            tracing::warn!("Card manifest is empty, using generic card colours");
            (placeholder_assets(), AssetSource::Placeholders)
        }
        Err(error) => {
            tracing::warn!("Couldn't load card manifest ({error}), using generic card colours");
            (placeholder_assets(), AssetSource::Placeholders)
        }
    }
}
