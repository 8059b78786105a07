//! Colour utilities for card tinting.

use ratatui::style::Color;

/// Image cards are tinted fairly vivid so neighbouring cards stay distinguishable.
const IMAGE_TINT_SATURATION: f32 = 0.65;

/// Mid lightness keeps tints clear of black and white, so the darker rim and the
/// opacity shading still read on top of them.
const IMAGE_TINT_LIGHTNESS: f32 = 0.5;

/// A plain 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Scale every channel by `factor` (0.0 = black, 1.0 = unchanged).
    pub fn scaled(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * factor).round() as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// Stable hue derived from an arbitrary name, for cards backed by images
    /// that cannot be drawn in a terminal.
    pub fn from_name(name: &str) -> Self {
        // FNV-1a
        let hash = name.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        });
        let hue = (hash % 360) as f32;
        hsl_to_rgb(hue, IMAGE_TINT_SATURATION, IMAGE_TINT_LIGHTNESS)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

/// Convert a hue in degrees (any value, wrapped into 0-360) plus saturation and
/// lightness in 0.0-1.0 to an [`Rgb`].
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb {
    let saturation = saturation.clamp(0.0, 1.0);
    let lightness = lightness.clamp(0.0, 1.0);
    let to_byte = |channel: f32| (channel * 255.0).round() as u8;

    if saturation == 0.0 {
        let grey = to_byte(lightness);
        return Rgb::new(grey, grey, grey);
    }

    let upper = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let lower = 2.0 * lightness - upper;
    let turn = hue.rem_euclid(360.0) / 360.0;

    let channel = |offset: f32| to_byte(hue_channel(lower, upper, turn + offset));
    Rgb::new(channel(1.0 / 3.0), channel(0.0), channel(-1.0 / 3.0))
}

/// One RGB channel for a position on the colour wheel, in turns.
fn hue_channel(lower: f32, upper: f32, turn: f32) -> f32 {
    let t = turn.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        lower + (upper - lower) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        upper
    } else if t < 2.0 / 3.0 {
        lower + (upper - lower) * (2.0 / 3.0 - t) * 6.0
    } else {
        lower
    }
}
