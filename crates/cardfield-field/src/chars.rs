//! Glyphs used to draw cards.

/// Shade glyphs from faint to solid.
pub const SHADE_CHARS: &[char] = &['░', '▒', '▓', '█'];

/// Below this opacity a card cell is left blank.
pub const MIN_VISIBLE_OPACITY: f32 = 0.05;

/// Pick a shade glyph for an opacity, or `None` when the cell should stay blank.
pub fn shade_char(opacity: f32) -> Option<char> {
    if opacity < MIN_VISIBLE_OPACITY {
        None
    } else if opacity > 0.75 {
        Some(SHADE_CHARS[3])
    } else if opacity > 0.5 {
        Some(SHADE_CHARS[2])
    } else if opacity > 0.25 {
        Some(SHADE_CHARS[1])
    } else {
        Some(SHADE_CHARS[0])
    }
}
