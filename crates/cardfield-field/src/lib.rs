//! The card particle field.
//!
//! Cards drift around the field, bounce off its edges, knock into each other
//! with elastic collisions and scatter away from the mouse cursor. The
//! [`Simulator`] owns the cards and advances them one tick per frame; the
//! [`raster`] module draws them into a terminal grid.

mod body;
mod chars;
mod physics;
pub mod raster;
mod simulator;
mod sprite;

pub use body::{Body, BodyId, BodyParams, CARD_ASPECT};
pub use raster::{CellPaint, FieldRaster, rasterize, render};
pub use simulator::{CURSOR_ABSENT, FLY_OFF_FADE_MS, REMOVAL_FADE_MS, Simulator};
pub use sprite::{Easing, Sprite};
