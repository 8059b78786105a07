//! A single card in the field.

use cardfield_core::AssetRef;
use glam::Vec2;

use crate::sprite::Sprite;

/// Card height as a fraction of its width.
pub const CARD_ASPECT: f32 = 0.63;

/// Identifies a body for the lifetime of one simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u64);

/// Everything needed to place a new body.
#[derive(Debug, Clone)]
pub struct BodyParams {
    /// Top-left corner in field units.
    pub position: Vec2,
    /// Units per tick.
    pub velocity: Vec2,
    /// Card width; the height follows from [`CARD_ASPECT`].
    pub width: f32,
    /// Degrees.
    pub rotation: f32,
    /// Degrees per tick.
    pub rotation_speed: f32,
    pub opacity: f32,
    /// Bounciness in collisions, 1.0 being perfectly elastic.
    pub elasticity: f32,
    pub asset: AssetRef,
}

/// A card-shaped rigid body.
///
/// Size, mass and elasticity are fixed when the body is created.
#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    /// Top-left corner in field units.
    pub position: Vec2,
    /// Units per tick.
    pub velocity: Vec2,
    /// Degrees.
    pub rotation: f32,
    /// Degrees per tick.
    pub rotation_speed: f32,
    size: Vec2,
    opacity: f32,
    mass: f32,
    elasticity: f32,
    sprite: Sprite,
    /// Milliseconds left until a pending removal completes.
    removal_ms: Option<u64>,
}

impl Body {
    pub(crate) fn new(id: BodyId, params: BodyParams) -> Self {
        let width = params.width.max(f32::EPSILON);
        let size = Vec2::new(width, width * CARD_ASPECT);
        Self {
            id,
            position: params.position,
            velocity: params.velocity,
            rotation: params.rotation,
            rotation_speed: params.rotation_speed,
            size,
            opacity: params.opacity,
            mass: size.x * size.y / 1000.0,
            elasticity: params.elasticity,
            sprite: Sprite::new(params.asset, params.opacity),
            removal_ms: None,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Width and height.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn elasticity(&self) -> f32 {
        self.elasticity
    }

    /// Opacity the body was created with.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// The body's visual representation.
    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub(crate) fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    /// Half the larger side. Two bodies collide when their centres are closer than the
    /// sum of their radii, scaled down slightly so cards can visually touch.
    pub fn radius(&self) -> f32 {
        self.size.x.max(self.size.y) / 2.0
    }

    /// Whether a removal is pending.
    pub fn is_removing(&self) -> bool {
        self.removal_ms.is_some()
    }

    pub(crate) fn start_removal(&mut self, duration_ms: u64) {
        self.removal_ms = Some(duration_ms);
    }

    /// Count down a pending removal. Returns true once it has completed.
    pub(crate) fn advance_removal(&mut self, delta_ms: u64) -> bool {
        match self.removal_ms.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(delta_ms);
                *remaining == 0
            }
            None => false,
        }
    }

    /// Map a field point into the card's own frame: origin at the centre, axes aligned
    /// with the card's edges.
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let delta = point - self.center();
        Vec2::new(
            delta.x * cos + delta.y * sin,
            -delta.x * sin + delta.y * cos,
        )
    }

    /// Whether a field point lies on the rotated card.
    pub fn contains(&self, point: Vec2) -> bool {
        let local = self.to_local(point);
        let half = self.size / 2.0;
        local.x.abs() <= half.x && local.y.abs() <= half.y
    }

    /// Half extents of the axis-aligned box around the rotated card.
    pub fn rotated_half_extents(&self) -> Vec2 {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let half = self.size / 2.0;
        Vec2::new(
            (half.x * cos).abs() + (half.y * sin).abs(),
            (half.x * sin).abs() + (half.y * cos).abs(),
        )
    }
}
