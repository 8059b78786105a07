//! The particle field: owns the bodies and advances them one tick at a time.

use cardfield_core::{AssetRef, FieldConfig};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::body::{Body, BodyId, BodyParams};
use crate::physics;
use crate::sprite::Easing;

/// Cursor position used while the pointer is outside the field.
pub const CURSOR_ABSENT: Vec2 = Vec2::new(-1000.0, -1000.0);

/// How long a removed card takes to fade before it is replaced.
pub const REMOVAL_FADE_MS: u64 = 500;

/// How long the exit animation takes.
pub const FLY_OFF_FADE_MS: u64 = 800;

/// Range of the random particle count when none is configured.
const DEFAULT_COUNT_RANGE: std::ops::Range<usize> = 3..20;

/// Largest initial rotation speed, in degrees per tick.
const MAX_INITIAL_SPIN: f32 = 1.5;

/// Random bounciness is drawn from `MIN_ELASTICITY..1.0`.
const MIN_ELASTICITY: f32 = 0.8;

/// A field of card-shaped bodies.
#[derive(Debug)]
pub struct Simulator {
    config: FieldConfig,
    /// Field width and height in units.
    bounds: Vec2,
    cursor: Vec2,
    bodies: Vec<Body>,
    assets: Vec<AssetRef>,
    /// Bodies have been seeded.
    initialized: bool,
    /// Cleared by [`Simulator::teardown`].
    active: bool,
    flying_off: bool,
    next_id: u64,
    rng: StdRng,
}

impl Simulator {
    /// Create an empty field. Bodies are added by [`Simulator::seed`] once assets are known.
    pub fn new(config: FieldConfig, width: f32, height: f32) -> Self {
        Self::with_rng(config, width, height, StdRng::from_entropy())
    }

    /// Like [`Simulator::new`] but reproducible.
    pub fn with_seed(config: FieldConfig, width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(config, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: FieldConfig, width: f32, height: f32, rng: StdRng) -> Self {
        Self {
            config,
            bounds: Vec2::new(width, height),
            cursor: CURSOR_ABSENT,
            bodies: Vec::new(),
            assets: Vec::new(),
            initialized: false,
            active: true,
            flying_off: false,
            next_id: 0,
            rng,
        }
    }

    /// Take the resolved asset list and create the initial bodies.
    ///
    /// With no assets there is nothing to draw, so no bodies are created.
    pub fn seed(&mut self, assets: Vec<AssetRef>) {
        self.assets = assets;
        let count = match self.config.particle_count {
            Some(count) => count,
            None => self.rng.gen_range(DEFAULT_COUNT_RANGE),
        };

        for _ in 0..count {
            self.spawn();
        }
        self.initialized = true;

        tracing::debug!(
            "Seeded {} cards from {} assets in a {}x{} field",
            self.bodies.len(),
            self.assets.len(),
            self.bounds.x,
            self.bounds.y
        );
    }

    /// Add a body with fully specified parameters. Ignored once torn down.
    pub fn insert(&mut self, params: BodyParams) -> Option<BodyId> {
        if !self.active {
            return None;
        }
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.push(Body::new(id, params));
        Some(id)
    }

    /// Add a randomised body drawing from the asset list.
    fn spawn(&mut self) -> Option<BodyId> {
        let asset = self.pick_asset()?;
        let params = self.random_params(asset);
        self.insert(params)
    }

    fn pick_asset(&mut self) -> Option<AssetRef> {
        if self.assets.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.assets.len());
        self.assets.get(index).cloned()
    }

    fn random_params(&mut self, asset: AssetRef) -> BodyParams {
        let config = &self.config;
        let rng = &mut self.rng;

        let width = sample(rng, config.min_size, config.max_size);
        let height = width * crate::body::CARD_ASPECT;
        let position = Vec2::new(
            sample(rng, 0.0, self.bounds.x - width),
            sample(rng, 0.0, self.bounds.y - height),
        );
        let velocity = Vec2::new(
            sample(rng, -config.max_speed, config.max_speed),
            sample(rng, -config.max_speed, config.max_speed),
        );

        BodyParams {
            position,
            velocity,
            width,
            rotation: sample(rng, 0.0, 360.0),
            rotation_speed: sample(rng, -MAX_INITIAL_SPIN, MAX_INITIAL_SPIN),
            opacity: sample(rng, config.min_opacity, config.max_opacity),
            elasticity: sample(rng, MIN_ELASTICITY, 1.0),
            asset,
        }
    }

    /// Advance the field by one frame.
    ///
    /// Physics moves one fixed step regardless of `delta_ms`; fades and pending removals
    /// count down by `delta_ms`.
    pub fn tick(&mut self, delta_ms: u64) {
        if !self.active {
            return;
        }

        let radius = self.config.cursor_repel_radius;
        let force = self.config.cursor_repel_force;

        for i in 0..self.bodies.len() {
            let (head, tail) = self.bodies.split_at_mut(i + 1);
            let Some(body) = head.last_mut() else {
                continue;
            };

            physics::repel(body, self.cursor, radius, force, &mut self.rng);
            for other in tail.iter_mut() {
                physics::collide(body, other, &mut self.rng);
            }
            physics::integrate(body);
            physics::damp(body);
            physics::reflect(body, self.bounds);
        }

        self.advance_timers(delta_ms);
    }

    fn advance_timers(&mut self, delta_ms: u64) {
        let before = self.bodies.len();
        self.bodies.retain_mut(|body| {
            body.sprite_mut().advance(delta_ms);
            !body.advance_removal(delta_ms)
        });

        let removed = before - self.bodies.len();
        if removed > 0 {
            tracing::debug!("Replacing {removed} removed card(s)");
        }
        for _ in 0..removed {
            self.spawn();
        }
    }

    /// Fade a body out and replace it once the fade completes.
    ///
    /// Returns false for unknown bodies and bodies already being removed.
    pub fn remove(&mut self, id: BodyId) -> bool {
        if !self.active {
            return false;
        }
        let Some(body) = self.bodies.iter_mut().find(|body| body.id() == id) else {
            return false;
        };
        if body.is_removing() {
            return false;
        }

        body.sprite_mut().fade_out(REMOVAL_FADE_MS, Easing::Linear);
        body.start_removal(REMOVAL_FADE_MS);
        tracing::debug!("Removing card {id:?}");
        true
    }

    /// Remove the top-most card under a field point.
    pub fn remove_at(&mut self, x: f32, y: f32) -> Option<BodyId> {
        let point = Vec2::new(x, y);
        let id = self
            .bodies
            .iter()
            .rev()
            .find(|body| !body.is_removing() && body.contains(point))
            .map(Body::id)?;
        self.remove(id).then_some(id)
    }

    /// Remove a random card that isn't already on its way out.
    pub fn remove_random(&mut self) -> Option<BodyId> {
        let candidates: Vec<BodyId> = self
            .bodies
            .iter()
            .filter(|body| !body.is_removing())
            .map(Body::id)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let id = candidates[self.rng.gen_range(0..candidates.len())];
        self.remove(id).then_some(id)
    }

    /// Store the new field size and pull every body back inside it straight away.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.bounds = Vec2::new(width, height);
        for body in &mut self.bodies {
            let max = (self.bounds - body.size()).max(Vec2::ZERO);
            body.position = body.position.min(max);
        }
        tracing::debug!("Field resized to {width}x{height}");
    }

    /// Track the pointer, in field coordinates.
    pub fn set_cursor(&mut self, x: f32, y: f32) {
        self.cursor = Vec2::new(x, y);
    }

    /// The pointer left the field: nothing is repelled any more.
    pub fn clear_cursor(&mut self) {
        self.cursor = CURSOR_ABSENT;
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Fade every card out without removing or replacing any of them.
    pub fn fly_off(&mut self) {
        self.flying_off = true;
        for body in &mut self.bodies {
            body.sprite_mut().fade_out(FLY_OFF_FADE_MS, Easing::EaseOut);
        }
        tracing::debug!("Flying off {} cards", self.bodies.len());
    }

    /// Whether [`Simulator::fly_off`] was called and every card has faded out.
    pub fn fly_off_finished(&self) -> bool {
        self.flying_off && self.bodies.iter().all(|body| body.sprite().is_hidden())
    }

    /// Stop the field: drop every body and refuse to spawn or advance from now on.
    pub fn teardown(&mut self) {
        self.active = false;
        self.bodies.clear();
        tracing::debug!("Field torn down");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Make more assets available to cards created from now on.
    pub fn append_assets(&mut self, assets: Vec<AssetRef>) {
        if assets.is_empty() {
            return;
        }
        tracing::debug!("Adding {} card assets", assets.len());
        self.assets.extend(assets);
    }

    pub fn assets(&self) -> &[AssetRef] {
        &self.assets
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Field width and height in units.
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }
}

/// Uniform sample from `low..high`, collapsing to `low` for empty ranges.
fn sample<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}
