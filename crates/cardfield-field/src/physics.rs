//! Per-tick motion: cursor repulsion, pairwise collisions, integration and walls.

use glam::Vec2;
use rand::Rng;

use crate::body::Body;

/// Velocity kept per tick.
pub const VELOCITY_DAMPING: f32 = 0.99;
/// Rotation speed kept per tick.
pub const SPIN_DAMPING: f32 = 0.97;
/// Speed kept when bouncing off a wall.
pub const WALL_RESTITUTION: f32 = 0.9;
/// Fraction of the overlap each body is pushed back after a collision.
pub const SEPARATION: f32 = 0.6;
/// Divisor applied to the summed sizes to get the collision distance.
pub const COLLISION_SPREAD: f32 = 2.2;

/// Push a body away from the cursor when it is within `radius`.
///
/// A cursor sitting exactly on the body's centre has no direction to push in, so the body
/// is left alone. Returns whether an impulse was applied.
pub fn repel<R: Rng + ?Sized>(
    body: &mut Body,
    cursor: Vec2,
    radius: f32,
    force: f32,
    rng: &mut R,
) -> bool {
    let delta = body.center() - cursor;
    let distance = delta.length();
    if distance >= radius || distance == 0.0 {
        return false;
    }

    let strength = (radius - distance) / radius * force * 2.0;
    body.velocity += delta / distance * strength;
    body.rotation_speed += rng.gen_range(-1.0..1.0);
    true
}

/// Elastic impulse between two overlapping bodies that are moving towards each other.
///
/// Returns whether the pair was resolved.
pub fn collide<R: Rng + ?Sized>(a: &mut Body, b: &mut Body, rng: &mut R) -> bool {
    let delta = b.center() - a.center();
    let distance = delta.length();
    let min_distance = (a.radius() + b.radius()) * 2.0 / COLLISION_SPREAD;

    // Coincident centres have no collision normal.
    if distance >= min_distance || distance == 0.0 {
        return false;
    }

    let normal = delta / distance;
    let velocity_along_normal = (b.velocity - a.velocity).dot(normal);
    if velocity_along_normal > 0.0 {
        return false;
    }

    let restitution = (a.elasticity() + b.elasticity()) / 2.0;
    let impulse = -(1.0 + restitution) * velocity_along_normal
        / (1.0 / a.mass() + 1.0 / b.mass());

    a.velocity -= normal * (impulse / a.mass());
    b.velocity += normal * (impulse / b.mass());

    a.rotation_speed += rng.gen_range(-1.0..1.0);
    b.rotation_speed += rng.gen_range(-1.0..1.0);

    let separation = normal * ((min_distance - distance) * SEPARATION);
    a.position -= separation;
    b.position += separation;
    true
}

/// Advance position and rotation by one tick.
pub fn integrate(body: &mut Body) {
    body.position += body.velocity;
    body.rotation = (body.rotation + body.rotation_speed).rem_euclid(360.0);
}

pub fn damp(body: &mut Body) {
    body.velocity *= VELOCITY_DAMPING;
    body.rotation_speed *= SPIN_DAMPING;
}

/// Keep a body inside `bounds`, bouncing it back inwards off whichever wall it crossed.
///
/// A body larger than the field on some axis is pinned to 0 on that axis.
pub fn reflect(body: &mut Body, bounds: Vec2) {
    let max = (bounds - body.size()).max(Vec2::ZERO);

    if body.position.x < 0.0 {
        body.position.x = 0.0;
        body.velocity.x = body.velocity.x.abs() * WALL_RESTITUTION;
    } else if body.position.x > max.x {
        body.position.x = max.x;
        body.velocity.x = -body.velocity.x.abs() * WALL_RESTITUTION;
    }

    if body.position.y < 0.0 {
        body.position.y = 0.0;
        body.velocity.y = body.velocity.y.abs() * WALL_RESTITUTION;
    } else if body.position.y > max.y {
        body.position.y = max.y;
        body.velocity.y = -body.velocity.y.abs() * WALL_RESTITUTION;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::body::{Body, BodyId, tests::params};

    fn body(x: f32, y: f32, width: f32, velocity: Vec2) -> Body {
        let mut body = Body::new(BodyId(0), params(x, y, width));
        body.velocity = velocity;
        body
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_equal_mass_head_on_swaps_velocities() {
        let mut a = body(100.0, 100.0, 100.0, Vec2::new(1.0, 0.0));
        let mut b = body(180.0, 100.0, 100.0, Vec2::new(-1.0, 0.0));

        assert!(collide(&mut a, &mut b, &mut rng()));

        assert!((a.velocity.x + 1.0).abs() < 1e-5, "{:?}", a.velocity);
        assert!((b.velocity.x - 1.0).abs() < 1e-5, "{:?}", b.velocity);
        assert!(a.velocity.y.abs() < 1e-6);
        assert!(b.velocity.y.abs() < 1e-6);
    }

    #[test]
    fn test_collision_never_decreases_separation() {
        let cases = [
            (Vec2::new(2.0, 0.5), Vec2::new(-1.0, 0.0)),
            (Vec2::new(0.0, 0.0), Vec2::new(-3.0, -1.0)),
            // Already separating: no impulse, no correction.
            (Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)),
        ];

        for (va, vb) in cases {
            let mut a = body(100.0, 100.0, 80.0, va);
            let mut b = body(150.0, 120.0, 120.0, vb);
            let before = a.center().distance(b.center());
            collide(&mut a, &mut b, &mut rng());
            let after = a.center().distance(b.center());
            assert!(after >= before, "{before} -> {after}");
        }
    }

    #[test]
    fn test_impulse_scales_with_inverse_mass() {
        let mut light = body(100.0, 100.0, 40.0, Vec2::new(1.0, 0.0));
        let mut heavy = body(120.0, 80.0, 120.0, Vec2::new(-1.0, 0.0));
        let light_before = light.velocity;
        let heavy_before = heavy.velocity;

        assert!(collide(&mut light, &mut heavy, &mut rng()));

        let light_change = (light.velocity - light_before).length();
        let heavy_change = (heavy.velocity - heavy_before).length();
        assert!(light_change > heavy_change);

        // Equal and opposite impulses: change in velocity times mass matches.
        let light_impulse = light_change * light.mass();
        let heavy_impulse = heavy_change * heavy.mass();
        assert!((light_impulse - heavy_impulse).abs() < 1e-3 * light_impulse);
    }

    #[test]
    fn test_coincident_centres_are_skipped() {
        let mut a = body(100.0, 100.0, 100.0, Vec2::new(1.0, 0.0));
        let mut b = body(100.0, 100.0, 100.0, Vec2::new(-1.0, 0.0));

        assert!(!collide(&mut a, &mut b, &mut rng()));
        assert!(a.velocity.is_finite() && b.velocity.is_finite());
        assert!(a.position.is_finite() && b.position.is_finite());
    }

    #[test]
    fn test_distant_bodies_do_not_collide() {
        let mut a = body(0.0, 0.0, 40.0, Vec2::new(1.0, 0.0));
        let mut b = body(300.0, 0.0, 40.0, Vec2::new(-1.0, 0.0));
        assert!(!collide(&mut a, &mut b, &mut rng()));
        assert_eq!(a.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_repel_pushes_away_from_cursor() {
        let mut b = body(100.0, 100.0, 100.0, Vec2::ZERO);
        let cursor = b.center() - Vec2::new(90.0, 0.0);

        assert!(repel(&mut b, cursor, 180.0, 1.5, &mut rng()));
        // (180 - 90) / 180 * 1.5 * 2
        assert!((b.velocity.x - 1.5).abs() < 1e-5);
        assert!(b.velocity.y.abs() < 1e-6);
    }

    #[test]
    fn test_repel_with_cursor_on_centre_is_guarded() {
        let mut b = body(100.0, 100.0, 100.0, Vec2::new(0.5, -0.5));
        let spin = b.rotation_speed;
        let center = b.center();

        assert!(!repel(&mut b, center, 180.0, 1.5, &mut rng()));
        assert_eq!(b.velocity, Vec2::new(0.5, -0.5));
        assert_eq!(b.rotation_speed, spin);
    }

    #[test]
    fn test_repel_outside_radius() {
        let mut b = body(100.0, 100.0, 100.0, Vec2::ZERO);
        assert!(!repel(&mut b, Vec2::new(-1000.0, -1000.0), 180.0, 1.5, &mut rng()));
        assert_eq!(b.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_reflect_off_walls() {
        let bounds = Vec2::new(400.0, 300.0);

        let mut b = body(-5.0, 10.0, 100.0, Vec2::new(-2.0, 0.0));
        reflect(&mut b, bounds);
        assert_eq!(b.position.x, 0.0);
        assert!((b.velocity.x - 1.8).abs() < 1e-6);

        let mut b = body(310.0, 250.0, 100.0, Vec2::new(2.0, 1.0));
        reflect(&mut b, bounds);
        assert_eq!(b.position, Vec2::new(300.0, 237.0));
        assert!((b.velocity.x + 1.8).abs() < 1e-6);
        assert!((b.velocity.y + 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_reflect_body_larger_than_field() {
        let mut b = body(20.0, 5.0, 500.0, Vec2::new(1.0, 1.0));
        reflect(&mut b, Vec2::new(400.0, 400.0));
        assert_eq!(b.position.x, 0.0);
        assert_eq!(b.position.y, 5.0);
    }

    #[test]
    fn test_integrate_and_damp() {
        let mut b = body(10.0, 10.0, 100.0, Vec2::new(1.0, -2.0));
        b.rotation = 359.0;
        b.rotation_speed = 2.0;

        integrate(&mut b);
        assert_eq!(b.position, Vec2::new(11.0, 8.0));
        assert!((b.rotation - 1.0).abs() < 1e-4);

        damp(&mut b);
        assert!((b.velocity.x - 0.99).abs() < 1e-6);
        assert!((b.rotation_speed - 1.94).abs() < 1e-6);
    }
}
