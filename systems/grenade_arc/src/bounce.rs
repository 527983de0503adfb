//! Impact deflection for thrown projectiles.

use glam::Vec3;
use grid_tactics_core::{CollisionQuery, LayerMask};
use serde::{Deserialize, Serialize};

/// Offset applied along the surface normal so a bounced projectile starts outside the collider.
const SURFACE_SKIN: f32 = 0.01;

/// Energy retained when a projectile strikes a surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceSettings {
    /// Fraction of the normal speed kept after impact.
    pub restitution: f32,
    /// Fraction of the tangential speed removed by impact.
    pub friction: f32,
}

impl Default for BounceSettings {
    fn default() -> Self {
        Self {
            restitution: 0.4,
            friction: 0.2,
        }
    }
}

/// Projectile state right after an impact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounce {
    /// Impact point, lifted off the surface.
    pub point: Vec3,
    /// Surface normal at the impact.
    pub normal: Vec3,
    /// Velocity leaving the surface.
    pub velocity: Vec3,
}

/// Reflects `velocity` off a surface with the given normal.
///
/// Velocities already leaving the surface are returned unchanged.
#[must_use]
pub fn deflect(velocity: Vec3, normal: Vec3, settings: &BounceSettings) -> Vec3 {
    let Some(normal) = normal.try_normalize() else {
        return velocity;
    };
    let approach = velocity.dot(normal);
    if approach >= 0.0 {
        return velocity;
    }

    let normal_part = normal * approach;
    let tangent_part = velocity - normal_part;
    tangent_part * (1.0 - settings.friction.clamp(0.0, 1.0))
        - normal_part * settings.restitution.clamp(0.0, 1.0)
}

/// Resolves the first impact of a projectile moving from `from` to `to`.
pub fn resolve_bounce<C>(
    collision: &C,
    from: Vec3,
    to: Vec3,
    velocity: Vec3,
    layers: LayerMask,
    settings: &BounceSettings,
) -> Option<Bounce>
where
    C: CollisionQuery + ?Sized,
{
    let hit = collision.linecast(from, to, layers)?;
    Some(Bounce {
        point: hit.point + hit.normal * SURFACE_SKIN,
        normal: hit.normal,
        velocity: deflect(velocity, hit.normal, settings),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn deflection_reverses_and_damps_normal_speed() {
        let settings = BounceSettings {
            restitution: 0.5,
            friction: 0.25,
        };
        let out = deflect(Vec3::new(4.0, -2.0, 0.0), Vec3::Y, &settings);

        assert_relative_eq!(out.x, 3.0);
        assert_relative_eq!(out.y, 1.0);
        assert_relative_eq!(out.z, 0.0);
    }

    #[test]
    fn departing_velocity_is_untouched() {
        let velocity = Vec3::new(1.0, 2.0, 0.0);
        assert_eq!(deflect(velocity, Vec3::Y, &BounceSettings::default()), velocity);
        assert_eq!(deflect(velocity, Vec3::ZERO, &BounceSettings::default()), velocity);
    }
}
