#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grenade trajectory solver.
//!
//! Given the thrower's hand and the target point, the solver picks an apex
//! from the configured distance falloff, lowers it under any ceiling, checks
//! that the arc clears intervening geometry and, for obstacle targets, that it
//! falls steeply enough to land on top. The same inputs always yield the same
//! plan, so a throw validated during targeting animates identically.

use glam::Vec3;
use grid_tactics_core::{CollisionQuery, LayerMask};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub mod apex;
pub mod bounce;
pub mod clearance;
pub mod config;
pub mod math;

pub use apex::ceiling_clamped_apex;
pub use bounce::{deflect, resolve_bounce, Bounce, BounceSettings};
pub use clearance::is_arc_clear;
pub use config::{ArcConfig, Curve, CurveKey};
pub use math::{
    apex_for_distance, can_land_on_obstacle, descent_angle_deg, horizontal_distance, point_at,
    sample_arc, segment_count, MAX_SEGMENTS, MIN_SEGMENTS,
};

/// Probe parameters shared by the apex and clearance solvers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcSettings {
    /// Layers probed for ceilings above the throw.
    pub ceiling_layers: LayerMask,
    /// Gap kept between the arc and any ceiling.
    pub ceiling_clearance: f32,
    /// Extra length added to every upward ceiling probe.
    pub ceiling_probe_margin: f32,
    /// Interior chord points probed for ceilings.
    pub ceiling_samples: u32,
    /// Layers the projectile collides with in flight.
    pub blocker_layers: LayerMask,
    /// Radius of the swept projectile.
    pub sweep_radius: f32,
    /// Fraction of the arc skipped at each end during clearance sweeps.
    pub end_clip: f32,
    /// Allowance below the segment height before a touched collider blocks.
    pub clearance_tolerance: f32,
}

impl Default for ArcSettings {
    fn default() -> Self {
        Self {
            ceiling_layers: LayerMask::CEILING,
            ceiling_clearance: 0.3,
            ceiling_probe_margin: 0.5,
            ceiling_samples: 8,
            blocker_layers: LayerMask::ARC_BLOCKERS,
            sweep_radius: 0.1,
            end_clip: 0.1,
            clearance_tolerance: 0.05,
        }
    }
}

/// Kind of surface the grenade is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandingSurface {
    /// Open floor.
    Ground,
    /// Top of an obstacle; requires a steep enough descent.
    Obstacle,
}

/// Accepted throw ready to be animated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ThrowPlan {
    /// Horizontal distance covered.
    pub distance: f32,
    /// Apex prescribed by the falloff curve.
    pub nominal_apex: f32,
    /// Apex actually used after ceiling clamping.
    pub apex: f32,
    /// Descent angle at the landing point, in degrees.
    pub descent_angle_deg: f32,
    /// Sampled trajectory from start to end.
    pub points: Vec<Vec3>,
}

/// Reasons a throw is refused.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ThrowRejection {
    /// The target lies beyond the maximum throw distance.
    #[error("target is {distance} units away, beyond the {max} unit limit")]
    OutOfRange {
        /// Horizontal distance to the target.
        distance: f32,
        /// Configured maximum distance.
        max: f32,
    },
    /// Geometry blocks the arc.
    #[error("arc with apex {apex} is blocked")]
    ArcBlocked {
        /// Apex of the blocked arc.
        apex: f32,
    },
    /// The arc falls too shallowly to land on an obstacle.
    #[error("descent of {angle_deg} degrees is shallower than the required {minimum_deg}")]
    LandingTooShallow {
        /// Achieved descent angle.
        angle_deg: f32,
        /// Required descent angle.
        minimum_deg: f32,
    },
}

/// Validates a throw and produces its trajectory.
///
/// A missing configuration falls back to [`ArcConfig::fallback`].
pub fn plan_throw<C>(
    start: Vec3,
    end: Vec3,
    landing: LandingSurface,
    config: Option<&ArcConfig>,
    collision: &C,
    settings: &ArcSettings,
) -> Result<ThrowPlan, ThrowRejection>
where
    C: CollisionQuery + ?Sized,
{
    let fallback;
    let config = match config {
        Some(config) => config,
        None => {
            warn!("no arc configuration supplied; using the straight-ramp fallback");
            fallback = ArcConfig::fallback();
            &fallback
        }
    };

    let distance = horizontal_distance(start, end);
    if distance > config.max_throw_distance {
        return Err(ThrowRejection::OutOfRange {
            distance,
            max: config.max_throw_distance,
        });
    }

    let nominal_apex = apex_for_distance(config, distance);
    let apex = ceiling_clamped_apex(start, end, config, collision, settings);
    if !is_arc_clear(start, end, apex, config, collision, settings) {
        return Err(ThrowRejection::ArcBlocked { apex });
    }

    let angle = descent_angle_deg(start, end, apex, config);
    if landing == LandingSurface::Obstacle && !can_land_on_obstacle(angle, config) {
        return Err(ThrowRejection::LandingTooShallow {
            angle_deg: angle,
            minimum_deg: config.min_obstacle_landing_angle_deg,
        });
    }

    Ok(ThrowPlan {
        distance,
        nominal_apex,
        apex,
        descent_angle_deg: angle,
        points: sample_arc(start, end, apex, config),
    })
}
