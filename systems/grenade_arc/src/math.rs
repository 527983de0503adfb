//! Closed-form arc geometry.
//!
//! An arc is the straight chord between the endpoints lifted by
//! `apex * height_profile(t)`. Everything here is a pure function of its
//! inputs so validation and animation see the same trajectory.

use glam::{Vec2, Vec3};

use crate::config::ArcConfig;

/// Fewest segments used to walk any arc.
pub const MIN_SEGMENTS: usize = 12;

/// Most segments used to walk any arc.
pub const MAX_SEGMENTS: usize = 40;

/// Fraction of the arc before the landing point used to measure descent.
const DESCENT_SAMPLE: f32 = 0.05;

/// Distance between two points projected onto the ground plane.
#[must_use]
pub fn horizontal_distance(start: Vec3, end: Vec3) -> f32 {
    Vec2::new(end.x - start.x, end.z - start.z).length()
}

/// Nominal apex for a throw covering `distance` horizontally.
#[must_use]
pub fn apex_for_distance(config: &ArcConfig, distance: f32) -> f32 {
    let normalized = if config.max_throw_distance > f32::EPSILON {
        (distance / config.max_throw_distance).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let exponent = config.smoothing_exponent.max(f32::EPSILON);
    let blend = config
        .apex_falloff
        .evaluate(normalized)
        .clamp(0.0, 1.0)
        .powf(exponent);
    config.near_apex_height + (config.far_apex_height - config.near_apex_height) * blend
}

/// Number of segments used to walk an arc covering `distance`.
#[must_use]
pub fn segment_count(config: &ArcConfig, distance: f32) -> usize {
    let wanted = (distance * config.segments_per_unit).ceil();
    // Float to usize casts saturate; NaN becomes zero.
    (wanted as usize).clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

/// Point on the arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn point_at(start: Vec3, end: Vec3, apex: f32, config: &ArcConfig, t: f32) -> Vec3 {
    start.lerp(end, t) + Vec3::Y * (apex * config.height_profile.evaluate(t))
}

/// Evenly spaced points from `start` to `end`, both inclusive.
#[must_use]
pub fn sample_arc(start: Vec3, end: Vec3, apex: f32, config: &ArcConfig) -> Vec<Vec3> {
    let segments = segment_count(config, horizontal_distance(start, end));
    (0..=segments)
        .map(|index| point_at(start, end, apex, config, index as f32 / segments as f32))
        .collect()
}

/// Angle below the horizon at which the arc arrives at `end`, in degrees.
#[must_use]
pub fn descent_angle_deg(start: Vec3, end: Vec3, apex: f32, config: &ArcConfig) -> f32 {
    let before = point_at(start, end, apex, config, 1.0 - DESCENT_SAMPLE);
    let landing = point_at(start, end, apex, config, 1.0);
    let delta = landing - before;
    let run = Vec2::new(delta.x, delta.z).length();
    (-delta.y).atan2(run).to_degrees()
}

/// Reports whether an arc descending at `angle_deg` may land on an obstacle top.
#[must_use]
pub fn can_land_on_obstacle(angle_deg: f32, config: &ArcConfig) -> bool {
    angle_deg >= config.min_obstacle_landing_angle_deg
}
