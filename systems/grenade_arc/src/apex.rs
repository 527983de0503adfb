//! Ceiling-aware apex selection.

use glam::Vec3;
use grid_tactics_core::CollisionQuery;
use tracing::debug;

use crate::{
    config::ArcConfig,
    math::{apex_for_distance, horizontal_distance},
    ArcSettings,
};

/// Highest apex not exceeding the configured one that keeps clear of ceilings.
///
/// Upward probes are cast from interior points of the chord. A ceiling hit at
/// or below both endpoints is not above the throw and is ignored; any other
/// hit caps the apex so the arc passes `ceiling_clearance` beneath it. Without
/// hits the nominal apex is returned unchanged.
pub fn ceiling_clamped_apex<C>(
    start: Vec3,
    end: Vec3,
    config: &ArcConfig,
    collision: &C,
    settings: &ArcSettings,
) -> f32
where
    C: CollisionQuery + ?Sized,
{
    let nominal = apex_for_distance(config, horizontal_distance(start, end));
    let floor = start.y.min(end.y);
    let samples = settings.ceiling_samples.max(1);
    let mut apex = nominal;

    for index in 1..=samples {
        let t = index as f32 / (samples + 1) as f32;
        let shape = config.height_profile.evaluate(t);
        if shape <= f32::EPSILON {
            continue;
        }

        let base = start.lerp(end, t);
        let reach = nominal * shape + settings.ceiling_clearance + settings.ceiling_probe_margin;
        let Some(hit) = collision.raycast(base, Vec3::Y, reach, settings.ceiling_layers) else {
            continue;
        };
        if hit.point.y <= floor {
            continue;
        }

        let cap = ((hit.point.y - settings.ceiling_clearance - base.y) / shape).max(0.0);
        if cap < apex {
            debug!(t, ceiling = hit.point.y, cap, "ceiling caps arc apex");
            apex = cap;
        }
    }
    apex
}
