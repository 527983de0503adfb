//! Swept clearance test along an arc.

use glam::Vec3;
use grid_tactics_core::CollisionQuery;
use tracing::debug;

use crate::{
    config::ArcConfig,
    math::{horizontal_distance, point_at, segment_count},
    ArcSettings,
};

/// Reports whether the arc passes over every blocker between its endpoints.
///
/// Consecutive samples are joined by capsule sweeps. The first and last
/// `end_clip` of the parameter range are skipped so the thrower and the target
/// do not block their own throw. A touched collider blocks when its top
/// reaches the segment's mean height, less `clearance_tolerance`.
pub fn is_arc_clear<C>(
    start: Vec3,
    end: Vec3,
    apex: f32,
    config: &ArcConfig,
    collision: &C,
    settings: &ArcSettings,
) -> bool
where
    C: CollisionQuery + ?Sized,
{
    let clip = settings.end_clip.clamp(0.0, 0.5);
    let (first, last) = (clip, 1.0 - clip);
    if last <= first {
        return true;
    }

    let segments = segment_count(config, horizontal_distance(start, end));
    let span = last - first;
    let mut from = point_at(start, end, apex, config, first);

    for index in 1..=segments {
        let t = first + span * (index as f32 / segments as f32);
        let to = point_at(start, end, apex, config, t);
        let mean_height = (from.y + to.y) * 0.5;

        for hit in collision.capsule_cast(from, to, settings.sweep_radius, settings.blocker_layers) {
            let top = collision
                .collider_bounds(hit.collider)
                .map_or(hit.point.y, |bounds| bounds.max().y);
            if top >= mean_height - settings.clearance_tolerance {
                debug!(t, top, mean_height, "arc blocked");
                return false;
            }
        }
        from = to;
    }
    true
}
