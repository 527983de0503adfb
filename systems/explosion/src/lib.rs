#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Directional reach flood for blast pressure.
//!
//! Pressure spreads outward ring by ring. Each candidate cell is tested with a
//! single ray from the origin; once a ray in some direction strikes an
//! obstacle, the cell in front of the obstacle is reached and that direction
//! stays closed for every farther ring.

use std::collections::BTreeSet;

use glam::Vec3;
use grid_tactics_core::{CollisionQuery, GridLayout, GridPosition, LayerMask};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ray parameters used while flooding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionSettings {
    /// Height above the floor at which pressure rays travel.
    pub ray_height: f32,
    /// Layers that stop pressure.
    pub obstacle_layers: LayerMask,
    /// Distance pulled back from a hit point before resolving the reached cell.
    pub face_nudge: f32,
}

impl Default for ExplosionSettings {
    fn default() -> Self {
        Self {
            ray_height: 0.5,
            obstacle_layers: LayerMask::OBSTACLES,
            face_nudge: 0.05,
        }
    }
}

/// Reach solver that reuses its blocked-direction scratch set between calls.
#[derive(Debug, Default)]
pub struct ExplosionSolver {
    settings: ExplosionSettings,
    blocked: FxHashSet<(i32, i32)>,
}

impl ExplosionSolver {
    /// Creates a solver using the provided ray settings.
    #[must_use]
    pub fn new(settings: ExplosionSettings) -> Self {
        Self {
            settings,
            blocked: FxHashSet::default(),
        }
    }

    /// Ray settings used by the solver.
    #[must_use]
    pub fn settings(&self) -> &ExplosionSettings {
        &self.settings
    }

    /// Cells reached by pressure from `origin` within `radius_tiles`.
    ///
    /// The origin is always reached. An origin outside the grid reaches
    /// nothing. Candidates are visited ring by ring, then by row and column,
    /// so the result only depends on the geometry and the arguments.
    pub fn compute_reach<C>(
        &mut self,
        layout: &GridLayout,
        collision: &C,
        origin: GridPosition,
        radius_tiles: u32,
    ) -> BTreeSet<GridPosition>
    where
        C: CollisionQuery + ?Sized,
    {
        let mut reached = BTreeSet::new();
        if !layout.is_valid(origin) {
            warn!(?origin, "explosion origin lies outside the grid");
            return reached;
        }
        let _ = reached.insert(origin);
        self.blocked.clear();

        let radius = i32::try_from(radius_tiles).unwrap_or(i32::MAX);
        let radius_sq = i64::from(radius) * i64::from(radius);
        let widest = i32::try_from(layout.width().max(layout.height())).unwrap_or(i32::MAX);
        let lift = Vec3::Y * self.settings.ray_height;
        let from = layout.world_position(origin) + lift;

        for ring in 1..=radius.min(widest) {
            for dz in -ring..=ring {
                for dx in -ring..=ring {
                    if dx.abs().max(dz.abs()) != ring {
                        continue;
                    }
                    if i64::from(dx) * i64::from(dx) + i64::from(dz) * i64::from(dz) > radius_sq {
                        continue;
                    }
                    let candidate = origin.offset(dx, dz);
                    if !layout.is_valid(candidate) {
                        continue;
                    }
                    let direction = reduce_direction(dx, dz);
                    if self.blocked.contains(&direction) {
                        continue;
                    }

                    let to = layout.world_position(candidate) + lift;
                    match collision.linecast(from, to, self.settings.obstacle_layers) {
                        None => {
                            let _ = reached.insert(candidate);
                        }
                        Some(hit) => {
                            let back = (to - from).normalize_or_zero() * self.settings.face_nudge;
                            let face = layout
                                .grid_position(hit.point - back)
                                .with_floor(origin.floor());
                            if layout.is_valid(face) {
                                let _ = reached.insert(face);
                            }
                            let _ = self.blocked.insert(direction);
                        }
                    }
                }
            }
        }

        debug!(
            ?origin,
            radius_tiles,
            reached = reached.len(),
            blocked = self.blocked.len(),
            "explosion reach computed"
        );
        reached
    }
}

/// Integer direction `(dx, dz)` divided by its greatest common divisor.
fn reduce_direction(dx: i32, dz: i32) -> (i32, i32) {
    let divisor = gcd(dx.unsigned_abs(), dz.unsigned_abs());
    if divisor == 0 {
        return (0, 0);
    }
    let divisor = i32::try_from(divisor).unwrap_or(1);
    (dx / divisor, dz / divisor)
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let remainder = a % b;
        a = b;
        b = remainder;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_reduce_by_common_divisor() {
        assert_eq!(reduce_direction(4, 2), (2, 1));
        assert_eq!(reduce_direction(-3, 0), (-1, 0));
        assert_eq!(reduce_direction(-6, -9), (-2, -3));
        assert_eq!(reduce_direction(0, 0), (0, 0));
    }
}
