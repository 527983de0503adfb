//! Height-aware sight sampling against world geometry.
//!
//! Units peek over low cover but not over high cover. Several rays are cast
//! from the observer's eye to different heights and lateral offsets on the
//! target cell; the fraction that arrives unobstructed tells the caller
//! whether the target is hidden, partially covered or fully exposed.

use glam::Vec3;
use grid_tactics_core::{CollisionQuery, GridLayout, GridPosition, LayerMask};
use serde::{Deserialize, Serialize};

/// Ray fan used when sampling sight between two cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaySampling {
    /// Height of the observer's eye above its cell floor.
    pub eye_height: f32,
    /// Heights above the target floor that rays aim at.
    pub target_heights: Vec<f32>,
    /// Sideways offsets applied to every target point, perpendicular to the sight line.
    pub lateral_offsets: Vec<f32>,
    /// Layers that block sight.
    pub layers: LayerMask,
}

impl Default for RaySampling {
    fn default() -> Self {
        Self {
            eye_height: 1.6,
            target_heights: vec![0.5, 1.0, 1.5],
            lateral_offsets: vec![0.0, -0.3, 0.3],
            layers: LayerMask::LINE_OF_SIGHT_BLOCKERS,
        }
    }
}

/// Outcome of a sampled sight check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RayVisibility {
    /// Rays that reached their target point.
    pub clear: u32,
    /// Rays stopped by geometry.
    pub blocked: u32,
}

impl RayVisibility {
    /// Reports whether at least one ray reached the target.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.clear > 0
    }

    /// Reports whether every ray reached the target.
    #[must_use]
    pub const fn is_fully_exposed(&self) -> bool {
        self.clear > 0 && self.blocked == 0
    }

    /// Fraction of rays that reached the target.
    #[must_use]
    pub fn exposure(&self) -> f32 {
        let total = self.clear + self.blocked;
        if total == 0 {
            0.0
        } else {
            self.clear as f32 / total as f32
        }
    }
}

/// Samples sight from the observer standing on `from` to the cell `to`.
pub fn sample_line_of_sight<C>(
    collision: &C,
    layout: &GridLayout,
    from: GridPosition,
    to: GridPosition,
    sampling: &RaySampling,
) -> RayVisibility
where
    C: CollisionQuery + ?Sized,
{
    let eye = layout.world_position(from) + Vec3::Y * sampling.eye_height;
    let base = layout.world_position(to);
    let planar = Vec3::new(base.x - eye.x, 0.0, base.z - eye.z);
    let lateral = planar
        .try_normalize()
        .map_or(Vec3::X, |forward| Vec3::new(-forward.z, 0.0, forward.x));

    let mut visibility = RayVisibility::default();
    for height in &sampling.target_heights {
        for offset in &sampling.lateral_offsets {
            let target = base + Vec3::Y * *height + lateral * *offset;
            if collision.linecast(eye, target, sampling.layers).is_some() {
                visibility.blocked += 1;
            } else {
                visibility.clear += 1;
            }
        }
    }
    visibility
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exposure_reports_clear_fraction() {
        let partial = RayVisibility {
            clear: 6,
            blocked: 3,
        };
        assert!(partial.is_visible());
        assert!(!partial.is_fully_exposed());
        assert_relative_eq!(partial.exposure(), 2.0 / 3.0);

        let hidden = RayVisibility {
            clear: 0,
            blocked: 9,
        };
        assert!(!hidden.is_visible());
        assert_relative_eq!(RayVisibility::default().exposure(), 0.0);
    }
}
