//! Geometry query surface consumed by the spatial solvers.
//!
//! The core never keeps its own copy of world geometry. Edge baking, the
//! height-aware visibility rays, the explosion reach flood and the grenade arc
//! solver all ask an implementation of [`CollisionQuery`] for ground truth and
//! treat its answers as authoritative.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Bit set selecting which collision layers a query considers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(u32);

impl LayerMask {
    /// Mask that matches no layer.
    pub const NONE: Self = Self(0);
    /// Mask that matches every layer.
    pub const ALL: Self = Self(u32::MAX);
    /// Thin walls and doors that occlude and block movement across cell borders.
    pub const EDGE_BLOCKERS: Self = Self(1 << 0);
    /// Crates, sandbags and half walls that provide cover.
    pub const COVER: Self = Self(1 << 1);
    /// Geometry that blocks unit-to-unit sight rays.
    pub const LINE_OF_SIGHT_BLOCKERS: Self = Self(1 << 2);
    /// Solid obstacles that occupy whole cells and stop blast pressure.
    pub const OBSTACLES: Self = Self(1 << 3);
    /// Ceilings and overhangs probed when shaping grenade arcs.
    pub const CEILING: Self = Self(1 << 4);
    /// Geometry a thrown projectile collides with while in flight.
    pub const ARC_BLOCKERS: Self = Self(1 << 5);

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bit representation of the mask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Mask matching every layer selected by either operand.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Reports whether the two masks share at least one layer.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

/// Opaque handle assigned to a collider by the geometry backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(u32);

impl ColliderId {
    /// Creates a collider identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Creates a box spanning the two corners in any order.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a box from its center and half extents.
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Lower corner of the box.
    #[must_use]
    pub const fn min(&self) -> Vec3 {
        self.min
    }

    /// Upper corner of the box.
    #[must_use]
    pub const fn max(&self) -> Vec3 {
        self.max
    }

    /// Center point of the box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Reports whether the point lies strictly inside the box.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpgt(self.min).all() && point.cmplt(self.max).all()
    }

    /// Reports whether the two boxes overlap with non-zero volume.
    ///
    /// Boxes that merely touch along a face do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
    }

    /// Returns the box grown by `amount` along every axis.
    #[must_use]
    pub fn expanded(&self, amount: f32) -> Self {
        let grow = Vec3::splat(amount.max(0.0));
        Self {
            min: self.min - grow,
            max: self.max + grow,
        }
    }
}

/// Contact reported by a ray or sweep query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Collider that was struck.
    pub collider: ColliderId,
    /// World-space contact point.
    pub point: Vec3,
    /// Surface normal at the contact point.
    pub normal: Vec3,
    /// Distance travelled along the query before the contact.
    pub distance: f32,
}

/// Query surface offered by the physics/collision backend.
///
/// Implementations must be deterministic: the same geometry and the same
/// query must always yield the same answer, since several solvers run once to
/// validate an action and again to animate it.
pub trait CollisionQuery {
    /// Casts a ray and returns the closest hit within `max_distance`.
    ///
    /// Colliders containing the ray origin are ignored.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit>;

    /// Casts a ray and returns every hit within `max_distance`, nearest first.
    fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Vec<RayHit>;

    /// Reports whether any collider on `layers` overlaps the box.
    fn overlap_box(&self, center: Vec3, half_extents: Vec3, layers: LayerMask) -> bool;

    /// Sweeps a capsule of `radius` from `start` to `end`, returning every
    /// collider touched on the way, nearest first.
    fn capsule_cast(&self, start: Vec3, end: Vec3, radius: f32, layers: LayerMask)
        -> Vec<RayHit>;

    /// World-space bounds of a collider, if it still exists.
    fn collider_bounds(&self, collider: ColliderId) -> Option<Aabb>;

    /// Casts a ray between two points and returns the closest hit on the segment.
    fn linecast(&self, from: Vec3, to: Vec3, layers: LayerMask) -> Option<RayHit> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }
        self.raycast(from, delta / length, length, layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_normalizes_corners() {
        let aabb = Aabb::new(Vec3::new(2.0, 0.0, 3.0), Vec3::new(-1.0, 4.0, 1.0));
        assert_eq!(aabb.min(), Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(aabb.max(), Vec3::new(2.0, 4.0, 3.0));
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let left = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let right = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(!left.intersects(&right));
        assert!(left.expanded(0.01).intersects(&right));
    }

    #[test]
    fn layer_masks_compose() {
        let mask = LayerMask::COVER.union(LayerMask::OBSTACLES);
        assert!(mask.intersects(LayerMask::COVER));
        assert!(!mask.intersects(LayerMask::CEILING));
        assert!(!LayerMask::NONE.intersects(LayerMask::ALL));
    }
}
