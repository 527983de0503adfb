#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory collision backend built from axis-aligned boxes.
//!
//! [`BoxWorld`] answers every [`CollisionQuery`] with exact slab tests and is
//! deterministic: hits are ordered by distance, then by collider identifier.

use glam::Vec3;
use grid_tactics_core::{Aabb, ColliderId, CollisionQuery, LayerMask, RayHit};

/// Axis-aligned box collider assigned to a set of layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxCollider {
    bounds: Aabb,
    layers: LayerMask,
}

impl BoxCollider {
    /// World-space bounds of the collider.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Layers the collider belongs to.
    #[must_use]
    pub const fn layers(&self) -> LayerMask {
        self.layers
    }
}

/// Collection of box colliders addressed by stable identifiers.
#[derive(Clone, Debug, Default)]
pub struct BoxWorld {
    colliders: Vec<Option<BoxCollider>>,
}

impl BoxWorld {
    /// Creates an empty collision world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collider and returns its identifier.
    pub fn add(&mut self, bounds: Aabb, layers: LayerMask) -> ColliderId {
        let id = ColliderId::new(u32::try_from(self.colliders.len()).unwrap_or(u32::MAX));
        self.colliders.push(Some(BoxCollider { bounds, layers }));
        id
    }

    /// Removes a collider, returning it if it existed.
    pub fn remove(&mut self, collider: ColliderId) -> Option<BoxCollider> {
        self.colliders
            .get_mut(collider.get() as usize)
            .and_then(Option::take)
    }

    /// Looks up a live collider.
    #[must_use]
    pub fn collider(&self, collider: ColliderId) -> Option<&BoxCollider> {
        self.colliders
            .get(collider.get() as usize)
            .and_then(Option::as_ref)
    }

    /// Number of live colliders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colliders.iter().flatten().count()
    }

    /// Reports whether no collider is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self, layers: LayerMask) -> impl Iterator<Item = (ColliderId, &BoxCollider)> + '_ {
        self.colliders
            .iter()
            .enumerate()
            .filter_map(move |(index, collider)| {
                let collider = collider.as_ref()?;
                if !collider.layers.intersects(layers) {
                    return None;
                }
                let id = ColliderId::new(u32::try_from(index).ok()?);
                Some((id, collider))
            })
    }
}

impl CollisionQuery for BoxWorld {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<RayHit> {
        self.raycast_all(origin, direction, max_distance, layers)
            .into_iter()
            .next()
    }

    fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Vec<RayHit> {
        let Some(direction) = direction.try_normalize() else {
            return Vec::new();
        };

        let mut hits: Vec<RayHit> = self
            .iter(layers)
            .filter(|(_, collider)| !collider.bounds.contains(origin))
            .filter_map(|(id, collider)| {
                let (distance, normal) = slab_entry(&collider.bounds, origin, direction)?;
                (distance <= max_distance).then_some(RayHit {
                    collider: id,
                    point: origin + direction * distance,
                    normal,
                    distance,
                })
            })
            .collect();
        sort_hits(&mut hits);
        hits
    }

    fn overlap_box(&self, center: Vec3, half_extents: Vec3, layers: LayerMask) -> bool {
        let probe = Aabb::from_center_half_extents(center, half_extents);
        self.iter(layers)
            .any(|(_, collider)| collider.bounds.intersects(&probe))
    }

    fn capsule_cast(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        layers: LayerMask,
    ) -> Vec<RayHit> {
        let delta = end - start;
        let length = delta.length();
        let direction = delta.try_normalize();

        let mut hits: Vec<RayHit> = self
            .iter(layers)
            .filter_map(|(id, collider)| {
                let swept = collider.bounds.expanded(radius);
                if swept.contains(start) {
                    return Some(RayHit {
                        collider: id,
                        point: start,
                        normal: direction.map_or(Vec3::Y, |direction| -direction),
                        distance: 0.0,
                    });
                }
                let direction = direction?;
                let (distance, normal) = slab_entry(&swept, start, direction)?;
                (distance <= length).then_some(RayHit {
                    collider: id,
                    point: start + direction * distance,
                    normal,
                    distance,
                })
            })
            .collect();
        sort_hits(&mut hits);
        hits
    }

    fn collider_bounds(&self, collider: ColliderId) -> Option<Aabb> {
        self.collider(collider).map(BoxCollider::bounds)
    }
}

/// Entry distance and face normal of a normalized ray against the box.
fn slab_entry(bounds: &Aabb, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
    let min = bounds.min();
    let max = bounds.max();
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() <= f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let inv = d.recip();
        let near = ((min[axis] - o) * inv).min((max[axis] - o) * inv);
        let far = ((min[axis] - o) * inv).max((max[axis] - o) * inv);
        if near > t_enter {
            t_enter = near;
            normal = Vec3::ZERO;
            normal[axis] = -d.signum();
        }
        t_exit = t_exit.min(far);
    }

    if t_enter > t_exit || t_enter < 0.0 {
        return None;
    }
    Some((t_enter, normal))
}

fn sort_hits(hits: &mut [RayHit]) {
    hits.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.collider.cmp(&b.collider))
    });
}
