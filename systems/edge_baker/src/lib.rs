#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bakes wall, cover and walkability flags from world geometry.
//!
//! The baker never mutates the world directly. It probes the collision
//! backend and emits the [`Command`] batch that brings the path node store in
//! line with the geometry; the world mirrors every wall onto the neighboring
//! cell when the batch is applied.

use glam::Vec3;
use grid_tactics_core::{
    BakeRegion, Command, CollisionQuery, CoverKind, Direction, GridLayout, GridPosition, LayerMask,
    NodeView,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Probe dimensions and layers used while baking.
///
/// Heights are measured from the floor of the probed cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeBakeSettings {
    /// Lower bound of the wall probe band.
    pub wall_band_bottom: f32,
    /// Upper bound of the wall probe band.
    pub wall_band_top: f32,
    /// Thickness of the wall probe across the border.
    pub wall_thickness: f32,
    /// Fraction of the border length covered by every probe.
    pub edge_coverage: f32,
    /// Lower bound of the low cover band.
    pub low_cover_bottom: f32,
    /// Upper bound of the low cover band.
    pub low_cover_top: f32,
    /// Lower bound of the high cover band.
    pub high_cover_bottom: f32,
    /// Upper bound of the high cover band.
    pub high_cover_top: f32,
    /// Depth of the cover probes across the border.
    pub cover_depth: f32,
    /// Layers treated as walls.
    pub wall_layers: LayerMask,
    /// Layers treated as cover.
    pub cover_layers: LayerMask,
    /// Layers that make a cell unwalkable.
    pub obstacle_layers: LayerMask,
    /// Half width of the column probed for obstacles at a cell centre.
    pub walkability_footprint: f32,
    /// Height above the floor up to which obstacles make a cell unwalkable.
    pub walkability_probe_height: f32,
}

impl Default for EdgeBakeSettings {
    fn default() -> Self {
        Self {
            wall_band_bottom: 0.3,
            wall_band_top: 1.8,
            wall_thickness: 0.1,
            edge_coverage: 0.8,
            low_cover_bottom: 0.2,
            low_cover_top: 0.9,
            high_cover_bottom: 1.1,
            high_cover_top: 1.8,
            cover_depth: 0.4,
            wall_layers: LayerMask::EDGE_BLOCKERS,
            cover_layers: LayerMask::COVER,
            obstacle_layers: LayerMask::OBSTACLES,
            walkability_footprint: 0.1,
            walkability_probe_height: 1.0,
        }
    }
}

/// Axis-aligned probe volume.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Probe {
    center: Vec3,
    half_extents: Vec3,
}

impl Probe {
    fn hits<C>(&self, collision: &C, layers: LayerMask) -> bool
    where
        C: CollisionQuery + ?Sized,
    {
        collision.overlap_box(self.center, self.half_extents, layers)
    }
}

/// Pure system that turns geometry probes into wall and cover commands.
#[derive(Clone, Debug, Default)]
pub struct EdgeBaker {
    settings: EdgeBakeSettings,
}

impl EdgeBaker {
    /// Creates a baker using the provided probe settings.
    #[must_use]
    pub fn new(settings: EdgeBakeSettings) -> Self {
        Self { settings }
    }

    /// Probe settings used by the baker.
    #[must_use]
    pub fn settings(&self) -> &EdgeBakeSettings {
        &self.settings
    }

    /// Clears and re-probes every border of the grid.
    pub fn bake_all<C>(&self, nodes: NodeView<'_>, collision: &C, out: &mut Vec<Command>)
    where
        C: CollisionQuery + ?Sized,
    {
        self.bake_region(nodes, collision, BakeRegion::Entire, out);
    }

    /// Clears and re-probes the square neighborhood around `center`.
    ///
    /// Used after a localized geometry change such as a door opening.
    pub fn rebake_around<C>(
        &self,
        nodes: NodeView<'_>,
        collision: &C,
        center: GridPosition,
        radius: u32,
        out: &mut Vec<Command>,
    ) where
        C: CollisionQuery + ?Sized,
    {
        self.bake_region(nodes, collision, BakeRegion::Around { center, radius }, out);
    }

    /// Derives walkability from obstacle geometry.
    ///
    /// Only cells whose walkability differs from the store are reported.
    pub fn bake_walkability<C>(&self, nodes: NodeView<'_>, collision: &C, out: &mut Vec<Command>)
    where
        C: CollisionQuery + ?Sized,
    {
        let layout = nodes.layout();
        let mut changed = 0_usize;

        for cell in layout.positions() {
            let blocked = walkability_column(layout, &self.settings, cell)
                .hits(collision, self.settings.obstacle_layers);
            if nodes.is_walkable(cell) == blocked {
                out.push(Command::SetWalkable {
                    cell,
                    walkable: !blocked,
                });
                changed += 1;
            }
        }

        debug!(changed, "walkability baked");
    }

    fn bake_region<C>(
        &self,
        nodes: NodeView<'_>,
        collision: &C,
        region: BakeRegion,
        out: &mut Vec<Command>,
    ) where
        C: CollisionQuery + ?Sized,
    {
        let layout = nodes.layout();
        out.push(Command::ClearEdges { region });
        let mut walls = 0_usize;
        let mut covers = 0_usize;

        for cell in region.positions(layout) {
            let walkable = nodes.is_walkable(cell);
            for direction in Direction::ALL {
                let neighbor = cell.step(direction);
                let neighbor_inside = layout.is_valid(neighbor) && region.contains(neighbor);
                let owns_border =
                    matches!(direction, Direction::North | Direction::East) || !neighbor_inside;

                if owns_border && (walkable || nodes.is_walkable(neighbor)) {
                    let probe = wall_probe(layout, &self.settings, cell, direction);
                    if probe.hits(collision, self.settings.wall_layers) {
                        out.push(Command::MarkWall { cell, direction });
                        walls += 1;
                    }
                }

                if walkable {
                    let cover = self.classify_cover(layout, collision, cell, direction);
                    if cover != CoverKind::None {
                        out.push(Command::MarkCover {
                            cell,
                            direction,
                            cover,
                        });
                        covers += 1;
                    }
                }
            }
        }

        debug!(?region, walls, covers, "edges baked");
    }

    fn classify_cover<C>(
        &self,
        layout: &GridLayout,
        collision: &C,
        cell: GridPosition,
        direction: Direction,
    ) -> CoverKind
    where
        C: CollisionQuery + ?Sized,
    {
        let settings = &self.settings;
        let band = |bottom: f32, top: f32| {
            band_probe(
                layout,
                settings,
                cell,
                direction,
                settings.cover_depth,
                bottom,
                top,
            )
        };

        if band(settings.high_cover_bottom, settings.high_cover_top)
            .hits(collision, settings.cover_layers)
        {
            CoverKind::High
        } else if band(settings.low_cover_bottom, settings.low_cover_top)
            .hits(collision, settings.cover_layers)
        {
            CoverKind::Low
        } else {
            CoverKind::None
        }
    }
}

fn wall_probe(
    layout: &GridLayout,
    settings: &EdgeBakeSettings,
    cell: GridPosition,
    direction: Direction,
) -> Probe {
    band_probe(
        layout,
        settings,
        cell,
        direction,
        settings.wall_thickness,
        settings.wall_band_bottom,
        settings.wall_band_top,
    )
}

/// Thin box centred on the border line between `cell` and its neighbor.
fn band_probe(
    layout: &GridLayout,
    settings: &EdgeBakeSettings,
    cell: GridPosition,
    direction: Direction,
    depth: f32,
    bottom: f32,
    top: f32,
) -> Probe {
    let (dx, dz) = direction.offset();
    let half_cell = layout.cell_size() * 0.5;
    let along = half_cell * settings.edge_coverage.clamp(0.0, 1.0);
    let across = depth.abs() * 0.5;
    let (low, high) = (bottom.min(top), bottom.max(top));

    let border = layout.world_position(cell) + Vec3::new(dx as f32, 0.0, dz as f32) * half_cell;
    let half_extents = if dx != 0 {
        Vec3::new(across, (high - low) * 0.5, along)
    } else {
        Vec3::new(along, (high - low) * 0.5, across)
    };

    Probe {
        center: border + Vec3::Y * ((low + high) * 0.5),
        half_extents,
    }
}

/// Column standing on the cell floor at its centre.
///
/// Colliders merely touching the floor from below do not count, while obstacles
/// sunk into the floor or reaching up from the storey below do.
fn walkability_column(
    layout: &GridLayout,
    settings: &EdgeBakeSettings,
    cell: GridPosition,
) -> Probe {
    let half_height = settings.walkability_probe_height * 0.5;
    Probe {
        center: layout.world_position(cell) + Vec3::Y * half_height,
        half_extents: Vec3::new(
            settings.walkability_footprint,
            half_height,
            settings.walkability_footprint,
        ),
    }
}
