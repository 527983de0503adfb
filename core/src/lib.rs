#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the grid tactics spatial engine.
//!
//! This crate defines the coordinate system, the per-cell path node record and
//! the message surface that connects callers, the authoritative world and the
//! pure solver systems. Callers submit [`Command`] values describing desired
//! mutations, the world executes those commands via its `apply` entry point
//! and reports [`Event`] values describing what changed. Systems query
//! immutable views ([`NodeView`], [`OccupancyView`], [`TallBlockerView`]) and
//! a [`CollisionQuery`] backend, and respond with results or command batches.

use std::ops::{Add, RangeInclusive, Sub};

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub mod collision;

pub use collision::{Aabb, ColliderId, CollisionQuery, LayerMask, RayHit};

/// Cost of a single orthogonal step, scaled to keep costs integral.
pub const MOVE_STRAIGHT_COST: u32 = 10;

/// Cost of a single diagonal step, scaled to keep costs integral.
pub const MOVE_DIAGONAL_COST: u32 = 14;

/// Location of a single grid cell expressed as planar coordinates and a floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    x: i32,
    z: i32,
    floor: i32,
}

impl GridPosition {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, z: i32, floor: i32) -> Self {
        Self { x, z, floor }
    }

    /// Column of the cell along the world X axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell along the world Z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Floor index of the cell.
    #[must_use]
    pub const fn floor(&self) -> i32 {
        self.floor
    }

    /// Returns the position shifted within its floor.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz, self.floor)
    }

    /// Returns the planar neighbor across the provided edge.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dz) = direction.offset();
        self.offset(dx, dz)
    }

    /// Returns the same planar cell on another floor.
    #[must_use]
    pub const fn with_floor(self, floor: i32) -> Self {
        Self::new(self.x, self.z, floor)
    }

    /// Octile movement cost between two cells.
    ///
    /// Planar distance costs `14` per diagonal and `10` per straight step;
    /// every floor crossed adds a straight step. The metric is symmetric and
    /// is shared by pathfinding and visibility range checks.
    #[must_use]
    pub fn octile_cost(self, other: GridPosition) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dz = self.z.abs_diff(other.z);
        let diagonal = dx.min(dz);
        let straight = dx.max(dz) - diagonal;
        let vertical = self.floor.abs_diff(other.floor);
        MOVE_DIAGONAL_COST * diagonal + MOVE_STRAIGHT_COST * (straight + vertical)
    }
}

impl Add for GridPosition {
    type Output = GridPosition;

    fn add(self, rhs: GridPosition) -> GridPosition {
        GridPosition::new(self.x + rhs.x, self.z + rhs.z, self.floor + rhs.floor)
    }
}

impl Sub for GridPosition {
    type Output = GridPosition;

    fn sub(self, rhs: GridPosition) -> GridPosition {
        GridPosition::new(self.x - rhs.x, self.z - rhs.z, self.floor - rhs.floor)
    }
}

/// Compass directions naming the four borders of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Border toward increasing Z.
    North,
    /// Border toward increasing X.
    East,
    /// Border toward decreasing Z.
    South,
    /// Border toward decreasing X.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Planar `(dx, dz)` offset to the neighbor across this border.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Direction of the same border seen from the neighboring cell.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Resolves a unit orthogonal offset into a direction.
    #[must_use]
    pub const fn from_offset(dx: i32, dz: i32) -> Option<Self> {
        match (dx, dz) {
            (0, 1) => Some(Self::North),
            (1, 0) => Some(Self::East),
            (0, -1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::North => 1 << 0,
            Self::East => 1 << 1,
            Self::South => 1 << 2,
            Self::West => 1 << 3,
        }
    }
}

/// Set of cell borders, one bit per [`Direction`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeMask(u8);

impl EdgeMask {
    /// Mask with no border set.
    pub const EMPTY: Self = Self(0);

    /// Reports whether the border is part of the mask.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Adds the border to the mask.
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    /// Removes the border from the mask.
    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !direction.bit();
    }

    /// Reports whether no border is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw four-bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Iterates the borders contained in the mask in clockwise order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

/// Protection offered by a cell border against fire from across it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CoverKind {
    /// The border offers no protection.
    #[default]
    None,
    /// Waist-high geometry such as crates or sandbags.
    Low,
    /// Full-height geometry such as pillars or walls.
    High,
}

/// Unique identifier assigned to a unit standing on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
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

/// Bijective mapping between world space and grid coordinates.
///
/// Cells are addressed floor-major: all of floor 0 row by row, then floor 1,
/// and so on. Cell `(x, z, floor)` is centred at
/// `origin + (x * cell_size, floor * floor_height, z * cell_size)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    width: u32,
    height: u32,
    floor_count: u32,
    cell_size: f32,
    floor_height: f32,
    origin: Vec3,
}

impl GridLayout {
    /// Creates a layout anchored at the world origin.
    pub fn new(
        width: u32,
        height: u32,
        floor_count: u32,
        cell_size: f32,
        floor_height: f32,
    ) -> Result<Self, GridError> {
        let fits_coordinates = |value: u32| i32::try_from(value).is_ok();
        if width == 0
            || height == 0
            || floor_count == 0
            || !fits_coordinates(width)
            || !fits_coordinates(height)
            || !fits_coordinates(floor_count)
        {
            return Err(GridError::InvalidDimensions {
                width,
                height,
                floors: floor_count,
            });
        }

        let cells = u64::from(width) * u64::from(height) * u64::from(floor_count);
        if usize::try_from(cells).is_err() {
            return Err(GridError::InvalidDimensions {
                width,
                height,
                floors: floor_count,
            });
        }

        let valid_scale = |value: f32| value.is_finite() && value > 0.0;
        if !valid_scale(cell_size) || !valid_scale(floor_height) {
            return Err(GridError::InvalidScale {
                cell_size,
                floor_height,
            });
        }

        Ok(Self {
            width,
            height,
            floor_count,
            cell_size,
            floor_height,
            origin: Vec3::ZERO,
        })
    }

    /// Returns the layout moved so that cell `(0, 0, 0)` sits at `origin`.
    #[must_use]
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    /// Number of cells along the X axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cells along the Z axis.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of stacked floors.
    #[must_use]
    pub const fn floor_count(&self) -> u32 {
        self.floor_count
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Vertical distance between consecutive floors in world units.
    #[must_use]
    pub const fn floor_height(&self) -> f32 {
        self.floor_height
    }

    /// World position of cell `(0, 0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Total number of cells across every floor.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize * self.floor_count as usize
    }

    /// Reports whether the position addresses a cell of this layout.
    #[must_use]
    pub fn is_valid(&self, position: GridPosition) -> bool {
        let within = |value: i32, bound: u32| u32::try_from(value).map_or(false, |v| v < bound);
        within(position.x(), self.width)
            && within(position.z(), self.height)
            && within(position.floor(), self.floor_count)
    }

    /// Dense storage index of the cell, if it lies within the layout.
    #[must_use]
    pub fn index(&self, position: GridPosition) -> Option<usize> {
        if !self.is_valid(position) {
            return None;
        }
        let x = usize::try_from(position.x()).ok()?;
        let z = usize::try_from(position.z()).ok()?;
        let floor = usize::try_from(position.floor()).ok()?;
        let width = self.width as usize;
        let plane = width * self.height as usize;
        Some(floor * plane + z * width + x)
    }

    /// Inverse of [`GridLayout::index`].
    #[must_use]
    pub fn position_at(&self, index: usize) -> Option<GridPosition> {
        if index >= self.cell_count() {
            return None;
        }
        let width = self.width as usize;
        let plane = width * self.height as usize;
        let floor = index / plane;
        let within_floor = index % plane;
        Some(GridPosition::new(
            i32::try_from(within_floor % width).ok()?,
            i32::try_from(within_floor / width).ok()?,
            i32::try_from(floor).ok()?,
        ))
    }

    /// Column and row ranges of the square of `radius` cells around `center`,
    /// clipped to the layout.
    ///
    /// Either range is empty when the square misses the grid entirely.
    #[must_use]
    pub fn clamped_square(
        &self,
        center: GridPosition,
        radius: u32,
    ) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
        let clip = |value: i32, bound: u32| {
            let low = (i64::from(value) - i64::from(radius)).max(0);
            let high = (i64::from(value) + i64::from(radius)).min(i64::from(bound) - 1);
            let low = i32::try_from(low).unwrap_or(i32::MAX);
            let high = i32::try_from(high).unwrap_or(i32::MAX);
            low..=high
        };
        (clip(center.x(), self.width), clip(center.z(), self.height))
    }

    /// Iterates every cell in storage order.
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> + '_ {
        (0..self.cell_count()).filter_map(|index| self.position_at(index))
    }

    /// Planar neighbor across the border, if it lies within the layout.
    #[must_use]
    pub fn neighbor(&self, position: GridPosition, direction: Direction) -> Option<GridPosition> {
        let neighbor = position.step(direction);
        self.is_valid(neighbor).then_some(neighbor)
    }

    /// World-space center of the cell floor.
    #[must_use]
    pub fn world_position(&self, position: GridPosition) -> Vec3 {
        self.origin
            + Vec3::new(
                position.x() as f32 * self.cell_size,
                position.floor() as f32 * self.floor_height,
                position.z() as f32 * self.cell_size,
            )
    }

    /// Grid cell containing the world-space point.
    ///
    /// The result is not bounds-checked; pair with [`GridLayout::is_valid`].
    #[must_use]
    pub fn grid_position(&self, world: Vec3) -> GridPosition {
        let local = world - self.origin;
        GridPosition::new(
            (local.x / self.cell_size).round() as i32,
            (local.z / self.cell_size).round() as i32,
            (local.y / self.floor_height).round() as i32,
        )
    }
}

/// Set of cells affected by an edge bake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BakeRegion {
    /// Every cell of the grid.
    Entire,
    /// Square neighborhood on the floor of `center`.
    Around {
        /// Cell the neighborhood is centred on.
        center: GridPosition,
        /// Chebyshev radius of the neighborhood in cells.
        radius: u32,
    },
}

impl BakeRegion {
    /// Reports whether the cell lies within the region.
    #[must_use]
    pub fn contains(&self, position: GridPosition) -> bool {
        match *self {
            Self::Entire => true,
            Self::Around { center, radius } => {
                position.floor() == center.floor()
                    && position.x().abs_diff(center.x()) <= radius
                    && position.z().abs_diff(center.z()) <= radius
            }
        }
    }

    /// In-bounds cells of the region in storage order.
    #[must_use]
    pub fn positions(&self, layout: &GridLayout) -> Vec<GridPosition> {
        match *self {
            Self::Entire => layout.positions().collect(),
            Self::Around { center, radius } => {
                let (columns, rows) = layout.clamped_square(center, radius);
                let mut cells = Vec::new();
                for z in rows {
                    for x in columns.clone() {
                        let cell = GridPosition::new(x, z, center.floor());
                        if layout.is_valid(cell) {
                            cells.push(cell);
                        }
                    }
                }
                cells
            }
        }
    }
}

/// Persistent per-cell pathfinding record.
///
/// Search-local costs are owned by the pathfinder; this record only carries
/// the baked state shared by every query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    walkable: bool,
    walls: EdgeMask,
    low_cover: EdgeMask,
    high_cover: EdgeMask,
}

impl PathNode {
    /// Walkable node with no walls or cover.
    #[must_use]
    pub const fn open() -> Self {
        Self {
            walkable: true,
            walls: EdgeMask::EMPTY,
            low_cover: EdgeMask::EMPTY,
            high_cover: EdgeMask::EMPTY,
        }
    }

    /// Reports whether units may stand on the cell.
    #[must_use]
    pub const fn is_walkable(&self) -> bool {
        self.walkable
    }

    /// Updates the walkability flag.
    pub fn set_walkable(&mut self, walkable: bool) {
        self.walkable = walkable;
    }

    /// Borders that block movement and sight.
    #[must_use]
    pub const fn walls(&self) -> EdgeMask {
        self.walls
    }

    /// Reports whether the border is walled.
    #[must_use]
    pub const fn has_wall(&self, direction: Direction) -> bool {
        self.walls.contains(direction)
    }

    /// Sets or clears the wall flag on one border.
    pub fn set_wall(&mut self, direction: Direction, walled: bool) {
        if walled {
            self.walls.insert(direction);
        } else {
            self.walls.remove(direction);
        }
    }

    /// Cover offered by the border; high cover takes precedence over low.
    #[must_use]
    pub const fn cover(&self, direction: Direction) -> CoverKind {
        if self.high_cover.contains(direction) {
            CoverKind::High
        } else if self.low_cover.contains(direction) {
            CoverKind::Low
        } else {
            CoverKind::None
        }
    }

    /// Records the cover offered by one border.
    pub fn set_cover(&mut self, direction: Direction, cover: CoverKind) {
        self.low_cover.remove(direction);
        self.high_cover.remove(direction);
        match cover {
            CoverKind::None => {}
            CoverKind::Low => self.low_cover.insert(direction),
            CoverKind::High => self.high_cover.insert(direction),
        }
    }

    /// Clears every wall and cover flag.
    pub fn clear_edges(&mut self) {
        self.walls = EdgeMask::EMPTY;
        self.low_cover = EdgeMask::EMPTY;
        self.high_cover = EdgeMask::EMPTY;
    }
}

impl Default for PathNode {
    fn default() -> Self {
        Self::open()
    }
}

/// Read-only view into the dense path node store.
#[derive(Clone, Copy, Debug)]
pub struct NodeView<'a> {
    layout: &'a GridLayout,
    nodes: &'a [PathNode],
}

impl<'a> NodeView<'a> {
    /// Captures a view backed by nodes stored in layout order.
    #[must_use]
    pub fn new(layout: &'a GridLayout, nodes: &'a [PathNode]) -> Self {
        Self { layout, nodes }
    }

    /// Coordinate system of the viewed grid.
    #[must_use]
    pub fn layout(&self) -> &'a GridLayout {
        self.layout
    }

    /// Node stored for the cell, if it lies within the grid.
    #[must_use]
    pub fn node(&self, position: GridPosition) -> Option<&'a PathNode> {
        self.layout
            .index(position)
            .and_then(|index| self.nodes.get(index))
    }

    /// Reports whether the cell exists and is walkable.
    #[must_use]
    pub fn is_walkable(&self, position: GridPosition) -> bool {
        self.node(position).map_or(false, PathNode::is_walkable)
    }

    /// Reports whether the cell's border is walled. Out-of-bounds cells have no walls.
    #[must_use]
    pub fn has_wall(&self, position: GridPosition, direction: Direction) -> bool {
        self.node(position)
            .map_or(false, |node| node.has_wall(direction))
    }

    /// Cover offered by the cell's border.
    #[must_use]
    pub fn cover(&self, position: GridPosition, direction: Direction) -> CoverKind {
        self.node(position)
            .map_or(CoverKind::None, |node| node.cover(direction))
    }

    /// Reports whether a single planar step of `(dx, dz)` crosses no wall.
    ///
    /// Orthogonal steps test the crossed border. A diagonal step passes
    /// through the shared corner and is allowed only if at least one of the
    /// two orthogonal detours around that corner is wall-free, so a diagonal
    /// can never slip between two walled edges. Offsets larger than one cell
    /// are rejected.
    #[must_use]
    pub fn can_step(&self, from: GridPosition, dx: i32, dz: i32) -> bool {
        if dx.abs() > 1 || dz.abs() > 1 {
            return false;
        }

        match (Direction::from_offset(dx, 0), Direction::from_offset(0, dz)) {
            (None, None) => true,
            (Some(direction), None) | (None, Some(direction)) => !self.has_wall(from, direction),
            (Some(x_direction), Some(z_direction)) => {
                let via_x = from.step(x_direction);
                let via_z = from.step(z_direction);
                let x_first =
                    !self.has_wall(from, x_direction) && !self.has_wall(via_x, z_direction);
                let z_first =
                    !self.has_wall(from, z_direction) && !self.has_wall(via_z, x_direction);
                x_first || z_first
            }
        }
    }
}

/// Units standing on a single cell.
pub type CellOccupants = SmallVec<[UnitId; 2]>;

/// Read-only view into the per-cell occupancy table.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    layout: &'a GridLayout,
    cells: &'a [CellOccupants],
}

impl<'a> OccupancyView<'a> {
    /// Captures a view backed by occupant lists stored in layout order.
    #[must_use]
    pub fn new(layout: &'a GridLayout, cells: &'a [CellOccupants]) -> Self {
        Self { layout, cells }
    }

    /// Units standing on the cell; empty for out-of-bounds cells.
    #[must_use]
    pub fn occupants(&self, position: GridPosition) -> &'a [UnitId] {
        self.layout
            .index(position)
            .and_then(|index| self.cells.get(index))
            .map_or(&[], |occupants| occupants.as_slice())
    }

    /// Reports whether any unit stands on the cell.
    #[must_use]
    pub fn is_occupied(&self, position: GridPosition) -> bool {
        !self.occupants(position).is_empty()
    }
}

/// Read-only view into the tall-blocker reference counts.
#[derive(Clone, Copy, Debug)]
pub struct TallBlockerView<'a> {
    counts: &'a FxHashMap<GridPosition, u32>,
}

impl<'a> TallBlockerView<'a> {
    /// Captures a view backed by the provided reference counts.
    #[must_use]
    pub fn new(counts: &'a FxHashMap<GridPosition, u32>) -> Self {
        Self { counts }
    }

    /// Number of registered obstacles covering the cell.
    #[must_use]
    pub fn count(&self, position: GridPosition) -> u32 {
        self.counts.get(&position).copied().unwrap_or(0)
    }

    /// Reports whether at least one tall obstacle covers the cell.
    #[must_use]
    pub fn is_blocked(&self, position: GridPosition) -> bool {
        self.count(position) > 0
    }

    /// Number of distinct cells currently covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Reports whether no cell is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Marks a cell walkable or blocked.
    SetWalkable {
        /// Cell whose walkability changes.
        cell: GridPosition,
        /// New walkability flag.
        walkable: bool,
    },
    /// Clears wall and cover flags of every cell in the region.
    ClearEdges {
        /// Cells to clear.
        region: BakeRegion,
    },
    /// Walls a cell border on both sides of the shared edge.
    MarkWall {
        /// Cell whose border is walled.
        cell: GridPosition,
        /// Border of `cell` that is walled.
        direction: Direction,
    },
    /// Records the cover a cell border offers to units standing in the cell.
    MarkCover {
        /// Cell whose border provides cover.
        cell: GridPosition,
        /// Border of `cell` that provides cover.
        direction: Direction,
        /// Strength of the cover.
        cover: CoverKind,
    },
    /// Places a unit on the grid.
    PlaceOccupant {
        /// Unit entering the grid.
        unit: UnitId,
        /// Cell the unit stands on.
        cell: GridPosition,
    },
    /// Moves a unit that is already on the grid.
    MoveOccupant {
        /// Unit being moved.
        unit: UnitId,
        /// Destination cell.
        to: GridPosition,
    },
    /// Removes a unit from the grid, typically on destruction.
    RemoveOccupant {
        /// Unit leaving the grid.
        unit: UnitId,
    },
    /// Registers a tall obstacle spanning the provided tiles.
    RegisterTallBlocker {
        /// Tiles covered by the obstacle.
        tiles: Vec<GridPosition>,
    },
    /// Unregisters a tall obstacle spanning the provided tiles.
    UnregisterTallBlocker {
        /// Tiles previously covered by the obstacle.
        tiles: Vec<GridPosition>,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A cell's walkability flag changed.
    WalkabilityChanged {
        /// Cell that changed.
        cell: GridPosition,
        /// New walkability flag.
        walkable: bool,
    },
    /// Wall and cover flags of a region were cleared.
    EdgesCleared {
        /// Region that was cleared.
        region: BakeRegion,
    },
    /// A border was walled.
    WallMarked {
        /// Cell whose border was walled.
        cell: GridPosition,
        /// Border of `cell` that was walled.
        direction: Direction,
        /// Neighbor that received the mirrored flag, if it lies within the grid.
        mirrored: Option<GridPosition>,
    },
    /// A border's cover was recorded.
    CoverMarked {
        /// Cell whose border provides cover.
        cell: GridPosition,
        /// Border of `cell` that provides cover.
        direction: Direction,
        /// Strength of the cover.
        cover: CoverKind,
    },
    /// A unit was placed on the grid.
    OccupantPlaced {
        /// Unit that entered the grid.
        unit: UnitId,
        /// Cell the unit stands on.
        cell: GridPosition,
    },
    /// A unit moved between cells.
    OccupantMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Cell the unit left.
        from: GridPosition,
        /// Cell the unit entered.
        to: GridPosition,
    },
    /// A unit was removed from the grid.
    OccupantRemoved {
        /// Unit that left the grid.
        unit: UnitId,
        /// Cell the unit stood on.
        cell: GridPosition,
    },
    /// The tall-blocker reference count of a cell changed.
    TallBlockerChanged {
        /// Cell whose count changed.
        cell: GridPosition,
        /// Number of obstacles now covering the cell.
        count: u32,
    },
    /// A command could not be applied.
    CommandRejected {
        /// Why the command was rejected.
        reason: GridError,
    },
}

/// Errors describing invalid grids and rejected world mutations.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum GridError {
    /// The grid must have at least one cell along every axis.
    #[error("grid dimensions {width}x{height}x{floors} are invalid")]
    InvalidDimensions {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
        /// Requested number of floors.
        floors: u32,
    },
    /// Cell size and floor height must be positive and finite.
    #[error("cell size {cell_size} and floor height {floor_height} must be positive")]
    InvalidScale {
        /// Requested cell size.
        cell_size: f32,
        /// Requested floor height.
        floor_height: f32,
    },
    /// The cell lies outside the grid.
    #[error("cell {cell:?} lies outside the grid")]
    OutOfBounds {
        /// Offending cell.
        cell: GridPosition,
    },
    /// The unit already stands on the grid.
    #[error("unit {unit:?} is already on the grid")]
    UnitAlreadyPlaced {
        /// Offending unit.
        unit: UnitId,
    },
    /// The unit is not on the grid.
    #[error("unit {unit:?} is not on the grid")]
    UnknownUnit {
        /// Offending unit.
        unit: UnitId,
    },
    /// No tall obstacle was registered on the cell.
    #[error("no tall blocker is registered on {cell:?}")]
    TallBlockerUnderflow {
        /// Offending cell.
        cell: GridPosition,
    },
}
