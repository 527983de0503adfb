#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative spatial state for the grid tactics engine.
//!
//! The world owns the dense path node store, the occupancy table and the
//! tall-blocker registry. It is mutated exclusively through [`apply`] and
//! read through the views exposed by [`query`].

use std::collections::{BTreeMap, BTreeSet};

use grid_tactics_core::{
    BakeRegion, CellOccupants, Command, Direction, Event, GridError, GridLayout, GridPosition,
    PathNode, UnitId,
};
use rustc_hash::FxHashMap;
use tracing::warn;

/// Represents the authoritative spatial state of a tactical map.
#[derive(Debug)]
pub struct World {
    layout: GridLayout,
    nodes: Vec<PathNode>,
    occupancy: OccupancyTable,
    tall_blockers: FxHashMap<GridPosition, u32>,
}

impl World {
    /// Creates a world whose cells are all walkable and free of walls.
    #[must_use]
    pub fn new(layout: GridLayout) -> Self {
        Self {
            nodes: vec![PathNode::open(); layout.cell_count()],
            occupancy: OccupancyTable::new(layout.cell_count()),
            tall_blockers: FxHashMap::default(),
            layout,
        }
    }

    fn node_mut(&mut self, cell: GridPosition) -> Result<&mut PathNode, GridError> {
        let index = self
            .layout
            .index(cell)
            .ok_or(GridError::OutOfBounds { cell })?;
        self.nodes
            .get_mut(index)
            .ok_or(GridError::OutOfBounds { cell })
    }

    fn require_cell(&self, cell: GridPosition) -> Result<usize, GridError> {
        self.layout.index(cell).ok_or(GridError::OutOfBounds { cell })
    }

    fn set_walkable(
        &mut self,
        cell: GridPosition,
        walkable: bool,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError> {
        let node = self.node_mut(cell)?;
        if node.is_walkable() != walkable {
            node.set_walkable(walkable);
            out_events.push(Event::WalkabilityChanged { cell, walkable });
        }
        Ok(())
    }

    fn clear_edges(&mut self, region: BakeRegion, out_events: &mut Vec<Event>) {
        let layout = self.layout;
        for cell in region.positions(&layout) {
            if let Ok(node) = self.node_mut(cell) {
                node.clear_edges();
            }

            for direction in Direction::ALL {
                let Some(neighbor) = layout.neighbor(cell, direction) else {
                    continue;
                };
                if region.contains(neighbor) {
                    continue;
                }
                if let Ok(node) = self.node_mut(neighbor) {
                    node.set_wall(direction.opposite(), false);
                }
            }
        }
        out_events.push(Event::EdgesCleared { region });
    }

    fn mark_wall(
        &mut self,
        cell: GridPosition,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError> {
        self.node_mut(cell)?.set_wall(direction, true);

        let mirrored = self.layout.neighbor(cell, direction);
        if let Some(neighbor) = mirrored {
            self.node_mut(neighbor)?
                .set_wall(direction.opposite(), true);
        }

        out_events.push(Event::WallMarked {
            cell,
            direction,
            mirrored,
        });
        Ok(())
    }

    fn register_tall_blocker(
        &mut self,
        tiles: Vec<GridPosition>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError> {
        let tiles: BTreeSet<GridPosition> = tiles.into_iter().collect();
        for tile in &tiles {
            let _ = self.require_cell(*tile)?;
        }

        for cell in tiles {
            let count = self.tall_blockers.entry(cell).or_insert(0);
            *count = count.saturating_add(1);
            out_events.push(Event::TallBlockerChanged {
                cell,
                count: *count,
            });
        }
        Ok(())
    }

    fn unregister_tall_blocker(
        &mut self,
        tiles: Vec<GridPosition>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError> {
        let tiles: BTreeSet<GridPosition> = tiles.into_iter().collect();
        if let Some(cell) = tiles
            .iter()
            .copied()
            .find(|tile| !self.tall_blockers.contains_key(tile))
        {
            return Err(GridError::TallBlockerUnderflow { cell });
        }

        for cell in tiles {
            let remaining = match self.tall_blockers.get_mut(&cell) {
                Some(count) => {
                    *count = count.saturating_sub(1);
                    *count
                }
                None => continue,
            };
            if remaining == 0 {
                let _ = self.tall_blockers.remove(&cell);
            }
            out_events.push(Event::TallBlockerChanged {
                cell,
                count: remaining,
            });
        }
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that cannot be honoured leave the world untouched and report a
/// [`Event::CommandRejected`] instead.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let outcome = match command {
        Command::SetWalkable { cell, walkable } => world.set_walkable(cell, walkable, out_events),
        Command::ClearEdges { region } => {
            world.clear_edges(region, out_events);
            Ok(())
        }
        Command::MarkWall { cell, direction } => world.mark_wall(cell, direction, out_events),
        Command::MarkCover {
            cell,
            direction,
            cover,
        } => world.node_mut(cell).map(|node| {
            node.set_cover(direction, cover);
            out_events.push(Event::CoverMarked {
                cell,
                direction,
                cover,
            });
        }),
        Command::PlaceOccupant { unit, cell } => world
            .require_cell(cell)
            .and_then(|index| world.occupancy.place(unit, cell, index))
            .map(|()| out_events.push(Event::OccupantPlaced { unit, cell })),
        Command::MoveOccupant { unit, to } => {
            let layout = world.layout;
            world
                .require_cell(to)
                .and_then(|to_index| world.occupancy.relocate(&layout, unit, to, to_index))
                .map(|from| out_events.push(Event::OccupantMoved { unit, from, to }))
        }
        Command::RemoveOccupant { unit } => {
            let layout = world.layout;
            world
                .occupancy
                .remove(&layout, unit)
                .map(|cell| out_events.push(Event::OccupantRemoved { unit, cell }))
        }
        Command::RegisterTallBlocker { tiles } => world.register_tall_blocker(tiles, out_events),
        Command::UnregisterTallBlocker { tiles } => {
            world.unregister_tall_blocker(tiles, out_events)
        }
    };

    if let Err(reason) = outcome {
        warn!(%reason, "world rejected command");
        out_events.push(Event::CommandRejected { reason });
    }
}

/// Dense per-cell occupant lists plus a reverse index from unit to cell.
#[derive(Debug)]
struct OccupancyTable {
    cells: Vec<CellOccupants>,
    units: BTreeMap<UnitId, GridPosition>,
}

impl OccupancyTable {
    fn new(cell_count: usize) -> Self {
        Self {
            cells: vec![CellOccupants::new(); cell_count],
            units: BTreeMap::new(),
        }
    }

    fn place(&mut self, unit: UnitId, cell: GridPosition, index: usize) -> Result<(), GridError> {
        if self.units.contains_key(&unit) {
            return Err(GridError::UnitAlreadyPlaced { unit });
        }
        let occupants = self
            .cells
            .get_mut(index)
            .ok_or(GridError::OutOfBounds { cell })?;
        occupants.push(unit);
        let _ = self.units.insert(unit, cell);
        Ok(())
    }

    fn relocate(
        &mut self,
        layout: &GridLayout,
        unit: UnitId,
        to: GridPosition,
        to_index: usize,
    ) -> Result<GridPosition, GridError> {
        if to_index >= self.cells.len() {
            return Err(GridError::OutOfBounds { cell: to });
        }
        let from = self.remove(layout, unit)?;
        self.place(unit, to, to_index)?;
        Ok(from)
    }

    fn remove(&mut self, layout: &GridLayout, unit: UnitId) -> Result<GridPosition, GridError> {
        let cell = self
            .units
            .remove(&unit)
            .ok_or(GridError::UnknownUnit { unit })?;
        if let Some(occupants) = layout
            .index(cell)
            .and_then(|index| self.cells.get_mut(index))
        {
            occupants.retain(|occupant| *occupant != unit);
        }
        Ok(cell)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use grid_tactics_core::{
        GridLayout, GridPosition, NodeView, OccupancyView, TallBlockerView, UnitId,
    };

    use super::World;

    /// Coordinate system of the world's grid.
    #[must_use]
    pub fn layout(world: &World) -> &GridLayout {
        &world.layout
    }

    /// Read-only view of the baked path node store.
    #[must_use]
    pub fn nodes(world: &World) -> NodeView<'_> {
        NodeView::new(&world.layout, &world.nodes)
    }

    /// Read-only view of the per-cell occupant lists.
    #[must_use]
    pub fn occupancy(world: &World) -> OccupancyView<'_> {
        OccupancyView::new(&world.layout, &world.occupancy.cells)
    }

    /// Read-only view of the tall-blocker reference counts.
    #[must_use]
    pub fn tall_blockers(world: &World) -> TallBlockerView<'_> {
        TallBlockerView::new(&world.tall_blockers)
    }

    /// Cell the unit currently stands on.
    #[must_use]
    pub fn unit_cell(world: &World, unit: UnitId) -> Option<GridPosition> {
        world.occupancy.units.get(&unit).copied()
    }

    /// Every unit on the grid with its cell, ordered by identifier.
    #[must_use]
    pub fn units(world: &World) -> Vec<(UnitId, GridPosition)> {
        world
            .occupancy
            .units
            .iter()
            .map(|(unit, cell)| (*unit, *cell))
            .collect()
    }
}
