#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* pathfinding over the baked path node store.
//!
//! Movement is 8-directional within a floor plus direct vertical moves
//! between floors. Search state lives in a scratch buffer owned by the
//! [`Pathfinder`], indexed by the same dense index as the node store, so the
//! store itself stays read-only and several pathfinders may share one world.

use grid_tactics_core::{GridPosition, NodeView, MOVE_DIAGONAL_COST, MOVE_STRAIGHT_COST};
use tracing::debug;

/// Cost of moving one floor up or down.
pub const MOVE_VERTICAL_COST: u32 = MOVE_STRAIGHT_COST;

/// Planar and vertical offsets in expansion order: W, SW, NW, E, SE, NE, S, N, down, up.
const NEIGHBOR_OFFSETS: [(i32, i32, i32); 10] = [
    (-1, 0, 0),
    (-1, -1, 0),
    (-1, 1, 0),
    (1, 0, 0),
    (1, -1, 0),
    (1, 1, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

/// Route produced by a successful search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResult {
    /// Cells from start to end, both inclusive.
    pub cells: Vec<GridPosition>,
    /// Accumulated movement cost of the route.
    pub cost: u32,
}

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    g_cost: u32,
    h_cost: u32,
    f_cost: u32,
    came_from: Option<usize>,
    open: bool,
    closed: bool,
}

impl Default for SearchNode {
    fn default() -> Self {
        Self {
            g_cost: u32::MAX,
            h_cost: 0,
            f_cost: u32::MAX,
            came_from: None,
            open: false,
            closed: false,
        }
    }
}

/// Reusable A* search workspace.
#[derive(Debug, Default)]
pub struct Pathfinder {
    scratch: Vec<SearchNode>,
    open: Vec<usize>,
}

impl Pathfinder {
    /// Creates a pathfinder with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the cheapest route from `start` to `end`.
    ///
    /// Returns `None` when either endpoint lies outside the grid, when `end`
    /// is not walkable, or when no route exists.
    pub fn find_path(
        &mut self,
        nodes: NodeView<'_>,
        start: GridPosition,
        end: GridPosition,
    ) -> Option<PathResult> {
        let layout = nodes.layout();
        let (Some(start_index), Some(end_index)) = (layout.index(start), layout.index(end)) else {
            debug!(?start, ?end, "path endpoint outside the grid");
            return None;
        };
        if !nodes.is_walkable(end) {
            debug!(?end, "path destination is not walkable");
            return None;
        }

        self.reset(layout.cell_count());
        let start_h = start.octile_cost(end);
        self.scratch[start_index] = SearchNode {
            g_cost: 0,
            h_cost: start_h,
            f_cost: start_h,
            came_from: None,
            open: true,
            closed: false,
        };
        self.open.push(start_index);

        while let Some(current_index) = self.pop_lowest() {
            if current_index == end_index {
                return Some(self.reconstruct(nodes, end_index));
            }
            let Some(current) = layout.position_at(current_index) else {
                continue;
            };
            let current_g = self.scratch[current_index].g_cost;

            for (dx, dz, dfloor) in NEIGHBOR_OFFSETS {
                let neighbor = GridPosition::new(
                    current.x() + dx,
                    current.z() + dz,
                    current.floor() + dfloor,
                );
                let Some(neighbor_index) = layout.index(neighbor) else {
                    continue;
                };
                if self.scratch[neighbor_index].closed {
                    continue;
                }
                if !nodes.is_walkable(neighbor) {
                    self.scratch[neighbor_index].closed = true;
                    continue;
                }

                let step_cost = if dfloor != 0 {
                    MOVE_VERTICAL_COST
                } else if !nodes.can_step(current, dx, dz) {
                    continue;
                } else if dx != 0 && dz != 0 {
                    MOVE_DIAGONAL_COST
                } else {
                    MOVE_STRAIGHT_COST
                };

                let tentative = current_g.saturating_add(step_cost);
                let entry = &mut self.scratch[neighbor_index];
                if tentative < entry.g_cost {
                    entry.g_cost = tentative;
                    entry.h_cost = neighbor.octile_cost(end);
                    entry.f_cost = tentative.saturating_add(entry.h_cost);
                    entry.came_from = Some(current_index);
                    if !entry.open {
                        entry.open = true;
                        self.open.push(neighbor_index);
                    }
                }
            }
        }

        debug!(?start, ?end, "no path between cells");
        None
    }

    /// Reports whether any route connects the two cells.
    pub fn has_path(&mut self, nodes: NodeView<'_>, start: GridPosition, end: GridPosition) -> bool {
        self.find_path(nodes, start, end).is_some()
    }

    /// Cost of the cheapest route between the two cells, if one exists.
    pub fn path_cost(
        &mut self,
        nodes: NodeView<'_>,
        start: GridPosition,
        end: GridPosition,
    ) -> Option<u32> {
        self.find_path(nodes, start, end).map(|path| path.cost)
    }

    fn reset(&mut self, cell_count: usize) {
        self.scratch.clear();
        self.scratch.resize(cell_count, SearchNode::default());
        self.open.clear();
    }

    /// Removes the first open node with the strictly lowest f-cost.
    fn pop_lowest(&mut self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (slot, index) in self.open.iter().enumerate() {
            let f_cost = self.scratch[*index].f_cost;
            if best.map_or(true, |(_, best_f)| f_cost < best_f) {
                best = Some((slot, f_cost));
            }
        }

        let (slot, _) = best?;
        let index = self.open.remove(slot);
        let node = &mut self.scratch[index];
        node.open = false;
        node.closed = true;
        Some(index)
    }

    fn reconstruct(&self, nodes: NodeView<'_>, end_index: usize) -> PathResult {
        let layout = nodes.layout();
        let mut cells = Vec::new();
        let mut cursor = Some(end_index);
        while let Some(index) = cursor {
            if let Some(position) = layout.position_at(index) {
                cells.push(position);
            }
            cursor = self.scratch[index].came_from;
        }
        cells.reverse();

        PathResult {
            cells,
            cost: self.scratch[end_index].g_cost,
        }
    }
}
