#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Line of sight over the baked grid.
//!
//! [`GridSight`] answers cell-to-cell visibility from the wall masks, the
//! tall-blocker registry and optionally the occupancy table. The [`raycast`]
//! module provides the height-aware variant that samples rays against world
//! geometry instead of baked masks.

use std::collections::BTreeSet;

use grid_tactics_core::{
    GridPosition, NodeView, OccupancyView, TallBlockerView, MOVE_STRAIGHT_COST,
};
use tracing::warn;

pub mod raycast;

pub use raycast::{sample_line_of_sight, RaySampling, RayVisibility};

/// Grid-level visibility queries bound to one snapshot of the world.
#[derive(Clone, Copy, Debug)]
pub struct GridSight<'a> {
    nodes: NodeView<'a>,
    occupancy: OccupancyView<'a>,
    tall_blockers: TallBlockerView<'a>,
}

impl<'a> GridSight<'a> {
    /// Binds the query to the provided world views.
    #[must_use]
    pub fn new(
        nodes: NodeView<'a>,
        occupancy: OccupancyView<'a>,
        tall_blockers: TallBlockerView<'a>,
    ) -> Self {
        Self {
            nodes,
            occupancy,
            tall_blockers,
        }
    }

    /// Reports whether `to` can be seen from `from`.
    ///
    /// Sight never crosses floors. Walled borders block orthogonal steps, and
    /// a diagonal step is blocked when both detours around its corner are
    /// walled. Tall blockers block every cell they cover except the
    /// destination; occupied cells do the same when `occlude_by_units` is set.
    /// The line is always rasterized from the smaller endpoint, so swapping
    /// `from` and `to` gives the same answer.
    #[must_use]
    pub fn has_line_of_sight(
        &self,
        from: GridPosition,
        to: GridPosition,
        occlude_by_units: bool,
    ) -> bool {
        if from == to {
            return true;
        }
        let layout = self.nodes.layout();
        if from.floor() != to.floor() || !layout.is_valid(from) || !layout.is_valid(to) {
            return false;
        }

        let line = if from <= to {
            rasterize_line(from, to)
        } else {
            let mut line = rasterize_line(to, from);
            line.reverse();
            line
        };
        for pair in line.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            if !self
                .nodes
                .can_step(current, next.x() - current.x(), next.z() - current.z())
            {
                return false;
            }
            if next == to {
                break;
            }
            if self.tall_blockers.is_blocked(next) {
                return false;
            }
            if occlude_by_units && self.occupancy.is_occupied(next) {
                return false;
            }
        }
        true
    }

    /// Every cell on the origin's floor within `max_range` that is in sight.
    ///
    /// Range uses the same octile metric as movement: a cell is in range when
    /// its cost from the origin does not exceed `10 * max_range`.
    #[must_use]
    pub fn visible_tiles(
        &self,
        origin: GridPosition,
        max_range: u32,
        occlude_by_units: bool,
    ) -> BTreeSet<GridPosition> {
        let layout = self.nodes.layout();
        let mut visible = BTreeSet::new();
        if !layout.is_valid(origin) {
            warn!(?origin, "visibility origin lies outside the grid");
            return visible;
        }

        let budget = MOVE_STRAIGHT_COST.saturating_mul(max_range);
        let (columns, rows) = layout.clamped_square(origin, max_range);
        for z in rows {
            for x in columns.clone() {
                let cell = GridPosition::new(x, z, origin.floor());
                if origin.octile_cost(cell) > budget {
                    continue;
                }
                if self.has_line_of_sight(origin, cell, occlude_by_units) {
                    let _ = visible.insert(cell);
                }
            }
        }
        visible
    }
}

/// Cells visited by Bresenham's line from `from` to `to` on `from`'s floor.
///
/// Both endpoints are included. Consecutive cells differ by one orthogonal or
/// diagonal step. The walk is not symmetric: swapping the endpoints can pick
/// different cells where the line passes exactly between two of them.
#[must_use]
pub fn rasterize_line(from: GridPosition, to: GridPosition) -> Vec<GridPosition> {
    let dx = (to.x() - from.x()).abs();
    let dz = -(to.z() - from.z()).abs();
    let step_x = if from.x() < to.x() { 1 } else { -1 };
    let step_z = if from.z() < to.z() { 1 } else { -1 };

    let capacity = usize::try_from(dx.max(-dz)).unwrap_or(0) + 1;
    let mut cells = Vec::with_capacity(capacity);
    let (mut x, mut z) = (from.x(), from.z());
    let mut error = dx + dz;

    loop {
        cells.push(GridPosition::new(x, z, from.floor()));
        if x == to.x() && z == to.z() {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dz {
            error += dz;
            x += step_x;
        }
        if doubled <= dx {
            error += dx;
            z += step_z;
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_includes_both_endpoints() {
        let from = GridPosition::new(0, 0, 1);
        let to = GridPosition::new(5, 2, 1);
        let line = rasterize_line(from, to);

        assert_eq!(line.first(), Some(&from));
        assert_eq!(line.last(), Some(&to));
        assert_eq!(line.len(), 6);
        for pair in line.windows(2) {
            let step = pair[1] - pair[0];
            assert!(step.x().abs() <= 1 && step.z().abs() <= 1);
            assert_eq!(step.floor(), 0);
        }
    }

    #[test]
    fn pure_diagonal_moves_in_lockstep() {
        let line = rasterize_line(GridPosition::new(3, 3, 0), GridPosition::new(0, 0, 0));
        assert_eq!(
            line,
            vec![
                GridPosition::new(3, 3, 0),
                GridPosition::new(2, 2, 0),
                GridPosition::new(1, 1, 0),
                GridPosition::new(0, 0, 0),
            ]
        );
    }

    #[test]
    fn reversed_lines_may_take_other_cells() {
        let near = GridPosition::new(0, 0, 0);
        let far = GridPosition::new(2, 1, 0);

        assert_eq!(rasterize_line(near, far)[1], GridPosition::new(1, 1, 0));
        assert_eq!(rasterize_line(far, near)[1], GridPosition::new(1, 0, 0));
    }

    #[test]
    fn degenerate_line_is_a_single_cell() {
        let cell = GridPosition::new(-2, 7, 0);
        assert_eq!(rasterize_line(cell, cell), vec![cell]);
    }
}
