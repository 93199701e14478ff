//! The Conway transition rule (B3/S23) over a bounded sparse grid.
//!
//! Only the active neighbourhood is examined: every living cell and its
//! in-bounds Moore neighbours. A dead cell with no living neighbour
//! stays dead, so the cost of a step follows the population, not the
//! grid area.

use crate::{cell::Cell, grid::Grid, types::Coord};
use std::collections::HashSet;

/// Compute the successor of `grid`. The input is not modified.
pub fn calculate(grid: &Grid) -> Grid {
    let mut next = grid.blank();

    for c in active_set(grid) {
        let state = next_cell_state(grid.cell(c), grid.live_neighbors_count(c.x, c.y));
        if state.is_alive() {
            next.set_cell(c, state);
        }
    }
    next
}

/// Living cells plus all of their in-bounds neighbours, deduplicated.
pub fn active_set(grid: &Grid) -> HashSet<Coord> {
    let mut active = HashSet::with_capacity(grid.living_count() * 9);
    for c in grid.living_coords() {
        active.insert(c);
        active.extend(c.neighbors().filter(|n| grid.in_bounds(*n)));
    }
    active
}

/// Survival on 2 or 3 neighbours, birth on exactly 3.
pub fn next_cell_state(current: Cell, live_neighbors: u8) -> Cell {
    match (current, live_neighbors) {
        (Cell::Alive, 2) | (Cell::Alive, 3) => Cell::Alive,
        (Cell::Dead, 3)                     => Cell::Alive,
        _                                   => Cell::Dead,
    }
}
