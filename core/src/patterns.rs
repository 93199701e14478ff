//! Named seed patterns.

use crate::{cell::Cell, grid::Grid, types::Coord};

/// A pattern as (x, y) offsets from its top-left corner.
pub struct Pattern {
    pub name:  &'static str,
    pub cells: &'static [(i64, i64)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "block",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
    },
    Pattern {
        name: "blinker",
        cells: &[(1, 0), (1, 1), (1, 2)],
    },
    Pattern {
        name: "toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Pattern {
        name: "glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "r-pentomino",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
    },
];

impl Pattern {
    /// Case-insensitive lookup.
    pub fn find(name: &str) -> Option<&'static Pattern> {
        PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Bounding box as (width, height).
    pub fn extent(&self) -> (i64, i64) {
        let w = self.cells.iter().map(|&(x, _)| x).max().map_or(0, |m| m + 1);
        let h = self.cells.iter().map(|&(_, y)| y).max().map_or(0, |m| m + 1);
        (w, h)
    }

    /// Revive the pattern's cells at `origin`. Cells off the grid are dropped.
    pub fn apply(&self, grid: &mut Grid, origin: Coord) {
        for &(dx, dy) in self.cells {
            grid.set_cell(Coord::new(origin.x + dx, origin.y + dy), Cell::Alive);
        }
    }

    /// The origin that centres this pattern on `grid`.
    pub fn centered_origin(&self, grid: &Grid) -> Coord {
        let (w, h) = self.extent();
        Coord::new((grid.width() as i64 - w) / 2, (grid.height() as i64 - h) / 2)
    }
}
