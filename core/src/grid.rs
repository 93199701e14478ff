//! Sparse bounded grid.
//!
//! RULE: only living cells are stored. A coordinate absent from the
//! living set is dead, and so is every coordinate outside the bounds.
//! Reads outside the bounds return dead; writes outside are ignored.

use crate::{
    cell::Cell,
    error::{LifeError, LifeResult},
    rng::LifeRng,
    types::Coord,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width:  u32,
    height: u32,
    living: HashSet<Coord>,
}

/// The boundary-crossing form of a grid.
/// `living_cells` holds `"x,y"` keys in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGrid {
    pub width:        i64,
    pub height:       i64,
    pub living_cells: Vec<String>,
}

impl Grid {
    /// An all-dead grid. Both sides must be positive.
    pub fn new(width: u32, height: u32) -> LifeResult<Self> {
        if width == 0 || height == 0 {
            return Err(LifeError::InvalidDimension {
                width:  width as i64,
                height: height as i64,
            });
        }
        Ok(Self { width, height, living: HashSet::new() })
    }

    /// A grid where each cell is alive with probability `density`.
    pub fn randomized(width: u32, height: u32, density: f64, rng: &mut LifeRng) -> LifeResult<Self> {
        let mut grid = Self::new(width, height)?;
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                if rng.chance(density) {
                    grid.living.insert(Coord::new(x, y));
                }
            }
        }
        Ok(grid)
    }

    /// An all-dead grid with the same bounds as this one.
    pub fn blank(&self) -> Self {
        Self { width: self.width, height: self.height, living: HashSet::new() }
    }

    pub fn width(&self)  -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < self.width as i64 && c.y < self.height as i64
    }

    pub fn cell_at(&self, x: i64, y: i64) -> Cell {
        self.cell(Coord::new(x, y))
    }

    pub fn cell(&self, c: Coord) -> Cell {
        // Out-of-bounds coordinates are never in the set.
        Cell::from(self.living.contains(&c))
    }

    pub fn set_cell_at(&mut self, x: i64, y: i64, cell: Cell) {
        self.set_cell(Coord::new(x, y), cell);
    }

    pub fn set_cell(&mut self, c: Coord, cell: Cell) {
        if !self.in_bounds(c) {
            return;
        }
        if cell.is_alive() {
            self.living.insert(c);
        } else {
            self.living.remove(&c);
        }
    }

    pub fn toggle_cell_at(&mut self, x: i64, y: i64) {
        let c = Coord::new(x, y);
        self.set_cell(c, self.cell(c).toggled());
    }

    /// Live cells among the in-bounds Moore neighbours of (x, y). Range 0..=8.
    pub fn live_neighbors_count(&self, x: i64, y: i64) -> u8 {
        Coord::new(x, y)
            .neighbors()
            .filter(|n| self.living.contains(n))
            .count() as u8
    }

    /// A detached copy of the living cells. Mutating it does not touch the grid.
    pub fn living_cells(&self) -> HashMap<Coord, Cell> {
        self.living.iter().map(|&c| (c, Cell::Alive)).collect()
    }

    pub fn living_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.living.iter().copied()
    }

    pub fn living_count(&self) -> usize {
        self.living.len()
    }

    pub fn is_empty(&self) -> bool {
        self.living.is_empty()
    }

    pub fn clear(&mut self) {
        self.living.clear();
    }

    /// Dense row-major view, `rows()[y][x]`. For renderers.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        let mut rows = vec![vec![Cell::Dead; self.width as usize]; self.height as usize];
        for c in &self.living {
            rows[c.y as usize][c.x as usize] = Cell::Alive;
        }
        rows
    }

    // ── Wire form ──────────────────────────────────────────────

    pub fn to_wire(&self) -> WireGrid {
        let mut coords: Vec<Coord> = self.living.iter().copied().collect();
        coords.sort_by_key(|c| (c.y, c.x));
        WireGrid {
            width:        self.width as i64,
            height:       self.height as i64,
            living_cells: coords.iter().map(Coord::to_string).collect(),
        }
    }

    /// Rebuild a grid from its wire form.
    /// Fails on non-positive dimensions, unparseable keys, and keys
    /// outside the declared bounds.
    pub fn from_wire(wire: &WireGrid) -> LifeResult<Self> {
        let invalid = || LifeError::InvalidDimension { width: wire.width, height: wire.height };
        let width  = u32::try_from(wire.width).map_err(|_| invalid())?;
        let height = u32::try_from(wire.height).map_err(|_| invalid())?;
        let mut grid = Self::new(width, height)?;

        for key in &wire.living_cells {
            let c: Coord = key.parse().map_err(LifeError::Deserialization)?;
            if !grid.in_bounds(c) {
                return Err(LifeError::Deserialization(format!(
                    "cell {c} outside {width}x{height} grid"
                )));
            }
            grid.living.insert(c);
        }
        Ok(grid)
    }

    pub fn to_json(&self) -> LifeResult<String> {
        Ok(serde_json::to_string(&self.to_wire())?)
    }

    pub fn from_json(json: &str) -> LifeResult<Self> {
        let wire: WireGrid = serde_json::from_str(json)
            .map_err(|e| LifeError::Deserialization(e.to_string()))?;
        Self::from_wire(&wire)
    }
}
