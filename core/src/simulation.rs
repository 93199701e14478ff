//! Simulation: a grid plus its generation counter and identity.
//!
//! A Simulation is a value. Every transition returns a new Simulation
//! and leaves the receiver untouched; the id and creation time carry
//! over, the update time is refreshed.

use crate::{
    error::LifeResult,
    grid::Grid,
    types::{Generation, SimulationId},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Simulation {
    id:         SimulationId,
    grid:       Grid,
    generation: Generation,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Simulation {
    /// A fresh simulation over an all-dead grid.
    pub fn create(width: u32, height: u32) -> LifeResult<Self> {
        Ok(Self::with_grid(Grid::new(width, height)?))
    }

    /// A fresh simulation at generation 0 over `grid`.
    pub fn with_grid(grid: Grid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            grid,
            generation: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self)          -> &str { &self.id }
    pub fn grid(&self)        -> &Grid { &self.grid }
    pub fn generation(&self)  -> Generation { self.generation }
    pub fn created_at(&self)  -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self)  -> DateTime<Utc> { self.updated_at }

    /// Next generation: counter + 1, grid replaced.
    pub fn advance(&self, grid: Grid) -> Self {
        self.transition(grid, self.generation + 1)
    }

    /// New seed grid: counter back to 0.
    pub fn reset_with(&self, grid: Grid) -> Self {
        self.transition(grid, 0)
    }

    /// Edit in place (e.g. a toggled cell): counter unchanged.
    pub fn replace_grid(&self, grid: Grid) -> Self {
        self.transition(grid, self.generation)
    }

    /// True when both values descend from the same `create`.
    pub fn same_simulation(&self, other: &Simulation) -> bool {
        self.id == other.id
    }

    fn transition(&self, grid: Grid, generation: Generation) -> Self {
        Self {
            id: self.id.clone(),
            grid,
            generation,
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }
}
