//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A generation counter. Generation 0 is the seeded grid.
pub type Generation = u64;

/// The canonical simulation identifier (uuid v4, hyphenated).
pub type SimulationId = String;

/// Correlates an offload request with its responses.
pub type RequestId = u64;

/// A cell coordinate. Signed so callers may ask about positions
/// outside the grid; those are always dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The 8 Moore-neighbourhood offsets, row by row.
    pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
        (-1, -1), (0, -1), (1, -1),
        (-1,  0),          (1,  0),
        (-1,  1), (0,  1), (1,  1),
    ];

    /// Neighbouring coordinates, unbounded. Callers filter by grid bounds.
    /// Neighbours past the i64 range do not exist and are skipped.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        Self::NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| {
                Some(Coord::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
            })
    }
}

/// Wire key form: `"x,y"`.
impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Coord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("coordinate key '{s}' is not of the form x,y"))?;
        let x = x.trim().parse::<i64>()
            .map_err(|e| format!("coordinate key '{s}': bad x: {e}"))?;
        let y = y.trim().parse::<i64>()
            .map_err(|e| format!("coordinate key '{s}': bad y: {e}"))?;
        Ok(Coord::new(x, y))
    }
}
