//! Two-state cell value.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Alive,
    #[default]
    Dead,
}

impl Cell {
    pub const fn alive() -> Self { Cell::Alive }
    pub const fn dead()  -> Self { Cell::Dead }

    pub const fn is_alive(self) -> bool { matches!(self, Cell::Alive) }
    pub const fn is_dead(self)  -> bool { matches!(self, Cell::Dead) }

    /// The opposite state.
    pub const fn toggled(self) -> Self {
        match self {
            Cell::Alive => Cell::Dead,
            Cell::Dead  => Cell::Alive,
        }
    }

    pub const fn killed(self)  -> Self { Cell::Dead }
    pub const fn revived(self) -> Self { Cell::Alive }

    /// Flip in place.
    pub fn toggle(&mut self) {
        *self = self.toggled();
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive { Cell::Alive } else { Cell::Dead }
    }
}
