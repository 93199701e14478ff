//! Controller events: what happened to a simulation, in order.
//!
//! The controller appends events as it applies commands and advances
//! generations; drivers drain them for display.

use crate::types::{Generation, SimulationId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifeEvent {
    // ── Lifecycle ─────────────────────────────────
    SimulationCreated {
        simulation_id: SimulationId,
        width: u32,
        height: u32,
    },
    GridReset {
        simulation_id: SimulationId,
        living_cells: usize,
    },
    CellToggled {
        generation: Generation,
        x: i64,
        y: i64,
    },
    SpeedChanged {
        speed_ms: u64,
    },

    // ── Run loop ──────────────────────────────────
    RunStarted {
        generation: Generation,
    },
    RunStopped {
        generation: Generation,
        reason: StopReason,
    },
    GenerationAdvanced {
        generation: Generation,
        living_cells: usize,
        total_time_ms: f64,
    },
    CalculationFailed {
        generation: Generation,
        message: String,
    },

    // ── Ignored commands ──────────────────────────
    CommandIgnored {
        command: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Stop command or stop handle.
    Requested,
    /// The requested number of generations ran.
    Completed,
    /// An offload error ended the run.
    Failed,
    /// The grid was replaced (reset, randomise, resize).
    GridReplaced,
}
