use serde::{Deserialize, Serialize};

/// Every action a user (or a driving tool) may issue to the controller.
/// Dimensions and speeds arrive raw and are clamped by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ControlCommand {
    // ── Run control ───────────────────────────────
    Start,
    Stop,
    SetSpeed { speed: i64 },

    // ── Grid editing ──────────────────────────────
    ToggleCell { x: i64, y: i64 },
    Randomize {
        #[serde(default)]
        density: Option<f64>,
    },
    LoadPattern { name: String },
    Reset,
    Resize { width: i64, height: i64 },
}

impl ControlCommand {
    /// Stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start              => "start",
            Self::Stop               => "stop",
            Self::SetSpeed { .. }    => "set_speed",
            Self::ToggleCell { .. }  => "toggle_cell",
            Self::Randomize { .. }   => "randomize",
            Self::LoadPattern { .. } => "load_pattern",
            Self::Reset              => "reset",
            Self::Resize { .. }      => "resize",
        }
    }
}
