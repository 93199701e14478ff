//! The controller: owns the current Simulation and drives it.
//!
//! RUN LOOP (one iteration per generation):
//!   1. Wait the configured delay. A stop request ends the run here.
//!   2. If no calculation is in flight, submit the grid to the executor.
//!   3. Wait for the terminal response.
//!   4. If a stop arrived meanwhile, discard the result. Otherwise advance.
//!
//! RULES:
//!   - At most one calculation is outstanding, so results apply in order.
//!   - Any offload error ends the run and is kept as `last_error`.
//!     Nothing is retried; the caller restarts explicitly.
//!   - Grid edits are refused while running or calculating.

use crate::{
    cell::Cell,
    clock::RunClock,
    command::ControlCommand,
    config::{clamp_dimension, ValidatedConfig},
    error::{LifeError, LifeResult},
    event::{LifeEvent, StopReason},
    grid::Grid,
    offload::{CalculationOutcome, ExecutorStatus, OffloadClient},
    patterns::Pattern,
    rng::LifeRng,
    simulation::Simulation,
    types::{Generation, SimulationId},
};
use serde::Serialize;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Shared stop flag for a running loop. Clone it into another thread.
#[derive(Clone, Default)]
pub struct StopHandle {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock().unwrap_or_else(|p| p.into_inner()) = true;
        cvar.notify_all();
    }

    pub fn is_stop_requested(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Sleep for `delay` or until a stop is requested.
    /// Returns true if a stop was requested.
    pub fn sleep(&self, delay: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(|p| p.into_inner());
        let (guard, _) = cvar
            .wait_timeout_while(guard, delay, |stopped| !*stopped)
            .unwrap_or_else(|p| p.into_inner());
        *guard
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub simulation_id:    SimulationId,
    pub start_generation: Generation,
    pub end_generation:   Generation,
    pub living_cells:     usize,
    pub reason:           StopReason,
}

pub struct LifeController {
    simulation:     Simulation,
    clock:          RunClock,
    client:         OffloadClient,
    density:        f64,
    rng:            LifeRng,
    randomizations: u64,
    events:         Vec<LifeEvent>,
    last_error:     Option<String>,
}

impl LifeController {
    /// Build a controller with its own executor. If the executor cannot
    /// start, the controller still works for editing; runs fail with
    /// ExecutorUnavailable and the start failure is kept as `last_error`.
    pub fn new(config: &ValidatedConfig) -> LifeResult<Self> {
        match OffloadClient::spawn() {
            Ok(client) => Self::with_client(config, client),
            Err(e) => {
                log::warn!("offload executor failed to start: {e}");
                let mut controller = Self::with_client(config, OffloadClient::unavailable(e.to_string()))?;
                controller.last_error = Some(e.to_string());
                Ok(controller)
            }
        }
    }

    pub fn with_client(config: &ValidatedConfig, client: OffloadClient) -> LifeResult<Self> {
        let simulation = Simulation::create(config.width, config.height)?;
        let events = vec![LifeEvent::SimulationCreated {
            simulation_id: simulation.id().to_string(),
            width: config.width,
            height: config.height,
        }];
        Ok(Self {
            simulation,
            clock: RunClock::new(config.speed_ms),
            client,
            density: config.density,
            rng: LifeRng::new(config.seed),
            randomizations: 0,
            events,
            last_error: None,
        })
    }

    pub fn simulation(&self)    -> &Simulation { &self.simulation }
    pub fn grid(&self)          -> &Grid { self.simulation.grid() }
    pub fn generation(&self)    -> Generation { self.simulation.generation() }
    pub fn is_running(&self)    -> bool { self.clock.running }
    pub fn speed_ms(&self)      -> u64 { self.clock.speed_ms }
    pub fn client(&self)        -> &OffloadClient { &self.client }
    pub fn last_error(&self)    -> Option<&str> { self.last_error.as_deref() }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<LifeEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn apply(&mut self, command: ControlCommand) -> LifeResult<()> {
        log::debug!("command {}", command.name());
        match command {
            ControlCommand::Start => {
                if !self.client.is_available() {
                    self.ignore(&command, "compute executor unavailable");
                } else if self.client.is_calculating() {
                    self.ignore(&command, "calculation in flight");
                } else {
                    self.clock.start();
                    self.last_error = None;
                }
            }
            ControlCommand::Stop => self.stop(StopReason::Requested),
            ControlCommand::SetSpeed { speed } => {
                let speed_ms = self.clock.set_speed(speed);
                self.events.push(LifeEvent::SpeedChanged { speed_ms });
            }
            ControlCommand::ToggleCell { x, y } => {
                if self.clock.running || self.client.is_calculating() {
                    self.ignore(&command, "grid is locked while running");
                } else {
                    let mut grid = self.grid().clone();
                    grid.toggle_cell_at(x, y);
                    self.simulation = self.simulation.replace_grid(grid);
                    self.events.push(LifeEvent::CellToggled { generation: self.generation(), x, y });
                }
            }
            ControlCommand::Randomize { density } => {
                if self.clock.running || self.client.is_calculating() {
                    self.ignore(&command, "grid is locked while running");
                } else {
                    let density = density.unwrap_or(self.density).clamp(0.0, 1.0);
                    self.randomizations += 1;
                    let mut rng = self.rng.derive(self.randomizations);
                    let grid = Grid::randomized(self.grid().width(), self.grid().height(), density, &mut rng)?;
                    self.replace_seed(grid);
                }
            }
            ControlCommand::LoadPattern { ref name } => {
                if self.clock.running || self.client.is_calculating() {
                    self.ignore(&command, "grid is locked while running");
                } else {
                    let pattern = Pattern::find(name)
                        .ok_or_else(|| anyhow::anyhow!("unknown pattern '{name}'"))?;
                    let mut grid = self.grid().blank();
                    let origin = pattern.centered_origin(&grid);
                    pattern.apply(&mut grid, origin);
                    self.replace_seed(grid);
                }
            }
            ControlCommand::Reset => {
                let (width, height) = (self.grid().width(), self.grid().height());
                self.cancel_in_flight();
                self.stop(StopReason::GridReplaced);
                self.simulation = Simulation::create(width, height)?;
                self.events.push(LifeEvent::GridReset {
                    simulation_id: self.simulation.id().to_string(),
                    living_cells: 0,
                });
            }
            ControlCommand::Resize { width, height } => {
                let (width, height) = (clamp_dimension(width), clamp_dimension(height));
                self.cancel_in_flight();
                self.stop(StopReason::GridReplaced);
                self.simulation = Simulation::create(width, height)?;
                self.events.push(LifeEvent::SimulationCreated {
                    simulation_id: self.simulation.id().to_string(),
                    width,
                    height,
                });
            }
        }
        Ok(())
    }

    /// Toggle outside the command path. Same locking rule as ToggleCell.
    pub fn set_cell(&mut self, x: i64, y: i64, cell: Cell) -> bool {
        if self.clock.running || self.client.is_calculating() {
            return false;
        }
        let mut grid = self.grid().clone();
        grid.set_cell_at(x, y, cell);
        self.simulation = self.simulation.replace_grid(grid);
        true
    }

    // ── Generations ────────────────────────────────────────────

    /// Compute and apply exactly one generation, without delay.
    pub fn step(&mut self) -> LifeResult<Generation> {
        let outcome = match self.calculate_blocking() {
            Ok(outcome) => outcome,
            Err(e) => {
                self.record_failure(&e);
                return Err(e);
            }
        };
        self.advance(outcome);
        Ok(self.generation())
    }

    /// Run the timer-driven loop until `max_generations` have advanced
    /// (None = until stopped), `stop` is requested, or an error occurs.
    pub fn run(&mut self, max_generations: Option<u64>, stop: &StopHandle) -> LifeResult<RunSummary> {
        if !self.client.is_available() {
            let reason = match self.client.status() {
                ExecutorStatus::Unavailable(reason) => reason,
                _ => "executor terminated".to_string(),
            };
            let e = LifeError::ExecutorUnavailable(reason);
            self.record_failure(&e);
            return Err(e);
        }

        let start_generation = self.generation();
        self.clock.start();
        self.last_error = None;
        self.events.push(LifeEvent::RunStarted { generation: start_generation });
        log::info!(
            "run started: simulation={} generation={start_generation} delay={}ms",
            self.simulation.id(),
            self.clock.speed_ms
        );

        let mut advanced = 0u64;
        let reason = loop {
            if max_generations.is_some_and(|max| advanced >= max) {
                break StopReason::Completed;
            }
            if !self.clock.running || stop.sleep(self.clock.delay()) {
                break StopReason::Requested;
            }
            if self.client.is_calculating() {
                continue;
            }

            let outcome = match self.calculate_blocking() {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.record_failure(&e);
                    self.stop(StopReason::Failed);
                    return Err(e);
                }
            };

            if stop.is_stop_requested() {
                log::debug!("run stopped mid-calculation; discarding generation {}", outcome.generation);
                break StopReason::Requested;
            }
            self.advance(outcome);
            advanced += 1;
        };

        self.stop(reason);
        Ok(RunSummary {
            simulation_id:    self.simulation.id().to_string(),
            start_generation,
            end_generation:   self.generation(),
            living_cells:     self.grid().living_count(),
            reason,
        })
    }

    /// Stop the executor. The controller keeps its state but can no
    /// longer advance.
    pub fn shutdown(&mut self) {
        self.stop(StopReason::Requested);
        self.client.terminate();
    }

    // ── Internals ──────────────────────────────────────────────

    fn calculate_blocking(&self) -> LifeResult<CalculationOutcome> {
        self.client.calculate(self.grid(), self.generation())?.wait()
    }

    fn advance(&mut self, outcome: CalculationOutcome) {
        let expected = self.generation() + 1;
        if outcome.generation != expected {
            log::warn!("executor returned generation {}, expected {expected}", outcome.generation);
        }
        self.simulation = self.simulation.advance(outcome.grid);
        self.events.push(LifeEvent::GenerationAdvanced {
            generation: self.generation(),
            living_cells: outcome.performance.living_cells,
            total_time_ms: outcome.performance.total_time,
        });
    }

    fn replace_seed(&mut self, grid: Grid) {
        self.cancel_in_flight();
        self.stop(StopReason::GridReplaced);
        let living_cells = grid.living_count();
        self.simulation = self.simulation.reset_with(grid);
        self.events.push(LifeEvent::GridReset {
            simulation_id: self.simulation.id().to_string(),
            living_cells,
        });
    }

    fn stop(&mut self, reason: StopReason) {
        if self.clock.running {
            self.clock.stop();
            self.events.push(LifeEvent::RunStopped { generation: self.generation(), reason });
            log::info!("run stopped at generation {} ({reason:?})", self.generation());
        }
    }

    fn cancel_in_flight(&self) {
        if self.client.cancel() {
            log::info!("cancelled in-flight calculation");
        }
    }

    fn record_failure(&mut self, error: &LifeError) {
        log::warn!("generation {} failed: {error}", self.generation());
        self.last_error = Some(error.to_string());
        self.events.push(LifeEvent::CalculationFailed {
            generation: self.generation(),
            message: error.to_string(),
        });
    }

    fn ignore(&mut self, command: &ControlCommand, reason: &str) {
        log::debug!("ignoring {}: {reason}", command.name());
        self.events.push(LifeEvent::CommandIgnored {
            command: command.name().to_string(),
            reason: reason.to_string(),
        });
    }
}
