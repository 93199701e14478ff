//! Controller side of the offload protocol.
//!
//! RULES:
//!   - At most one calculation is pending per client. A second
//!     `calculate` while one is pending fails with CalculationInProgress
//!     and nothing is sent.
//!   - Every accepted request resolves exactly once: result, error,
//!     cancellation, or termination.
//!   - A response whose request id is not the pending one is discarded.
//!     This covers late results for cancelled requests.
//!
//! Two threads run per client: the executor, and a dispatcher that
//! routes executor responses into the pending request's reply channel.

use super::executor::{self, ComputeFn};
use super::protocol::{
    decode, encode, CalculateRequest, CalculationResult, ControllerMessage, ErrorReport,
    ExecutorMessage, PerformanceReport, ResultPerformance,
};
use crate::{
    error::{LifeError, LifeResult},
    grid::{Grid, WireGrid},
    next_generation,
    types::{Generation, RequestId},
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// The successor state delivered by a `result` message.
#[derive(Debug, Clone)]
pub struct CalculationOutcome {
    pub request_id:  RequestId,
    pub grid:        Grid,
    pub generation:  Generation,
    pub performance: ResultPerformance,
}

type Reply = LifeResult<CalculationOutcome>;

/// A submitted calculation. Resolves exactly once.
pub struct PendingCalculation {
    request_id: RequestId,
    reply:      Receiver<Reply>,
}

impl PendingCalculation {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Block until the calculation resolves.
    pub fn wait(self) -> Reply {
        self.reply.recv().unwrap_or_else(|_| Err(abandoned()))
    }

    /// Block for at most `timeout`. `None` means still pending.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Reply> {
        match self.reply.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(abandoned())),
        }
    }

    /// Non-blocking poll.
    pub fn try_outcome(&self) -> Option<Reply> {
        match self.reply.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(abandoned())),
        }
    }
}

fn abandoned() -> LifeError {
    LifeError::ExecutorUnavailable("calculation abandoned by executor".into())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorStatus {
    Ready,
    /// Never started; the reason is reported on every calculate.
    Unavailable(String),
    Terminated,
}

struct PendingSlot {
    request_id: RequestId,
    generation: Generation,
    reply:      SyncSender<Reply>,
}

struct SharedState {
    status:           ExecutorStatus,
    pending:          Option<PendingSlot>,
    last_performance: Option<PerformanceReport>,
    last_error:       Option<ErrorReport>,
}

impl SharedState {
    fn new(status: ExecutorStatus) -> Self {
        Self { status, pending: None, last_performance: None, last_error: None }
    }

    fn is_pending(&self, request_id: Option<RequestId>) -> bool {
        match (&self.pending, request_id) {
            (Some(p), Some(id)) => p.request_id == id,
            // An error the executor could not attribute fails whatever is pending.
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn resolve(&mut self, reply: Reply) {
        if let Some(slot) = self.pending.take() {
            // The waiter may have dropped its handle; nothing to do then.
            let _ = slot.reply.send(reply);
        }
    }
}

pub struct OffloadClient {
    shared:     Arc<Mutex<SharedState>>,
    requests:   Option<Sender<String>>,
    executor:   Option<JoinHandle<()>>,
    dispatcher: Option<JoinHandle<()>>,
    next_id:    AtomicU64,
}

impl OffloadClient {
    /// Start an executor running the Conway rule.
    pub fn spawn() -> LifeResult<Self> {
        Self::spawn_with(Box::new(next_generation::calculate))
    }

    /// Start an executor running `compute` for each request.
    pub fn spawn_with(compute: ComputeFn) -> LifeResult<Self> {
        let (request_tx, request_rx) = mpsc::channel::<String>();
        let (response_tx, response_rx) = mpsc::channel::<String>();

        let executor = thread::Builder::new()
            .name("life-executor".into())
            .spawn(move || executor::run(compute, request_rx, response_tx))
            .map_err(|e| LifeError::ExecutorInit(e.to_string()))?;

        let shared = Arc::new(Mutex::new(SharedState::new(ExecutorStatus::Ready)));
        let dispatcher_state = Arc::clone(&shared);
        let dispatcher = thread::Builder::new()
            .name("life-dispatcher".into())
            .spawn(move || dispatch(dispatcher_state, response_rx));

        let dispatcher = match dispatcher {
            Ok(handle) => handle,
            Err(e) => {
                // Dropping the sender stops the executor.
                drop(request_tx);
                let _ = executor.join();
                return Err(LifeError::ExecutorInit(e.to_string()));
            }
        };

        log::info!("offload executor ready");
        Ok(Self {
            shared,
            requests:   Some(request_tx),
            executor:   Some(executor),
            dispatcher: Some(dispatcher),
            next_id:    AtomicU64::new(1),
        })
    }

    /// A client with no executor behind it. Every calculate fails with
    /// ExecutorUnavailable carrying `reason`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            shared:     Arc::new(Mutex::new(SharedState::new(ExecutorStatus::Unavailable(reason.into())))),
            requests:   None,
            executor:   None,
            dispatcher: None,
            next_id:    AtomicU64::new(1),
        }
    }

    /// Submit `grid` (at `generation`) for its successor.
    pub fn calculate(&self, grid: &Grid, generation: Generation) -> LifeResult<PendingCalculation> {
        self.calculate_wire(grid.to_wire(), generation)
    }

    /// Submit an already serialized grid. The executor validates it.
    pub fn calculate_wire(&self, grid: WireGrid, generation: Generation) -> LifeResult<PendingCalculation> {
        let mut state = self.lock();
        match &state.status {
            ExecutorStatus::Ready => {}
            ExecutorStatus::Unavailable(reason) => {
                return Err(LifeError::ExecutorUnavailable(reason.clone()));
            }
            ExecutorStatus::Terminated => {
                return Err(LifeError::ExecutorUnavailable("executor terminated".into()));
            }
        }
        if state.pending.is_some() {
            return Err(LifeError::CalculationInProgress);
        }
        let Some(requests) = &self.requests else {
            return Err(LifeError::ExecutorUnavailable("executor not initialized".into()));
        };

        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message = encode(&ControllerMessage::Calculate(CalculateRequest {
            request_id,
            grid,
            generation,
        }))?;

        // The slot lock is held across the send, so the dispatcher cannot
        // see the response before the pending slot exists.
        if requests.send(message).is_err() {
            state.status = ExecutorStatus::Terminated;
            return Err(LifeError::ExecutorUnavailable("executor stopped".into()));
        }

        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        state.pending = Some(PendingSlot { request_id, generation, reply: reply_tx });
        state.last_error = None;
        log::debug!("calculate request={request_id} generation={generation} sent");

        Ok(PendingCalculation { request_id, reply: reply_rx })
    }

    /// Resolve the pending calculation with CalculationCancelled.
    /// The executor is not interrupted; its eventual response is discarded.
    /// Returns false when nothing was pending.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        let Some((request_id, generation)) =
            state.pending.as_ref().map(|slot| (slot.request_id, slot.generation))
        else {
            return false;
        };
        log::warn!("calculation request={request_id} generation={generation} cancelled");
        state.resolve(Err(LifeError::CalculationCancelled));
        true
    }

    /// Stop the executor. A pending calculation resolves with
    /// ExecutorUnavailable. Later calls are no-ops.
    pub fn terminate(&mut self) {
        {
            let mut state = self.lock();
            if state.status == ExecutorStatus::Ready {
                state.status = ExecutorStatus::Terminated;
            }
            state.resolve(Err(LifeError::ExecutorUnavailable("executor terminated".into())));
        }

        if let Some(requests) = self.requests.take() {
            if let Ok(shutdown) = encode(&ControllerMessage::Shutdown) {
                let _ = requests.send(shutdown);
            }
        }
        for (name, handle) in [("executor", self.executor.take()), ("dispatcher", self.dispatcher.take())] {
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    log::warn!("offload {name} thread panicked");
                }
            }
        }
        log::info!("offload executor terminated");
    }

    pub fn status(&self) -> ExecutorStatus {
        self.lock().status.clone()
    }

    pub fn is_available(&self) -> bool {
        self.status() == ExecutorStatus::Ready
    }

    pub fn is_calculating(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Most recent advisory telemetry.
    pub fn last_performance(&self) -> Option<PerformanceReport> {
        self.lock().last_performance
    }

    /// Most recent error reported for a request. Cleared by the next calculate.
    pub fn last_error(&self) -> Option<ErrorReport> {
        self.lock().last_error.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        lock_state(&self.shared)
    }
}

impl Drop for OffloadClient {
    fn drop(&mut self) {
        if self.requests.is_some() {
            self.terminate();
        }
    }
}

fn lock_state(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    // State stays consistent even if a holder panicked: every update is a
    // single assignment or take.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Dispatcher loop: route executor responses to the pending request.
fn dispatch(shared: Arc<Mutex<SharedState>>, responses: Receiver<String>) {
    while let Ok(json) = responses.recv() {
        let mut state = lock_state(&shared);

        let message = match decode::<ExecutorMessage>(&json) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("unreadable executor response: {e}");
                state.last_error = Some(ErrorReport {
                    request_id: None,
                    message:    "Failed to deserialize executor response".into(),
                    stack:      None,
                });
                state.resolve(Err(e));
                continue;
            }
        };

        if !state.is_pending(message.request_id()) {
            log::debug!(
                "discarding stale {} response for request {:?}",
                if message.is_terminal() { "terminal" } else { "performance" },
                message.request_id()
            );
            continue;
        }

        match message {
            ExecutorMessage::Performance(report) => {
                state.last_performance = Some(report);
            }
            ExecutorMessage::Result(result) => {
                let reply = outcome(result);
                if let Err(e) = &reply {
                    state.last_error = Some(ErrorReport {
                        request_id: None,
                        message:    e.to_string(),
                        stack:      None,
                    });
                }
                state.resolve(reply);
            }
            ExecutorMessage::Error(report) => {
                log::warn!("executor reported: {}", report.message);
                state.last_error = Some(report.clone());
                state.resolve(Err(report.into()));
            }
        }
    }

    // The executor is gone. Anything still pending will never be answered.
    let mut state = lock_state(&shared);
    if state.pending.is_some() {
        log::warn!("executor exited with a calculation pending");
        state.resolve(Err(LifeError::ExecutorRuntime {
            message: "executor stopped unexpectedly".into(),
            stack:   None,
        }));
    }
    if state.status == ExecutorStatus::Ready {
        state.status = ExecutorStatus::Terminated;
    }
}

fn outcome(result: CalculationResult) -> Reply {
    let grid = Grid::from_wire(&result.grid)?;
    Ok(CalculationOutcome {
        request_id:  result.request_id,
        grid,
        generation:  result.generation,
        performance: result.performance,
    })
}
