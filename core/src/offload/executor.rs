//! The background executor: runs the transition rule off the
//! controller's thread.
//!
//! For every `calculate` the executor deserializes the grid, runs the
//! compute function, reserializes, then emits `performance` followed by
//! `result`. Any failure on that path, panics included, becomes a single
//! `error` message. The loop ends on `shutdown` or when the controller
//! drops its request sender.

use super::protocol::{
    decode, encode, round_ms, CalculateRequest, CalculationResult, ControllerMessage,
    ErrorReport, ExecutorMessage, PerformanceReport, ResultPerformance,
};
use crate::{
    error::{LifeError, LifeResult},
    grid::Grid,
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, Sender};
use std::time::Instant;

/// The per-request computation. Production uses `next_generation::calculate`.
pub type ComputeFn = Box<dyn Fn(&Grid) -> Grid + Send + 'static>;

pub(crate) fn run(compute: ComputeFn, requests: Receiver<String>, responses: Sender<String>) {
    log::info!("executor started");
    while let Ok(json) = requests.recv() {
        let messages = match decode::<ControllerMessage>(&json) {
            Ok(ControllerMessage::Calculate(request)) => handle_calculate(&compute, request),
            Ok(ControllerMessage::Shutdown) => break,
            Err(e) => vec![error_message(None, &e)],
        };

        for message in messages {
            let Ok(out) = encode(&message) else {
                log::warn!("executor could not encode {message:?}");
                continue;
            };
            if responses.send(out).is_err() {
                log::info!("controller gone; executor exiting");
                return;
            }
        }
    }
    log::info!("executor stopped");
}

/// Run one calculation and produce the messages to send back, in order.
pub(crate) fn handle_calculate(compute: &ComputeFn, request: CalculateRequest) -> Vec<ExecutorMessage> {
    let id = request.request_id;
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| calculate(compute, &request)));

    match attempt {
        Ok(Ok(messages)) => messages,
        Ok(Err(e)) => vec![error_message(Some(id), &e)],
        Err(payload) => {
            // The unwind has already left the panic site, so no stack is reported.
            let message = panic_message(payload.as_ref());
            log::warn!("executor calculation {id} panicked: {message}");
            vec![ExecutorMessage::Error(ErrorReport { request_id: Some(id), message, stack: None })]
        }
    }
}

fn calculate(compute: &ComputeFn, request: &CalculateRequest) -> LifeResult<Vec<ExecutorMessage>> {
    let started = Instant::now();

    let grid = Grid::from_wire(&request.grid)?;
    let cells_processed = grid.living_count();
    let next = compute(&grid);
    let wire = next.to_wire();

    let total_time = round_ms(started.elapsed().as_secs_f64() * 1000.0);
    let living_cells = next.living_count();
    log::debug!(
        "request={} generation={} living={cells_processed}->{living_cells} time={total_time}ms",
        request.request_id,
        request.generation,
    );

    Ok(vec![
        ExecutorMessage::Performance(PerformanceReport {
            request_id: request.request_id,
            total_time,
            living_cells,
            cells_processed,
        }),
        ExecutorMessage::Result(CalculationResult {
            request_id:  request.request_id,
            grid:        wire,
            generation:  request.generation + 1,
            performance: ResultPerformance { total_time, living_cells },
        }),
    ])
}

fn error_message(request_id: Option<u64>, error: &LifeError) -> ExecutorMessage {
    ExecutorMessage::Error(ErrorReport { request_id, message: error.to_string(), stack: None })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown executor error".to_string()
    }
}
