//! Compute offload: runs generation steps on a background executor.
//!
//! `protocol` defines the messages, `executor` the background side,
//! `client` the controller side with its single pending slot.

pub mod client;
pub mod executor;
pub mod protocol;

pub use client::{CalculationOutcome, ExecutorStatus, OffloadClient, PendingCalculation};
pub use executor::ComputeFn;
pub use protocol::{ErrorReport, PerformanceReport};
