//! life-core: Conway's Game of Life on a bounded sparse grid, with the
//! per-generation computation offloaded to a background executor.
//!
//! Layering, leaves first:
//!   cell → grid → next_generation → simulation → offload → controller

pub mod cell;
pub mod clock;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod grid;
pub mod next_generation;
pub mod offload;
pub mod patterns;
pub mod rng;
pub mod simulation;
pub mod types;
