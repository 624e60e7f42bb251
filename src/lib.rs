//! Reelr - a multi-agent video production pipeline orchestrator
//!
//! Reelr coordinates a team of independent production workers (research,
//! script writing, rendering, validation) into one deterministic run: a DAG
//! scheduler dispatches ready steps in concurrent waves over an asynchronous
//! message bus, and a quality gate loop re-works the assets until a scored
//! threshold is met or the iteration budget runs out.

pub mod bus;
pub mod config;
pub mod domain;
pub mod error;
pub mod id;
pub mod pipeline;
pub mod quality;
pub mod scheduler;
pub mod workers;

pub use error::{ReelrError, Result};
