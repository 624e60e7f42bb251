//! Message bus - asynchronous point-to-point delivery between named workers.
//!
//! The bus owns the worker registry and a single intake queue. A dedicated
//! processing loop pulls messages in enqueue order, invokes the receiver's
//! handler, and resolves the sender's correlation when a reply was requested.

pub mod broker;
pub mod registry;
pub mod templates;

pub use broker::{MessageBus, MessageBusConfig};
pub use registry::{FnWorker, Worker, WorkerRegistry};
