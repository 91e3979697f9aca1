//! A multi-threaded network transport dispatcher.
//!
//! [`Transport`](facade::Transport) is a front-end over a fixed pool of
//! identical event-loop worker threads. It shards listen/connect calls
//! across workers by a stable hash of the endpoint spec, broadcasts tuning
//! and lifecycle operations to every worker, owns an asynchronous DNS
//! resolver shared by the whole pool, and collapses to a single
//! caller-driven event loop when the pool has exactly one worker.
//!
//! The per-thread event loop itself, connection/connector objects, and the
//! underlying OS thread pool are external collaborators: this crate only
//! defines the contract they must satisfy ([`Worker`](worker::Worker),
//! [`IoComponent`](worker::IoComponent)) and the dispatcher that sits in
//! front of them.

pub mod config;
pub mod error;
pub mod resolver;
pub mod selector;
pub mod worker;

mod facade;

pub use config::TransportConfig;
pub use error::TransportError;
pub use facade::Transport;
pub use resolver::{ResolveError, ResolveHandler, ResolverHandle};
pub use selector::select;
pub use worker::{IoComponent, Worker};

/// Catch-all error type for worker-reported failures that this crate never
/// inspects or translates (see `TransportError` for the facade's own,
/// narrow error surface).
pub type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;
