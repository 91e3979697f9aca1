//! Errors the facade itself can raise.
//!
//! Per the error handling design, the facade never wraps or translates a
//! worker's own error: `Listen`/`Connect` failures surface as `None`,
//! `execute` rejection surfaces as `false`, and partial `Start` failure
//! surfaces as `false`. `TransportError` only covers the two precondition
//! violations that are the facade's own fault, not the worker's.

/// Precondition violations raised directly by the facade.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// `Transport::new` was called with zero worker threads.
    #[error("worker_threads must be at least 1")]
    ZeroWorkers,

    /// A single-thread-mode method (`init_event_loop`, `event_loop_iteration`,
    /// `main`, `time_sampler`) was called on a pool with more than one worker.
    #[error("single-thread-mode operation requires exactly 1 worker, pool has {0}")]
    NotSingleThreaded(usize),
}
