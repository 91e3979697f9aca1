//! Runtime/tuning configuration carried into a [`Transport`](crate::Transport)
//! at construction time, independent of the facade so it can be loaded from
//! a config file the same way the collaborator workers load theirs.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Initial values for the six broadcast tuning setters, applied to every
/// worker at [`Transport::start`](crate::Transport::start) time in addition
/// to whatever the caller sets explicitly beforehand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningDefaults {
    pub io_timeout: Duration,
    pub max_input_buffer_size: usize,
    pub max_output_buffer_size: usize,
    pub direct_write: bool,
    pub tcp_nodelay: bool,
    pub log_stats: bool,
}

impl Default for TuningDefaults {
    fn default() -> Self {
        Self {
            io_timeout: Duration::from_secs(30),
            max_input_buffer_size: 64 * 1024,
            max_output_buffer_size: 64 * 1024,
            direct_write: false,
            tcp_nodelay: true,
            log_stats: false,
        }
    }
}

/// Pool-wide configuration for a [`Transport`](crate::Transport).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// N: the number of worker threads. `1` selects single-thread mode.
    pub worker_threads: NonZeroUsize,
    /// Best-effort: pin each worker thread to a distinct CPU core. A
    /// pinning failure is logged and otherwise ignored, it is never fatal.
    pub cpu_affinity: bool,
    /// Size of the resolver's own blocking-lookup thread pool. This pool
    /// belongs to the resolver collaborator, not to the N transport
    /// workers.
    pub resolver_threads: NonZeroUsize,
    /// Tuning values applied to every worker at `start` time.
    pub tuning: TuningDefaults,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            worker_threads: NonZeroUsize::new(1).unwrap(),
            cpu_affinity: false,
            resolver_threads: NonZeroUsize::new(2).unwrap(),
            tuning: TuningDefaults::default(),
        }
    }
}

impl TransportConfig {
    /// Convenience constructor for an N-worker pool with otherwise
    /// default tuning.
    pub fn with_worker_threads(n: usize) -> Result<Self, crate::TransportError> {
        let worker_threads =
            NonZeroUsize::new(n).ok_or(crate::TransportError::ZeroWorkers)?;
        Ok(Self {
            worker_threads,
            ..Self::default()
        })
    }
}
