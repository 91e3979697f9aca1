//! The transport facade: the single public-facing object that multiplexes
//! a fixed pool of worker event loops.

use std::sync::{Arc, Weak};

use tracing::{debug, info, warn};

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::resolver::{ResolveHandler, ResolverHandle};
use crate::selector::{self, SENTINEL};
use crate::worker::{Executable, IoComponent, Worker};
use crate::AnyError;

/// Front-end over `N` identical worker threads.
///
/// `Transport` owns its workers exclusively: callers only ever receive
/// non-owning handles (connectors, connections, schedulers) whose validity
/// is bounded by the worker's lifetime, which is in turn bounded by this
/// facade's lifetime. The facade is itself stateless on the hot path, just
/// sharding and forwarding, so it may be called concurrently from any
/// number of caller threads.
pub struct Transport<W: Worker> {
    workers: Vec<W>,
    resolver: Arc<ResolverHandle>,
    config: TransportConfig,
}

impl<W: Worker> Transport<W> {
    /// Construct a facade over `workers`, sharing `resolver`.
    ///
    /// `workers.len()` must equal `config.worker_threads`; this is a
    /// caller error (debug-asserted) rather than a runtime-checked one,
    /// since the worker pool is normally built directly from `config` by
    /// the collaborator's own factory.
    pub fn new(
        workers: Vec<W>,
        resolver: Arc<ResolverHandle>,
        config: TransportConfig,
    ) -> Result<Self, TransportError> {
        if workers.is_empty() {
            return Err(TransportError::ZeroWorkers);
        }
        debug_assert_eq!(workers.len(), config.worker_threads.get());
        info!(workers = workers.len(), "transport facade constructed");
        Ok(Self {
            workers,
            resolver,
            config,
        })
    }

    /// Number of worker threads in the pool (N, fixed at construction).
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    fn worker_for(&self, key: &[u8]) -> &W {
        let idx = selector::select(key, self.workers.len());
        &self.workers[idx]
    }

    fn assert_single_threaded(&self) -> Result<(), TransportError> {
        if self.workers.len() != 1 {
            return Err(TransportError::NotSingleThreaded(self.workers.len()));
        }
        Ok(())
    }

    // ---- Endpoint operations ----

    /// Shard `spec` to a worker and forward the listen request. Returns
    /// `None` verbatim on worker-level failure; the facade never
    /// translates it.
    pub fn listen(&self, spec: &[u8]) -> Option<W::Connector> {
        self.worker_for(spec).listen(spec)
    }

    /// Shard `spec` to a worker and forward the connect request. Returns
    /// `None` verbatim on worker-level failure.
    pub fn connect(&self, spec: &[u8]) -> Option<W::Connection> {
        self.worker_for(spec).connect(spec)
    }

    /// Forward to the shared resolver unchanged. `handler` is held weakly
    /// by the resolver; see [`ResolverHandle`].
    pub fn resolve_async(&self, spec: &[u8], handler: Weak<dyn ResolveHandler>) {
        self.resolver.resolve_async(spec, handler);
    }

    // ---- Broadcast operations ----

    pub fn set_io_timeout(&self, timeout: std::time::Duration) {
        for w in &self.workers {
            w.set_io_timeout(timeout);
        }
    }

    pub fn set_max_input_buffer_size(&self, bytes: usize) {
        for w in &self.workers {
            w.set_max_input_buffer_size(bytes);
        }
    }

    pub fn set_max_output_buffer_size(&self, bytes: usize) {
        for w in &self.workers {
            w.set_max_output_buffer_size(bytes);
        }
    }

    pub fn set_direct_write(&self, enabled: bool) {
        for w in &self.workers {
            w.set_direct_write(enabled);
        }
    }

    pub fn set_tcp_nodelay(&self, enabled: bool) {
        for w in &self.workers {
            w.set_tcp_nodelay(enabled);
        }
    }

    pub fn set_log_stats(&self, enabled: bool) {
        for w in &self.workers {
            w.set_log_stats(enabled);
        }
    }

    /// Sum of every worker's I/O component count. A non-atomic snapshot:
    /// concurrent Listen/Connect/Close during the call may make this
    /// reflect different instants per worker.
    pub fn num_io_components(&self) -> usize {
        self.workers.iter().map(|w| w.num_io_components()).sum()
    }

    /// Drain every worker in index order; returns once every worker has
    /// acknowledged.
    pub fn sync(&self) {
        for w in &self.workers {
            w.sync();
        }
    }

    /// Start every worker, applying the configured tuning defaults first.
    /// Visits workers in index order and keeps starting the rest even if
    /// one fails; returns the logical AND of per-worker successes.
    pub fn start(&self, pool: Option<&dyn std::any::Any>) -> bool {
        let tuning = &self.config.tuning;
        self.set_io_timeout(tuning.io_timeout);
        self.set_max_input_buffer_size(tuning.max_input_buffer_size);
        self.set_max_output_buffer_size(tuning.max_output_buffer_size);
        self.set_direct_write(tuning.direct_write);
        self.set_tcp_nodelay(tuning.tcp_nodelay);
        self.set_log_stats(tuning.log_stats);

        let mut all_ok = true;
        for (idx, w) in self.workers.iter().enumerate() {
            let ok = w.start(pool);
            if !ok {
                warn!(worker = idx, "worker failed to start");
            } else {
                debug!(worker = idx, "worker started");
            }
            all_ok &= ok;
        }
        all_ok
    }

    /// Signal every worker to shut down, in index order. If `wait` is
    /// true, each call blocks until that worker is quiesced before moving
    /// to the next.
    pub fn shutdown(&self, wait: bool) {
        info!(wait, "transport shutdown requested");
        for w in &self.workers {
            w.shutdown(wait);
        }
    }

    /// Join every worker thread, in index order.
    pub fn wait_finished(&self) {
        for w in &self.workers {
            w.wait_finished();
        }
    }

    // ---- Dispatch for non-endpoint work ----

    /// Pick a worker via the sentinel key and return its scheduler. The
    /// caller must not assume which worker produced it.
    pub fn scheduler(&self) -> W::Scheduler {
        self.worker_for(SENTINEL).scheduler()
    }

    /// Pick a worker via the sentinel key and submit `exe` to it. Returns
    /// `false` if that worker has already shut down.
    pub fn execute(&self, exe: Box<dyn Executable>) -> bool {
        self.worker_for(SENTINEL).execute(exe)
    }

    // ---- I/O component router ----
    //
    // These never go through the selector: the component already knows
    // which worker owns it, and routing anywhere else would violate the
    // one-worker-per-component invariant.

    pub fn add(&self, component: &W::Connector) -> Result<(), AnyError> {
        self.workers[component.owner()].add(component)
    }

    pub fn enable_read(&self, component: &W::Connector) -> Result<(), AnyError> {
        self.workers[component.owner()].enable_read(component)
    }

    pub fn disable_read(&self, component: &W::Connector) -> Result<(), AnyError> {
        self.workers[component.owner()].disable_read(component)
    }

    pub fn enable_write(&self, component: &W::Connector) -> Result<(), AnyError> {
        self.workers[component.owner()].enable_write(component)
    }

    pub fn disable_write(&self, component: &W::Connector) -> Result<(), AnyError> {
        self.workers[component.owner()].disable_write(component)
    }

    pub fn close(&self, component: &W::Connector) -> Result<(), AnyError> {
        self.workers[component.owner()].close(component)
    }

    // ---- Single-thread mode ----
    //
    // Only meaningful (and only exposed without error) when N == 1: the
    // caller drives the single worker's event loop in its own thread
    // rather than the worker spawning one.

    pub fn time_sampler(&self) -> Result<std::time::Duration, TransportError> {
        self.assert_single_threaded()?;
        Ok(self.workers[0].time_sampler())
    }

    pub fn init_event_loop(&self) -> Result<bool, TransportError> {
        self.assert_single_threaded()?;
        Ok(self.workers[0].init_event_loop())
    }

    pub fn event_loop_iteration(&self) -> Result<bool, TransportError> {
        self.assert_single_threaded()?;
        Ok(self.workers[0].event_loop_iteration())
    }

    pub fn main(&self) -> Result<(), TransportError> {
        self.assert_single_threaded()?;
        self.workers[0].main();
        Ok(())
    }
}

impl<W: Worker> Drop for Transport<W> {
    /// Block on outstanding resolver work before releasing any worker.
    /// Does **not** shut down workers: that is the caller's responsibility,
    /// via `shutdown(true)` then `wait_finished()` before dropping the
    /// facade.
    fn drop(&mut self) {
        debug!("transport facade dropping, draining resolver");
        self.resolver.wait_pending();
    }
}
