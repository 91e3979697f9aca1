//! The worker contract: an external collaborator owning one independent
//! event-loop thread and a slice of I/O components.
//!
//! Everything in this module is a trait. The actual event loop, selector,
//! timers, packet I/O, connection and connector objects are out of scope
//! for this crate, they are whatever the collaborator implements, as long
//! as it honors these contracts and is safe to call from any thread for
//! every listed operation.

use std::time::Duration;

use crate::AnyError;

/// An I/O component (listener or connection) tied to exactly one worker
/// for its entire lifetime.
///
/// The back-reference to the owning worker is non-owning: the component
/// never keeps its worker alive, and the facade never mutates the
/// reference once the worker has set it at creation time.
pub trait IoComponent {
    /// Index, within the facade's `WorkerList`, of the worker that created
    /// this component. Stable for the component's lifetime.
    fn owner(&self) -> usize;
}

/// A worker's scheduler handle, returned by [`Worker::scheduler`].
///
/// Opaque to the facade: it is handed back to the caller verbatim, who
/// must not assume any particular worker produced it.
pub trait Scheduler {}

/// A unit of work submitted to a worker's event loop via
/// [`Worker::execute`].
pub trait Executable: Send {
    fn run(self: Box<Self>);
}

/// The worker contract required from the collaborator.
///
/// Every method here must be safe to call concurrently from any thread;
/// the worker is responsible for whatever internal synchronization that
/// requires. The facade never holds a lock while calling into a worker.
pub trait Worker: Send + Sync {
    type Connector: IoComponent;
    type Connection: IoComponent;
    type Scheduler: Scheduler;

    /// Start listening at `spec`. Returns `None` on any resource or parse
    /// failure; the facade does not translate or inspect the failure.
    fn listen(&self, spec: &[u8]) -> Option<Self::Connector>;

    /// Connect to `spec`. Returns `None` on any resource or parse failure.
    fn connect(&self, spec: &[u8]) -> Option<Self::Connection>;

    /// Number of I/O components currently owned by this worker.
    fn num_io_components(&self) -> usize;

    fn set_io_timeout(&self, timeout: Duration);
    fn set_max_input_buffer_size(&self, bytes: usize);
    fn set_max_output_buffer_size(&self, bytes: usize);
    fn set_direct_write(&self, enabled: bool);
    fn set_tcp_nodelay(&self, enabled: bool);
    fn set_log_stats(&self, enabled: bool);

    /// Block until this worker has processed a round-trip marker, i.e.
    /// has drained everything enqueued on it before this call.
    fn sync(&self);

    /// This worker's scheduler handle.
    fn scheduler(&self) -> Self::Scheduler;

    /// Submit `exe` to run on this worker's event loop. Returns `false`
    /// if the worker has already shut down and rejected the submission.
    fn execute(&self, exe: Box<dyn Executable>) -> bool;

    /// Start the worker's event loop. `pool` is an opaque handle to the
    /// shared OS thread pool collaborator; workers that do not need one
    /// may ignore it.
    fn start(&self, pool: Option<&dyn std::any::Any>) -> bool;

    /// Signal shutdown. If `wait` is true, blocks until this worker has
    /// quiesced.
    fn shutdown(&self, wait: bool);

    /// Block until this worker's thread has terminated.
    fn wait_finished(&self);

    fn add(&self, component: &Self::Connector) -> Result<(), AnyError>;
    fn enable_read(&self, component: &Self::Connector) -> Result<(), AnyError>;
    fn disable_read(&self, component: &Self::Connector) -> Result<(), AnyError>;
    fn enable_write(&self, component: &Self::Connector) -> Result<(), AnyError>;
    fn disable_write(&self, component: &Self::Connector) -> Result<(), AnyError>;
    fn close(&self, component: &Self::Connector) -> Result<(), AnyError>;

    // --- Single-thread mode. Only ever invoked by the facade when the
    // pool has exactly one worker; the facade asserts that for every call
    // below before delegating. ---

    /// A sampler for the worker's notion of "now", used to drive
    /// time-based scheduling in single-thread mode.
    fn time_sampler(&self) -> Duration;

    /// Prepare the event loop for caller-driven iteration. Returns `false`
    /// on failure.
    fn init_event_loop(&self) -> bool;

    /// Run one iteration of the event loop in the caller's own thread.
    /// Returns `false` when the loop has nothing left to do and should
    /// stop being driven.
    fn event_loop_iteration(&self) -> bool;

    /// Run the worker's event loop to completion in the caller's thread,
    /// blocking until the worker shuts down.
    fn main(&self);
}
