//! `MockWorker`: an in-tree `Worker` implementation over plain atomics,
//! with no real I/O. Used to exercise the facade's fan-out, sticky
//! ownership, partial-start-failure, and broadcast-tuning behavior without
//! depending on a real event-loop collaborator.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use transport_core::worker::{Executable, IoComponent, Scheduler, Worker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    EnableRead,
    DisableRead,
    EnableWrite,
    DisableWrite,
    Close,
}

/// A mock I/O component. `owner` is fixed at creation and never mutated
/// by the facade.
pub struct MockComponent {
    owner: usize,
    id: usize,
}

impl IoComponent for MockComponent {
    fn owner(&self) -> usize {
        self.owner
    }
}

pub struct MockScheduler(pub usize);
impl Scheduler for MockScheduler {}

pub struct RecordedExecutable {
    pub ran: std::sync::Arc<AtomicBool>,
}
impl Executable for RecordedExecutable {
    fn run(self: Box<Self>) {
        self.ran.store(true, Ordering::SeqCst);
    }
}

/// A worker that records every operation it receives instead of doing
/// real I/O.
///
/// Cheaply `Clone`-able (it is an `Arc` handle around its actual state) so
/// a test can keep an observable handle after moving the `Worker`-facing
/// copy into a `Transport`.
#[derive(Clone)]
pub struct MockWorker(Arc<Inner>);

impl std::ops::Deref for MockWorker {
    type Target = Inner;
    fn deref(&self) -> &Inner {
        &self.0
    }
}

pub struct Inner {
    pub id: usize,
    next_component_id: AtomicUsize,
    components: Mutex<Vec<usize>>,
    op_log: Mutex<Vec<(usize, Op)>>,

    pub start_count: AtomicUsize,
    pub start_should_fail: AtomicBool,
    pub shutdown_signaled: AtomicBool,
    pub shutdown_wait_count: AtomicUsize,
    pub finished: AtomicBool,
    pub sync_count: AtomicUsize,
    pub execute_count: AtomicUsize,

    pub io_timeout_ms: AtomicI64,
    pub max_input_buffer_size: AtomicUsize,
    pub max_output_buffer_size: AtomicUsize,
    pub direct_write: AtomicBool,
    pub tcp_nodelay: AtomicBool,
    pub log_stats: AtomicBool,

    // Single-thread mode state.
    pub event_loop_ready: AtomicBool,
    pub remaining_iterations: AtomicUsize,
}

impl MockWorker {
    pub fn new(id: usize) -> Self {
        MockWorker(Arc::new(Inner::new(id)))
    }

    pub fn with_scheduled_iterations(id: usize, iterations: usize) -> Self {
        let w = Self::new(id);
        w.remaining_iterations.store(iterations, Ordering::SeqCst);
        w
    }
}

impl Inner {
    fn new(id: usize) -> Self {
        Self {
            id,
            next_component_id: AtomicUsize::new(0),
            components: Mutex::new(Vec::new()),
            op_log: Mutex::new(Vec::new()),
            start_count: AtomicUsize::new(0),
            start_should_fail: AtomicBool::new(false),
            shutdown_signaled: AtomicBool::new(false),
            shutdown_wait_count: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
            sync_count: AtomicUsize::new(0),
            execute_count: AtomicUsize::new(0),
            io_timeout_ms: AtomicI64::new(-1),
            max_input_buffer_size: AtomicUsize::new(0),
            max_output_buffer_size: AtomicUsize::new(0),
            direct_write: AtomicBool::new(false),
            tcp_nodelay: AtomicBool::new(false),
            log_stats: AtomicBool::new(false),
            event_loop_ready: AtomicBool::new(false),
            remaining_iterations: AtomicUsize::new(0),
        }
    }

    pub fn ops_on(&self, component_id: usize) -> Vec<Op> {
        self.op_log
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == component_id)
            .map(|(_, op)| *op)
            .collect()
    }

    pub fn op_count(&self) -> usize {
        self.op_log.lock().unwrap().len()
    }

    fn record(&self, component: &MockComponent, op: Op) -> Result<(), transport_core::AnyError> {
        assert_eq!(
            component.owner, self.id,
            "facade routed a component op to the wrong worker"
        );
        self.op_log.lock().unwrap().push((component.id, op));
        Ok(())
    }
}

impl Worker for MockWorker {
    type Connector = MockComponent;
    type Connection = MockComponent;
    type Scheduler = MockScheduler;

    fn listen(&self, spec: &[u8]) -> Option<Self::Connector> {
        if spec == b"fail" {
            return None;
        }
        let id = self.next_component_id.fetch_add(1, Ordering::SeqCst);
        self.components.lock().unwrap().push(id);
        Some(MockComponent {
            owner: self.id,
            id,
        })
    }

    fn connect(&self, spec: &[u8]) -> Option<Self::Connection> {
        self.listen(spec)
    }

    fn num_io_components(&self) -> usize {
        self.components.lock().unwrap().len()
    }

    fn set_io_timeout(&self, timeout: Duration) {
        self.io_timeout_ms
            .store(timeout.as_millis() as i64, Ordering::SeqCst);
    }

    fn set_max_input_buffer_size(&self, bytes: usize) {
        self.max_input_buffer_size.store(bytes, Ordering::SeqCst);
    }

    fn set_max_output_buffer_size(&self, bytes: usize) {
        self.max_output_buffer_size.store(bytes, Ordering::SeqCst);
    }

    fn set_direct_write(&self, enabled: bool) {
        self.direct_write.store(enabled, Ordering::SeqCst);
    }

    fn set_tcp_nodelay(&self, enabled: bool) {
        self.tcp_nodelay.store(enabled, Ordering::SeqCst);
    }

    fn set_log_stats(&self, enabled: bool) {
        self.log_stats.store(enabled, Ordering::SeqCst);
    }

    fn sync(&self) {
        self.sync_count.fetch_add(1, Ordering::SeqCst);
    }

    fn scheduler(&self) -> Self::Scheduler {
        MockScheduler(self.id)
    }

    fn execute(&self, exe: Box<dyn Executable>) -> bool {
        if self.shutdown_signaled.load(Ordering::SeqCst) {
            return false;
        }
        self.execute_count.fetch_add(1, Ordering::SeqCst);
        exe.run();
        true
    }

    fn start(&self, _pool: Option<&dyn std::any::Any>) -> bool {
        self.start_count.fetch_add(1, Ordering::SeqCst);
        !self.start_should_fail.load(Ordering::SeqCst)
    }

    fn shutdown(&self, wait: bool) {
        self.shutdown_signaled.store(true, Ordering::SeqCst);
        if wait {
            self.shutdown_wait_count.fetch_add(1, Ordering::SeqCst);
            self.finished.store(true, Ordering::SeqCst);
        }
    }

    fn wait_finished(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    fn add(&self, component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        self.record(component, Op::Add)
    }

    fn enable_read(&self, component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        self.record(component, Op::EnableRead)
    }

    fn disable_read(&self, component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        self.record(component, Op::DisableRead)
    }

    fn enable_write(&self, component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        self.record(component, Op::EnableWrite)
    }

    fn disable_write(&self, component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        self.record(component, Op::DisableWrite)
    }

    fn close(&self, component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        self.record(component, Op::Close)
    }

    fn time_sampler(&self) -> Duration {
        Duration::from_millis(1)
    }

    fn init_event_loop(&self) -> bool {
        self.event_loop_ready.store(true, Ordering::SeqCst);
        true
    }

    fn event_loop_iteration(&self) -> bool {
        let remaining = self.remaining_iterations.load(Ordering::SeqCst);
        if remaining == 0 {
            return false;
        }
        self.remaining_iterations
            .store(remaining - 1, Ordering::SeqCst);
        true
    }

    fn main(&self) {
        while self.event_loop_iteration() {}
    }
}
