//! Minimal end-to-end demo of `Transport`: a tiny loopback `Worker` backed
//! by a real `std::net::TcpListener`/`TcpStream`, driven through the
//! facade's sharding, broadcast tuning, and shutdown sequence.
//!
//! Run with `cargo run --example echo_dispatch`.

use std::net::{TcpListener, TcpStream};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};
use transport_core::worker::{Executable, IoComponent, Scheduler};
use transport_core::{ResolverHandle, Transport, TransportConfig, Worker};

struct LoopbackComponent {
    owner: usize,
    listener: Mutex<Option<TcpListener>>,
}

impl IoComponent for LoopbackComponent {
    fn owner(&self) -> usize {
        self.owner
    }
}

struct LoopbackScheduler(usize);
impl Scheduler for LoopbackScheduler {}

struct LoopbackWorker {
    id: usize,
    components: AtomicUsize,
    shutdown: AtomicBool,
}

impl LoopbackWorker {
    fn new(id: usize) -> Self {
        Self {
            id,
            components: AtomicUsize::new(0),
            shutdown: AtomicBool::new(false),
        }
    }
}

impl Worker for LoopbackWorker {
    type Connector = LoopbackComponent;
    type Connection = LoopbackComponent;
    type Scheduler = LoopbackScheduler;

    fn listen(&self, spec: &[u8]) -> Option<Self::Connector> {
        let addr = std::str::from_utf8(spec).ok()?;
        let listener = TcpListener::bind(addr).ok()?;
        self.components.fetch_add(1, Ordering::SeqCst);
        Some(LoopbackComponent {
            owner: self.id,
            listener: Mutex::new(Some(listener)),
        })
    }

    fn connect(&self, spec: &[u8]) -> Option<Self::Connection> {
        let addr = std::str::from_utf8(spec).ok()?;
        let _stream: TcpStream = TcpStream::connect(addr).ok()?;
        self.components.fetch_add(1, Ordering::SeqCst);
        Some(LoopbackComponent {
            owner: self.id,
            listener: Mutex::new(None),
        })
    }

    fn num_io_components(&self) -> usize {
        self.components.load(Ordering::SeqCst)
    }

    fn set_io_timeout(&self, _timeout: Duration) {}
    fn set_max_input_buffer_size(&self, _bytes: usize) {}
    fn set_max_output_buffer_size(&self, _bytes: usize) {}
    fn set_direct_write(&self, _enabled: bool) {}
    fn set_tcp_nodelay(&self, _enabled: bool) {}
    fn set_log_stats(&self, _enabled: bool) {}

    fn sync(&self) {}

    fn scheduler(&self) -> Self::Scheduler {
        LoopbackScheduler(self.id)
    }

    fn execute(&self, exe: Box<dyn Executable>) -> bool {
        if self.shutdown.load(Ordering::SeqCst) {
            return false;
        }
        exe.run();
        true
    }

    fn start(&self, _pool: Option<&dyn std::any::Any>) -> bool {
        true
    }

    fn shutdown(&self, _wait: bool) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn wait_finished(&self) {}

    fn add(&self, _component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        Ok(())
    }
    fn enable_read(&self, _component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        Ok(())
    }
    fn disable_read(&self, _component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        Ok(())
    }
    fn enable_write(&self, _component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        Ok(())
    }
    fn disable_write(
        &self,
        _component: &Self::Connector,
    ) -> Result<(), transport_core::AnyError> {
        Ok(())
    }
    fn close(&self, _component: &Self::Connector) -> Result<(), transport_core::AnyError> {
        Ok(())
    }

    fn time_sampler(&self) -> Duration {
        Duration::from_millis(1)
    }
    fn init_event_loop(&self) -> bool {
        true
    }
    fn event_loop_iteration(&self) -> bool {
        false
    }
    fn main(&self) {}
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let worker_threads = 3;
    let workers: Vec<LoopbackWorker> = (0..worker_threads).map(LoopbackWorker::new).collect();
    let resolver = ResolverHandle::new(NonZeroUsize::new(2).unwrap());
    let config = TransportConfig::with_worker_threads(worker_threads).unwrap();
    let transport = Transport::new(workers, resolver, config).unwrap();

    tracing::info!(workers = worker_threads, "starting transport");
    transport.start(None);
    transport.set_tcp_nodelay(true);

    let listener = transport
        .listen(b"127.0.0.1:0")
        .expect("bind should succeed");
    tracing::info!(owner = listener.owner(), "listener bound on worker");

    tracing::info!(total = transport.num_io_components(), "io components live");

    transport.shutdown(true);
    transport.wait_finished();
    tracing::info!("transport shut down cleanly");
}
