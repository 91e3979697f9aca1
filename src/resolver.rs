//! Asynchronous DNS resolution integration.
//!
//! [`ResolverHandle`] is the concrete collaborator for the resolver
//! contract: it accepts `(spec, weak handler)` pairs, runs the blocking
//! lookup on a small dedicated thread pool (one named `std::thread` per
//! lookup worker, fed through a channel), and tracks in-flight work so
//! that teardown can block until every pending resolution has been
//! delivered or silently dropped.

use std::net::{IpAddr, ToSocketAddrs};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::thread::JoinHandle;

/// Why a resolution attempt failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("endpoint spec was not valid utf-8")]
    InvalidSpec,
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error("lookup returned no addresses")]
    NoAddresses,
}

/// Receives the outcome of an async resolution.
///
/// Held weakly by the resolver: if the owner drops its strong reference
/// before resolution completes, the callback is silently skipped rather
/// than kept alive by the resolver's internal queue.
pub trait ResolveHandler: Send + Sync {
    fn on_resolved(&self, spec: &[u8], outcome: Result<IpAddr, ResolveError>);
}

struct Job {
    spec: Vec<u8>,
    handler: Weak<dyn ResolveHandler>,
}

/// Pending-count tracking shared between `ResolverHandle` and its
/// background threads. Kept separate from `ResolverHandle` itself so the
/// threads never hold a strong reference to the handle they serve: if they
/// did, the handle's refcount would never reach zero while they're
/// running, and they only stop running once the handle's `Drop` closes the
/// channel. Splitting the state avoids that deadlock.
struct Shared {
    pending: AtomicUsize,
    drained: Condvar,
    drain_lock: Mutex<()>,
}

impl Shared {
    fn wait_pending(&self) {
        let mut guard = self.drain_lock.lock().unwrap();
        while self.pending.load(Ordering::SeqCst) != 0 {
            guard = self.drained.wait(guard).unwrap();
        }
    }

    fn mark_done(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _guard = self.drain_lock.lock().unwrap();
            self.drained.notify_all();
        }
    }
}

/// Shared-ownership handle to an async resolver.
///
/// Lifetime extends at least until every in-flight resolution has
/// terminated: dropping the last `Arc` does not cancel outstanding work,
/// and [`ResolverHandle::wait_pending`] blocks regardless of how many
/// strong references remain.
pub struct ResolverHandle {
    tx: Mutex<Option<mpsc::Sender<Job>>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    shared: Arc<Shared>,
}

impl ResolverHandle {
    /// Spin up a resolver with `threads` dedicated blocking-lookup
    /// threads.
    pub fn new(threads: NonZeroUsize) -> Arc<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let shared = Arc::new(Shared {
            pending: AtomicUsize::new(0),
            drained: Condvar::new(),
            drain_lock: Mutex::new(()),
        });

        let mut spawned = Vec::with_capacity(threads.get());
        for worker_id in 0..threads.get() {
            let rx = rx.clone();
            let shared = shared.clone();
            let join = std::thread::Builder::new()
                .name(format!("transport-resolver-{worker_id}"))
                .spawn(move || resolver_loop(rx, shared))
                .expect("spawn resolver thread failed");
            spawned.push(join);
        }

        Arc::new(Self {
            tx: Mutex::new(Some(tx)),
            threads: Mutex::new(spawned),
            shared,
        })
    }

    /// Enqueue a resolution. `handler` is held weakly; see the module docs.
    pub fn resolve_async(&self, spec: &[u8], handler: Weak<dyn ResolveHandler>) {
        let guard = self.tx.lock().unwrap();
        let Some(tx) = guard.as_ref() else {
            tracing::debug!("resolve_async called after resolver shutdown, dropping");
            return;
        };
        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        if tx
            .send(Job {
                spec: spec.to_vec(),
                handler,
            })
            .is_err()
        {
            self.shared.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Block until every resolution enqueued so far has been delivered or
    /// dropped. Called from `Drop` but may also be called directly.
    pub fn wait_pending(&self) {
        self.shared.wait_pending();
    }
}

impl Drop for ResolverHandle {
    fn drop(&mut self) {
        // Closing the sender lets every resolver thread's recv loop end
        // once its queue is empty; in-flight jobs still get to run.
        *self.tx.lock().unwrap() = None;
        self.wait_pending();
        for join in self.threads.lock().unwrap().drain(..) {
            let _ = join.join();
        }
    }
}

fn resolver_loop(rx: Arc<Mutex<mpsc::Receiver<Job>>>, shared: Arc<Shared>) {
    loop {
        let job = {
            let rx = rx.lock().unwrap();
            rx.recv()
        };
        let Ok(job) = job else {
            return;
        };
        if let Some(handler) = job.handler.upgrade() {
            let outcome = resolve_blocking(&job.spec);
            handler.on_resolved(&job.spec, outcome);
        }
        shared.mark_done();
    }
}

fn resolve_blocking(spec: &[u8]) -> Result<IpAddr, ResolveError> {
    let spec = std::str::from_utf8(spec).map_err(|_| ResolveError::InvalidSpec)?;
    // Accept either "host:port" (as ToSocketAddrs expects) or a bare host.
    let lookup_target = if spec.contains(':') {
        spec.to_string()
    } else {
        format!("{spec}:0")
    };
    lookup_target
        .to_socket_addrs()
        .map_err(|e| ResolveError::Lookup(e.to_string()))?
        .map(|addr| addr.ip())
        .next()
        .ok_or(ResolveError::NoAddresses)
}
