//! The shard selector: a pure, non-allocating function mapping a key to a
//! worker index.
//!
//! The selector is deliberately *not* a pure function of the key alone. It
//! mixes in a per-call, call-local salt (a stack address) and a
//! high-resolution timestamp so that repeated calls with the same endpoint
//! spec can land on different workers. This avoids one popular endpoint
//! pinning every caller to a single worker; it is acceptable because
//! workers are functionally identical and affinity is not a goal here.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;
use std::time::Instant;

/// The sentinel shard key for non-endpoint dispatch (`GetScheduler`,
/// `execute`): an empty key, equivalent to `(null, 0)`.
pub const SENTINEL: &[u8] = &[];

fn process_anchor() -> Instant {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

/// A local, per-call identity value. Its stack address differs (with high
/// probability) between calls; it is salt, not a cryptographic nonce.
struct CallSite;

fn hash_key(key: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Map `key` to a worker index in `[0, worker_count)`.
///
/// `worker_count` must be at least 1. For `worker_count == 1` this always
/// returns `0` without touching the salted hash path.
///
/// Pass [`SENTINEL`] for non-endpoint dispatch such as `GetScheduler`/
/// `execute`.
pub fn select(key: &[u8], worker_count: usize) -> usize {
    debug_assert!(worker_count >= 1, "select requires at least one worker");
    if worker_count <= 1 {
        return 0;
    }

    let first_stage = hash_key(key);

    let call_site = CallSite;
    let identity = &call_site as *const CallSite as usize;
    let elapsed_nanos = process_anchor().elapsed().as_nanos();

    let mut hasher = DefaultHasher::new();
    identity.hash(&mut hasher);
    elapsed_nanos.hash(&mut hasher);
    first_stage.hash(&mut hasher);
    let second_stage = hasher.finish();

    (second_stage % worker_count as u64) as usize
}
