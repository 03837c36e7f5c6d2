use std::sync::atomic::{AtomicU64, Ordering};

/// Injected result-id source, mirroring `vc_core::TimeProvider`: the issuer
/// never reads a global counter or clock directly, so tests can supply
/// deterministic ids.
pub trait ResultIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Production id source: a process-wide monotonic counter rendered as hex.
/// Uniqueness only needs to hold within one process — ids are not expected
/// to be globally unique across a fleet.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl ResultIdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        format!("{:016x}", self.counter.fetch_add(1, Ordering::Relaxed))
    }
}

/// Fixed id source for deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedIdGenerator(pub String);

impl ResultIdGenerator for FixedIdGenerator {
    fn next_id(&self) -> String {
        self.0.clone()
    }
}
