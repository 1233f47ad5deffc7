//! WorkerPool: the injected execution context bulk graph/CSR operations run
//! through. A real run uses a `rayon` pool sized to the hardware core count;
//! tests substitute the serial variant so fan-out order never leaks into
//! assertions. This replaces a process-wide global with an explicit value
//! callers can thread through (or fall back to [default_pool] for
//! convenience call sites).

use std::sync::OnceLock;

/// Execution context for bulk graph/CSR operations.
pub enum WorkerPool {
    /// Bounded work-stealing pool, degree pinned to the hardware core count.
    Rayon(rayon::ThreadPool),
    /// Runs everything on the calling thread. Deterministic, for tests.
    Serial,
}

impl WorkerPool {
    /// A pool sized to `num_cpus::get()`, pinned to the hardware core count
    /// to avoid over-subscription and cache-line contention.
    pub fn hardware() -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .build()
            .expect("building a rayon thread pool with the default configuration cannot fail");
        WorkerPool::Rayon(pool)
    }

    /// A pool that runs everything inline on the caller's thread. Used by
    /// tests that need deterministic fan-out order.
    pub fn serial() -> Self {
        WorkerPool::Serial
    }

    /// Run `f` on this pool, blocking until it returns.
    pub fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match self {
            WorkerPool::Rayon(pool) => pool.install(f),
            WorkerPool::Serial => f(),
        }
    }
}

/// Process-wide default pool for call sites that don't need to inject one.
pub fn default_pool() -> &'static WorkerPool {
    static POOL: OnceLock<WorkerPool> = OnceLock::new();
    POOL.get_or_init(WorkerPool::hardware)
}
