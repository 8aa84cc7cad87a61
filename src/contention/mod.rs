//! Host-driven I/O contention against the guest
//!
//! - [`ContentionWorkerPool`] spawns push workers and reaps them
//! - [`ContentionManager`] owns the pool for one level and runs the
//!   start/stop handshake with the benchmark driver
//! - [`ContentionFiles`] names (and if needed generates) the pushed payloads

pub mod manager;
pub mod payload;
pub mod pool;

pub use manager::{ContentionHandle, ContentionManager, ManagerState};
pub use payload::{ContentionFiles, SizeClass};
pub use pool::{ContentionWorkerPool, WorkerHandle, WorkerId};
