//! Background contention manager and its handshake with the driver
//!
//! The driver and the manager never share a lock. They talk through four
//! one-shot signals, each with exactly one notifier and one waiter:
//!
//! | signal      | notified by | awaited by |
//! |-------------|-------------|------------|
//! | `start`     | driver      | manager    |
//! | `stop`      | driver      | manager    |
//! | `ready`     | manager     | driver     |
//! | `terminate` | driver      | manager    |
//!
//! A `Notify` permit is stored when nobody is waiting yet and consumed by the
//! next wait, which gives the set-then-wait-then-clear behaviour of an
//! auto-resetting event.

use super::pool::ContentionWorkerPool;
use crate::error::{AppError, Result};
use crate::types::ContentionCounts;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Signals shared by one manager and its handle
#[derive(Debug, Default)]
struct Handshake {
    start: Notify,
    stop: Notify,
    ready: Notify,
    terminate: Notify,
}

/// Lifecycle state of the manager task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Waiting for a start (or terminate) signal with no workers alive
    Idle,
    /// Workers running, waiting for a stop (or terminate) signal
    Active,
    /// Task has exited
    Terminated,
}

impl ManagerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ManagerState::Idle,
            1 => ManagerState::Active,
            _ => ManagerState::Terminated,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ManagerState::Idle => 0,
            ManagerState::Active => 1,
            ManagerState::Terminated => 2,
        }
    }
}

/// Owns the worker pool for one contention level
pub struct ContentionManager {
    pool: ContentionWorkerPool,
    counts: ContentionCounts,
    handshake: Arc<Handshake>,
    state: Arc<AtomicU8>,
    cycles: Arc<AtomicU64>,
}

impl ContentionManager {
    pub fn new(pool: ContentionWorkerPool, counts: ContentionCounts) -> Self {
        Self {
            pool,
            counts,
            handshake: Arc::new(Handshake::default()),
            state: Arc::new(AtomicU8::new(ManagerState::Idle.as_u8())),
            cycles: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start the manager task and return the driver's side of the handshake
    pub fn spawn(self) -> ContentionHandle {
        let handshake = Arc::clone(&self.handshake);
        let state = Arc::clone(&self.state);
        let cycles = Arc::clone(&self.cycles);
        let workers = self.pool.gauge();
        let counts = self.counts;
        let task = tokio::spawn(self.run());

        ContentionHandle {
            handshake,
            task: Some(task),
            state,
            cycles,
            workers,
            counts,
            active: false,
        }
    }

    fn set_state(&self, state: ManagerState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    async fn run(self) {
        let hs = Arc::clone(&self.handshake);
        loop {
            self.set_state(ManagerState::Idle);
            tokio::select! {
                biased;
                _ = hs.terminate.notified() => break,
                _ = hs.start.notified() => {}
            }

            let workers = self.pool.spawn(self.counts);
            self.set_state(ManagerState::Active);
            hs.ready.notify_one();

            let terminating = tokio::select! {
                biased;
                _ = hs.terminate.notified() => true,
                _ = hs.stop.notified() => false,
            };

            ContentionWorkerPool::stop_all(&workers);
            ContentionWorkerPool::join_all(workers).await;

            if terminating {
                break;
            }
            self.cycles.fetch_add(1, Ordering::SeqCst);
            self.set_state(ManagerState::Idle);
            hs.ready.notify_one();
        }
        self.set_state(ManagerState::Terminated);
    }
}

/// Driver-side handle to a running [`ContentionManager`].
///
/// Start and stop must strictly alternate; the handle refuses anything else
/// instead of queueing a signal the manager would act on later.
pub struct ContentionHandle {
    handshake: Arc<Handshake>,
    task: Option<JoinHandle<()>>,
    state: Arc<AtomicU8>,
    cycles: Arc<AtomicU64>,
    workers: Arc<AtomicUsize>,
    counts: ContentionCounts,
    active: bool,
}

impl ContentionHandle {
    /// Bring every configured worker up; returns once the manager confirms.
    pub async fn start_contention(&mut self) -> Result<()> {
        if self.active {
            return Err(AppError::internal("Contention already started; stop it before starting again"));
        }
        self.handshake.start.notify_one();
        self.wait_ready().await?;
        self.active = true;
        Ok(())
    }

    /// Stop and join every worker; returns once the manager confirms.
    pub async fn stop_contention(&mut self) -> Result<()> {
        if !self.active {
            return Err(AppError::internal("Contention is not running"));
        }
        self.handshake.stop.notify_one();
        self.wait_ready().await?;
        self.active = false;
        Ok(())
    }

    async fn wait_ready(&mut self) -> Result<()> {
        let Some(task) = self.task.as_mut() else {
            return Err(AppError::internal("Contention manager is not running"));
        };

        let exited = tokio::select! {
            biased;
            _ = self.handshake.ready.notified() => None,
            joined = task => Some(joined),
        };

        match exited {
            None => Ok(()),
            Some(joined) => {
                self.task = None;
                joined?;
                Err(AppError::internal("Contention manager exited before signalling ready"))
            }
        }
    }

    /// Terminate the manager and wait for it to exit.
    ///
    /// Safe in either state: an active manager stops and joins its workers
    /// before exiting.
    pub async fn shutdown(mut self) -> Result<()> {
        self.handshake.terminate.notify_one();
        if let Some(task) = self.task.take() {
            task.await?;
        }
        self.active = false;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> ManagerState {
        ManagerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Workers alive right now
    pub fn active_workers(&self) -> usize {
        self.workers.load(Ordering::SeqCst)
    }

    /// Live-worker gauge shared with the pool
    pub fn worker_gauge(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.workers)
    }

    /// Start/stop cycles the manager has fully completed
    pub fn cycles_completed(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Worker counts the manager spawns per cycle
    pub fn counts(&self) -> ContentionCounts {
        self.counts
    }
}

impl Drop for ContentionHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.handshake.terminate.notify_one();
        }
    }
}
