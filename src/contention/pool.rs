//! Load-generating push workers

use super::payload::{ContentionFiles, SizeClass};
use crate::device::DeviceTransfer;
use crate::models::config::guest_payload_path;
use crate::types::ContentionCounts;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Identity of one worker: its size class and index within that class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    pub class: SizeClass,
    pub index: usize,
}

/// Handle to a running push worker
#[derive(Debug)]
pub struct WorkerHandle {
    id: WorkerId,
    destination: String,
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Decrements the live-worker gauge when a worker task ends, however it ends
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Spawns and reaps push workers for one contention level
pub struct ContentionWorkerPool {
    device: Arc<dyn DeviceTransfer>,
    files: ContentionFiles,
    guest_work_dir: String,
    live: Arc<AtomicUsize>,
}

impl ContentionWorkerPool {
    pub fn new(device: Arc<dyn DeviceTransfer>, files: ContentionFiles, guest_work_dir: String) -> Self {
        Self {
            device,
            files,
            guest_work_dir,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Share an externally owned live-worker gauge
    pub fn with_gauge(mut self, gauge: Arc<AtomicUsize>) -> Self {
        self.live = gauge;
        self
    }

    /// Workers currently alive across every class
    pub fn live_workers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn gauge(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.live)
    }

    /// Start `counts` workers per class.
    ///
    /// Every worker of a class pushes the same source file to its own
    /// destination, so concurrent pushes never collide on the guest. The
    /// gauge already includes all of them when this returns.
    pub fn spawn(&self, counts: ContentionCounts) -> Vec<WorkerHandle> {
        let mut handles = Vec::with_capacity(counts.total());
        for (class, count) in [
            (SizeClass::Small, counts.small),
            (SizeClass::Medium, counts.medium),
            (SizeClass::Large, counts.large),
        ] {
            let source = self.files.path(class).to_path_buf();
            for index in 0..count {
                let destination = guest_payload_path(&self.guest_work_dir, &source, index);
                handles.push(self.spawn_worker(WorkerId { class, index }, source.clone(), destination));
            }
        }
        handles
    }

    fn spawn_worker(&self, id: WorkerId, source: PathBuf, destination: String) -> WorkerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        self.live.fetch_add(1, Ordering::SeqCst);
        let guard = LiveGuard(Arc::clone(&self.live));

        let device = Arc::clone(&self.device);
        let worker_stop = Arc::clone(&stop);
        let worker_destination = destination.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            while !worker_stop.load(Ordering::Acquire) {
                // Load generation tolerates failed pushes; just go again.
                if !device.push(&source, &worker_destination).await {
                    tokio::task::yield_now().await;
                }
            }
        });

        WorkerHandle { id, destination, stop, task }
    }

    /// Raise every worker's stop flag without waiting
    pub fn stop_all(handles: &[WorkerHandle]) {
        for handle in handles {
            handle.stop();
        }
    }

    /// Wait for every worker to finish its in-flight push and exit.
    ///
    /// Returns the number of workers that panicked.
    pub async fn join_all(handles: Vec<WorkerHandle>) -> usize {
        let results = join_all(handles.into_iter().map(|h| h.task)).await;
        results.iter().filter(|r| r.is_err()).count()
    }
}
