//! # Background work queue
//!
//! Fire-and-forget side effects (cache writes, hit counters, analytics) are
//! submitted here instead of being awaited on the caller's path.
//!
//! - `submit` never blocks and never fails the caller
//! - a job that returns `Err` is logged with its label and dropped
//! - jobs run one at a time in submission order on a single worker task
//! - `flush` resolves once every job submitted before it has finished
//!
//! ```rust,no_run
//! use parley_core::tasks::BackgroundQueue;
//!
//! # async fn example() {
//! let queue = BackgroundQueue::start();
//! queue.submit("cache_write", async { Ok(()) });
//! queue.flush().await;
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::Result;

type Job = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

enum Command {
    Run { label: String, job: Job },
    Flush(oneshot::Sender<()>),
}

/// 队列统计
#[derive(Debug, Default)]
struct QueueCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub dropped: u64,
}

#[derive(Clone)]
pub struct BackgroundQueue {
    sender: mpsc::UnboundedSender<Command>,
    counters: Arc<QueueCounters>,
    closed: Arc<AtomicBool>,
}

impl BackgroundQueue {
    /// Spawn the worker on the current tokio runtime.
    pub fn start() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let counters = Arc::new(QueueCounters::default());
        tokio::spawn(run_worker(receiver, counters.clone()));
        Self {
            sender,
            counters,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn submit<F>(&self, label: impl Into<String>, job: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let label = label.into();
        if self.closed.load(Ordering::Acquire) {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("background queue closed, dropping job {}", label);
            return;
        }
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        let command = Command::Run {
            label,
            job: Box::pin(job),
        };
        if let Err(mpsc::error::SendError(Command::Run { label, .. })) = self.sender.send(command) {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("background worker gone, dropping job {}", label);
        }
    }

    /// Wait for every job submitted so far.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(Command::Flush(tx)).is_err() {
            return;
        }
        let _ = rx.await;
    }

    /// Stop accepting new jobs. Jobs already queued still run.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

async fn run_worker(mut receiver: mpsc::UnboundedReceiver<Command>, counters: Arc<QueueCounters>) {
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Run { label, job } => match job.await {
                Ok(()) => {
                    counters.completed.fetch_add(1, Ordering::Relaxed);
                    debug!("background job {} done", label);
                }
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!("background job {} failed: {}", label, e);
                }
            },
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("background worker stopped");
}
