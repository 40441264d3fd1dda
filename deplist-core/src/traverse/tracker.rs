// deplist-core/src/traverse/tracker.rs
// Wait-group for a task tree whose size is only known once it has finished
// growing. Every unit of outstanding work owns a sender clone; the channel
// closes when the last one is dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use deplist_common::error::{DeplistError, Result};
use tokio::sync::mpsc;
use tracing::{error, trace};

#[derive(Debug)]
pub struct WorkTracker {
    tx: mpsc::UnboundedSender<DeplistError>,
    outstanding: Arc<AtomicUsize>,
}

/// Receiving half, held by whoever waits for the whole tree.
#[derive(Debug)]
pub struct Completion {
    rx: mpsc::UnboundedReceiver<DeplistError>,
    outstanding: Arc<AtomicUsize>,
}

/// One registered unit of work. Completes when dropped.
#[derive(Debug)]
pub struct WorkGuard {
    label: String,
    tx: mpsc::UnboundedSender<DeplistError>,
    outstanding: Arc<AtomicUsize>,
}

fn register(
    tx: &mpsc::UnboundedSender<DeplistError>,
    outstanding: &Arc<AtomicUsize>,
    label: String,
) -> WorkGuard {
    outstanding.fetch_add(1, Ordering::SeqCst);
    WorkGuard {
        label,
        tx: tx.clone(),
        outstanding: Arc::clone(outstanding),
    }
}

impl WorkTracker {
    pub fn new() -> (Self, Completion) {
        let (tx, rx) = mpsc::unbounded_channel();
        let outstanding = Arc::new(AtomicUsize::new(0));
        let tracker = Self {
            tx,
            outstanding: Arc::clone(&outstanding),
        };
        (tracker, Completion { rx, outstanding })
    }

    /// Registers a unit of work. Call this before spawning the task that
    /// will own the guard.
    pub fn register(&self, label: impl Into<String>) -> WorkGuard {
        register(&self.tx, &self.outstanding, label.into())
    }
}

impl WorkGuard {
    /// Registers a child unit. The child is outstanding before this returns,
    /// so the parent's own completion can never be observed first.
    pub fn register(&self, label: impl Into<String>) -> WorkGuard {
        register(&self.tx, &self.outstanding, label.into())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Reports a fatal error for the whole tree, then completes.
    pub fn fail(self, err: DeplistError) {
        // The receiver is gone only if the waiter already returned.
        let _ = self.tx.send(err);
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!("[{}] Visitor panicked", self.label);
            let _ = self.tx.send(DeplistError::Panic(format!(
                "visitor for {} panicked",
                self.label
            )));
        }
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        trace!("[{}] Work unit completed", self.label);
    }
}

impl Completion {
    /// Resolves once every registered unit has completed, or as soon as any
    /// unit reports a failure. The tracker must have been dropped by then.
    pub async fn wait(mut self) -> Result<()> {
        match self.rx.recv().await {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}
