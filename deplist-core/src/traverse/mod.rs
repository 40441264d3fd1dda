// deplist-core/src/traverse/mod.rs
//! Parallel discovery of the import closure of a set of root packages.
//!
//! One task is spawned per package visit. Each visitor claims its package in
//! the shared [`Ledger`], resolves it while holding a [`Limiter`] permit,
//! records the result and spawns visitors for its imports. The coordinator
//! waits on a [`WorkTracker`] until no visitor remains, then reads the ledger.

use std::sync::Arc;
use std::time::Instant;

use deplist_common::config::BuildContext;
use deplist_common::error::Result;
use deplist_common::model::PackageId;
use deplist_common::resolver::PackageResolver;
use tracing::{debug, instrument};

pub mod tracker;
pub mod visit;

pub use tracker::{Completion, WorkGuard, WorkTracker};
pub use visit::{artifact_path, collect_files};

use crate::ledger::{Ledger, Snapshot};
use crate::limiter::{Limiter, DEFAULT_MAX_INFLIGHT};

pub struct Traversal {
    ctx: Arc<BuildContext>,
    resolver: Arc<dyn PackageResolver>,
    max_inflight: usize,
}

impl Traversal {
    pub fn new(ctx: impl Into<Arc<BuildContext>>, resolver: Arc<dyn PackageResolver>) -> Self {
        Self {
            ctx: ctx.into(),
            resolver,
            max_inflight: DEFAULT_MAX_INFLIGHT,
        }
    }

    /// Caps the number of resolver calls running at once.
    pub fn with_max_inflight(mut self, max_inflight: usize) -> Self {
        self.max_inflight = max_inflight;
        self
    }

    /// Visits every package reachable from `roots` and returns the resolved
    /// rules. The first resolver failure aborts the wait and is returned;
    /// nothing partial is reported.
    #[instrument(skip_all, fields(roots = ?roots, target = %self.ctx.target))]
    pub async fn run(&self, roots: &[PackageId]) -> Result<Snapshot> {
        let start = Instant::now();
        let limiter = Limiter::new(self.max_inflight)?;
        let ledger = Arc::new(Ledger::new());
        let shared = Arc::new(visit::Shared {
            ledger: Arc::clone(&ledger),
            limiter,
            ctx: Arc::clone(&self.ctx),
            resolver: Arc::clone(&self.resolver),
        });

        let (tracker, completion) = WorkTracker::new();
        for root in roots {
            let guard = tracker.register(root.clone());
            visit::spawn_visit(Arc::clone(&shared), root.clone(), guard);
        }
        drop(tracker);

        completion.wait().await?;

        let snapshot = ledger.snapshot()?;
        debug!(
            "Traversal finished: {} packages from {} roots in {:.2?}",
            snapshot.len(),
            roots.len(),
            start.elapsed()
        );
        Ok(snapshot)
    }
}
