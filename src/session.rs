//! Epoch-guarded installation of projection results.
//!
//! Recalculations triggered by quick successive input changes may finish out
//! of order. Each one takes a [`RecalcTicket`] before fetching records, and
//! only the result of the most recently issued ticket is installed; results
//! carrying an older ticket are dropped so stale data never overwrites a
//! fresher projection.

use crate::engine::{compute_projection, Projection, ProjectionConfig};
use crate::error::Result;
use crate::store::{load_records, RecordStore};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Proof that a recalculation was requested at a given epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecalcTicket(u64);

impl RecalcTicket {
    pub fn epoch(&self) -> u64 {
        self.0
    }
}

/// Holds the currently installed projection.
///
/// The projection is swapped as a whole `Arc`, so readers see either the
/// previous result or the new one, never a mix.
#[derive(Debug, Default)]
pub struct ProjectionSession {
    latest_epoch: AtomicU64,
    current: Mutex<Option<Arc<Projection>>>,
}

impl ProjectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket that supersedes every ticket issued before it.
    pub fn begin(&self) -> RecalcTicket {
        RecalcTicket(self.latest_epoch.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Installs `projection` if `ticket` is still the latest one issued.
    ///
    /// Returns `false` and discards the projection otherwise.
    pub fn install(&self, ticket: RecalcTicket, projection: Projection) -> bool {
        let mut current = self.lock();
        // Checked under the lock so a newer install cannot interleave.
        if ticket.0 != self.latest_epoch.load(Ordering::SeqCst) {
            debug!(
                "Discarding projection for epoch {} (latest is {})",
                ticket.0,
                self.latest_epoch.load(Ordering::SeqCst)
            );
            return false;
        }
        *current = Some(Arc::new(projection));
        true
    }

    /// Latest installed projection, if any.
    pub fn current(&self) -> Option<Arc<Projection>> {
        self.lock().clone()
    }

    /// Loads every record from `store`, computes and installs a projection.
    ///
    /// Returns the installed projection, or `None` when a newer
    /// recalculation began while this one was running.
    pub fn recompute<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        config: &ProjectionConfig,
    ) -> Result<Option<Arc<Projection>>> {
        let ticket = self.begin();
        let records = load_records(store)?;
        let projection = compute_projection(&records, config);

        if self.install(ticket, projection) {
            Ok(self.current())
        } else {
            Ok(None)
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<Projection>>> {
        // A panic while holding the lock cannot leave a half-written result.
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
