// deplist-core/src/ledger.rs
//! Shared record of which packages have been visited and what they resolved
//! to. Every operation takes the single lock; the map itself is never handed
//! out.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use deplist_common::error::{DeplistError, Result};
use deplist_common::model::PackageId;

#[derive(Debug, Clone, PartialEq, Eq)]
enum LedgerEntry {
    /// Claimed by a visitor that has not finished resolving it yet.
    Visiting,
    Resolved { files: Vec<PathBuf>, output: PathBuf },
}

/// A finished rule: the artifact path and the files it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub output: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Resolved ledger contents, ordered by package identifier.
pub type Snapshot = BTreeMap<PackageId, Rule>;

#[derive(Debug, Default)]
pub struct Ledger {
    entries: Mutex<HashMap<PackageId, LedgerEntry>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PackageId, LedgerEntry>> {
        // Entries are write-once, so a panic elsewhere cannot leave one half
        // written.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claims `id` for the caller. Returns `true` if someone already claimed
    /// it, in which case the caller must do nothing further for `id`.
    pub fn claim(&self, id: &str) -> bool {
        let mut entries = self.lock();
        if entries.contains_key(id) {
            return true;
        }
        entries.insert(id.to_string(), LedgerEntry::Visiting);
        false
    }

    /// Records the result for an id the caller claimed.
    pub fn store(&self, id: &str, files: Vec<PathBuf>, output: PathBuf) -> Result<()> {
        let mut entries = self.lock();
        match entries.entry(id.to_string()) {
            Entry::Occupied(mut slot) if *slot.get() == LedgerEntry::Visiting => {
                slot.insert(LedgerEntry::Resolved { files, output });
                Ok(())
            }
            Entry::Occupied(_) => Err(DeplistError::Ledger(format!(
                "{id} was already resolved"
            ))),
            Entry::Vacant(_) => Err(DeplistError::Ledger(format!(
                "{id} was stored without being claimed"
            ))),
        }
    }

    /// Copies out every resolved entry. Only meaningful once no visitor is
    /// running; an entry still marked as visiting is an error.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let entries = self.lock();
        entries
            .iter()
            .map(|(id, entry)| match entry {
                LedgerEntry::Resolved { files, output } => Ok((
                    id.clone(),
                    Rule {
                        output: output.clone(),
                        files: files.clone(),
                    },
                )),
                LedgerEntry::Visiting => Err(DeplistError::Ledger(format!(
                    "{id} was claimed but never resolved"
                ))),
            })
            .collect()
    }
}
