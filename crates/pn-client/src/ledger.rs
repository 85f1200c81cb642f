//! Local record of posts this client already voted on or reported.
//!
//! A cache of server truth that saves a round trip, never the authority.
//! Unreadable or corrupt entries decode to the empty set.

use std::collections::BTreeSet;
use std::sync::Arc;

use pn_core::models::ActionKind;

use crate::storage::{LocalStore, REPORTED_KEY, VOTED_KEY};

#[derive(Clone)]
pub struct DedupLedger {
    store: Arc<dyn LocalStore>,
    key: &'static str,
}

impl DedupLedger {
    pub fn new(store: Arc<dyn LocalStore>, kind: ActionKind) -> Self {
        let key = match kind {
            ActionKind::Vote => VOTED_KEY,
            ActionKind::Report => REPORTED_KEY,
        };
        Self { store, key }
    }

    pub fn has_acted(&self, post_id: &str) -> bool {
        self.read().contains(post_id)
    }

    /// Best effort: a failed write only costs a wasted request later.
    pub fn mark_acted(&self, post_id: &str) {
        let mut ids = self.read();
        if !ids.insert(post_id.to_string()) {
            return;
        }
        let encoded = match serde_json::to_string(&ids) {
            Ok(encoded) => encoded,
            Err(err) => {
                log::warn!("could not encode {}: {}", self.key, err);
                return;
            }
        };
        if let Err(err) = self.store.set(self.key, &encoded) {
            log::warn!("could not persist {}: {err:#}", self.key);
        }
    }

    fn read(&self) -> BTreeSet<String> {
        match self.store.get(self.key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            _ => BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn marks_are_per_kind() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let votes = DedupLedger::new(Arc::clone(&store), ActionKind::Vote);
        let reports = DedupLedger::new(Arc::clone(&store), ActionKind::Report);

        assert!(!votes.has_acted("p1"));
        votes.mark_acted("p1");
        votes.mark_acted("p1");
        assert!(votes.has_acted("p1"));
        assert!(!reports.has_acted("p1"));

        let raw = store.get(VOTED_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"["p1"]"#);
    }

    #[test]
    fn corrupt_entry_reads_as_empty_and_is_repaired() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        store.set(REPORTED_KEY, "{oops").unwrap();
        let reports = DedupLedger::new(Arc::clone(&store), ActionKind::Report);

        assert!(!reports.has_acted("p1"));
        reports.mark_acted("p1");
        assert!(reports.has_acted("p1"));
    }

    #[test]
    fn unavailable_storage_never_panics() {
        let ledger = DedupLedger::new(Arc::new(MemoryStore::unavailable()), ActionKind::Vote);
        ledger.mark_acted("p1");
        assert!(!ledger.has_acted("p1"));
    }
}
