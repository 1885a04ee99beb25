// ── Consolidator ──
//
// Merges every controller's snapshot into one desired state keyed by
// identity. Collisions are settled by `Record::precedence`, so the result
// never depends on the order snapshots arrive in.

use std::collections::{BTreeMap, BTreeSet};

use crate::fetch::Snapshot;
use crate::model::{ControllerId, Identity, Record};

/// One record of the desired state, with every controller that has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEntry {
    /// The winning copy; its payload is what gets propagated.
    pub record: Record,
    /// Controllers that already hold this identity. Never empty.
    pub origins: BTreeSet<ControllerId>,
}

/// The union of all records across all reachable controllers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    pub(crate) entries: BTreeMap<Identity, DesiredEntry>,
}

impl DesiredState {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, identity: &Identity) -> Option<&DesiredEntry> {
        self.entries.get(identity)
    }

    /// Entries in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &DesiredEntry)> {
        self.entries.iter()
    }
}

/// Merge snapshots into the desired state.
pub fn consolidate<'a, I>(snapshots: I) -> DesiredState
where
    I: IntoIterator<Item = &'a Snapshot>,
{
    let mut entries: BTreeMap<Identity, DesiredEntry> = BTreeMap::new();

    for snapshot in snapshots {
        for record in snapshot.records() {
            match entries.get_mut(record.identity()) {
                Some(entry) => {
                    entry.origins.insert(snapshot.controller().clone());
                    if record.precedence(&entry.record).is_lt() {
                        entry.record = record.clone();
                    }
                }
                None => {
                    entries.insert(
                        record.identity().clone(),
                        DesiredEntry {
                            record: record.clone(),
                            origins: BTreeSet::from([snapshot.controller().clone()]),
                        },
                    );
                }
            }
        }
    }

    DesiredState { entries }
}
