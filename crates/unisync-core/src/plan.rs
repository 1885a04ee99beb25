// ── Diff planner ──
//
// For each reachable controller, work out which desired records it lacks
// or holds with a different payload. A controller is never asked to write
// a record it already originates, and the same filter that gates reads
// gates writes.

use std::collections::BTreeMap;

use serde::Serialize;
use strum::Display;

use crate::config::ControllerConfig;
use crate::consolidate::{DesiredEntry, DesiredState};
use crate::fetch::Snapshot;
use crate::model::{ControllerId, Record};

/// What to do with a record on a target controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Create,
    Update,
}

/// One write against one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOperation {
    pub action: Action,
    /// The record to write. For updates, `remote_id` addresses the target
    /// controller's existing copy.
    pub record: Record,
}

/// The ordered operations for one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub controller: ControllerId,
    pub operations: Vec<PlannedOperation>,
}

impl SyncPlan {
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Build one plan per controller that has a snapshot this cycle.
pub fn plan(
    desired: &DesiredState,
    snapshots: &BTreeMap<ControllerId, Snapshot>,
    configs: &[ControllerConfig],
) -> BTreeMap<ControllerId, SyncPlan> {
    configs
        .iter()
        .filter_map(|config| {
            let snapshot = snapshots.get(&config.id)?;
            Some((config.id.clone(), plan_for(desired, snapshot, config)))
        })
        .collect()
}

/// Plan a single controller against the desired state.
pub fn plan_for(desired: &DesiredState, snapshot: &Snapshot, config: &ControllerConfig) -> SyncPlan {
    let mut operations: Vec<PlannedOperation> = desired
        .iter()
        .filter_map(|(_, entry)| operation_for(entry, snapshot, config))
        .collect();

    operations.sort_by_cached_key(|op| op.record.identity().canonical());

    SyncPlan {
        controller: config.id.clone(),
        operations,
    }
}

fn operation_for(
    entry: &DesiredEntry,
    snapshot: &Snapshot,
    config: &ControllerConfig,
) -> Option<PlannedOperation> {
    if entry.origins.contains(&config.id) {
        return None;
    }
    if !config.accepts(entry.record.identity()) {
        return None;
    }

    match snapshot.find(entry.record.identity()) {
        None => Some(PlannedOperation {
            action: Action::Create,
            record: entry.record.clone(),
        }),
        Some(existing) if !existing.same_payload(&entry.record) => Some(PlannedOperation {
            action: Action::Update,
            record: entry.record.retargeted(existing.remote_id()),
        }),
        Some(_) => None,
    }
}
