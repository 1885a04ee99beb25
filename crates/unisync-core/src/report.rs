// ── Cycle report ──
//
// Everything one sync cycle did, per controller. Serializable so the CLI
// can print it as JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::apply::OperationReport;
use crate::fetch::FetchOutcome;
use crate::model::ControllerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    /// One entry per configured controller.
    pub fetches: BTreeMap<ControllerId, FetchOutcome>,
    /// Size of the consolidated desired state.
    pub desired_records: usize,
    /// Operations per controller that fetched successfully.
    pub operations: BTreeMap<ControllerId, Vec<OperationReport>>,
}

impl CycleReport {
    fn all_operations(&self) -> impl Iterator<Item = &OperationReport> {
        self.operations.values().flatten()
    }

    pub fn applied(&self) -> usize {
        self.all_operations()
            .filter(|op| op.outcome.is_applied())
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.all_operations()
            .filter(|op| op.outcome.is_skipped())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.all_operations()
            .filter(|op| op.outcome.is_failed())
            .count()
    }

    /// Total planned operations, whatever their outcome.
    pub fn planned(&self) -> usize {
        self.all_operations().count()
    }

    /// Controllers whose fetch failed this cycle.
    pub fn failed_controllers(&self) -> Vec<&ControllerId> {
        self.fetches
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(id, _)| id)
            .collect()
    }

    /// No fetch failed and no operation failed.
    pub fn is_clean(&self) -> bool {
        self.failed_controllers().is_empty() && self.failed() == 0
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
