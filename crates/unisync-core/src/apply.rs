// ── Apply executor ──
//
// Runs one controller's plan through the adapter, one operation at a time.
// Every operation gets its own outcome; a failure never stops the rest.

use serde::Serialize;
use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapter::ControllerAdapter;
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::Identity;
use crate::plan::{Action, PlannedOperation, SyncPlan};

/// Reason attached to operations interrupted by cancellation.
pub const CANCELLED_REASON: &str = "cancelled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    DryRun,
}

/// Result of one planned operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied,
    Skipped { reason: SkipReason },
    Failed { reason: String },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationReport {
    pub action: Action,
    pub identity: Identity,
    #[serde(flatten)]
    pub outcome: ApplyOutcome,
}

/// Apply `plan` to the controller described by `config`.
///
/// With `dry_run` set nothing is sent and every operation is reported as
/// skipped. Once `cancel` fires, the operation in flight and all that
/// follow are reported as failed.
pub async fn apply_plan<A: ControllerAdapter>(
    adapter: &A,
    config: &ControllerConfig,
    plan: &SyncPlan,
    dry_run: bool,
    cancel: &CancellationToken,
) -> Vec<OperationReport> {
    let mut reports = Vec::with_capacity(plan.len());

    for op in &plan.operations {
        let identity = op.record.identity();
        let outcome = if dry_run {
            info!(controller = %config.id, action = %op.action, record = %identity, "dry run, not applied");
            ApplyOutcome::Skipped {
                reason: SkipReason::DryRun,
            }
        } else if cancel.is_cancelled() {
            cancelled()
        } else {
            tokio::select! {
                biased;
                () = cancel.cancelled() => cancelled(),
                result = execute(adapter, config, op) => match result {
                    Ok(()) => {
                        info!(controller = %config.id, action = %op.action, record = %identity, "applied");
                        ApplyOutcome::Applied
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        let err = CoreError::ControllerApply {
                            controller: config.id.to_string(),
                            action: op.action.to_string(),
                            identity: identity.to_string(),
                            source: Box::new(e),
                        };
                        warn!(error = %err, "operation failed");
                        ApplyOutcome::Failed { reason }
                    }
                },
            }
        };

        reports.push(OperationReport {
            action: op.action,
            identity: identity.clone(),
            outcome,
        });
    }

    reports
}

async fn execute<A: ControllerAdapter>(
    adapter: &A,
    config: &ControllerConfig,
    op: &PlannedOperation,
) -> Result<(), CoreError> {
    match op.action {
        Action::Create => adapter.create_record(config, &op.record).await,
        Action::Update => adapter.update_record(config, &op.record).await,
    }
}

fn cancelled() -> ApplyOutcome {
    ApplyOutcome::Failed {
        reason: CANCELLED_REASON.into(),
    }
}
