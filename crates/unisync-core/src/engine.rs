// ── Sync engine ──
//
// One cycle: fetch every controller, consolidate, plan, apply. The engine
// keeps no state between cycles besides what the adapter caches.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::adapter::ControllerAdapter;
use crate::apply::apply_plan;
use crate::config::ControllerConfig;
use crate::consolidate::consolidate;
use crate::error::CoreError;
use crate::fetch::fetch_all;
use crate::plan::plan;
use crate::report::CycleReport;

/// Drives sync cycles against a set of controllers through one adapter.
pub struct SyncEngine<A> {
    adapter: A,
}

impl<A: ControllerAdapter> SyncEngine<A> {
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Run one cycle to completion.
    pub async fn run_cycle(
        &self,
        configs: &[ControllerConfig],
        dry_run: bool,
    ) -> Result<CycleReport, CoreError> {
        self.run_cycle_with_cancel(configs, dry_run, &CancellationToken::new())
            .await
    }

    /// Run one cycle, stopping early when `cancel` fires.
    ///
    /// Only an empty or ambiguous controller list, or cancellation before
    /// any write was attempted, fails the cycle. Everything else ends up in
    /// the report.
    pub async fn run_cycle_with_cancel(
        &self,
        configs: &[ControllerConfig],
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, CoreError> {
        validate(configs)?;

        let started_at = Utc::now();
        let span = info_span!("cycle", controllers = configs.len(), dry_run);

        async {
            info!("sync cycle started");

            let fetched = fetch_all(&self.adapter, configs, cancel).await;
            if cancel.is_cancelled() {
                warn!("cancelled before apply, nothing written");
                return Err(CoreError::Cancelled);
            }

            let desired = consolidate(fetched.snapshots.values());
            let plans = plan(&desired, &fetched.snapshots, configs);
            debug!(
                desired = desired.len(),
                planned = plans.values().map(|p| p.len()).sum::<usize>(),
                "plans built"
            );

            let applied = join_all(configs.iter().filter_map(|config| {
                let plan = plans.get(&config.id)?;
                Some(async move {
                    let reports =
                        apply_plan(&self.adapter, config, plan, dry_run, cancel).await;
                    (config.id.clone(), reports)
                })
            }))
            .await;

            let report = CycleReport {
                started_at,
                finished_at: Utc::now(),
                dry_run,
                fetches: fetched.outcomes,
                desired_records: desired.len(),
                operations: applied.into_iter().collect::<BTreeMap<_, _>>(),
            };

            let failed_controllers = report.failed_controllers().len();
            if report.is_clean() {
                info!(
                    desired = report.desired_records,
                    applied = report.applied(),
                    skipped = report.skipped(),
                    "sync cycle finished"
                );
            } else {
                warn!(
                    desired = report.desired_records,
                    applied = report.applied(),
                    skipped = report.skipped(),
                    failed = report.failed(),
                    failed_controllers,
                    "sync cycle finished with failures"
                );
            }
            Ok(report)
        }
        .instrument(span)
        .await
    }
}

fn validate(configs: &[ControllerConfig]) -> Result<(), CoreError> {
    if configs.is_empty() {
        return Err(CoreError::NoControllers);
    }
    let mut seen = BTreeSet::new();
    for config in configs {
        if !seen.insert(&config.id) {
            return Err(CoreError::DuplicateController {
                id: config.id.to_string(),
            });
        }
    }
    Ok(())
}
