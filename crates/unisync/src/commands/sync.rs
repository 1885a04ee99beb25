//! `sync`, `plan` and `run` handlers.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use unisync_core::{ControllerConfig, CoreError, CycleReport, SyncEngine, UnifiAdapter};

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;
use crate::output;

/// Run one cycle. Fails with `PartialSync` if anything went wrong.
pub async fn sync(dry_run: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    let configs = config.to_controller_configs()?;
    let dry_run = dry_run || config.sync.dry_run;

    let engine = SyncEngine::new(UnifiAdapter::new());
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(&cancel);

    let report = engine
        .run_cycle_with_cancel(&configs, dry_run, &cancel)
        .await?;
    print_report(&report, global)?;

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::PartialSync {
            failed_operations: report.failed(),
            failed_controllers: report.failed_controllers().len(),
        })
    }
}

/// Run cycles until interrupted.
///
/// Per-controller failures are reported and retried next cycle; only
/// cycle-level errors (an unusable controller list) end the loop.
pub async fn run(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    let configs = config.to_controller_configs()?;
    let dry_run = args.dry_run || config.sync.dry_run;
    let interval = args.interval.unwrap_or_else(|| config.sync.interval());
    if interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let engine = SyncEngine::new(UnifiAdapter::new());
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(&cancel);

    info!(
        controllers = configs.len(),
        interval = %humantime::format_duration(interval),
        dry_run,
        "sync loop started"
    );

    let mut cycles: u64 = 0;
    loop {
        match run_once(&engine, &configs, dry_run, &cancel).await {
            Ok(report) => {
                cycles += 1;
                print_report(&report, global)?;
            }
            Err(CliError::Cancelled) => break,
            Err(e) => return Err(e),
        }

        if !sleep_or_cancel(interval, &cancel).await {
            break;
        }
    }

    info!(cycles, "sync loop stopped");
    Ok(())
}

async fn run_once(
    engine: &SyncEngine<UnifiAdapter>,
    configs: &[ControllerConfig],
    dry_run: bool,
    cancel: &CancellationToken,
) -> Result<CycleReport, CliError> {
    match engine.run_cycle_with_cancel(configs, dry_run, cancel).await {
        Ok(report) => {
            if !report.is_clean() {
                warn!(
                    failed = report.failed(),
                    unreachable = report.failed_controllers().len(),
                    "cycle finished with failures, retrying next cycle"
                );
            }
            Ok(report)
        }
        Err(CoreError::Cancelled) => Err(CliError::Cancelled),
        Err(e) => Err(e.into()),
    }
}

/// Sleep for `interval`. Returns `false` if cancelled first.
async fn sleep_or_cancel(interval: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(interval) => true,
    }
}

fn cancel_on_ctrl_c(cancel: &CancellationToken) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping");
            cancel.cancel();
        }
    });
}

fn print_report(report: &CycleReport, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let rendered = output::render_report(global.output, report, color)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
