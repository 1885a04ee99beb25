// ── Fetcher ──
//
// Pulls every controller concurrently and turns what each one returns into
// an origin-tagged `Snapshot`. A controller that fails (or is cancelled)
// gets a `FetchOutcome::Failed` slot and no snapshot; the rest carry on.

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::adapter::ControllerAdapter;
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{Channel, ControllerId, Identity, Origin, RawRecord, Record};

// ── Snapshot ─────────────────────────────────────────────────────────

/// The records one controller held at fetch time, after filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    controller: ControllerId,
    records: Vec<Record>,
}

impl Snapshot {
    pub fn new(controller: ControllerId, records: Vec<Record>) -> Self {
        Self {
            controller,
            records,
        }
    }

    pub fn controller(&self) -> &ControllerId {
        &self.controller
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// This controller's copy of `identity`.
    ///
    /// When the controller holds the identity more than once (a static
    /// policy plus a client-derived name, say), the copy that wins
    /// [`Record::precedence`] is returned.
    pub fn find(&self, identity: &Identity) -> Option<&Record> {
        self.records
            .iter()
            .filter(|r| r.identity() == identity)
            .min_by(|a, b| a.precedence(b))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// How fetching one controller went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Fetched {
        /// Static DNS policy records kept.
        dns_records: usize,
        /// Client-derived records kept.
        dhcp_records: usize,
        /// Dropped by the record type / domain suffix filter.
        filtered: usize,
        /// Dropped as unsupported or malformed.
        rejected: usize,
    },
    Failed {
        error: String,
    },
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Everything the fetch phase produced.
#[derive(Debug, Default)]
pub struct FetchResults {
    /// Only controllers that fetched successfully.
    pub snapshots: BTreeMap<ControllerId, Snapshot>,
    /// One entry per configured controller.
    pub outcomes: BTreeMap<ControllerId, FetchOutcome>,
}

// ── Fetch ────────────────────────────────────────────────────────────

/// Fetch every controller concurrently.
pub async fn fetch_all<A: ControllerAdapter>(
    adapter: &A,
    configs: &[ControllerConfig],
    cancel: &CancellationToken,
) -> FetchResults {
    let fetched = join_all(
        configs
            .iter()
            .map(|config| fetch_controller(adapter, config, cancel)),
    )
    .await;

    let mut results = FetchResults::default();
    for (config, result) in configs.iter().zip(fetched) {
        match result {
            Ok((snapshot, outcome)) => {
                debug!(controller = %config.id, records = snapshot.len(), "controller fetched");
                results.snapshots.insert(config.id.clone(), snapshot);
                results.outcomes.insert(config.id.clone(), outcome);
            }
            Err(e) => {
                let err = CoreError::ControllerFetch {
                    controller: config.id.to_string(),
                    source: Box::new(e),
                };
                warn!(controller = %config.id, error = %err, "fetch failed, controller skipped this cycle");
                results.outcomes.insert(
                    config.id.clone(),
                    FetchOutcome::Failed {
                        error: err.to_string(),
                    },
                );
            }
        }
    }
    results
}

async fn fetch_controller<A: ControllerAdapter>(
    adapter: &A,
    config: &ControllerConfig,
    cancel: &CancellationToken,
) -> Result<(Snapshot, FetchOutcome), CoreError> {
    let dhcp = async {
        if config.sync_dhcp_clients {
            adapter.fetch_dhcp_clients(config).await
        } else {
            Ok(Vec::new())
        }
    };
    let both = async { tokio::try_join!(adapter.fetch_dns_records(config), dhcp) };

    let (dns, dhcp) = tokio::select! {
        () = cancel.cancelled() => return Err(CoreError::Cancelled),
        result = both => result?,
    };

    Ok(build_snapshot(config, dns, dhcp))
}

/// Tag, validate and filter one controller's raw records.
pub(crate) fn build_snapshot(
    config: &ControllerConfig,
    dns: Vec<RawRecord>,
    dhcp: Vec<RawRecord>,
) -> (Snapshot, FetchOutcome) {
    let mut records = Vec::with_capacity(dns.len() + dhcp.len());
    let mut kept = [0_usize; 2];
    let mut filtered = 0;
    let mut rejected = 0;

    let tagged = dns
        .into_iter()
        .map(|raw| (Channel::DnsPolicy, raw))
        .chain(dhcp.into_iter().map(|raw| (Channel::DhcpLease, raw)));

    for (channel, raw) in tagged {
        let origin = Origin::new(config.id.clone(), channel);
        match Record::from_raw(raw, origin) {
            Ok(record) if config.accepts(record.identity()) => {
                kept[usize::from(channel == Channel::DhcpLease)] += 1;
                records.push(record);
            }
            Ok(record) => {
                debug!(controller = %config.id, record = %record.identity(), "filtered out");
                filtered += 1;
            }
            Err(e) => {
                debug!(controller = %config.id, error = %e, "rejected record");
                rejected += 1;
            }
        }
    }

    if rejected > 0 {
        warn!(controller = %config.id, rejected, "some records could not be understood and were ignored");
    }

    let outcome = FetchOutcome::Fetched {
        dns_records: kept[0],
        dhcp_records: kept[1],
        filtered,
        rejected,
    };
    (Snapshot::new(config.id.clone(), records), outcome)
}
