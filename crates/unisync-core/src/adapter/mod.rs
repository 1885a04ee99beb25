// ── Controller adapter seam ──
//
// The engine never speaks HTTP itself. Everything it needs from a
// controller goes through `ControllerAdapter`: two reads that return raw
// records, and two writes that apply a planned operation.

mod unifi;

use std::future::Future;

pub use unifi::UnifiAdapter;

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{RawRecord, Record};

/// Capability to read records from, and write records to, a controller.
///
/// Implementations must be safe to call concurrently for different
/// controllers. They report failures and leave retrying to the next cycle.
pub trait ControllerAdapter: Send + Sync {
    /// List the static DNS policy records of the controller's site.
    fn fetch_dns_records(
        &self,
        config: &ControllerConfig,
    ) -> impl Future<Output = Result<Vec<RawRecord>, CoreError>> + Send;

    /// List records derived from the controller's connected (DHCP) clients.
    ///
    /// Only called when `sync_dhcp_clients` is enabled.
    fn fetch_dhcp_clients(
        &self,
        config: &ControllerConfig,
    ) -> impl Future<Output = Result<Vec<RawRecord>, CoreError>> + Send;

    /// Create `record` on the controller.
    fn create_record(
        &self,
        config: &ControllerConfig,
        record: &Record,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Overwrite the controller's copy of `record`, addressed by
    /// [`Record::remote_id`].
    fn update_record(
        &self,
        config: &ControllerConfig,
        record: &Record,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}
