//! Reconciliation engine that keeps local DNS records in step across
//! several UniFi controllers.
//!
//! A cycle has four phases, each in its own module:
//!
//! - [`fetch`]: pull static DNS policies (and optionally client-derived
//!   names) from every controller concurrently, tagging each record with
//!   its [`Origin`]. A controller that fails is left out of the cycle.
//! - [`consolidate`]: merge all snapshots into one [`DesiredState`] keyed
//!   by [`Identity`], settling collisions with a fixed precedence order.
//! - [`plan`]: per controller, the records it lacks or holds with a stale
//!   payload, excluding anything it already originates.
//! - [`apply`]: run each plan through the [`ControllerAdapter`], honouring
//!   dry-run and collecting one outcome per operation.
//!
//! [`SyncEngine`] strings the phases together and returns a
//! [`CycleReport`].

pub mod adapter;
pub mod apply;
pub mod config;
pub mod consolidate;
pub mod convert;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod model;
pub mod plan;
pub mod report;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::{ControllerAdapter, UnifiAdapter};
pub use apply::{ApplyOutcome, OperationReport, SkipReason, apply_plan};
pub use config::{ControllerConfig, ControllerPlatform, TlsVerification};
pub use consolidate::{DesiredEntry, DesiredState, consolidate};
pub use engine::SyncEngine;
pub use error::CoreError;
pub use fetch::{FetchOutcome, FetchResults, Snapshot, fetch_all};
pub use model::{Channel, ControllerId, Identity, Origin, RawRecord, Record, RecordType};
pub use plan::{Action, PlannedOperation, SyncPlan, plan};
pub use report::CycleReport;
