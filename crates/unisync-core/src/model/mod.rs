// ── Domain model ──

pub mod origin;
pub mod record;

pub use origin::{Channel, ControllerId, Origin};
pub use record::{Identity, RawRecord, Record, RecordType, normalize_name};
