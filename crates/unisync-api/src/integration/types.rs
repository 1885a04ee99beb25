//! Wire shapes for the `/integration/v1/` endpoints unisync touches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One page of a list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub offset: i64,
    /// Absent on some older firmware; paging then stops at a short page.
    #[serde(default)]
    pub total_count: Option<i64>,
    pub data: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    /// Legacy short name, `default` on single-site controllers.
    #[serde(default)]
    pub internal_reference: Option<String>,
}

impl Site {
    /// Match a configured site by name, UUID or internal reference, ignoring case.
    pub fn matches(&self, wanted: &str) -> bool {
        let wanted = wanted.trim();
        self.name.eq_ignore_ascii_case(wanted)
            || self.id.to_string().eq_ignore_ascii_case(wanted)
            || self
                .internal_reference
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(wanted))
    }
}

/// A client currently known to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedClient {
    pub id: Uuid,
    /// Unset clients come back as `null` or without the key.
    #[serde(default)]
    pub name: Option<String>,
    /// `WIRED`, `WIRELESS`, `VPN` or `TELEPORT`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub ip_address: Option<String>,
}

/// A DNS policy as listed by the controller.
///
/// Only the fields shared by every policy type are typed; the rest
/// (`ipv4Address`, `alias`, `ttlSeconds`, ...) stay in `fields`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DnsPolicy {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub policy_type: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub domain: Option<String>,
    /// Controller bookkeeping, never compared or written back.
    #[serde(default)]
    pub metadata: Value,
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

fn enabled_by_default() -> bool {
    true
}

/// Request body for creating or replacing a DNS policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnsPolicyBody {
    #[serde(rename = "type")]
    pub policy_type: String,
    pub enabled: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
