// ── Record origin ──
//
// Where a record came from during the current cycle. Origins are
// recomputed from scratch every cycle and never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a configured controller (its name, or its host).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControllerId(String);

impl ControllerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ControllerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ControllerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How a controller came to know about a record.
///
/// Variant order is the consolidation precedence: static DNS policies
/// outrank names derived from DHCP leases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    DnsPolicy,
    DhcpLease,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DnsPolicy => f.write_str("dns-policy"),
            Self::DhcpLease => f.write_str("dhcp-lease"),
        }
    }
}

/// The controller and channel that supplied a record this cycle.
///
/// Field order matters: the derived `Ord` compares channel first, then
/// controller id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Origin {
    pub channel: Channel,
    pub controller: ControllerId,
}

impl Origin {
    pub fn new(controller: ControllerId, channel: Channel) -> Self {
        Self {
            channel,
            controller,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.controller, self.channel)
    }
}
