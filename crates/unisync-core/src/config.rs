// ── Runtime controller configuration ──
//
// These types describe one controller taking part in the sync: how to
// reach it and which records it is allowed to see and receive. They never
// touch disk; unisync-config builds them and hands them in read-only.

use std::collections::BTreeSet;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

pub use unisync_api::ControllerPlatform;

use crate::model::{ControllerId, Identity, RecordType, normalize_name};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for one controller participating in the sync.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Identifier used for origin tagging and in reports.
    pub id: ControllerId,
    /// Controller URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    /// Integration API key.
    pub api_key: SecretString,
    /// Site name or UUID (defaults to "default").
    pub site: String,
    /// Where the Integration API is mounted on this controller.
    pub platform: ControllerPlatform,
    /// Also publish names derived from connected clients.
    pub sync_dhcp_clients: bool,
    /// Only records under this domain are pulled from or pushed to this controller.
    pub domain_suffix: Option<String>,
    /// Record types this controller contributes and receives.
    pub allowed_record_types: BTreeSet<RecordType>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ControllerConfig {
    /// A config with the defaults used when a field is left out:
    /// site `default`, UniFi OS, no DHCP names, A + CNAME records only.
    pub fn new(id: impl Into<ControllerId>, url: Url, api_key: SecretString) -> Self {
        Self {
            id: id.into(),
            url,
            api_key,
            site: "default".into(),
            platform: ControllerPlatform::default(),
            sync_dhcp_clients: false,
            domain_suffix: None,
            allowed_record_types: default_record_types(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn allows_type(&self, record_type: RecordType) -> bool {
        self.allowed_record_types.contains(&record_type)
    }

    /// Whether `name` falls under this controller's domain suffix.
    ///
    /// With no suffix configured every name is in scope.
    pub fn in_domain(&self, name: &str) -> bool {
        let Some(suffix) = self.normalized_suffix() else {
            return true;
        };
        let name = normalize_name(name);
        name == suffix
            || name
                .strip_suffix(suffix.as_str())
                .is_some_and(|head| head.ends_with('.'))
    }

    /// The single filter applied both when reading from and when writing
    /// to this controller.
    pub fn accepts(&self, identity: &Identity) -> bool {
        self.allows_type(identity.record_type()) && self.in_domain(identity.name())
    }

    /// The domain suffix without leading/trailing dots, lower-cased.
    pub fn normalized_suffix(&self) -> Option<String> {
        self.domain_suffix
            .as_deref()
            .map(|s| normalize_name(s.trim().trim_start_matches('.')))
            .filter(|s| !s.is_empty())
    }
}

/// Record types synced when a controller does not say otherwise.
pub fn default_record_types() -> BTreeSet<RecordType> {
    BTreeSet::from([RecordType::ARecord, RecordType::CnameRecord])
}
