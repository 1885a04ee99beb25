//! Configuration for unisync.
//!
//! TOML (or JSON) file + `UNISYNC_*` environment layering, credential
//! resolution (env var, keyring, plaintext), validation, and translation
//! into `unisync_core::ControllerConfig`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use unisync_core::{ControllerConfig, ControllerPlatform, RecordType, TlsVerification};

/// Keyring service name under which API keys are stored.
pub const KEYRING_SERVICE: &str = "unisync";

/// Environment prefix for overrides (`UNISYNC_SYNC__DRY_RUN=true`).
pub const ENV_PREFIX: &str = "UNISYNC_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no controllers configured")]
    NoControllers,

    #[error("controller '{id}' is configured more than once")]
    DuplicateController { id: String },

    #[error("no API key configured for controller '{controller}'")]
    NoCredentials { controller: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub controllers: Vec<ControllerEntry>,
}

/// Scheduling of the periodic `run` loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SyncSettings {
    /// Seconds between cycles.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Plan but never write.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            dry_run: false,
        }
    }
}

impl SyncSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_interval() -> u64 {
    3600
}

/// One `[[controllers]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ControllerEntry {
    /// Host name, IP address, or full URL.
    pub host: String,

    /// Controller id used in logs and reports. Defaults to `host`.
    pub name: Option<String>,

    /// Site name or UUID.
    #[serde(default = "default_site")]
    pub site: String,

    /// API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,

    #[serde(default)]
    pub platform: ControllerPlatform,

    #[serde(default)]
    pub sync_dhcp_clients: bool,

    pub domain_suffix: Option<String>,

    #[serde(default = "default_record_types")]
    pub allowed_record_types: Vec<String>,

    /// Verify the controller certificate against the system store.
    #[serde(default)]
    pub verify_ssl: bool,

    /// Custom CA certificate (implies verification).
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_site() -> String {
    "default".into()
}
fn default_record_types() -> Vec<String> {
    vec!["A_RECORD".into(), "CNAME_RECORD".into()]
}
fn default_timeout() -> u64 {
    10
}

impl ControllerEntry {
    /// A minimal entry with every optional field at its default.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            name: None,
            site: default_site(),
            api_key: None,
            api_key_env: None,
            platform: ControllerPlatform::default(),
            sync_dhcp_clients: false,
            domain_suffix: None,
            allowed_record_types: default_record_types(),
            verify_ssl: false,
            ca_cert: None,
            timeout: default_timeout(),
        }
    }

    /// The id this controller goes by.
    pub fn id(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(self.host.trim())
    }

    /// Controller base URL. A bare host gets `https://`.
    pub fn url(&self) -> Result<Url, ConfigError> {
        let host = self.host.trim();
        let raw = if host.contains("://") {
            host.to_owned()
        } else {
            format!("https://{host}")
        };
        Url::parse(&raw).map_err(|e| ConfigError::Validation {
            field: format!("controllers.{}.host", self.id()),
            reason: format!("invalid URL '{host}': {e}"),
        })
    }

    pub fn record_types(&self) -> Result<BTreeSet<RecordType>, ConfigError> {
        self.allowed_record_types
            .iter()
            .map(|t| {
                RecordType::parse(t).map_err(|_| ConfigError::Validation {
                    field: format!("controllers.{}.allowed_record_types", self.id()),
                    reason: format!("unknown record type '{t}'"),
                })
            })
            .collect()
    }

    pub fn tls(&self) -> TlsVerification {
        if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else if self.verify_ssl {
            TlsVerification::SystemDefaults
        } else {
            TlsVerification::DangerAcceptInvalid
        }
    }

    /// Where the API key comes from, for display. Never the key itself.
    pub fn credential_source(&self) -> &'static str {
        if self
            .api_key_env
            .as_deref()
            .is_some_and(|name| std::env::var(name).is_ok())
        {
            "env"
        } else if keyring_entry(self.id())
            .and_then(|e| e.get_password())
            .is_ok()
        {
            "keyring"
        } else if self.api_key.is_some() {
            "config"
        } else {
            "missing"
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the default config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "unisync", "unisync").map_or_else(
        || PathBuf::from(".").join("unisync.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Build the layered figment: defaults, then the file, then environment.
pub fn figment(path: &Path) -> Figment {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let figment = Figment::new().merge(Serialized::defaults(Config::default()));
    let figment = if is_json {
        figment.merge(Json::file(path))
    } else {
        figment.merge(Toml::file(path))
    };
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one the default location is
/// used, and a missing file just means "defaults + environment".
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };
    debug!(path = %path.display(), "loading configuration");

    let config: Config = figment(&path).extract()?;
    Ok(config)
}

// ── Validation ──────────────────────────────────────────────────────

impl Config {
    /// Check everything that can be checked without touching credentials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controllers.is_empty() {
            return Err(ConfigError::NoControllers);
        }

        let mut seen = BTreeSet::new();
        for entry in &self.controllers {
            if entry.host.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: "controllers.host".into(),
                    reason: "must not be empty".into(),
                });
            }
            if !seen.insert(entry.id()) {
                return Err(ConfigError::DuplicateController {
                    id: entry.id().to_owned(),
                });
            }
            entry.url()?;
            entry.record_types()?;
            if entry.timeout == 0 {
                return Err(ConfigError::Validation {
                    field: format!("controllers.{}.timeout", entry.id()),
                    reason: "must be at least one second".into(),
                });
            }
        }

        if self.sync.interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "sync.interval_secs".into(),
                reason: "must be at least one second".into(),
            });
        }
        Ok(())
    }

    /// Validate and translate every entry into a core `ControllerConfig`,
    /// resolving API keys along the way.
    pub fn to_controller_configs(&self) -> Result<Vec<ControllerConfig>, ConfigError> {
        self.validate()?;
        self.controllers
            .iter()
            .map(entry_to_controller_config)
            .collect()
    }
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(controller_id: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{controller_id}/api-key"))
}

/// Resolve an API key: `api_key_env` variable, then the system keyring,
/// then plaintext `api_key`.
pub fn resolve_api_key(entry: &ControllerEntry) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = entry.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(secret) = keyring_entry(entry.id()).and_then(|e| e.get_password()) {
        return Ok(SecretString::from(secret));
    }

    if let Some(ref key) = entry.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        controller: entry.id().into(),
    })
}

/// Store an API key for `controller_id` in the system keyring.
pub fn store_api_key(controller_id: &str, key: &str) -> Result<(), ConfigError> {
    keyring_entry(controller_id)?.set_password(key)?;
    Ok(())
}

/// Build a `ControllerConfig` from one validated entry.
pub fn entry_to_controller_config(entry: &ControllerEntry) -> Result<ControllerConfig, ConfigError> {
    let mut config = ControllerConfig::new(entry.id(), entry.url()?, resolve_api_key(entry)?);
    config.site.clone_from(&entry.site);
    config.platform = entry.platform;
    config.sync_dhcp_clients = entry.sync_dhcp_clients;
    config.domain_suffix = entry
        .domain_suffix
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned);
    config.allowed_record_types = entry.record_types()?;
    config.tls = entry.tls();
    config.timeout = Duration::from_secs(entry.timeout);
    Ok(config)
}
