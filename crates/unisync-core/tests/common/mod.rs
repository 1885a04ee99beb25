// Shared fixtures for unisync-core integration tests: an in-memory
// controller fleet behind the `ControllerAdapter` trait.

#![allow(clippy::unwrap_used, dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use secrecy::SecretString;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use unisync_core::{ControllerAdapter, ControllerConfig, ControllerId, CoreError, RawRecord, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchDns(String),
    FetchDhcp(String),
    Create(String, String),
    Update(String, String),
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Create(..) | Self::Update(..))
    }
}

/// Controllers held in memory. Writes mutate the store, so a second cycle
/// sees the effect of the first.
#[derive(Default)]
pub struct MockAdapter {
    dns: Mutex<BTreeMap<ControllerId, Vec<RawRecord>>>,
    dhcp: Mutex<BTreeMap<ControllerId, Vec<RawRecord>>>,
    unreachable: Mutex<BTreeSet<ControllerId>>,
    rejected_names: Mutex<BTreeSet<String>>,
    cancel_after_write: Mutex<Option<CancellationToken>>,
    calls: Mutex<Vec<Call>>,
    next_id: Mutex<u32>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dns(self, controller: &str, records: Vec<RawRecord>) -> Self {
        self.dns
            .lock()
            .unwrap()
            .insert(ControllerId::from(controller), records);
        self
    }

    pub fn with_dhcp(self, controller: &str, records: Vec<RawRecord>) -> Self {
        self.dhcp
            .lock()
            .unwrap()
            .insert(ControllerId::from(controller), records);
        self
    }

    /// Every fetch from `controller` fails with a connection error.
    pub fn unreachable(self, controller: &str) -> Self {
        self.unreachable
            .lock()
            .unwrap()
            .insert(ControllerId::from(controller));
        self
    }

    /// Writes of records named `name` fail with an API error.
    pub fn reject_writes_of(self, name: &str) -> Self {
        self.rejected_names.lock().unwrap().insert(name.to_owned());
        self
    }

    /// Cancel `token` right after the first successful write.
    pub fn cancel_after_first_write(self, token: CancellationToken) -> Self {
        *self.cancel_after_write.lock().unwrap() = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn dns_of(&self, controller: &str) -> Vec<RawRecord> {
        self.dns
            .lock()
            .unwrap()
            .get(&ControllerId::from(controller))
            .cloned()
            .unwrap_or_default()
    }

    fn check_reachable(&self, config: &ControllerConfig) -> Result<(), CoreError> {
        if self.unreachable.lock().unwrap().contains(&config.id) {
            return Err(CoreError::ConnectionFailed {
                url: config.url.to_string(),
                reason: "connection refused".into(),
            });
        }
        Ok(())
    }

    fn check_writable(&self, record: &Record) -> Result<(), CoreError> {
        if self.rejected_names.lock().unwrap().contains(record.name()) {
            return Err(CoreError::Api {
                message: "rejected by controller".into(),
                code: Some("api.dns.policy.validation.failed".into()),
                status: Some(400),
            });
        }
        Ok(())
    }

    fn after_write(&self) {
        if let Some(token) = self.cancel_after_write.lock().unwrap().take() {
            token.cancel();
        }
    }
}

impl ControllerAdapter for MockAdapter {
    async fn fetch_dns_records(&self, config: &ControllerConfig) -> Result<Vec<RawRecord>, CoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::FetchDns(config.id.to_string()));
        self.check_reachable(config)?;
        Ok(self
            .dns
            .lock()
            .unwrap()
            .get(&config.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_dhcp_clients(&self, config: &ControllerConfig) -> Result<Vec<RawRecord>, CoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::FetchDhcp(config.id.to_string()));
        self.check_reachable(config)?;
        Ok(self
            .dhcp
            .lock()
            .unwrap()
            .get(&config.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_record(&self, config: &ControllerConfig, record: &Record) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(Call::Create(
            config.id.to_string(),
            record.identity().canonical(),
        ));
        self.check_writable(record)?;

        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("{}-{}", config.id, *next)
        };
        self.dns
            .lock()
            .unwrap()
            .entry(config.id.clone())
            .or_default()
            .push(RawRecord::new(record.raw().clone()).with_id(id));

        self.after_write();
        Ok(())
    }

    async fn update_record(&self, config: &ControllerConfig, record: &Record) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(Call::Update(
            config.id.to_string(),
            record.identity().canonical(),
        ));
        self.check_writable(record)?;

        let mut dns = self.dns.lock().unwrap();
        let existing = dns
            .get_mut(&config.id)
            .and_then(|records| {
                records
                    .iter_mut()
                    .find(|r| r.id.as_deref() == record.remote_id())
            })
            .ok_or_else(|| CoreError::Api {
                message: "policy not found".into(),
                code: None,
                status: Some(404),
            })?;
        existing.fields = record.raw().clone();
        drop(dns);

        self.after_write();
        Ok(())
    }
}

// ── Builders ────────────────────────────────────────────────────────

pub fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(fields) => RawRecord::new(fields),
        _ => unreachable!("test fixture must be an object"),
    }
}

pub fn a_record(domain: &str, ip: &str) -> RawRecord {
    raw(json!({
        "type": "A_RECORD",
        "domain": domain,
        "ipv4Address": ip,
        "enabled": true,
        "ttlSeconds": 300,
    }))
}

pub fn cname(domain: &str, target: &str) -> RawRecord {
    raw(json!({
        "type": "CNAME_RECORD",
        "domain": domain,
        "alias": target,
        "enabled": true,
    }))
}

pub fn controller(id: &str) -> ControllerConfig {
    ControllerConfig::new(
        id,
        format!("https://{id}.example").parse().unwrap(),
        SecretString::from(format!("{id}-key")),
    )
}
