// ── DNS record domain types ──
//
// A `Record` is one name record as seen on one controller during one sync
// cycle. Its `Identity` (name, type, value) is the only thing that decides
// whether two records are "the same"; everything else rides along.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::origin::Origin;
use crate::error::CoreError;

/// Fields assigned by the controller that never travel between controllers.
const SERVER_ASSIGNED_FIELDS: [&str; 2] = ["id", "metadata"];

// ── RecordType ───────────────────────────────────────────────────────

/// The closed set of record kinds the engine knows how to reconcile.
///
/// Parsing accepts the Integration API names (`A_RECORD`) and the short
/// forms (`A`), case-insensitively. Anything else is rejected.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum RecordType {
    #[serde(rename = "A_RECORD")]
    #[strum(to_string = "A_RECORD", serialize = "A")]
    ARecord,
    #[serde(rename = "AAAA_RECORD")]
    #[strum(to_string = "AAAA_RECORD", serialize = "AAAA")]
    AaaaRecord,
    #[serde(rename = "CNAME_RECORD")]
    #[strum(to_string = "CNAME_RECORD", serialize = "CNAME")]
    CnameRecord,
    #[serde(rename = "MX_RECORD")]
    #[strum(to_string = "MX_RECORD", serialize = "MX")]
    MxRecord,
    #[serde(rename = "TXT_RECORD")]
    #[strum(to_string = "TXT_RECORD", serialize = "TXT")]
    TxtRecord,
}

impl RecordType {
    /// Map a controller-supplied type string onto the enumeration.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        Self::from_str(raw.trim()).map_err(|_| CoreError::UnsupportedRecordType {
            record_type: raw.to_owned(),
        })
    }

    /// Whether the value of this record type is itself a host name.
    fn value_is_name(self) -> bool {
        matches!(self, Self::CnameRecord | Self::MxRecord)
    }
}

// ── Name normalization ───────────────────────────────────────────────

/// Lower-case a DNS name and strip surrounding whitespace and trailing dots.
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_lowercase()
}

fn normalize_value(record_type: RecordType, value: &str) -> String {
    if !record_type.value_is_name() {
        return value.trim().to_owned();
    }
    // MX values are `host:priority`; only the host part is a name.
    match value.rsplit_once(':') {
        Some((host, priority)) if record_type == RecordType::MxRecord => {
            format!("{}:{}", normalize_name(host), priority.trim())
        }
        _ => normalize_name(value),
    }
}

// ── Identity ─────────────────────────────────────────────────────────

/// The deduplication key of a record: `(name, type, value)`.
///
/// Construction normalizes the name (and name-valued targets), so two
/// controllers that spell the same record differently produce equal
/// identities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Identity {
    name: String,
    record_type: RecordType,
    value: String,
}

impl Identity {
    pub fn new(name: &str, record_type: RecordType, value: &str) -> Self {
        Self {
            name: normalize_name(name),
            record_type,
            value: normalize_value(record_type, value),
        }
    }

    /// Like [`Identity::new`], but parses the type string first.
    pub fn parse(name: &str, record_type: &str, value: &str) -> Result<Self, CoreError> {
        Ok(Self::new(name, RecordType::parse(record_type)?, value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Canonical string form, used to order plans and in log output.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.record_type, self.value)
    }
}

// ── RawRecord ────────────────────────────────────────────────────────

/// A record exactly as a controller adapter hands it over: the
/// controller-local id plus the JSON fields of the DNS policy shape
/// (`type`, `domain`, `ipv4Address`, `enabled`, `ttlSeconds`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub id: Option<String>,
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { id: None, fields }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    fn str_field(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Pull the identity value out of the type-specific field(s).
    fn value_for(&self, record_type: RecordType) -> Option<String> {
        match record_type {
            RecordType::ARecord => self.str_field("ipv4Address"),
            RecordType::AaaaRecord => self.str_field("ipv6Address"),
            RecordType::CnameRecord => self.str_field("alias"),
            RecordType::MxRecord => {
                let host = self.str_field("host")?;
                let priority = self.str_field("priority").unwrap_or_default();
                Some(format!("{host}:{priority}"))
            }
            RecordType::TxtRecord => self.str_field("value"),
        }
    }
}

// ── Record ───────────────────────────────────────────────────────────

/// One origin-tagged record for the current cycle.
///
/// Equality and hashing look only at the [`Identity`]: two records with
/// the same identity are the same record regardless of origin or payload.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    identity: Identity,
    /// Controller-local policy id on the controller this copy came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_id: Option<String>,
    origin: Origin,
    raw: Map<String, Value>,
}

impl Record {
    /// Validate a raw controller record and tag it with its origin.
    pub fn from_raw(raw: RawRecord, origin: Origin) -> Result<Self, CoreError> {
        let domain = raw.str_field("domain").unwrap_or_default();

        let type_str = raw
            .str_field("type")
            .ok_or_else(|| CoreError::MalformedRecord {
                domain: domain.clone(),
                reason: "missing record type".into(),
            })?;
        let record_type = RecordType::parse(&type_str)?;

        if domain.is_empty() {
            return Err(CoreError::MalformedRecord {
                domain,
                reason: "missing domain".into(),
            });
        }

        let value = raw
            .value_for(record_type)
            .ok_or_else(|| CoreError::MalformedRecord {
                domain: domain.clone(),
                reason: format!("{record_type} without a value"),
            })?;

        let identity = Identity::new(&domain, record_type, &value);

        let RawRecord { id, mut fields } = raw;
        for key in SERVER_ASSIGNED_FIELDS {
            fields.remove(key);
        }
        fields.insert("domain".into(), Value::String(identity.name.clone()));
        fields.insert("type".into(), Value::String(record_type.to_string()));

        Ok(Self {
            identity,
            remote_id: id,
            origin,
            raw: fields,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn record_type(&self) -> RecordType {
        self.identity.record_type
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    /// The opaque attribute payload carried between controllers.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Whether two copies of a record carry the same payload.
    pub fn same_payload(&self, other: &Self) -> bool {
        self.raw == other.raw
    }

    /// A copy addressed at another controller's instance of this record.
    pub fn retargeted(&self, remote_id: Option<&str>) -> Self {
        Self {
            remote_id: remote_id.map(ToOwned::to_owned),
            ..self.clone()
        }
    }

    /// Total precedence order between copies of the same identity.
    ///
    /// Static DNS policies beat DHCP-derived names, then the lowest
    /// controller id wins, then the payload's canonical JSON. The order
    /// never depends on fetch timing.
    pub fn precedence(&self, other: &Self) -> Ordering {
        self.origin
            .cmp(&other.origin)
            .then_with(|| payload_key(&self.raw).cmp(&payload_key(&other.raw)))
            .then_with(|| self.remote_id.cmp(&other.remote_id))
    }
}

/// Canonical JSON of a payload. `serde_json::Map` keeps keys sorted.
fn payload_key(raw: &Map<String, Value>) -> String {
    Value::Object(raw.clone()).to_string()
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Channel, ControllerId};
    use serde_json::json;

    fn origin() -> Origin {
        Origin::new(ControllerId::from("udm-a"), Channel::DnsPolicy)
    }

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(fields) => RawRecord::new(fields),
            _ => unreachable!("test fixture must be an object"),
        }
    }

    #[test]
    fn identity_normalizes_case_and_trailing_dot() {
        let a = Identity::new("NAS.Home.LAN.", RecordType::ARecord, "10.0.0.5");
        let b = Identity::new("nas.home.lan", RecordType::ARecord, "10.0.0.5");
        assert_eq!(a, b);
        assert_eq!(a.canonical(), "nas.home.lan A_RECORD 10.0.0.5");
    }

    #[test]
    fn cname_and_mx_targets_normalize_like_names() {
        let cname = Identity::new("www.lan", RecordType::CnameRecord, "NAS.lan.");
        assert_eq!(cname.value(), "nas.lan");

        let mx = Identity::new("lan", RecordType::MxRecord, "Mail.LAN.:10");
        assert_eq!(mx.value(), "mail.lan:10");
    }

    #[test]
    fn txt_values_keep_their_case() {
        let txt = Identity::new("lan", RecordType::TxtRecord, "v=spf1 -ALL");
        assert_eq!(txt.value(), "v=spf1 -ALL");
    }

    #[test]
    fn record_type_accepts_api_and_short_names() {
        assert_eq!(RecordType::parse("A_RECORD").unwrap(), RecordType::ARecord);
        assert_eq!(RecordType::parse("cname").unwrap(), RecordType::CnameRecord);
        assert_eq!(RecordType::parse("aaaa_record").unwrap(), RecordType::AaaaRecord);
        assert_eq!(RecordType::MxRecord.to_string(), "MX_RECORD");
    }

    #[test]
    fn unknown_record_type_is_rejected() {
        let err = RecordType::parse("FORWARD_DOMAIN").unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedRecordType { ref record_type } if record_type == "FORWARD_DOMAIN"
        ));

        let err = Identity::parse("x.lan", "SRV_RECORD", "x").unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedRecordType { .. }));
    }

    #[test]
    fn from_raw_strips_server_fields_and_normalizes_domain() {
        let record = Record::from_raw(
            raw(json!({
                "type": "A_RECORD",
                "domain": "NAS.lan.",
                "ipv4Address": "10.0.0.5",
                "enabled": true,
                "ttlSeconds": 300,
                "metadata": { "origin": "USER_DEFINED" },
            }))
            .with_id("policy-1"),
            origin(),
        )
        .unwrap();

        assert_eq!(record.name(), "nas.lan");
        assert_eq!(record.remote_id(), Some("policy-1"));
        assert_eq!(record.raw().get("domain"), Some(&json!("nas.lan")));
        assert!(!record.raw().contains_key("metadata"));
        assert!(!record.raw().contains_key("id"));
        assert_eq!(record.raw().get("ttlSeconds"), Some(&json!(300)));
    }

    #[test]
    fn from_raw_reads_mx_priority() {
        let record = Record::from_raw(
            raw(json!({ "type": "MX_RECORD", "domain": "lan", "host": "mail.lan", "priority": 10 })),
            origin(),
        )
        .unwrap();
        assert_eq!(record.identity().value(), "mail.lan:10");
    }

    #[test]
    fn from_raw_without_value_is_malformed() {
        let err = Record::from_raw(
            raw(json!({ "type": "A_RECORD", "domain": "nas.lan" })),
            origin(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::MalformedRecord { .. }));
    }

    #[test]
    fn from_raw_with_unsupported_type_fails() {
        let err = Record::from_raw(
            raw(json!({ "type": "FORWARD_DOMAIN", "domain": "corp", "ipAddress": "10.1.1.1" })),
            origin(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedRecordType { .. }));
    }

    #[test]
    fn equality_ignores_payload_and_origin() {
        let a = Record::from_raw(
            raw(json!({ "type": "A", "domain": "nas.lan", "ipv4Address": "10.0.0.5", "ttlSeconds": 60 })),
            origin(),
        )
        .unwrap();
        let b = Record::from_raw(
            raw(json!({ "type": "A_RECORD", "domain": "NAS.lan", "ipv4Address": "10.0.0.5" })),
            Origin::new(ControllerId::from("udm-b"), Channel::DhcpLease),
        )
        .unwrap();

        assert_eq!(a, b);
        assert!(!a.same_payload(&b));
    }
}
