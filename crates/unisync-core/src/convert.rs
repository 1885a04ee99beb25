// ── API ↔ domain conversions ──
//
// Translates Integration API DNS policies and connected clients into
// `RawRecord`s, and domain `Record`s back into policy create/update bodies.

use serde_json::{Map, Value};

use unisync_api::types::{ConnectedClient, DnsPolicy, DnsPolicyBody};

use crate::model::{RawRecord, Record, RecordType, normalize_name};

/// TTL given to records derived from connected clients.
pub const DHCP_RECORD_TTL_SECONDS: u64 = 3600;

// ── DNS Policy ───────────────────────────────────────────────────────

impl From<DnsPolicy> for RawRecord {
    fn from(policy: DnsPolicy) -> Self {
        let mut fields: Map<String, Value> = policy.fields.into_iter().collect();
        fields.insert("type".into(), Value::String(policy.policy_type));
        fields.insert("enabled".into(), Value::Bool(policy.enabled));
        if let Some(domain) = policy.domain {
            fields.insert("domain".into(), Value::String(domain));
        }

        RawRecord {
            id: Some(policy.id.to_string()),
            fields,
        }
    }
}

/// Build the request body that recreates `record` on another controller.
pub fn policy_body(record: &Record) -> DnsPolicyBody {
    let mut fields = record.raw().clone();
    fields.remove("type");
    let enabled = fields
        .remove("enabled")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    DnsPolicyBody {
        policy_type: record.record_type().to_string(),
        enabled,
        fields,
    }
}

// ── Client → DHCP-derived record ─────────────────────────────────────

/// Derive a host name for a connected client.
///
/// Everything from the first space on is dropped, so a name with a
/// leading space yields nothing. A configured domain suffix is appended
/// unless the name already contains a dot.
pub fn dhcp_host_name(client_name: &str, domain_suffix: Option<&str>) -> Option<String> {
    let name = client_name
        .split(' ')
        .next()
        .filter(|n| !n.trim().is_empty())?;

    let suffix = domain_suffix
        .map(|s| s.trim().trim_start_matches('.'))
        .filter(|s| !s.is_empty());

    let full = match suffix {
        Some(suffix) if !name.contains('.') => format!("{name}.{suffix}"),
        _ => name.to_owned(),
    };

    Some(normalize_name(&full)).filter(|n| !n.is_empty())
}

/// Turn a connected client into an `A_RECORD` in DNS policy shape.
///
/// Clients without a name or an IP address yield nothing.
pub fn dhcp_record(client: &ConnectedClient, domain_suffix: Option<&str>) -> Option<RawRecord> {
    let ip = client.ip_address.as_deref().filter(|ip| !ip.is_empty())?;
    let domain = dhcp_host_name(client.name.as_deref()?, domain_suffix)?;

    let mut fields = Map::new();
    fields.insert(
        "type".into(),
        Value::String(RecordType::ARecord.to_string()),
    );
    fields.insert("domain".into(), Value::String(domain));
    fields.insert("ipv4Address".into(), Value::String(ip.to_owned()));
    fields.insert("enabled".into(), Value::Bool(true));
    fields.insert("ttlSeconds".into(), Value::from(DHCP_RECORD_TTL_SECONDS));

    Some(RawRecord::new(fields))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Channel, ControllerId, Origin};
    use serde_json::json;
    use uuid::Uuid;

    fn client(name: &str, ip: Option<&str>) -> ConnectedClient {
        ConnectedClient {
            id: Uuid::new_v4(),
            name: Some(name.into()),
            kind: "WIRELESS".into(),
            ip_address: ip.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn host_name_takes_first_word_and_appends_suffix() {
        assert_eq!(
            dhcp_host_name("Laptop aa:bb:cc:dd:ee:ff", Some("home.lan")).as_deref(),
            Some("laptop.home.lan")
        );
        assert_eq!(
            dhcp_host_name("printer", Some(".home.lan")).as_deref(),
            Some("printer.home.lan")
        );
    }

    #[test]
    fn host_name_with_dot_keeps_its_domain() {
        assert_eq!(
            dhcp_host_name("nas.office.lan", Some("home.lan")).as_deref(),
            Some("nas.office.lan")
        );
        assert_eq!(dhcp_host_name("Phone", None).as_deref(), Some("phone"));
        assert_eq!(dhcp_host_name("   ", Some("home.lan")), None);
    }

    #[test]
    fn leading_space_drops_the_client() {
        assert_eq!(dhcp_host_name(" Laptop", Some("home.lan")), None);
        assert_eq!(
            dhcp_host_name("Laptop  spare", None).as_deref(),
            Some("laptop")
        );
    }

    #[test]
    fn dhcp_record_requires_name_and_ip() {
        assert!(dhcp_record(&client("laptop", None), None).is_none());
        assert!(dhcp_record(&client("", Some("10.0.0.9")), None).is_none());

        let unnamed = ConnectedClient {
            name: None,
            ..client("x", Some("10.0.0.9"))
        };
        assert!(dhcp_record(&unnamed, None).is_none());

        let raw = dhcp_record(&client("Laptop", Some("10.0.0.9")), Some("home.lan")).unwrap();
        assert_eq!(raw.id, None);
        assert_eq!(raw.fields.get("domain"), Some(&json!("laptop.home.lan")));
        assert_eq!(raw.fields.get("ipv4Address"), Some(&json!("10.0.0.9")));
        assert_eq!(raw.fields.get("ttlSeconds"), Some(&json!(3600)));
    }

    #[test]
    fn policy_round_trips_into_create_body() {
        let policy = DnsPolicy {
            id: Uuid::new_v4(),
            policy_type: "CNAME_RECORD".into(),
            enabled: false,
            domain: Some("WWW.lan".into()),
            metadata: json!({ "origin": "USER_DEFINED" }),
            fields: [("alias".to_string(), json!("nas.lan"))].into_iter().collect(),
        };
        let policy_id = policy.id.to_string();

        let raw = RawRecord::from(policy);
        assert_eq!(raw.id.as_deref(), Some(policy_id.as_str()));

        let record = Record::from_raw(
            raw,
            Origin::new(ControllerId::from("udm-a"), Channel::DnsPolicy),
        )
        .unwrap();
        let body = policy_body(&record);

        assert_eq!(body.policy_type, "CNAME_RECORD");
        assert!(!body.enabled);
        assert_eq!(body.fields.get("domain"), Some(&json!("www.lan")));
        assert_eq!(body.fields.get("alias"), Some(&json!("nas.lan")));
        assert!(!body.fields.contains_key("type"));
        assert!(!body.fields.contains_key("enabled"));
    }
}
