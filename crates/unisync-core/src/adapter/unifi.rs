// ── UniFi Integration API adapter ──
//
// One lazily built `IntegrationClient` per controller, with the site UUID
// resolved on first use and cached for the life of the adapter.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use unisync_api::{HttpSettings, IntegrationClient, TlsMode};

use super::ControllerAdapter;
use crate::config::{ControllerConfig, TlsVerification};
use crate::convert;
use crate::error::CoreError;
use crate::model::{ControllerId, RawRecord, Record};

/// Create rejections meaning "an equivalent record already exists".
const OVERLAP_CODES: [&str; 2] = [
    "api.dns.policy.validation.overlap-with-local-dns",
    "api.dns.policy.validation.cname-alias-overlap",
];

struct Session {
    client: IntegrationClient,
    site_id: OnceCell<Uuid>,
}

impl Session {
    /// Resolve the configured site (name, case-insensitive, or UUID).
    async fn site_id(&self, config: &ControllerConfig) -> Result<Uuid, CoreError> {
        self.site_id
            .get_or_try_init(|| async {
                let sites = self.client.sites().await?;
                let found = sites.iter().find(|site| site.matches(&config.site));

                match found {
                    Some(site) => {
                        info!(controller = %config.id, site = %site.name, site_id = %site.id, "resolved site");
                        Ok(site.id)
                    }
                    None => Err(CoreError::SiteNotFound {
                        name: config.site.clone(),
                        available: sites.into_iter().map(|s| s.name).collect(),
                    }),
                }
            })
            .await
            .copied()
    }
}

/// [`ControllerAdapter`] backed by the UniFi Network Integration API.
#[derive(Default)]
pub struct UnifiAdapter {
    sessions: DashMap<ControllerId, Arc<Session>>,
}

impl UnifiAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&self, config: &ControllerConfig) -> Result<Arc<Session>, CoreError> {
        if let Some(session) = self.sessions.get(&config.id) {
            return Ok(Arc::clone(session.value()));
        }

        let client = IntegrationClient::connect(
            config.url.as_str(),
            &config.api_key,
            &http_settings(config),
            config.platform,
        )?;
        debug!(controller = %config.id, base_url = %client.base_url(), "built integration client");

        let session = Arc::new(Session {
            client,
            site_id: OnceCell::new(),
        });
        Ok(Arc::clone(
            self.sessions
                .entry(config.id.clone())
                .or_insert(session)
                .value(),
        ))
    }
}

impl ControllerAdapter for UnifiAdapter {
    async fn fetch_dns_records(
        &self,
        config: &ControllerConfig,
    ) -> Result<Vec<RawRecord>, CoreError> {
        let session = self.session(config)?;
        let site_id = session.site_id(config).await?;

        let policies = session.client.dns_policies(&site_id).await?;

        debug!(controller = %config.id, count = policies.len(), "fetched DNS policies");
        Ok(policies.into_iter().map(RawRecord::from).collect())
    }

    async fn fetch_dhcp_clients(
        &self,
        config: &ControllerConfig,
    ) -> Result<Vec<RawRecord>, CoreError> {
        let session = self.session(config)?;
        let site_id = session.site_id(config).await?;

        let clients = session.client.clients(&site_id).await?;

        let suffix = config.domain_suffix.as_deref();
        let records: Vec<RawRecord> = clients
            .iter()
            .filter_map(|client| convert::dhcp_record(client, suffix))
            .collect();

        debug!(
            controller = %config.id,
            clients = clients.len(),
            records = records.len(),
            "fetched client records"
        );
        Ok(records)
    }

    async fn create_record(
        &self,
        config: &ControllerConfig,
        record: &Record,
    ) -> Result<(), CoreError> {
        let session = self.session(config)?;
        let site_id = session.site_id(config).await?;
        let body = convert::policy_body(record);

        match session.client.create_dns_policy(&site_id, &body).await {
            Ok(created) => {
                debug!(controller = %config.id, policy_id = %created.id, "created DNS policy");
                Ok(())
            }
            Err(e) if e.code().is_some_and(|c| OVERLAP_CODES.contains(&c)) => {
                info!(
                    controller = %config.id,
                    record = %record.identity(),
                    "controller already holds an overlapping record, treating as present"
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_record(
        &self,
        config: &ControllerConfig,
        record: &Record,
    ) -> Result<(), CoreError> {
        let policy_id = record
            .remote_id()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| CoreError::MalformedRecord {
                domain: record.name().to_owned(),
                reason: "update needs the target controller's policy id".into(),
            })?;

        let session = self.session(config)?;
        let site_id = session.site_id(config).await?;
        let body = convert::policy_body(record);

        session
            .client
            .update_dns_policy(&site_id, &policy_id, &body)
            .await?;
        debug!(controller = %config.id, %policy_id, "updated DNS policy");
        Ok(())
    }
}

fn http_settings(config: &ControllerConfig) -> HttpSettings {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    HttpSettings::new(tls, config.timeout)
}
