//! `controllers` handler: list configured controllers without contacting them.

use serde::Serialize;
use tabled::Tabled;

use unisync_config::ControllerEntry;
use unisync_core::TlsVerification;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize, Tabled)]
struct ControllerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "DHCP")]
    sync_dhcp_clients: bool,
    #[tabled(rename = "Domain")]
    domain_suffix: String,
    #[tabled(rename = "Types")]
    record_types: String,
    #[tabled(rename = "TLS")]
    tls: String,
    #[tabled(rename = "Key")]
    credentials: String,
}

fn to_row(entry: &ControllerEntry) -> Result<ControllerRow, CliError> {
    let record_types = entry
        .record_types()?
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let platform = serde_json::to_value(entry.platform)?
        .as_str()
        .unwrap_or_default()
        .to_owned();

    let tls = match entry.tls() {
        TlsVerification::SystemDefaults => "verify".to_owned(),
        TlsVerification::CustomCa(path) => format!("ca: {}", path.display()),
        TlsVerification::DangerAcceptInvalid => "insecure".to_owned(),
    };

    Ok(ControllerRow {
        id: entry.id().to_owned(),
        url: entry.url()?.to_string(),
        site: entry.site.clone(),
        platform,
        sync_dhcp_clients: entry.sync_dhcp_clients,
        domain_suffix: entry.domain_suffix.clone().unwrap_or_else(|| "*".into()),
        record_types,
        tls,
        credentials: entry.credential_source().to_owned(),
    })
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load_config(global)?;
    config.validate()?;

    let rows = config
        .controllers
        .iter()
        .map(to_row)
        .collect::<Result<Vec<_>, _>>()?;

    let rendered = output::render_list(global.output, &rows)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
