use serde::{Deserialize, Serialize};

/// Where the controller serves the Integration API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControllerPlatform {
    /// UniFi OS consoles (UDM, UCG, Cloud Key Gen2+) behind `/proxy/network`.
    #[default]
    UnifiOs,
    /// Self-hosted Network Application, API at the server root.
    Classic,
}

impl ControllerPlatform {
    pub fn integration_prefix(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network/integration",
            Self::Classic => "/integration",
        }
    }
}
