// unisync-api: Async client for the UniFi Network Integration API.
//
// Only the surfaces the DNS sync engine touches are modelled: site lookup,
// connected clients (for DHCP-derived names), and DNS policies.

pub mod error;
pub mod integration;
pub mod platform;
pub mod transport;

pub use error::Error;
pub use integration::IntegrationClient;
pub use integration::types;
pub use platform::ControllerPlatform;
pub use transport::{HttpSettings, TlsMode};
