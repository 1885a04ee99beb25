// X-API-KEY authenticated client for `/integration/v1/`.

pub mod client;
pub mod types;

pub use client::IntegrationClient;
