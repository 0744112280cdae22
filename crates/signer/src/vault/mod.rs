mod api;
mod auth;
mod client;
mod rest;
pub mod wire;

pub use api::{ApiVersion, WireFormat};
pub use auth::Credential;
pub use client::{ClientFactory, KeyVaultClient, SignOutcome};
pub use rest::{RestClient, RestClientFactory};
pub use wire::JsonWebKey;
