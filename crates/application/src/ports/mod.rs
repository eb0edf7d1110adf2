//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the verification core and the outside
//! world. Each port is a trait implemented by adapters in the infrastructure layer.

mod fixture_provider;
mod http_client;

pub use fixture_provider::{FixtureError, FixtureProvider};
pub use http_client::{HttpClient, HttpClientError};
