//! Argsync Scalr
//!
//! Typed client for the Scalr JSON:API (`/api/iacp/v3`), implementing the
//! core ParameterStore trait for provider configuration parameters.

mod client;
mod error;
mod types;

pub use client::ScalrClient;
pub use error::ScalrError;
pub use types::{ProviderConfiguration, ProviderConfigurationCreate};
