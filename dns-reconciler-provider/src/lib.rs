//! # dns-reconciler-provider
//!
//! Reconciliation backend that brings the DNS records of an AWS Lightsail
//! domain in line with a declared desired state.
//!
//! The backend reads the live zone, normalizes it into provider-agnostic
//! [`DnsRecord`]s, applies Lightsail's constraints to the desired records
//! (fixed TTLs, immutable apex NS), diffs both sides and returns an ordered
//! list of [`Correction`]s. Nothing is changed remotely until the caller runs
//! the corrections.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Auth Method |
//! |----------|-------------|-------------|
//! | [AWS Lightsail](https://aws.amazon.com/lightsail/) | `lightsail` | AWS Signature V4 |
//!
//! ## Feature Flags
//!
//! - **`lightsail`** *(default)*: Enable the Lightsail provider.
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dns_reconciler_provider::{
//!     create_provider, DnsProvider, DnsRecord, DomainConfig, ProviderCredentials, RecordData,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Create a provider from credentials
//!     let provider = create_provider(ProviderCredentials::Lightsail {
//!         access_key_id: "AKIA...".to_string(),
//!         secret_access_key: "secret".to_string(),
//!         session_token: None,
//!     })?;
//!
//!     // 2. Make sure the zone exists
//!     provider.ensure_zone_exists("example.com").await?;
//!
//!     // 3. Declare the desired records
//!     let desired = DomainConfig::new(
//!         "example.com",
//!         vec![DnsRecord::new(
//!             "www",
//!             "example.com",
//!             60,
//!             RecordData::A { address: "192.0.2.1".to_string() },
//!         )],
//!     );
//!
//!     // 4. Compute and apply the corrections
//!     for correction in provider.reconcile(&desired).await? {
//!         println!("{}", correction.msg);
//!         correction.run().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All provider operations return [`Result<T, ProviderError>`](ProviderError).
//!
//! - [`ProviderError::InvalidCredentials`]: credentials rejected; never retried
//! - [`ProviderError::RateLimited`]: retried every 5s, up to 23 attempts, see [`retry`]
//! - [`ProviderError::MalformedRecord`]: a remote record could not be parsed
//! - [`ProviderError::AliasUnsupported`]: alias records cannot be managed
//!
//! Read errors abort the reconciliation of a domain. Write errors are returned
//! by [`Correction::run`] and the caller decides whether to go on.

mod correction;
mod diff;
mod error;
mod factory;
mod http_client;
mod providers;
pub mod retry;
mod traits;
mod txt;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::{create_provider, get_all_provider_metadata};

// Re-export core trait only (internal traits are not exported)
pub use traits::DnsProvider;

// Re-export reconciliation building blocks
pub use correction::{Correction, CorrectionAction};
pub use diff::{Change, ChangeType, DiffOptions, diff_by_record};
pub use retry::{RetryPolicy, with_retry};
pub use txt::{encode_quoted, parse_quoted};

// Re-export types
pub use types::{
    CredentialValidationError, DnsRecord, DnsRecordType, DomainConfig, FieldType, NativeRecord,
    ProviderCredentialField, ProviderCredentials, ProviderFeatures, ProviderMetadata,
    ProviderType, RecordData, RecordKey,
};

// Re-export utils module
pub use utils::datetime;

// Re-export concrete providers (behind feature flags)
#[cfg(feature = "lightsail")]
pub use providers::lightsail::{
    Domain, DomainEntry, FIXED_NS_TTL, FIXED_TTL, GetDomainsResponse, LightsailApi,
    LightsailClient, audit_records, enforce_fixed_ttls,
};
#[cfg(feature = "lightsail")]
pub use providers::{LightsailProvider, LightsailProviderBuilder};
