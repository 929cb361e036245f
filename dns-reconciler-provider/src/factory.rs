//! Provider factory functions and metadata.

use std::sync::Arc;

use crate::error::Result;
use crate::traits::DnsProvider;
use crate::types::{ProviderCredentials, ProviderMetadata};

#[cfg(not(feature = "lightsail"))]
use crate::error::ProviderError;
#[cfg(feature = "lightsail")]
use crate::providers::LightsailProvider;

/// Creates a [`DnsProvider`] instance from the given credentials.
///
/// The concrete provider type is determined by the [`ProviderCredentials`] variant.
/// The returned provider is wrapped in `Arc<dyn DnsProvider>` for easy sharing
/// across async tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use dns_reconciler_provider::{create_provider, ProviderCredentials};
///
/// let provider = create_provider(ProviderCredentials::Lightsail {
///     access_key_id: "AKIA...".to_string(),
///     secret_access_key: "secret".to_string(),
///     session_token: None,
/// }).unwrap();
/// ```
pub fn create_provider(credentials: ProviderCredentials) -> Result<Arc<dyn DnsProvider>> {
    match credentials {
        #[cfg(feature = "lightsail")]
        ProviderCredentials::Lightsail {
            access_key_id,
            secret_access_key,
            session_token,
        } => Ok(Arc::new(LightsailProvider::new(
            access_key_id,
            secret_access_key,
            session_token,
        ))),
        #[cfg(not(feature = "lightsail"))]
        ProviderCredentials::Lightsail { .. } => Err(ProviderError::InvalidParameter {
            provider: "lightsail".to_string(),
            param: "provider".to_string(),
            detail: "crate built without the `lightsail` feature".to_string(),
        }),
    }
}

/// Returns metadata for all providers enabled via feature flags.
///
/// Useful for building dynamic UIs that enumerate available providers
/// and their required credential fields.
pub fn get_all_provider_metadata() -> Vec<ProviderMetadata> {
    vec![
        #[cfg(feature = "lightsail")]
        LightsailProvider::metadata(),
    ]
}
