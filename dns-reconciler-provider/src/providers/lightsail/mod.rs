//! AWS Lightsail DNS Provider

mod api;
mod convert;
mod error;
mod provider;
mod records;
mod sign;
/// Lightsail API-specific request/response types.
pub(crate) mod types;
mod zones;

use std::sync::Arc;
use std::time::Duration;

use crate::retry::RetryPolicy;

pub use api::{LightsailApi, LightsailClient};
pub use records::{audit_records, enforce_fixed_ttls};
pub use types::{Domain, DomainEntry, GetDomainsResponse};

/// Lightsail domain API host. Domain actions only exist in `us-east-1`.
pub(crate) const LIGHTSAIL_HOST: &str = "lightsail.us-east-1.amazonaws.com";
/// Signing region.
pub(crate) const LIGHTSAIL_REGION: &str = "us-east-1";
/// Signing service name.
pub(crate) const LIGHTSAIL_SERVICE: &str = "lightsail";
/// `X-Amz-Target` prefix (API version).
pub(crate) const LIGHTSAIL_TARGET_PREFIX: &str = "Lightsail_20161128";
/// AWS JSON 1.1 content type.
pub(crate) const LIGHTSAIL_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// TTL Lightsail applies to every record except apex NS.
pub const FIXED_TTL: u32 = 60;
/// TTL Lightsail applies to apex NS records.
pub const FIXED_NS_TTL: u32 = 172_800;

/// AWS Lightsail DNS provider implementation.
///
/// Lightsail ignores TTLs and does not let apex NS records be edited; the
/// provider rewrites desired TTLs accordingly and drops apex NS changes with a
/// warning instead of failing.
///
/// # Construction
///
/// ```rust,no_run
/// use dns_reconciler_provider::LightsailProvider;
///
/// let provider = LightsailProvider::new(
///     "your-access-key-id".to_string(),
///     "your-secret-access-key".to_string(),
///     None,
/// );
/// ```
pub struct LightsailProvider {
    pub(crate) api: Arc<dyn LightsailApi>,
    pub(crate) retry: RetryPolicy,
}

/// Builder for [`LightsailProvider`] with configurable retry behavior.
pub struct LightsailProviderBuilder {
    api: Arc<dyn LightsailApi>,
    retry: RetryPolicy,
}

impl LightsailProviderBuilder {
    fn new(api: Arc<dyn LightsailApi>) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
        }
    }

    /// Total attempts per call while rate limited (default: 23).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.retry.max_attempts = attempts;
        self
    }

    /// Wait between rate-limited attempts (default: 5s).
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry.delay = delay;
        self
    }

    /// Build the [`LightsailProvider`] instance.
    pub fn build(self) -> LightsailProvider {
        LightsailProvider {
            api: self.api,
            retry: self.retry,
        }
    }
}

impl LightsailProvider {
    /// Creates a new Lightsail provider with the default retry policy.
    pub fn new(
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    ) -> Self {
        Self::builder(access_key_id, secret_access_key, session_token).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    ) -> LightsailProviderBuilder {
        Self::with_api(Arc::new(LightsailClient::new(
            access_key_id,
            secret_access_key,
            session_token,
        )))
    }

    /// Returns a builder over a custom [`LightsailApi`] implementation.
    pub fn with_api(api: Arc<dyn LightsailApi>) -> LightsailProviderBuilder {
        LightsailProviderBuilder::new(api)
    }
}
