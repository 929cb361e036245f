use async_trait::async_trait;

use crate::correction::Correction;
use crate::error::{ProviderError, Result};
use crate::types::{DnsRecord, DomainConfig, ProviderMetadata};

/// API 返回的错误，尚未归类
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// AWS `__type` without the namespace prefix
    pub code: Option<String>,
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// What the failed call was about, so a bare `NotFoundException` can say
/// whether an entry or the domain is missing.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    pub record_name: Option<String>,
    pub record_id: Option<String>,
    pub domain: Option<String>,
}

impl ErrorContext {
    pub fn for_domain(domain: &str) -> Self {
        Self {
            domain: Some(domain.to_string()),
            ..Self::default()
        }
    }
}

/// Classifies a provider's wire errors into [`ProviderError`].
pub(crate) trait ProviderErrorMapper {
    fn provider_name(&self) -> &'static str;

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    fn serialization_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::SerializationError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// DNS 提供商 Trait
///
/// All operations run strictly one after another; implementations never issue
/// remote calls concurrently.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// 凭证字段与能力声明，创建实例前即可查询
    fn metadata() -> ProviderMetadata
    where
        Self: Sized;

    /// Names of every zone on the account, following pagination to the end.
    async fn list_zones(&self) -> Result<Vec<String>>;

    /// Create `domain` unless it can already be read.
    ///
    /// An authorization failure on the lookup is returned as is and nothing is created.
    async fn ensure_zone_exists(&self, domain: &str) -> Result<()>;

    /// Read the zone and convert every supported entry into a [`DnsRecord`].
    async fn get_zone_records(&self, domain: &str) -> Result<Vec<DnsRecord>>;

    /// Diff `desired` against `existing` and return the ordered corrections.
    ///
    /// Nothing is executed; run each [`Correction`] in order to apply it.
    /// Constraint warnings come first, as corrections without an action.
    async fn get_zone_records_corrections(
        &self,
        desired: &DomainConfig,
        existing: Vec<DnsRecord>,
    ) -> Result<Vec<Correction>>;

    /// Targets of the apex NS records, without trailing dot.
    async fn get_nameservers(&self, domain: &str) -> Result<Vec<String>>;

    /// Read the zone and compute corrections in one step.
    async fn reconcile(&self, desired: &DomainConfig) -> Result<Vec<Correction>> {
        let existing = self.get_zone_records(&desired.name).await?;
        self.get_zone_records_corrections(desired, existing).await
    }
}
