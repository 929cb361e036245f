use serde::{Deserialize, Serialize};

/// Errors raised while reading a zone, planning corrections or running them.
///
/// Every variant names the provider it came from. `raw_message` fields keep the
/// API's own wording. The enum serializes tagged by `code` so the host tool can
/// report it as structured data.
///
/// Only [`RateLimited`](Self::RateLimited) is retried, see [`crate::retry`].
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// Connection failed or a gateway answered 502-504.
    #[error("[{provider}] Network error: {detail}")]
    NetworkError {
        provider: String,
        detail: String,
    },

    #[error("[{provider}] Request timeout: {detail}")]
    Timeout {
        provider: String,
        detail: String,
    },

    /// Lightsail rejected the key pair or session token.
    ///
    /// Never retried, and never mistaken for a missing zone.
    #[error(
        "[{provider}] Invalid credentials{}: check your credentials, you're not authorized to perform actions on this provider",
        with_message(.raw_message)
    )]
    InvalidCredentials {
        provider: String,
        raw_message: Option<String>,
    },

    /// IAM policy forbids the action.
    #[error("[{provider}] Permission denied{}", with_message(.raw_message))]
    PermissionDenied {
        provider: String,
        raw_message: Option<String>,
    },

    /// Throttled. The only error worth waiting out.
    #[error("[{provider}] Rate limited{}", retry_hint(.retry_after))]
    RateLimited {
        provider: String,
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        raw_message: Option<String>,
    },

    #[error("[{provider}] Record '{record_name}' already exists")]
    RecordExists {
        provider: String,
        record_name: String,
        raw_message: Option<String>,
    },

    /// Update or delete addressed an entry id Lightsail no longer has.
    #[error("[{provider}] Record '{record_id}' not found")]
    RecordNotFound {
        provider: String,
        record_id: String,
        raw_message: Option<String>,
    },

    /// No Lightsail domain by that name on the account.
    #[error("[{provider}] Domain '{domain}' not found{}", with_message(.raw_message))]
    DomainNotFound {
        provider: String,
        domain: String,
        raw_message: Option<String>,
    },

    /// Lightsail refused an argument, or a correction could not be addressed.
    #[error("[{provider}] Invalid parameter '{param}': {detail}")]
    InvalidParameter {
        provider: String,
        param: String,
        detail: String,
    },

    /// Record type Lightsail cannot hold (CAA).
    #[error("[{provider}] Unsupported record type: {record_type}")]
    UnsupportedRecordType {
        provider: String,
        record_type: String,
    },

    /// The record is an alias record, which this provider cannot read or write.
    #[error("[{provider}] Alias records are not supported: {name} {record_type}")]
    AliasUnsupported {
        provider: String,
        /// Record name as returned by the API.
        name: String,
        /// Record type of the alias.
        record_type: String,
    },

    /// A record returned by the API could not be parsed into the generic model.
    #[error("[{provider}] Unparsable record type={record_type:?} value={value:?}: {detail}")]
    MalformedRecord {
        provider: String,
        /// Record type string as returned by the API.
        record_type: String,
        /// Raw target value as returned by the API.
        value: String,
        /// Why parsing failed.
        detail: String,
    },

    #[error("[{provider}] Parse error: {detail}")]
    ParseError {
        provider: String,
        detail: String,
    },

    #[error("[{provider}] Serialization error: {detail}")]
    SerializationError {
        provider: String,
        detail: String,
    },

    /// Any other API error, with its `__type` code when one was sent.
    #[error("[{provider}] {raw_message}")]
    Unknown {
        provider: String,
        raw_code: Option<String>,
        raw_message: String,
    },
}

fn with_message(raw_message: &Option<String>) -> String {
    raw_message
        .as_deref()
        .map(|msg| format!(": {msg}"))
        .unwrap_or_default()
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    retry_after
        .map(|secs| format!(" (retry after {secs}s)"))
        .unwrap_or_default()
}

impl ProviderError {
    /// 配置或账户层面的错误，重试无意义，日志用 `warn` 即可。
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::RecordExists { .. }
                | Self::RecordNotFound { .. }
                | Self::DomainNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::UnsupportedRecordType { .. }
                | Self::AliasUnsupported { .. }
        )
    }

    /// 限流错误由 [`crate::retry::with_retry`] 重试
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Credentials rejected or lacking permission. Never read as "zone missing".
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. } | Self::PermissionDenied { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
