//! Lightsail 错误映射
//!
//! 参考: <https://docs.aws.amazon.com/lightsail/2016-11-28/api-reference/CommonErrors.html>
//!
//! Lightsail reports errors as `{"__type": ..., "message": ...}`. Some
//! conditions are only recognizable from the message text, so both are
//! inspected:
//!
//! - **认证错误**：`UnrecognizedClientException`, `InvalidClientTokenId`,
//!   `ExpiredTokenException`, `IncompleteSignature`, `InvalidSignatureException`,
//!   `UnauthenticatedException`, or a message mentioning an invalid security token
//! - **权限拒绝**：`AccessDeniedException`
//! - **频率限制**：`ThrottlingException`, `TooManyRequestsException`, or a message
//!   saying the rate has been exceeded
//! - **不存在**：`NotFoundException`（有记录上下文时为记录，否则为域名）
//! - **已存在**：`InvalidInputException` whose message says it already exists
//! - **参数错误**：other `InvalidInputException`

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::LightsailClient;

/// Message fragment AWS uses for rejected credentials.
pub(crate) const INVALID_TOKEN_FRAGMENT: &str = "security token included in the request is invalid";
/// Message fragment Lightsail uses when throttling.
pub(crate) const RATE_EXCEEDED_FRAGMENT: &str = "rate has been exceeded";

pub(crate) const PROVIDER_NAME: &str = "lightsail";

/// Whether an error message says the credentials were rejected.
pub(crate) fn mentions_invalid_token(message: &str) -> bool {
    message.to_lowercase().contains(INVALID_TOKEN_FRAGMENT)
}

fn mentions_rate_exceeded(message: &str) -> bool {
    message.to_lowercase().contains(RATE_EXCEEDED_FRAGMENT)
}

/// Rewrite any error whose text mentions an invalid security token into
/// [`ProviderError::InvalidCredentials`].
pub(crate) fn translate_unauthorized(err: ProviderError) -> ProviderError {
    if err.is_unauthorized() {
        return err;
    }
    let text = err.to_string();
    if mentions_invalid_token(&text) {
        ProviderError::InvalidCredentials {
            provider: PROVIDER_NAME.to_string(),
            raw_message: Some(text),
        }
    } else {
        err
    }
}

impl ProviderErrorMapper for LightsailClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();

        if mentions_invalid_token(&raw.message) {
            return ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            };
        }
        if mentions_rate_exceeded(&raw.message) {
            return ProviderError::RateLimited {
                provider,
                retry_after: None,
                raw_message: Some(raw.message),
            };
        }

        match raw.code.as_deref() {
            // ============ 认证错误 ============
            Some(
                "UnrecognizedClientException"
                | "InvalidClientTokenId"
                | "ExpiredTokenException"
                | "IncompleteSignature"
                | "InvalidSignatureException"
                | "UnauthenticatedException",
            ) => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },

            // ============ 权限拒绝 ============
            Some("AccessDeniedException" | "AccountSetupInProgressException") => {
                ProviderError::PermissionDenied {
                    provider,
                    raw_message: Some(raw.message),
                }
            }

            // ============ 频率限制 ============
            Some("ThrottlingException" | "TooManyRequestsException" | "Throttling") => {
                ProviderError::RateLimited {
                    provider,
                    retry_after: None,
                    raw_message: Some(raw.message),
                }
            }

            // ============ 不存在 ============
            Some("NotFoundException") => match (context.record_id, context.domain) {
                (Some(record_id), _) => ProviderError::RecordNotFound {
                    provider,
                    record_id,
                    raw_message: Some(raw.message),
                },
                (None, domain) => ProviderError::DomainNotFound {
                    provider,
                    domain: domain.unwrap_or_default(),
                    raw_message: Some(raw.message),
                },
            },

            // ============ 参数错误 ============
            Some("InvalidInputException")
                if raw.message.to_lowercase().contains("already exist") =>
            {
                ProviderError::RecordExists {
                    provider,
                    record_name: context.record_name.unwrap_or_default(),
                    raw_message: Some(raw.message),
                }
            }
            Some("InvalidInputException") => ProviderError::InvalidParameter {
                provider,
                param: context.record_name.unwrap_or_else(|| "input".to_string()),
                detail: raw.message,
            },

            _ => self.unknown_error(raw),
        }
    }
}
