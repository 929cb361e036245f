//! Lightsail 域名 API
//!
//! [`LightsailApi`] lists the six domain actions the provider needs.
//! [`LightsailClient`] implements them over signed HTTPS; tests and
//! alternative transports can plug in their own implementation.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::providers::common::create_http_client;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::{mask_secret, truncate_for_log};

use super::types::{
    Domain, DomainEntry, DomainEntryRequest, DomainNameRequest, ErrorResponse, GetDomainResponse,
    GetDomainsRequest, GetDomainsResponse,
};
use super::{LIGHTSAIL_CONTENT_TYPE, LIGHTSAIL_HOST, LIGHTSAIL_TARGET_PREFIX};

/// Remote operations on Lightsail domains.
///
/// Each method is one API call. Retrying is the caller's business.
#[async_trait]
pub trait LightsailApi: Send + Sync {
    /// One page of the account's domains.
    async fn get_domains(&self, page_token: Option<&str>) -> Result<GetDomainsResponse>;

    /// A domain with all of its entries.
    async fn get_domain(&self, domain_name: &str) -> Result<Domain>;

    /// Create an empty domain.
    async fn create_domain(&self, domain_name: &str) -> Result<()>;

    /// Add an entry to a domain.
    async fn create_domain_entry(&self, domain_name: &str, entry: &DomainEntry) -> Result<()>;

    /// Rewrite the entry identified by `entry.id`.
    async fn update_domain_entry(&self, domain_name: &str, entry: &DomainEntry) -> Result<()>;

    /// Remove an entry.
    async fn delete_domain_entry(&self, domain_name: &str, entry: &DomainEntry) -> Result<()>;
}

/// Signed HTTPS client for the Lightsail JSON API.
pub struct LightsailClient {
    pub(crate) client: Client,
    pub(crate) access_key_id: String,
    pub(crate) secret_access_key: String,
    pub(crate) session_token: Option<String>,
}

impl LightsailClient {
    /// Create a client with static credentials and an optional session token.
    pub fn new(
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    ) -> Self {
        Self {
            client: create_http_client(),
            access_key_id,
            secret_access_key,
            session_token,
        }
    }

    /// 统一处理 Lightsail 响应错误
    fn handle_response_error(
        &self,
        status: u16,
        response_text: &str,
        ctx: ErrorContext,
    ) -> Result<()> {
        if HttpUtils::is_success(status) {
            return Ok(());
        }

        if let Ok(error) = serde_json::from_str::<ErrorResponse>(response_text) {
            let message = error.message.clone().unwrap_or_default();
            let raw = match error.code() {
                Some(code) => RawApiError::with_code(code, message),
                None => RawApiError::new(message),
            };
            return Err(self.map_error(raw, ctx));
        }

        Err(self.map_error(
            RawApiError::new(format!("HTTP {status}: {}", truncate_for_log(response_text))),
            ctx,
        ))
    }

    /// 执行一个 Lightsail action
    async fn call<T, B>(&self, action: &str, body: &B, ctx: ErrorContext) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let payload = serde_json::to_string(body).map_err(|e| self.serialization_error(e))?;
        log::debug!(
            "[{}] {action} as {}, Request Body: {}",
            self.provider_name(),
            mask_secret(&self.access_key_id),
            truncate_for_log(&payload)
        );

        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let target = format!("{LIGHTSAIL_TARGET_PREFIX}.{action}");

        let mut headers = vec![
            ("Content-Type".to_string(), LIGHTSAIL_CONTENT_TYPE.to_string()),
            ("Host".to_string(), LIGHTSAIL_HOST.to_string()),
            ("X-Amz-Date".to_string(), amz_date.clone()),
            ("X-Amz-Target".to_string(), target),
        ];
        if let Some(token) = &self.session_token {
            headers.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }

        let authorization = self.sign("POST", "/", &headers, &payload, &amz_date);
        let url = format!("https://{LIGHTSAIL_HOST}/");

        let request = headers
            .iter()
            .fold(self.client.post(&url), |req, (k, v)| req.header(k, v))
            .header("Authorization", authorization)
            .body(payload);

        let (status, response_text) = HttpUtils::execute_request(
            request,
            self.provider_name(),
            "POST",
            &format!("{url} (Action: {action})"),
        )
        .await?;

        self.handle_response_error(status, &response_text, ctx)?;
        HttpUtils::parse_json(&response_text, self.provider_name())
    }
}

#[async_trait]
impl LightsailApi for LightsailClient {
    async fn get_domains(&self, page_token: Option<&str>) -> Result<GetDomainsResponse> {
        self.call(
            "GetDomains",
            &GetDomainsRequest { page_token },
            ErrorContext::default(),
        )
        .await
    }

    async fn get_domain(&self, domain_name: &str) -> Result<Domain> {
        let resp: GetDomainResponse = self
            .call(
                "GetDomain",
                &DomainNameRequest { domain_name },
                ErrorContext::for_domain(domain_name),
            )
            .await?;
        Ok(resp.domain)
    }

    async fn create_domain(&self, domain_name: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "CreateDomain",
                &DomainNameRequest { domain_name },
                ErrorContext::for_domain(domain_name),
            )
            .await?;
        Ok(())
    }

    async fn create_domain_entry(&self, domain_name: &str, entry: &DomainEntry) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "CreateDomainEntry",
                &DomainEntryRequest {
                    domain_name,
                    domain_entry: entry,
                },
                ErrorContext {
                    record_name: Some(entry.name.clone()),
                    domain: Some(domain_name.to_string()),
                    ..ErrorContext::default()
                },
            )
            .await?;
        Ok(())
    }

    async fn update_domain_entry(&self, domain_name: &str, entry: &DomainEntry) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "UpdateDomainEntry",
                &DomainEntryRequest {
                    domain_name,
                    domain_entry: entry,
                },
                entry_context(domain_name, entry),
            )
            .await?;
        Ok(())
    }

    async fn delete_domain_entry(&self, domain_name: &str, entry: &DomainEntry) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "DeleteDomainEntry",
                &DomainEntryRequest {
                    domain_name,
                    domain_entry: entry,
                },
                entry_context(domain_name, entry),
            )
            .await?;
        Ok(())
    }
}

fn entry_context(domain_name: &str, entry: &DomainEntry) -> ErrorContext {
    ErrorContext {
        record_name: Some(entry.name.clone()),
        record_id: entry.id.clone(),
        domain: Some(domain_name.to_string()),
    }
}
