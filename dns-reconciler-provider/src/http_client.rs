//! Sending signed requests and reading what comes back.
//!
//! Providers build and sign their own `RequestBuilder`. Nothing is retried
//! here: throttling surfaces as [`ProviderError::RateLimited`] and
//! [`crate::retry`] decides what to do with it.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// AWS request id, worth quoting when a call misbehaves.
const REQUEST_ID_HEADER: &str = "x-amzn-requestid";

pub struct HttpUtils;

impl HttpUtils {
    /// Send the request and return `(status, body)`.
    ///
    /// Transport failures become `Timeout` or `NetworkError`. HTTP 429 is
    /// `RateLimited` and 502-504 are `NetworkError`. Any other status is handed
    /// back for the provider to interpret.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url_or_action: &str,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider_name}] {method_name} {url_or_action}");

        let response = request_builder
            .send()
            .await
            .map_err(|e| transport_error(provider_name, &e))?;

        let status = response.status().as_u16();
        let request_id = header_str(&response, REQUEST_ID_HEADER).unwrap_or("-").to_string();
        log::debug!("[{provider_name}] HTTP {status} (request id {request_id})");

        match status {
            429 => {
                let retry_after =
                    header_str(&response, "retry-after").and_then(|v| v.parse::<u64>().ok());
                let body = response.text().await.unwrap_or_default();
                log::warn!("[{provider_name}] HTTP 429 on {url_or_action}, retry_after={retry_after:?}");
                Err(ProviderError::RateLimited {
                    provider: provider_name.to_string(),
                    retry_after,
                    raw_message: Some(body),
                })
            }
            502..=504 => {
                let body = response.text().await.unwrap_or_default();
                log::warn!("[{provider_name}] HTTP {status} on {url_or_action} (request id {request_id})");
                Err(ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: format!("HTTP {status}: {}", truncate_for_log(&body)),
                })
            }
            _ => {
                let body = response.text().await.map_err(|e| ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: format!("reading response body: {e}"),
                })?;
                log::debug!("[{provider_name}] Response Body: {}", truncate_for_log(&body));
                Ok((status, body))
            }
        }
    }

    /// Decode a JSON body into `T`; `ParseError` otherwise.
    pub fn parse_json<T>(response_text: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!(
                "[{provider_name}] undecodable response ({e}): {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    pub fn is_success(status_code: u16) -> bool {
        (200..300).contains(&status_code)
    }
}

fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn transport_error(provider_name: &str, e: &reqwest::Error) -> ProviderError {
    let provider = provider_name.to_string();
    let detail = e.to_string();
    if e.is_timeout() {
        ProviderError::Timeout { provider, detail }
    } else {
        ProviderError::NetworkError { provider, detail }
    }
}
