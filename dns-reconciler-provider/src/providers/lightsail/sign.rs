//! AWS Signature Version 4
//!
//! Reference: <https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html>

use std::fmt::Write;

use crate::providers::common::{hmac_sha256, sha256_hex};
use crate::utils::log_sanitizer::{redact_header_lines, truncate_for_log};

use super::{LIGHTSAIL_REGION, LIGHTSAIL_SERVICE, LightsailClient};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Everything that goes into one signature.
pub(crate) struct SigningInput<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
    pub method: &'a str,
    pub uri: &'a str,
    pub query: &'a str,
    pub headers: &'a [(String, String)],
    pub payload: &'a str,
    /// `YYYYMMDD'T'HHMMSS'Z'`
    pub amz_date: &'a str,
}

/// kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")
pub(crate) fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// Build the `Authorization` header value.
pub(crate) fn authorization_header(input: &SigningInput<'_>) -> String {
    let date = input.amz_date.get(..8).unwrap_or(input.amz_date);

    // 1. Canonical query: parameters sorted by name
    let canonical_query = if input.query.is_empty() {
        String::new()
    } else {
        let mut params: Vec<&str> = input.query.split('&').collect();
        params.sort_unstable();
        params.join("&")
    };

    // 2. Canonical headers: lowercase names, trimmed values, sorted
    let mut sorted_headers: Vec<(String, &str)> = input
        .headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.trim()))
        .collect();
    sorted_headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers = sorted_headers
        .iter()
        .fold(String::new(), |mut acc, (k, v)| {
            let _ = writeln!(acc, "{k}:{v}");
            acc
        });
    let signed_headers = sorted_headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    // 3. Canonical request
    let canonical_request = format!(
        "{}\n{}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{}",
        input.method,
        input.uri,
        sha256_hex(input.payload.as_bytes())
    );
    log::debug!(
        "CanonicalRequest:\n{}",
        truncate_for_log(&redact_header_lines(&canonical_request))
    );

    // 4. String to sign
    let scope = format!("{date}/{}/{}/aws4_request", input.region, input.service);
    let string_to_sign = format!(
        "{ALGORITHM}\n{}\n{scope}\n{}",
        input.amz_date,
        sha256_hex(canonical_request.as_bytes())
    );
    log::debug!("StringToSign:\n{string_to_sign}");

    // 5. Signature
    let signing_key =
        derive_signing_key(input.secret_access_key, date, input.region, input.service);
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        input.access_key_id
    )
}

impl LightsailClient {
    /// Sign a Lightsail request (region `us-east-1`, service `lightsail`).
    pub(crate) fn sign(
        &self,
        method: &str,
        uri: &str,
        headers: &[(String, String)],
        payload: &str,
        amz_date: &str,
    ) -> String {
        authorization_header(&SigningInput {
            access_key_id: &self.access_key_id,
            secret_access_key: &self.secret_access_key,
            region: LIGHTSAIL_REGION,
            service: LIGHTSAIL_SERVICE,
            method,
            uri,
            query: "",
            headers,
            payload,
            amz_date,
        })
    }
}
