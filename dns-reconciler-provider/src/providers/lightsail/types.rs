//! Lightsail API 请求/响应类型
//!
//! Lightsail speaks AWS JSON 1.1: every action is a `POST /` whose body and
//! response are camelCase JSON objects.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::NativeRecord;

// ============ 公共结构 ============

/// A Lightsail domain (DNS zone) with its entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Zone name, e.g. `example.com`.
    pub name: String,
    /// Resource ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// Creation time. The API sends epoch seconds.
    #[serde(
        default,
        with = "crate::utils::datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Every entry of the zone, SOA included.
    #[serde(default)]
    pub domain_entries: Vec<DomainEntry>,
}

/// One record as Lightsail stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEntry {
    /// Opaque identifier, required for update and delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owner name. May be escaped (`\052` for `*`) and may end with a dot.
    #[serde(default)]
    pub name: String,
    /// Combined target. TXT targets are quoted segments.
    #[serde(default)]
    pub target: String,
    /// Alias entries point at other AWS resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_alias: Option<bool>,
    /// Record type, e.g. `A`, `MX`, `SOA`.
    #[serde(rename = "type", default)]
    pub record_type: String,
    /// Deprecated free-form options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<HashMap<String, String>>,
}

impl DomainEntry {
    /// Whether the entry is flagged as an alias.
    pub fn is_alias(&self) -> bool {
        self.is_alias.unwrap_or(false)
    }
}

impl From<&DomainEntry> for NativeRecord {
    fn from(entry: &DomainEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            record_type: entry.record_type.clone(),
            target: entry.target.clone(),
            is_alias: entry.is_alias(),
        }
    }
}

impl From<&NativeRecord> for DomainEntry {
    fn from(native: &NativeRecord) -> Self {
        Self {
            id: native.id.clone(),
            name: native.name.clone(),
            target: native.target.clone(),
            is_alias: Some(native.is_alias),
            record_type: native.record_type.clone(),
            options: None,
        }
    }
}

// ============ 请求体 ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GetDomainsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DomainNameRequest<'a> {
    pub domain_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DomainEntryRequest<'a> {
    pub domain_name: &'a str,
    pub domain_entry: &'a DomainEntry,
}

// ============ 响应体 ============

/// One page of `GetDomains`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDomainsResponse {
    /// Domains on this page.
    #[serde(default)]
    pub domains: Vec<Domain>,
    /// Token for the next page; absent on the last one.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetDomainResponse {
    pub domain: Domain,
}

/// Error body of AWS JSON protocols.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(rename = "__type")]
    pub error_type: Option<String>,
    #[serde(alias = "Message")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// `com.amazonaws.lightsail#NotFoundException` -> `NotFoundException`
    pub fn code(&self) -> Option<String> {
        self.error_type
            .as_deref()
            .map(|t| t.rsplit('#').next().unwrap_or(t))
            .map(|t| t.split(':').next().unwrap_or(t).to_string())
    }
}
