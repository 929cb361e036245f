//! Provider 公共工具函数

use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::error::{ProviderError, Result};
use crate::txt::{encode_quoted, parse_quoted};
use crate::types::{DnsRecordType, RecordData};

type HmacSha256 = Hmac<Sha256>;

// ============ HTTP Client ============

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Failed to build configured HTTP client, using defaults: {e}");
            Client::new()
        })
}

// ============ 记录类型转换 ============

/// 将字符串转换为 `DnsRecordType`
pub fn parse_record_type(record_type: &str, provider: &str) -> Result<DnsRecordType> {
    match record_type.to_uppercase().as_str() {
        "A" => Ok(DnsRecordType::A),
        "AAAA" => Ok(DnsRecordType::Aaaa),
        "CNAME" => Ok(DnsRecordType::Cname),
        "MX" => Ok(DnsRecordType::Mx),
        "TXT" => Ok(DnsRecordType::Txt),
        "NS" => Ok(DnsRecordType::Ns),
        "SRV" => Ok(DnsRecordType::Srv),
        "CAA" => Ok(DnsRecordType::Caa),
        _ => Err(ProviderError::UnsupportedRecordType {
            provider: provider.to_string(),
            record_type: record_type.to_string(),
        }),
    }
}

/// Parse a combined single-string target (zone-file RDATA) into [`RecordData`].
///
/// TXT values are read as quoted segments.
pub fn parse_record_data(record_type: &str, value: &str, provider: &str) -> Result<RecordData> {
    let rtype = parse_record_type(record_type, provider)?;
    let malformed = |detail: String| ProviderError::MalformedRecord {
        provider: provider.to_string(),
        record_type: record_type.to_string(),
        value: value.to_string(),
        detail,
    };
    let fields: Vec<&str> = value.split_whitespace().collect();

    let data = match rtype {
        DnsRecordType::A => {
            value
                .parse::<Ipv4Addr>()
                .map_err(|e| malformed(e.to_string()))?;
            RecordData::A {
                address: value.to_string(),
            }
        }
        DnsRecordType::Aaaa => {
            value
                .parse::<Ipv6Addr>()
                .map_err(|e| malformed(e.to_string()))?;
            RecordData::AAAA {
                address: value.to_string(),
            }
        }
        DnsRecordType::Cname => RecordData::CNAME {
            target: single_host(&fields).map_err(malformed)?,
        },
        DnsRecordType::Ns => RecordData::NS {
            nameserver: single_host(&fields).map_err(malformed)?,
        },
        DnsRecordType::Mx => {
            let [priority, exchange] = fields.as_slice() else {
                return Err(malformed("expected \"<priority> <exchange>\"".to_string()));
            };
            RecordData::MX {
                priority: parse_u16(priority, "priority").map_err(malformed)?,
                exchange: (*exchange).to_string(),
            }
        }
        DnsRecordType::Srv => {
            let [priority, weight, port, target] = fields.as_slice() else {
                return Err(malformed(
                    "expected \"<priority> <weight> <port> <target>\"".to_string(),
                ));
            };
            RecordData::SRV {
                priority: parse_u16(priority, "priority").map_err(malformed)?,
                weight: parse_u16(weight, "weight").map_err(malformed)?,
                port: parse_u16(port, "port").map_err(malformed)?,
                target: (*target).to_string(),
            }
        }
        DnsRecordType::Txt => RecordData::TXT {
            segments: parse_quoted(value).map_err(malformed)?,
        },
        DnsRecordType::Caa => {
            let mut parts = value.trim().splitn(3, char::is_whitespace);
            let (Some(flags), Some(tag), Some(caa_value)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(malformed("expected \"<flags> <tag> <value>\"".to_string()));
            };
            let flags = flags
                .parse::<u8>()
                .map_err(|e| malformed(format!("invalid flags: {e}")))?;
            let caa_value = caa_value.trim();
            let caa_value = caa_value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(caa_value);
            RecordData::CAA {
                flags,
                tag: tag.to_string(),
                value: caa_value.to_string(),
            }
        }
    };

    Ok(data)
}

fn single_host(fields: &[&str]) -> std::result::Result<String, String> {
    match fields {
        [host] => Ok((*host).to_string()),
        [] => Err("empty target".to_string()),
        _ => Err("expected a single host name".to_string()),
    }
}

fn parse_u16(raw: &str, field: &str) -> std::result::Result<u16, String> {
    raw.parse::<u16>().map_err(|e| format!("invalid {field}: {e}"))
}

/// Render [`RecordData`] as the combined single-string target.
///
/// TXT is rendered from the joined text as quoted segments.
pub fn record_data_to_single_string(data: &RecordData) -> String {
    match data {
        RecordData::A { address } | RecordData::AAAA { address } => address.clone(),
        RecordData::CNAME { target } => target.clone(),
        RecordData::NS { nameserver } => nameserver.clone(),
        RecordData::MX { priority, exchange } => format!("{priority} {exchange}"),
        RecordData::SRV {
            priority,
            weight,
            port,
            target,
        } => format!("{priority} {weight} {port} {target}"),
        RecordData::TXT { .. } => encode_quoted(&data.txt_joined()),
        RecordData::CAA { flags, tag, value } => format!("{flags} {tag} \"{value}\""),
    }
}

// ============ HMAC-SHA256 ============

/// HMAC-SHA256 计算（供 `SigV4` 签名使用）
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// SHA256 摘要的小写十六进制
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

// ============ 域名名称处理 ============

/// 去掉域名末尾的点并转为小写
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// 确保主机名以点结尾
pub fn ensure_trailing_dot(host: &str) -> String {
    if host.ends_with('.') {
        host.to_string()
    } else {
        format!("{host}.")
    }
}

/// 将完整域名转换为相对名称
/// 如: "www.example.com" + "example.com" -> "www"
/// 如: "example.com" + "example.com" -> "@"
pub fn full_name_to_relative(full_name: &str, zone_name: &str) -> String {
    let full = normalize_domain_name(full_name);
    let zone = normalize_domain_name(zone_name);

    if full == zone || full == "@" || full.is_empty() {
        "@".to_string()
    } else if let Some(subdomain) = full.strip_suffix(&format!(".{zone}")) {
        subdomain.to_string()
    } else {
        full
    }
}

/// 将相对名称转换为完整域名
/// 如: "www" + "example.com" -> "www.example.com"
/// 如: "@" + "example.com" -> "example.com"
pub fn relative_to_full_name(relative_name: &str, zone_name: &str) -> String {
    let zone = normalize_domain_name(zone_name);

    if relative_name == "@" || relative_name.is_empty() {
        zone
    } else {
        format!("{relative_name}.{zone}")
    }
}
