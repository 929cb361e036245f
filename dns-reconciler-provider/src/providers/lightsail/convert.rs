//! Lightsail entry <-> generic record conversion

use crate::error::{ProviderError, Result};
use crate::providers::common::{
    ensure_trailing_dot, full_name_to_relative, normalize_domain_name, parse_record_data,
    parse_record_type, record_data_to_single_string,
};
use crate::txt::encode_quoted;
use crate::types::{DnsRecord, DnsRecordType, NativeRecord, RecordData};

use super::error::PROVIDER_NAME;
use super::types::DomainEntry;
use super::{FIXED_NS_TTL, FIXED_TTL};

/// Octal escape Lightsail uses for `*` in owner names.
const ESCAPED_WILDCARD: &str = "\\052";

/// Decode the owner name: strip the trailing dot, `\052` becomes `*`, lower-case.
pub(crate) fn unescape_name(name: &str) -> String {
    normalize_domain_name(&name.replace(ESCAPED_WILDCARD, "*"))
}

/// Convert one Lightsail entry into a [`DnsRecord`] of zone `origin`.
///
/// The TTL is provider-fixed: 172800 for apex NS, 60 for everything else.
pub(crate) fn native_to_record(entry: &DomainEntry, origin: &str) -> Result<DnsRecord> {
    if entry.is_alias() {
        return Err(ProviderError::AliasUnsupported {
            provider: PROVIDER_NAME.to_string(),
            name: entry.name.clone(),
            record_type: entry.record_type.clone(),
        });
    }

    let origin = normalize_domain_name(origin);
    let record_type = entry.record_type.to_uppercase();
    let name_fqdn = unescape_name(&entry.name);

    let Ok(kind) = parse_record_type(&record_type, PROVIDER_NAME) else {
        return Err(ProviderError::MalformedRecord {
            provider: PROVIDER_NAME.to_string(),
            record_type: entry.record_type.clone(),
            value: entry.target.clone(),
            detail: "record type not supported".to_string(),
        });
    };
    let target = if kind.has_fqdn_target() {
        ensure_trailing_dot(&entry.target)
    } else {
        entry.target.clone()
    };
    let data = parse_record_data(&record_type, &target, PROVIDER_NAME)?;

    let ttl = if kind == DnsRecordType::Ns && name_fqdn == origin {
        FIXED_NS_TTL
    } else {
        FIXED_TTL
    };

    Ok(DnsRecord {
        name: full_name_to_relative(&name_fqdn, &origin),
        name_fqdn,
        ttl,
        data,
        native: Some(NativeRecord::from(entry)),
    })
}

/// Convert a [`DnsRecord`] into a Lightsail entry to be written.
///
/// The entry never carries an id and is never an alias.
pub(crate) fn record_to_native(record: &DnsRecord) -> DomainEntry {
    let target = match &record.data {
        RecordData::TXT { .. } => encode_quoted(&record.data.txt_joined()),
        data => record_data_to_single_string(data),
    };
    DomainEntry {
        id: None,
        name: record.name_fqdn.clone(),
        target,
        is_alias: Some(false),
        record_type: record.record_type().as_str().to_string(),
        options: None,
    }
}
