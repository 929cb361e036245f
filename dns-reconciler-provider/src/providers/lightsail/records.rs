//! Lightsail record constraints and correction building

use std::sync::Arc;

use crate::correction::Correction;
use crate::diff::{Change, ChangeType};
use crate::error::{ProviderError, Result};
use crate::providers::common::normalize_domain_name;
use crate::retry::{RetryPolicy, with_retry};
use crate::types::{DnsRecord, DnsRecordType};

use super::convert::record_to_native;
use super::error::PROVIDER_NAME;
use super::types::DomainEntry;
use super::{FIXED_NS_TTL, FIXED_TTL, LightsailApi, LightsailProvider};

/// Rewrite every TTL to the value Lightsail will actually serve.
///
/// Apex NS records get 172800, all others 60. Returns the warnings emitted,
/// which are also logged. The apex NS warning is a single entry, given at
/// most once per call.
pub fn enforce_fixed_ttls(records: &mut [DnsRecord], zone: &str) -> Vec<String> {
    let zone = normalize_domain_name(zone);
    let mut warnings = Vec::new();
    let mut warned_apex_ns = false;

    for record in records.iter_mut() {
        if record.is_apex_ns(&zone) {
            if record.ttl != FIXED_NS_TTL && !warned_apex_ns {
                warned_apex_ns = true;
                warnings.push(format!(
                    "{PROVIDER_NAME} does not support changing apex NS TTL, {} will be forced to {FIXED_NS_TTL}.\n\
                     The TTL of apex NS records is always {FIXED_NS_TTL} on {PROVIDER_NAME}.\n\
                     Please set NAMESERVER_TTL({FIXED_NS_TTL}) in your config file.",
                    record.ttl
                ));
            }
            record.ttl = FIXED_NS_TTL;
        } else {
            if record.ttl != FIXED_TTL {
                warnings.push(format!(
                    "{PROVIDER_NAME} does not support TTL. {} will be forced to {FIXED_TTL}s (was {}).",
                    record.target_debug(),
                    record.ttl
                ));
            }
            record.ttl = FIXED_TTL;
        }
    }

    for w in &warnings {
        log::warn!("{w}");
    }
    warnings
}

/// Records Lightsail cannot hold. One error per offending record.
pub fn audit_records(records: &[DnsRecord]) -> Vec<ProviderError> {
    records
        .iter()
        .filter(|r| r.record_type() == DnsRecordType::Caa)
        .map(|r| ProviderError::UnsupportedRecordType {
            provider: PROVIDER_NAME.to_string(),
            record_type: format!("{} ({})", r.record_type(), r.name_fqdn),
        })
        .collect()
}

fn require_native(record: &DnsRecord) -> Result<DomainEntry> {
    record
        .native
        .as_ref()
        .map(DomainEntry::from)
        .ok_or_else(|| ProviderError::InvalidParameter {
            provider: PROVIDER_NAME.to_string(),
            param: "native".to_string(),
            detail: format!("{} was not read from {PROVIDER_NAME}", record.target_debug()),
        })
}

/// What a correction's action sends.
enum EntryOp {
    Create,
    Update,
    Delete,
}

fn entry_correction(
    msg: String,
    op: EntryOp,
    api: Arc<dyn LightsailApi>,
    retry: RetryPolicy,
    domain: String,
    entry: DomainEntry,
) -> Correction {
    Correction::new(msg, move || async move {
        with_retry(&retry, PROVIDER_NAME, || match op {
            EntryOp::Create => api.create_domain_entry(&domain, &entry),
            EntryOp::Update => api.update_domain_entry(&domain, &entry),
            EntryOp::Delete => api.delete_domain_entry(&domain, &entry),
        })
        .await
    })
}

impl LightsailProvider {
    /// Turn classified changes into corrections, in order.
    ///
    /// Nothing is sent until a correction is run.
    pub(crate) fn build_corrections(
        &self,
        domain: &str,
        changes: Vec<Change>,
    ) -> Result<Vec<Correction>> {
        let zone = normalize_domain_name(domain);
        let mut corrections = Vec::with_capacity(changes.len());

        for change in changes {
            let apex_ns = change.key.record_type == DnsRecordType::Ns && change.key.name_fqdn == zone;

            let (op, entry) = match &change.kind {
                ChangeType::Report { .. } => {
                    corrections.push(Correction::report(change.msg));
                    continue;
                }
                _ if apex_ns => {
                    log::warn!(
                        "{PROVIDER_NAME} does not support modifying apex NS records. {} will not be affected.",
                        change.msg
                    );
                    continue;
                }
                ChangeType::Create { new } => (EntryOp::Create, record_to_native(new)),
                ChangeType::Change { old, new } => {
                    let mut entry = record_to_native(new);
                    entry.id = require_native(old)?.id;
                    (EntryOp::Update, entry)
                }
                ChangeType::Delete { old } => (EntryOp::Delete, require_native(old)?),
            };

            corrections.push(entry_correction(
                change.msg,
                op,
                Arc::clone(&self.api),
                self.retry,
                zone.clone(),
                entry,
            ));
        }

        Ok(corrections)
    }
}
