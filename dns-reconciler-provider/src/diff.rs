//! Record-level differ
//!
//! Compares existing and desired records grouped by `(fqdn, type)` and
//! classifies every difference as a create, change, delete or report.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{DnsRecord, RecordKey};

/// What a [`Change`] does. Each variant carries exactly the records it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    /// Record is desired but absent remotely.
    Create {
        /// Record to create.
        new: DnsRecord,
    },
    /// Existing record must be rewritten in place.
    Change {
        /// Record as it exists remotely.
        old: DnsRecord,
        /// Record as it should be.
        new: DnsRecord,
    },
    /// Record exists remotely but is not desired.
    Delete {
        /// Record to remove.
        old: DnsRecord,
    },
    /// Informational: the remote record is left untouched.
    Report {
        /// Record the message is about.
        old: DnsRecord,
    },
}

/// One classified difference between existing and desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// `(fqdn, type)` the change applies to.
    pub key: RecordKey,
    /// Classification and records.
    #[serde(flatten)]
    pub kind: ChangeType,
    /// Human-readable description.
    pub msg: String,
}

/// Knobs for [`diff_by_record`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// Report undeclared remote records instead of deleting them.
    pub keep_unknown: bool,
}

/// Diff `existing` against `desired`.
///
/// Keys are visited in order of first appearance, existing records first. Inside
/// a key, records with identical data and TTL are left alone; the remaining ones
/// are paired positionally into changes and the surplus becomes creates or
/// deletes.
pub fn diff_by_record(
    existing: &[DnsRecord],
    desired: &[DnsRecord],
    opts: DiffOptions,
) -> Vec<Change> {
    let mut order: Vec<RecordKey> = Vec::new();
    let mut groups: HashMap<RecordKey, (Vec<&DnsRecord>, Vec<&DnsRecord>)> = HashMap::new();

    for record in existing {
        let key = record.key();
        let entry = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            (Vec::new(), Vec::new())
        });
        entry.0.push(record);
    }
    for record in desired {
        let key = record.key();
        let entry = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            (Vec::new(), Vec::new())
        });
        entry.1.push(record);
    }

    let mut changes = Vec::new();
    for key in order {
        let Some((olds, news)) = groups.remove(&key) else {
            continue;
        };
        diff_group(&key, olds, news, opts, &mut changes);
    }

    log::debug!(
        "diff: {} existing, {} desired, {} changes",
        existing.len(),
        desired.len(),
        changes.len()
    );
    changes
}

fn diff_group(
    key: &RecordKey,
    olds: Vec<&DnsRecord>,
    news: Vec<&DnsRecord>,
    opts: DiffOptions,
    out: &mut Vec<Change>,
) {
    let mut olds: Vec<Option<&DnsRecord>> = olds.into_iter().map(Some).collect();
    let mut unmatched_news = Vec::new();

    for new in news {
        let matched = olds
            .iter_mut()
            .find(|slot| slot.is_some_and(|old| old.same_content(new)));
        match matched {
            Some(slot) => *slot = None,
            None => unmatched_news.push(new),
        }
    }
    let unmatched_olds: Vec<&DnsRecord> = olds.into_iter().flatten().collect();

    let paired = unmatched_olds.len().min(unmatched_news.len());
    for (old, new) in unmatched_olds.iter().zip(&unmatched_news) {
        out.push(Change {
            key: key.clone(),
            msg: format!(
                "± MODIFY {key}: ({} ttl={}) -> ({} ttl={})",
                old.target_combined(),
                old.ttl,
                new.target_combined(),
                new.ttl
            ),
            kind: ChangeType::Change {
                old: (*old).clone(),
                new: (*new).clone(),
            },
        });
    }
    for new in &unmatched_news[paired..] {
        out.push(Change {
            key: key.clone(),
            msg: format!("+ CREATE {key} {} ttl={}", new.target_combined(), new.ttl),
            kind: ChangeType::Create { new: (*new).clone() },
        });
    }
    for old in &unmatched_olds[paired..] {
        let change = if opts.keep_unknown {
            Change {
                key: key.clone(),
                msg: format!(
                    "REPORT unmanaged {key} {} ttl={} (kept)",
                    old.target_combined(),
                    old.ttl
                ),
                kind: ChangeType::Report { old: (*old).clone() },
            }
        } else {
            Change {
                key: key.clone(),
                msg: format!("- DELETE {key} {} ttl={}", old.target_combined(), old.ttl),
                kind: ChangeType::Delete { old: (*old).clone() },
            }
        };
        out.push(change);
    }
}
