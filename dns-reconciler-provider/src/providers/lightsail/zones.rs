//! Lightsail zone access

use crate::error::Result;
use crate::retry::with_retry;
use crate::types::DnsRecord;

use super::LightsailProvider;
use super::convert::native_to_record;
use super::error::{PROVIDER_NAME, translate_unauthorized};
use super::types::Domain;

impl LightsailProvider {
    /// Every domain on the account, all pages concatenated.
    pub(crate) async fn fetch_all_domains(&self) -> Result<Vec<Domain>> {
        let mut domains = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = with_retry(&self.retry, PROVIDER_NAME, || {
                self.api.get_domains(page_token.as_deref())
            })
            .await
            .map_err(translate_unauthorized)?;

            log::debug!(
                "[{PROVIDER_NAME}] GetDomains page: {} domains",
                page.domains.len()
            );
            domains.extend(page.domains);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(domains)
    }

    /// One domain with all of its entries.
    pub(crate) async fn fetch_zone(&self, domain: &str) -> Result<Domain> {
        with_retry(&self.retry, PROVIDER_NAME, || self.api.get_domain(domain))
            .await
            .map_err(translate_unauthorized)
    }

    /// Create `domain` unless it can be read. Credential failures are never
    /// taken as "zone missing".
    pub(crate) async fn create_zone_if_missing(&self, domain: &str) -> Result<()> {
        match self.fetch_zone(domain).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                log::debug!("[{PROVIDER_NAME}] GetDomain {domain} failed: {e}");
                log::info!("Adding zone for {domain} to lightsail account");
                with_retry(&self.retry, PROVIDER_NAME, || self.api.create_domain(domain))
                    .await
                    .map_err(translate_unauthorized)
            }
        }
    }

    /// The zone's manageable records. SOA and alias entries are skipped.
    pub(crate) async fn fetch_zone_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        let zone = self.fetch_zone(domain).await?;

        let mut records = Vec::with_capacity(zone.domain_entries.len());
        for entry in &zone.domain_entries {
            if entry.record_type.eq_ignore_ascii_case("SOA") {
                continue;
            }
            if entry.is_alias() {
                log::warn!(
                    "Alias record {} {} ignored: unsupported by {PROVIDER_NAME}",
                    entry.name,
                    entry.record_type
                );
                continue;
            }
            records.push(native_to_record(entry, domain)?);
        }

        Ok(records)
    }
}
