//! Lightsail `DnsProvider` trait implementation

use async_trait::async_trait;

use crate::correction::Correction;
use crate::diff::{DiffOptions, diff_by_record};
use crate::error::Result;
use crate::providers::common::normalize_domain_name;
use crate::traits::DnsProvider;
use crate::types::{
    DnsRecord, DnsRecordType, DomainConfig, FieldType, ProviderCredentialField, ProviderFeatures,
    ProviderMetadata, ProviderType,
};

use super::LightsailProvider;
use super::convert::unescape_name;
use super::error::PROVIDER_NAME;
use super::records::enforce_fixed_ttls;

#[async_trait]
impl DnsProvider for LightsailProvider {
    fn id(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: ProviderType::Lightsail,
            name: "AWS Lightsail".to_string(),
            description: "Amazon Lightsail DNS zones".to_string(),
            required_fields: vec![
                ProviderCredentialField {
                    key: "KeyId".to_string(),
                    label: "Access Key ID".to_string(),
                    field_type: FieldType::Text,
                    optional: true,
                    help_text: Some(
                        "Falls back to AWS_ACCESS_KEY_ID when left empty".to_string(),
                    ),
                },
                ProviderCredentialField {
                    key: "SecretKey".to_string(),
                    label: "Secret Access Key".to_string(),
                    field_type: FieldType::Password,
                    optional: true,
                    help_text: Some(
                        "Falls back to AWS_SECRET_ACCESS_KEY when left empty".to_string(),
                    ),
                },
                ProviderCredentialField {
                    key: "Token".to_string(),
                    label: "Session Token".to_string(),
                    field_type: FieldType::Password,
                    optional: true,
                    help_text: Some("Only for temporary credentials".to_string()),
                },
            ],
            features: ProviderFeatures {
                can_get_zones: true,
                can_create_domains: true,
                can_concur: false,
                can_use_alias: false,
                can_use_caa: false,
                can_use_srv: true,
            },
            supported_record_types: vec![
                DnsRecordType::A,
                DnsRecordType::Aaaa,
                DnsRecordType::Cname,
                DnsRecordType::Mx,
                DnsRecordType::Txt,
                DnsRecordType::Ns,
                DnsRecordType::Srv,
            ],
        }
    }

    async fn list_zones(&self) -> Result<Vec<String>> {
        let domains = self.fetch_all_domains().await?;
        Ok(domains.into_iter().map(|d| d.name).collect())
    }

    async fn ensure_zone_exists(&self, domain: &str) -> Result<()> {
        self.create_zone_if_missing(domain).await
    }

    async fn get_zone_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        self.fetch_zone_records(domain).await
    }

    async fn get_zone_records_corrections(
        &self,
        desired: &DomainConfig,
        existing: Vec<DnsRecord>,
    ) -> Result<Vec<Correction>> {
        let zone = normalize_domain_name(&desired.name);

        let mut desired_records = desired.records.clone();
        let warnings = enforce_fixed_ttls(&mut desired_records, &zone);

        let changes = diff_by_record(
            &existing,
            &desired_records,
            DiffOptions {
                keep_unknown: desired.keep_unknown,
            },
        );

        // TTL 警告以无动作的 correction 交给调用方，排在最前
        let mut corrections: Vec<Correction> =
            warnings.into_iter().map(Correction::report).collect();
        corrections.extend(self.build_corrections(&zone, changes)?);
        Ok(corrections)
    }

    async fn get_nameservers(&self, domain: &str) -> Result<Vec<String>> {
        let zone = normalize_domain_name(domain);
        // 只看 apex NS，其他记录不解析
        let found = self.fetch_zone(domain).await?;
        Ok(found
            .domain_entries
            .iter()
            .filter(|e| {
                !e.is_alias()
                    && e.record_type.eq_ignore_ascii_case("NS")
                    && unescape_name(&e.name) == zone
            })
            .map(|e| normalize_domain_name(&e.target))
            .collect())
    }
}
