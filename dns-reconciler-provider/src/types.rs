use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::providers::common::{
    full_name_to_relative, normalize_domain_name, record_data_to_single_string,
    relative_to_full_name,
};

// ============ Provider ============

/// Backend selector for [`create_provider`](crate::create_provider).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// AWS Lightsail domains. Requires feature `lightsail`.
    Lightsail,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lightsail => write!(f, "lightsail"),
        }
    }
}

// ============ Records ============

/// Record types the reconciler understands. Serialized upper-case.
///
/// Lightsail holds all of them except [`Caa`](Self::Caa).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Ns,
    Srv,
    Caa,
}

impl DnsRecordType {
    /// Uppercase wire name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
        }
    }

    /// Types whose target is a host name that must be fully qualified.
    pub fn has_fqdn_target(self) -> bool {
        matches!(self, Self::Cname | Self::Mx | Self::Srv | Self::Ns)
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed record content, one variant per type.
///
/// Host-name targets (CNAME, MX, NS, SRV) are kept fully qualified with a
/// trailing dot, which is how both sides of a diff must spell them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum RecordData {
    A {
        address: String,
    },

    AAAA {
        address: String,
    },

    CNAME {
        target: String,
    },

    MX {
        priority: u16,
        exchange: String,
    },

    /// Segments in wire order. Only the joined text is significant.
    TXT {
        segments: Vec<String>,
    },

    NS {
        nameserver: String,
    },

    SRV {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },

    /// `flags` is 0 or 128. Never written to Lightsail.
    CAA {
        flags: u8,
        tag: String,
        value: String,
    },
}

impl RecordData {
    pub fn record_type(&self) -> DnsRecordType {
        match self {
            Self::A { .. } => DnsRecordType::A,
            Self::AAAA { .. } => DnsRecordType::Aaaa,
            Self::CNAME { .. } => DnsRecordType::Cname,
            Self::MX { .. } => DnsRecordType::Mx,
            Self::TXT { .. } => DnsRecordType::Txt,
            Self::NS { .. } => DnsRecordType::Ns,
            Self::SRV { .. } => DnsRecordType::Srv,
            Self::CAA { .. } => DnsRecordType::Caa,
        }
    }

    /// Main value without priority, weight or flags. First segment for TXT.
    pub fn display_value(&self) -> &str {
        match self {
            Self::A { address } | Self::AAAA { address } => address,
            Self::CNAME { target } | Self::SRV { target, .. } => target,
            Self::MX { exchange, .. } => exchange,
            Self::TXT { segments } => segments.first().map_or("", String::as_str),
            Self::NS { nameserver } => nameserver,
            Self::CAA { value, .. } => value,
        }
    }

    /// TXT segments concatenated into one string. Empty for other types.
    pub fn txt_joined(&self) -> String {
        match self {
            Self::TXT { segments } => segments.concat(),
            _ => String::new(),
        }
    }
}

/// Snapshot of the provider-native record a [`DnsRecord`] was read from.
///
/// Only used to address the remote entry on update/delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeRecord {
    /// Remote identifier. `None` for records that do not exist remotely yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name exactly as the provider returned it.
    pub name: String,
    /// Record type string as the provider returned it.
    pub record_type: String,
    /// Target exactly as the provider returned it.
    pub target: String,
    /// Whether the provider flags this entry as an alias.
    pub is_alias: bool,
}

/// Lookup key of a record set: owner name plus type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    /// Fully-qualified owner name, without trailing dot.
    pub name_fqdn: String,
    /// Record type.
    pub record_type: DnsRecordType,
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name_fqdn, self.record_type)
    }
}

/// A provider-agnostic DNS record, either desired or read back from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Label relative to the zone (`"@"` for the apex).
    pub name: String,
    /// Fully-qualified owner name, lower-case, without trailing dot.
    pub name_fqdn: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Type-specific record data.
    pub data: RecordData,
    /// Native record this one was read from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<NativeRecord>,
}

impl DnsRecord {
    /// Build a record from a label (`"www"`, `"@"`, or a name already inside `zone`).
    pub fn new(name: &str, zone: &str, ttl: u32, data: RecordData) -> Self {
        let zone = normalize_domain_name(zone);
        let name = normalize_domain_name(name);
        let label = full_name_to_relative(&name, &zone);
        let name_fqdn = relative_to_full_name(&label, &zone);
        Self {
            name: label,
            name_fqdn,
            ttl,
            data,
            native: None,
        }
    }

    /// Returns the record's type.
    pub fn record_type(&self) -> DnsRecordType {
        self.data.record_type()
    }

    /// Returns the `(fqdn, type)` key used to group records when diffing.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            name_fqdn: self.name_fqdn.clone(),
            record_type: self.record_type(),
        }
    }

    /// Whether the record sits at the zone apex.
    pub fn is_apex(&self, zone: &str) -> bool {
        self.name_fqdn == normalize_domain_name(zone)
    }

    /// Whether this is an NS record at the zone apex.
    pub fn is_apex_ns(&self, zone: &str) -> bool {
        self.record_type() == DnsRecordType::Ns && self.is_apex(zone)
    }

    /// Compares data and TTL, ignoring names and native identity.
    ///
    /// TXT segment boundaries do not count, only the joined text.
    pub fn same_content(&self, other: &Self) -> bool {
        if self.ttl != other.ttl {
            return false;
        }
        match (&self.data, &other.data) {
            (RecordData::TXT { .. }, RecordData::TXT { .. }) => {
                self.data.txt_joined() == other.data.txt_joined()
            }
            (a, b) => a == b,
        }
    }

    /// Combined single-string form of the target (e.g. `"10 mail.example.com."` for MX).
    pub fn target_combined(&self) -> String {
        record_data_to_single_string(&self.data)
    }

    /// Human-readable one-line description used in messages and warnings.
    pub fn target_debug(&self) -> String {
        format!(
            "{} {} {}",
            self.name_fqdn,
            self.record_type(),
            self.target_combined()
        )
    }
}

/// Desired state for one domain, as supplied by the host tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConfig {
    /// Zone name (e.g., `"example.com"`).
    pub name: String,
    /// Desired records in declaration order.
    pub records: Vec<DnsRecord>,
    /// Keep existing records that are not declared instead of deleting them.
    #[serde(default)]
    pub keep_unknown: bool,
}

impl DomainConfig {
    /// Creates a desired state for `name` with the given records.
    pub fn new(name: &str, records: Vec<DnsRecord>) -> Self {
        Self {
            name: normalize_domain_name(name),
            records,
            keep_unknown: false,
        }
    }
}

// ============ Metadata ============

/// `Password` fields are masked by the host tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Password,
}

/// One key of the host tool's credential block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentialField {
    /// Config key, e.g. `KeyId`.
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field may be left empty.
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

/// Capabilities of a provider, as the host tool's documentation matrix expects them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFeatures {
    /// Can list all zones on the account.
    pub can_get_zones: bool,
    /// Can create missing zones.
    pub can_create_domains: bool,
    /// Supports concurrent reconciliation of several zones.
    pub can_concur: bool,
    /// Supports alias records.
    pub can_use_alias: bool,
    /// Supports CAA records.
    pub can_use_caa: bool,
    /// Supports SRV records.
    pub can_use_srv: bool,
}

/// What a backend accepts and can do, see
/// [`get_all_provider_metadata`](crate::get_all_provider_metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    pub id: ProviderType,
    pub name: String,
    pub description: String,
    /// Credential keys, in the order the host tool should ask for them.
    pub required_fields: Vec<ProviderCredentialField>,
    pub features: ProviderFeatures,
    /// Record types the provider can hold.
    pub supported_record_types: Vec<DnsRecordType>,
}

// ============ Credentials ============

/// A credential key is absent, or present but blank.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    #[error("Missing required field: {label}")]
    MissingField {
        provider: ProviderType,
        field: String,
        label: String,
    },
    #[error("Field must not be empty: {label}")]
    EmptyField {
        provider: ProviderType,
        field: String,
        label: String,
    },
}

/// Environment variables consulted when no static keys are configured.
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
/// See [`ENV_ACCESS_KEY_ID`].
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
/// See [`ENV_ACCESS_KEY_ID`].
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Credentials for [`create_provider`](crate::create_provider).
///
/// ```json
/// { "provider": "lightsail", "credentials": { "access_key_id": "...", "secret_access_key": "..." } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// AWS Lightsail credentials.
    #[serde(rename = "lightsail")]
    Lightsail {
        access_key_id: String,
        secret_access_key: String,
        /// Only for STS temporary credentials.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_token: Option<String>,
    },
}

impl ProviderCredentials {
    /// Construct credentials from the host tool's flat key-value config.
    ///
    /// Keys are `KeyId`, `SecretKey` and the optional `Token`. When neither key is
    /// set, the ambient `AWS_*` environment variables are used instead.
    pub fn from_map(
        provider: &ProviderType,
        map: &HashMap<String, String>,
    ) -> Result<Self, CredentialValidationError> {
        match provider {
            ProviderType::Lightsail => {
                let has_static = ["KeyId", "SecretKey"]
                    .iter()
                    .any(|k| map.get(*k).is_some_and(|v| !v.trim().is_empty()));
                if !has_static {
                    return Self::from_env(provider);
                }
                Ok(Self::Lightsail {
                    access_key_id: Self::get_required_field(
                        provider,
                        map,
                        "KeyId",
                        "Access Key ID",
                    )?,
                    secret_access_key: Self::get_required_field(
                        provider,
                        map,
                        "SecretKey",
                        "Secret Access Key",
                    )?,
                    session_token: map.get("Token").filter(|v| !v.trim().is_empty()).cloned(),
                })
            }
        }
    }

    /// Read credentials from the process environment.
    pub fn from_env(provider: &ProviderType) -> Result<Self, CredentialValidationError> {
        let env: HashMap<String, String> = [
            ENV_ACCESS_KEY_ID,
            ENV_SECRET_ACCESS_KEY,
            ENV_SESSION_TOKEN,
        ]
        .iter()
        .filter_map(|k| std::env::var(k).ok().map(|v| ((*k).to_string(), v)))
        .collect();
        Self::from_env_map(provider, &env)
    }

    fn from_env_map(
        provider: &ProviderType,
        env: &HashMap<String, String>,
    ) -> Result<Self, CredentialValidationError> {
        match provider {
            ProviderType::Lightsail => Ok(Self::Lightsail {
                access_key_id: Self::get_required_field(
                    provider,
                    env,
                    ENV_ACCESS_KEY_ID,
                    "Access Key ID",
                )?,
                secret_access_key: Self::get_required_field(
                    provider,
                    env,
                    ENV_SECRET_ACCESS_KEY,
                    "Secret Access Key",
                )?,
                session_token: env
                    .get(ENV_SESSION_TOKEN)
                    .filter(|v| !v.trim().is_empty())
                    .cloned(),
            }),
        }
    }

    /// Obtain required fields from `HashMap` and verify that it is not empty
    fn get_required_field(
        provider: &ProviderType,
        map: &HashMap<String, String>,
        key: &str,
        label: &str,
    ) -> Result<String, CredentialValidationError> {
        match map.get(key) {
            None => Err(CredentialValidationError::MissingField {
                provider: provider.clone(),
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) if v.trim().is_empty() => Err(CredentialValidationError::EmptyField {
                provider: provider.clone(),
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) => Ok(v.clone()),
        }
    }

    /// Convert credentials to a `HashMap` for flat key-value storage.
    pub fn to_map(&self) -> HashMap<String, String> {
        match self {
            Self::Lightsail {
                access_key_id,
                secret_access_key,
                session_token,
            } => {
                let mut map: HashMap<String, String> = [
                    ("KeyId".to_string(), access_key_id.clone()),
                    ("SecretKey".to_string(), secret_access_key.clone()),
                ]
                .into();
                if let Some(token) = session_token {
                    map.insert("Token".to_string(), token.clone());
                }
                map
            }
        }
    }

    /// Returns the [`ProviderType`] corresponding to this credential variant.
    pub fn provider_type(&self) -> ProviderType {
        match self {
            Self::Lightsail { .. } => ProviderType::Lightsail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============ ProviderCredentials ============

    #[test]
    fn credentials_lightsail_roundtrip() {
        let map: HashMap<String, String> = [
            ("KeyId".to_string(), "AKID".to_string()),
            ("SecretKey".to_string(), "secret".to_string()),
            ("Token".to_string(), "session".to_string()),
        ]
        .into();
        let res = ProviderCredentials::from_map(&ProviderType::Lightsail, &map);
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(cred) = res else {
            return;
        };
        let back = cred.to_map();
        assert_eq!(back.get("KeyId").map(String::as_str), Some("AKID"));
        assert_eq!(back.get("SecretKey").map(String::as_str), Some("secret"));
        assert_eq!(back.get("Token").map(String::as_str), Some("session"));
        assert_eq!(cred.provider_type(), ProviderType::Lightsail);
    }

    #[test]
    fn credentials_token_is_optional() {
        let map: HashMap<String, String> = [
            ("KeyId".to_string(), "AKID".to_string()),
            ("SecretKey".to_string(), "secret".to_string()),
            ("Token".to_string(), String::new()),
        ]
        .into();
        let res = ProviderCredentials::from_map(&ProviderType::Lightsail, &map);
        assert!(
            matches!(
                &res,
                Ok(ProviderCredentials::Lightsail {
                    session_token: None,
                    ..
                })
            ),
            "unexpected result: {res:?}"
        );
    }

    #[test]
    fn credentials_half_configured_is_an_error() {
        let map: HashMap<String, String> = [("KeyId".to_string(), "AKID".to_string())].into();
        let res = ProviderCredentials::from_map(&ProviderType::Lightsail, &map);
        assert!(
            matches!(&res, Err(CredentialValidationError::MissingField { field, .. }) if field == "SecretKey"),
            "unexpected result: {res:?}"
        );
    }

    #[test]
    fn credentials_empty_field() {
        let map: HashMap<String, String> = [
            ("KeyId".to_string(), "AKID".to_string()),
            ("SecretKey".to_string(), "  ".to_string()),
        ]
        .into();
        let res = ProviderCredentials::from_map(&ProviderType::Lightsail, &map);
        assert!(
            matches!(&res, Err(CredentialValidationError::EmptyField { .. })),
            "unexpected result: {res:?}"
        );
    }

    #[test]
    fn credentials_from_env_map() {
        let env: HashMap<String, String> = [
            (ENV_ACCESS_KEY_ID.to_string(), "AKID".to_string()),
            (ENV_SECRET_ACCESS_KEY.to_string(), "secret".to_string()),
        ]
        .into();
        let res = ProviderCredentials::from_env_map(&ProviderType::Lightsail, &env);
        assert!(
            matches!(
                &res,
                Ok(ProviderCredentials::Lightsail { access_key_id, session_token: None, .. })
                    if access_key_id == "AKID"
            ),
            "unexpected result: {res:?}"
        );
    }

    #[test]
    fn credentials_from_empty_env_map() {
        let res = ProviderCredentials::from_env_map(&ProviderType::Lightsail, &HashMap::new());
        assert!(
            matches!(&res, Err(CredentialValidationError::MissingField { field, .. }) if field == ENV_ACCESS_KEY_ID),
            "unexpected result: {res:?}"
        );
    }

    // ============ DnsRecord ============

    #[test]
    fn record_new_derives_label_and_fqdn() {
        let r = DnsRecord::new(
            "WWW",
            "Example.com.",
            300,
            RecordData::A {
                address: "1.2.3.4".into(),
            },
        );
        assert_eq!(r.name, "www");
        assert_eq!(r.name_fqdn, "www.example.com");

        let apex = DnsRecord::new(
            "@",
            "example.com",
            300,
            RecordData::NS {
                nameserver: "ns1.example.net.".into(),
            },
        );
        assert_eq!(apex.name, "@");
        assert_eq!(apex.name_fqdn, "example.com");
        assert!(apex.is_apex_ns("example.com."));
    }

    #[test]
    fn record_new_accepts_fqdn_inside_zone() {
        let r = DnsRecord::new(
            "mail.example.com",
            "example.com",
            60,
            RecordData::A {
                address: "1.2.3.4".into(),
            },
        );
        assert_eq!(r.name, "mail");
        assert_eq!(r.name_fqdn, "mail.example.com");
    }

    #[test]
    fn record_same_content_ignores_native() {
        let a = DnsRecord::new(
            "www",
            "example.com",
            60,
            RecordData::A {
                address: "1.2.3.4".into(),
            },
        );
        let mut b = a.clone();
        b.native = Some(NativeRecord {
            id: Some("id-1".into()),
            name: "www.example.com".into(),
            record_type: "A".into(),
            target: "1.2.3.4".into(),
            is_alias: false,
        });
        assert!(a.same_content(&b));
        b.ttl = 300;
        assert!(!a.same_content(&b));
    }

    #[test]
    fn record_target_debug() {
        let r = DnsRecord::new(
            "@",
            "example.com",
            60,
            RecordData::MX {
                priority: 10,
                exchange: "mail.example.com.".into(),
            },
        );
        assert_eq!(r.target_debug(), "example.com MX 10 mail.example.com.");
    }

    // ============ Serde ============

    #[test]
    fn dns_record_type_serde() {
        let json_res = serde_json::to_string(&DnsRecordType::Aaaa);
        assert!(json_res.is_ok(), "serde_json::to_string failed: {json_res:?}");
        let Ok(json) = json_res else {
            return;
        };
        assert_eq!(json, "\"AAAA\"");
        let back: serde_json::Result<DnsRecordType> = serde_json::from_str(&json);
        assert!(matches!(back, Ok(DnsRecordType::Aaaa)));
    }

    #[test]
    fn record_data_record_type_and_display() {
        let srv = RecordData::SRV {
            priority: 0,
            weight: 5,
            port: 443,
            target: "srv.example.com.".into(),
        };
        assert_eq!(srv.record_type(), DnsRecordType::Srv);
        assert_eq!(srv.display_value(), "srv.example.com.");

        let txt = RecordData::TXT {
            segments: vec!["v=spf1 ".into(), "-all".into()],
        };
        assert_eq!(txt.display_value(), "v=spf1 ");
        assert_eq!(txt.txt_joined(), "v=spf1 -all");
    }

    #[test]
    fn domain_config_deserializes_without_keep_unknown() {
        let json = r#"{"name":"example.com","records":[]}"#;
        let res: serde_json::Result<DomainConfig> = serde_json::from_str(json);
        assert!(res.is_ok(), "serde_json::from_str failed: {res:?}");
        let Ok(dc) = res else {
            return;
        };
        assert!(!dc.keep_unknown);
        assert!(dc.records.is_empty());
    }
}
