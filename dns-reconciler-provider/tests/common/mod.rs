//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::env;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use dns_reconciler_provider::{
    DnsProvider, DnsRecord, Domain, DomainEntry, GetDomainsResponse, LightsailApi,
    LightsailProvider, ProviderCredentials, ProviderError, ProviderType, RecordData, Result,
    create_provider,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

pub const ZONE: &str = "example.com";
pub const INVALID_TOKEN_MESSAGE: &str = "The security token included in the request is invalid.";

// ============ In-memory Lightsail ============

/// API operations the fake records and can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetDomains,
    GetDomain,
    CreateDomain,
    CreateEntry,
    UpdateEntry,
    DeleteEntry,
}

#[derive(Default)]
struct State {
    domains: BTreeMap<String, Vec<DomainEntry>>,
    next_id: u64,
    calls: HashMap<Op, usize>,
    failures: HashMap<Op, VecDeque<ProviderError>>,
    updates: Vec<DomainEntry>,
    creates: Vec<DomainEntry>,
    deletes: Vec<DomainEntry>,
}

/// Lightsail stand-in keeping zones in memory.
pub struct FakeLightsail {
    state: Mutex<State>,
    page_size: usize,
}

impl Default for FakeLightsail {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: 2,
        }
    }
}

impl FakeLightsail {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a zone holding the usual SOA and two apex NS entries.
    pub fn add_zone(&self, name: &str) {
        let mut st = self.state();
        let entries = vec![
            entry_with_id(&mut st, name, "SOA", "ns-1.awsdns-01.org. hostmaster.example.com. 1 7200 900 1209600 86400"),
            entry_with_id(&mut st, name, "NS", "ns-1.awsdns-01.org"),
            entry_with_id(&mut st, name, "NS", "ns-2.awsdns-02.com"),
        ];
        st.domains.insert(name.to_string(), entries);
    }

    /// Add an entry, returning its id.
    pub fn add_entry(&self, zone: &str, name: &str, record_type: &str, target: &str) -> String {
        self.push_entry(zone, name, record_type, target, false)
    }

    /// Add an alias entry, returning its id.
    pub fn add_alias(&self, zone: &str, name: &str, record_type: &str, target: &str) -> String {
        self.push_entry(zone, name, record_type, target, true)
    }

    fn push_entry(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
        target: &str,
        is_alias: bool,
    ) -> String {
        let mut st = self.state();
        let mut entry = entry_with_id(&mut st, name, record_type, target);
        entry.is_alias = Some(is_alias);
        let id = entry.id.clone().unwrap_or_default();
        st.domains.entry(zone.to_string()).or_default().push(entry);
        id
    }

    /// Make the next `times` calls of `op` fail with `error`.
    pub fn fail_next(&self, op: Op, times: usize, error: ProviderError) {
        let mut st = self.state();
        let queue = st.failures.entry(op).or_default();
        queue.extend(std::iter::repeat_n(error, times));
    }

    pub fn calls(&self, op: Op) -> usize {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn entries(&self, zone: &str) -> Vec<DomainEntry> {
        self.state().domains.get(zone).cloned().unwrap_or_default()
    }

    pub fn has_zone(&self, zone: &str) -> bool {
        self.state().domains.contains_key(zone)
    }

    pub fn updates(&self) -> Vec<DomainEntry> {
        self.state().updates.clone()
    }

    pub fn creates(&self) -> Vec<DomainEntry> {
        self.state().creates.clone()
    }

    pub fn deletes(&self) -> Vec<DomainEntry> {
        self.state().deletes.clone()
    }

    /// Count the call and pop a scripted failure, if any.
    fn enter(&self, op: Op) -> Result<MutexGuard<'_, State>> {
        let mut st = self.state();
        *st.calls.entry(op).or_insert(0) += 1;
        if let Some(err) = st.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        Ok(st)
    }
}

fn entry_with_id(st: &mut State, name: &str, record_type: &str, target: &str) -> DomainEntry {
    st.next_id += 1;
    DomainEntry {
        id: Some(format!("entry-{}", st.next_id)),
        name: name.to_string(),
        target: target.to_string(),
        is_alias: Some(false),
        record_type: record_type.to_string(),
        options: None,
    }
}

fn not_found(domain: &str) -> ProviderError {
    ProviderError::DomainNotFound {
        provider: "lightsail".to_string(),
        domain: domain.to_string(),
        raw_message: Some("The domain does not exist".to_string()),
    }
}

#[async_trait]
impl LightsailApi for FakeLightsail {
    async fn get_domains(&self, page_token: Option<&str>) -> Result<GetDomainsResponse> {
        let st = self.enter(Op::GetDomains)?;
        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let names: Vec<&String> = st.domains.keys().collect();
        let end = (start + self.page_size).min(names.len());
        let domains = names[start.min(end)..end]
            .iter()
            .map(|name| Domain {
                name: (*name).clone(),
                ..Domain::default()
            })
            .collect();
        Ok(GetDomainsResponse {
            domains,
            next_page_token: (end < names.len()).then(|| end.to_string()),
        })
    }

    async fn get_domain(&self, domain_name: &str) -> Result<Domain> {
        let st = self.enter(Op::GetDomain)?;
        let entries = st
            .domains
            .get(domain_name)
            .ok_or_else(|| not_found(domain_name))?;
        Ok(Domain {
            name: domain_name.to_string(),
            domain_entries: entries.clone(),
            ..Domain::default()
        })
    }

    async fn create_domain(&self, domain_name: &str) -> Result<()> {
        drop(self.enter(Op::CreateDomain)?);
        self.add_zone(domain_name);
        Ok(())
    }

    async fn create_domain_entry(&self, domain_name: &str, entry: &DomainEntry) -> Result<()> {
        let mut st = self.enter(Op::CreateEntry)?;
        st.creates.push(entry.clone());
        let mut stored = entry_with_id(&mut st, &entry.name, &entry.record_type, &entry.target);
        stored.is_alias = entry.is_alias;
        st.domains
            .get_mut(domain_name)
            .ok_or_else(|| not_found(domain_name))?
            .push(stored);
        Ok(())
    }

    async fn update_domain_entry(&self, domain_name: &str, entry: &DomainEntry) -> Result<()> {
        let mut st = self.enter(Op::UpdateEntry)?;
        st.updates.push(entry.clone());
        let entries = st
            .domains
            .get_mut(domain_name)
            .ok_or_else(|| not_found(domain_name))?;
        let slot = entries
            .iter_mut()
            .find(|e| e.id.is_some() && e.id == entry.id)
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "lightsail".to_string(),
                record_id: entry.id.clone().unwrap_or_default(),
                raw_message: None,
            })?;
        *slot = entry.clone();
        Ok(())
    }

    async fn delete_domain_entry(&self, domain_name: &str, entry: &DomainEntry) -> Result<()> {
        let mut st = self.enter(Op::DeleteEntry)?;
        st.deletes.push(entry.clone());
        let entries = st
            .domains
            .get_mut(domain_name)
            .ok_or_else(|| not_found(domain_name))?;
        let before = entries.len();
        entries.retain(|e| e.id != entry.id);
        if entries.len() == before {
            return Err(ProviderError::RecordNotFound {
                provider: "lightsail".to_string(),
                record_id: entry.id.clone().unwrap_or_default(),
                raw_message: None,
            });
        }
        Ok(())
    }
}

// ============ Helpers ============

/// Provider over the fake with zero retry delay.
pub fn provider(fake: &Arc<FakeLightsail>) -> LightsailProvider {
    let api: Arc<dyn LightsailApi> = fake.clone();
    LightsailProvider::with_api(api)
        .retry_delay(Duration::ZERO)
        .build()
}

pub fn throttled() -> ProviderError {
    ProviderError::RateLimited {
        provider: "lightsail".to_string(),
        retry_after: None,
        raw_message: Some("Sorry, your rate has been exceeded".to_string()),
    }
}

pub fn invalid_token() -> ProviderError {
    ProviderError::Unknown {
        provider: "lightsail".to_string(),
        raw_code: Some("UnrecognizedClientException".to_string()),
        raw_message: INVALID_TOKEN_MESSAGE.to_string(),
    }
}

pub fn a(name: &str, address: &str) -> DnsRecord {
    DnsRecord::new(
        name,
        ZONE,
        60,
        RecordData::A {
            address: address.to_string(),
        },
    )
}

pub fn apex_ns(nameserver: &str, ttl: u32) -> DnsRecord {
    DnsRecord::new(
        "@",
        ZONE,
        ttl,
        RecordData::NS {
            nameserver: nameserver.to_string(),
        },
    )
}

pub fn txt(name: &str, segments: &[&str]) -> DnsRecord {
    DnsRecord::new(
        name,
        ZONE,
        60,
        RecordData::TXT {
            segments: segments.iter().map(|s| (*s).to_string()).collect(),
        },
    )
}

/// 生成唯一的测试记录名称
pub fn generate_test_record_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}", &uuid.to_string()[..8])
}

// ============ Live tests ============

/// 测试上下文 - 封装 Provider 和测试域名
pub struct TestContext {
    pub provider: Arc<dyn DnsProvider>,
    pub domain: String,
}

impl TestContext {
    /// 创建 Lightsail 测试上下文（凭证取自环境变量）
    pub fn lightsail() -> Option<Self> {
        let domain = env::var("TEST_DOMAIN").ok()?;
        let credentials = ProviderCredentials::from_env(&ProviderType::Lightsail).ok()?;
        let provider = create_provider(credentials).ok()?;
        Some(Self { provider, domain })
    }
}
