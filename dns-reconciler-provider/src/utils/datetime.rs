//! 日期时间序列化/反序列化工具
//!
//! - 序列化: `DateTime`<Utc> -> RFC3339 字符串
//! - 反序列化: RFC3339 字符串，或 Unix 时间戳（整数或 AWS JSON 的浮点秒）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// 序列化 Option<`DateTime`<Utc>> 为 Option<RFC3339 字符串>
pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

/// 反序列化：支持 RFC3339 字符串、整数秒或浮点秒
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OptionalTimestamp {
        String(String),
        I64(i64),
        F64(f64),
    }

    match Option::<OptionalTimestamp>::deserialize(deserializer)? {
        Some(OptionalTimestamp::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| Error::custom(format!("Invalid RFC3339 timestamp: {e}"))),
        Some(OptionalTimestamp::I64(ts)) => DateTime::from_timestamp(ts, 0)
            .map(Some)
            .ok_or_else(|| Error::custom("Invalid Unix timestamp")),
        Some(OptionalTimestamp::F64(ts)) => from_fractional_seconds(ts)
            .map(Some)
            .ok_or_else(|| Error::custom("Invalid Unix timestamp")),
        None => Ok(None),
    }
}

/// 浮点秒 -> `DateTime`，精确到毫秒
#[allow(clippy::cast_possible_truncation)]
fn from_fractional_seconds(ts: f64) -> Option<DateTime<Utc>> {
    if !ts.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((ts * 1000.0).round() as i64)
}
