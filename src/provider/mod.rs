pub mod cloudflare;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// A DNS record as the provider returns it.
///
/// Only `id`, `name` and `content` are interpreted; every other field the
/// provider sends (type, ttl, proxied, ...) is carried in `extra` and written
/// back untouched when the record is recreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DnsRecord {
    pub fn record_type(&self) -> Option<&str> {
        self.extra.get("type").and_then(Value::as_str)
    }

    /// Same record with only the content replaced.
    ///
    /// Read-only fields (`id`, `zone_id`, `created_on`, `meta`, ...) stay in
    /// the copy and are sent back on create; Cloudflare v4 ignores them. An API
    /// that rejects unknown fields would fail every create after the delete.
    pub fn with_content(&self, content: &str) -> Self {
        Self {
            content: content.to_string(),
            ..self.clone()
        }
    }
}

/// The provider operations the updater relies on.
#[async_trait]
pub trait DnsApi: Send + Sync {
    async fn list_zones(&self) -> Result<Vec<Zone>>;

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>>;

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()>;

    async fn create_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord>;
}
