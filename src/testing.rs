//! In-memory doubles for the provider and the notifier.

use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use crate::notify::Notify;
use crate::provider::{DnsApi, DnsRecord, Zone};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Delete { zone_id: String, record_id: String },
    Create { zone_id: String, record: DnsRecord },
}

/// A provider that keeps zones and records in memory and logs every mutation.
#[derive(Default)]
pub struct FakeDns {
    zones: Vec<Zone>,
    records: Mutex<Vec<(String, DnsRecord)>>,
    mutations: Mutex<Vec<Mutation>>,
    next_id: AtomicUsize,
    fail_zones: bool,
    fail_create: bool,
}

impl FakeDns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zone(mut self, id: &str, name: &str) -> Self {
        self.zones.push(Zone {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Adds an `AAAA` record when `content` is IPv6, `A` otherwise.
    pub fn record(self, zone_id: &str, id: &str, name: &str, content: &str) -> Self {
        let record_type = if content.parse::<Ipv6Addr>().is_ok() { "AAAA" } else { "A" };
        let record: DnsRecord = serde_json::from_value(json!({
            "id": id,
            "zone_id": zone_id,
            "name": name,
            "type": record_type,
            "content": content,
            "proxied": true,
            "ttl": 300,
        }))
        .expect("valid record");
        self.records
            .lock()
            .unwrap()
            .push((zone_id.to_string(), record));
        self
    }

    pub fn failing_zone_listing(mut self) -> Self {
        self.fail_zones = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.mutations.lock().unwrap().clone()
    }

    pub fn records_in(&self, zone_id: &str) -> Vec<DnsRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(z, _)| z == zone_id)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

#[async_trait]
impl DnsApi for FakeDns {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        if self.fail_zones {
            anyhow::bail!("zone listing unavailable");
        }
        Ok(self.zones.clone())
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        Ok(self.records_in(zone_id))
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        self.mutations.lock().unwrap().push(Mutation::Delete {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
        });
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|(z, r)| !(z == zone_id && r.id == record_id));
        if records.len() == before {
            anyhow::bail!("no record {} in zone {}", record_id, zone_id);
        }
        Ok(())
    }

    async fn create_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        self.mutations.lock().unwrap().push(Mutation::Create {
            zone_id: zone_id.to_string(),
            record: record.clone(),
        });
        if self.fail_create {
            anyhow::bail!("create rejected");
        }
        let mut created = record.clone();
        created.id = format!("new{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.records
            .lock()
            .unwrap()
            .push((zone_id.to_string(), created.clone()));
        Ok(created)
    }
}

/// A notifier that records what it was asked to send.
#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub fail: bool,
}

impl FakeNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notify for FakeNotifier {
    async fn notify(&self, record_name: &str, old_content: &str, new_content: &str) -> Result<()> {
        self.sent.lock().unwrap().push((
            record_name.to_string(),
            old_content.to_string(),
            new_content.to_string(),
        ));
        if self.fail {
            anyhow::bail!("relay unreachable");
        }
        Ok(())
    }
}
