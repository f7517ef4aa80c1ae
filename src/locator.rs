use std::net::IpAddr;

use log::{debug, warn};

use crate::config::DuplicatePolicy;
use crate::error::{DdnsError, Result};
use crate::provider::{DnsApi, DnsRecord};

/// Last two labels of a hostname: `home.example.org` -> `example.org`.
///
/// Multi-label public suffixes (`example.co.uk`) are not recognised, and a
/// single-label name is returned as-is.
pub fn extract_apex(record_name: &str) -> String {
    let labels: Vec<&str> = record_name.split('.').collect();
    let start = labels.len().saturating_sub(2);
    labels[start..].join(".")
}

/// Record type that can hold `ip`: `A` for IPv4, `AAAA` for IPv6.
pub fn record_type_for(ip: &str) -> Option<&'static str> {
    match ip.parse::<IpAddr>().ok()? {
        IpAddr::V4(_) => Some("A"),
        IpAddr::V6(_) => Some("AAAA"),
    }
}

pub async fn find_zone_id<A: DnsApi + ?Sized>(api: &A, apex: &str) -> Result<String> {
    let zones = api.list_zones().await.map_err(DdnsError::Provider)?;

    zones
        .into_iter()
        .find(|zone| zone.name == apex)
        .map(|zone| zone.id)
        .ok_or_else(|| DdnsError::ZoneNotFound(apex.to_string()))
}

pub async fn find_record<A: DnsApi + ?Sized>(
    api: &A,
    zone_id: &str,
    record_name: &str,
    record_type: Option<&str>,
    policy: DuplicatePolicy,
) -> Result<DnsRecord> {
    let records = api.list_records(zone_id).await.map_err(DdnsError::Provider)?;
    // A and AAAA records often share a name; only one of them can take the IP.
    let mut matches: Vec<DnsRecord> = records
        .into_iter()
        .filter(|record| record.name == record_name)
        .filter(|record| match (record_type, record.record_type()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        })
        .collect();

    let count = matches.len();
    if count > 1 {
        if policy == DuplicatePolicy::Error {
            return Err(DdnsError::DuplicateRecords {
                zone_id: zone_id.to_string(),
                record: record_name.to_string(),
                count,
            });
        }
        warn!(
            "{} records named {} in zone {}, using the last one",
            count, record_name, zone_id
        );
    }

    matches.pop().ok_or_else(|| DdnsError::RecordNotFound {
        zone_id: zone_id.to_string(),
        record: record_name.to_string(),
    })
}

/// Zone id and current state of a watched record.
pub async fn resolve<A: DnsApi + ?Sized>(
    api: &A,
    record_name: &str,
    record_type: Option<&str>,
    policy: DuplicatePolicy,
) -> Result<(String, DnsRecord)> {
    let apex = extract_apex(record_name);
    let zone_id = find_zone_id(api, &apex).await?;
    debug!("{} is in zone {} ({})", record_name, apex, zone_id);

    let record = find_record(api, &zone_id, record_name, record_type, policy).await?;
    Ok((zone_id, record))
}
