use thiserror::Error;

pub type Result<T> = std::result::Result<T, DdnsError>;

/// Failures while resolving or updating a single watched record.
#[derive(Debug, Error)]
pub enum DdnsError {
    #[error("IP lookup failed: {0}")]
    IpLookup(String),

    #[error("zone not found for domain {0}")]
    ZoneNotFound(String),

    #[error("record {record} not found in zone {zone_id}")]
    RecordNotFound { zone_id: String, record: String },

    #[error("{count} records named {record} in zone {zone_id}")]
    DuplicateRecords {
        zone_id: String,
        record: String,
        count: usize,
    },

    #[error("Cloudflare API error: {0}")]
    Provider(#[source] anyhow::Error),

    /// The old record is gone but its replacement was not created.
    #[error("record {record} was deleted (id {deleted_id}) but could not be recreated: {source}")]
    PartialUpdate {
        record: String,
        deleted_id: String,
        #[source]
        source: anyhow::Error,
    },
}
