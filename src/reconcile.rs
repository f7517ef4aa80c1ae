use log::{error, info};

use crate::config::DuplicatePolicy;
use crate::error::{DdnsError, Result};
use crate::locator;
use crate::provider::DnsApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Updated {
        old_content: String,
        new_content: String,
    },
    /// Dry-run only: the record differs but was left untouched.
    WouldUpdate {
        old_content: String,
        new_content: String,
    },
}

/// Brings watched records in line with the current IP.
pub struct Reconciler<A> {
    api: A,
    on_duplicate: DuplicatePolicy,
    dry_run: bool,
}

impl<A: DnsApi> Reconciler<A> {
    pub fn new(api: A, on_duplicate: DuplicatePolicy, dry_run: bool) -> Self {
        Self {
            api,
            on_duplicate,
            dry_run,
        }
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replaces the record by delete-then-create if its content differs from
    /// `current_ip`. Every field other than `content` is carried over.
    pub async fn reconcile(&self, record_name: &str, current_ip: &str) -> Result<Outcome> {
        let record_type = locator::record_type_for(current_ip);
        let (zone_id, record) =
            locator::resolve(&self.api, record_name, record_type, self.on_duplicate).await?;

        if record.content == current_ip {
            info!("{} already points to {}", record_name, current_ip);
            return Ok(Outcome::Unchanged);
        }

        if self.dry_run {
            info!(
                "[dry-run] would update {} from {} to {}",
                record_name, record.content, current_ip
            );
            return Ok(Outcome::WouldUpdate {
                old_content: record.content,
                new_content: current_ip.to_string(),
            });
        }

        let outcome = Outcome::Updated {
            old_content: record.content.clone(),
            new_content: current_ip.to_string(),
        };

        info!(
            "Updating {} record {} from {} to {}",
            record.record_type().unwrap_or("?"),
            record_name,
            record.content,
            current_ip
        );
        let updated = record.with_content(current_ip);

        self.api
            .delete_record(&zone_id, &record.id)
            .await
            .map_err(DdnsError::Provider)?;

        match self.api.create_record(&zone_id, &updated).await {
            Ok(created) => {
                info!("Recreated {} as record {}", record_name, created.id);
                Ok(outcome)
            }
            Err(e) => {
                error!(
                    "{} was deleted but not recreated, it is missing from zone {}",
                    record_name, zone_id
                );
                Err(DdnsError::PartialUpdate {
                    record: record_name.to_string(),
                    deleted_id: record.id,
                    source: e,
                })
            }
        }
    }
}
