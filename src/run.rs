use log::{error, warn};

use crate::notify::Notify;
use crate::provider::DnsApi;
use crate::reconcile::{Outcome, Reconciler};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub updated: Vec<String>,
    pub would_update: Vec<String>,
    pub unchanged: Vec<String>,
    pub failed: Vec<String>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Reconciles every watched record in order against one IP.
///
/// A failing record is logged and counted; the remaining records are still
/// processed. Notification failures are logged only.
pub async fn run<A: DnsApi>(
    reconciler: &Reconciler<A>,
    notifier: Option<&dyn Notify>,
    records: &[String],
    current_ip: &str,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for record in records {
        match reconciler.reconcile(record, current_ip).await {
            Ok(Outcome::Unchanged) => {
                if notifier.is_none() {
                    println!("Records match");
                }
                summary.unchanged.push(record.clone());
            }
            Ok(Outcome::Updated {
                old_content,
                new_content,
            }) => {
                match notifier {
                    Some(notifier) => {
                        if let Err(e) = notifier.notify(record, &old_content, &new_content).await {
                            warn!("Notification for {} failed: {:#}", record, e);
                        }
                    }
                    None => println!("Updated {}", record),
                }
                summary.updated.push(record.clone());
            }
            Ok(Outcome::WouldUpdate { .. }) => {
                if notifier.is_none() {
                    println!("Would update {}", record);
                }
                summary.would_update.push(record.clone());
            }
            Err(e) => {
                error!("Failed to reconcile {}: {}", record, e);
                summary.failed.push(record.clone());
            }
        }
    }

    summary
}
