use std::net::IpAddr;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;

use crate::config::IpConfig;
use crate::error::{DdnsError, Result};

/// Looks up the caller's public address from a plain-text echo service.
pub struct IpResolver {
    client: Client,
    url: String,
    retries: u32,
    retry_delay: Duration,
}

impl IpResolver {
    pub fn new(config: &IpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DdnsError::IpLookup(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            retries: config.retries,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        })
    }

    /// Current public IP, parsed and printed back in canonical form.
    pub async fn current_ip(&self) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.fetch().await {
                Ok(ip) => return Ok(ip),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "IP lookup failed ({}), retry {}/{} in {:?}",
                        e, attempt, self.retries, self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DdnsError::IpLookup(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(DdnsError::IpLookup(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DdnsError::IpLookup(format!("Failed to read response: {}", e)))?;

        let ip_text = body.trim();
        if ip_text.is_empty() {
            return Err(DdnsError::IpLookup(format!("{} returned an empty body", self.url)));
        }

        let ip: IpAddr = ip_text
            .parse()
            .map_err(|_| DdnsError::IpLookup(format!("Invalid IP address: {}", ip_text)))?;

        debug!("Current IP is {}", ip);
        Ok(ip.to_string())
    }
}
