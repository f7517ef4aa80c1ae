use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{DnsApi, DnsRecord, Zone};
use crate::config::CloudflareConfig;

const PER_PAGE: u32 = 50;

/// Upper bound on pages read from one listing.
const MAX_PAGES: u32 = 1000;

pub struct CloudflareClient {
    client: Client,
    api_base: String,
    auth: Auth,
}

enum Auth {
    /// Scoped API token.
    Bearer(String),
    /// Global API key paired with the account email.
    GlobalKey { email: String, key: String },
}

impl CloudflareClient {
    pub fn new(config: &CloudflareConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let auth = match config.email {
            Some(ref email) if !email.is_empty() => Auth::GlobalKey {
                email: email.clone(),
                key: config.api_token.clone(),
            },
            _ => Auth::Bearer(config.api_token.clone()),
        };

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Content-Type", "application/json");
        match self.auth {
            Auth::Bearer(ref token) => request.bearer_auth(token),
            Auth::GlobalKey { ref email, ref key } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> Result<CloudflareResponse<T>> {
        let response = self
            .authorize(request)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to Cloudflare", action))?;

        let status = response.status();
        let body: CloudflareResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Cloudflare {} response (HTTP {})", action, status))?;

        if !body.success || !status.is_success() {
            let errors: Vec<String> = body
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect();
            anyhow::bail!(
                "Cloudflare API error on {} (HTTP {}): {}",
                action,
                status,
                errors.join(", ")
            );
        }

        Ok(body)
    }

    /// Reads every page of a listing endpoint.
    async fn list_all<T: DeserializeOwned>(&self, path: &str, action: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let url = format!("{}{}", self.api_base, path);
            let request = self
                .client
                .get(&url)
                .query(&[("page", page), ("per_page", PER_PAGE)]);
            let response: CloudflareResponse<Vec<T>> = self.execute(request, action).await?;

            let batch = response.result.unwrap_or_default();
            let fetched = batch.len();
            items.extend(batch);

            let total_pages = response.result_info.map(|info| info.total_pages).unwrap_or(1);
            if fetched == 0 || page >= total_pages {
                break;
            }
            if page >= MAX_PAGES {
                warn!("Stopping {} after {} pages", action, MAX_PAGES);
                break;
            }
            page += 1;
        }

        debug!("{}: {} item(s)", action, items.len());
        Ok(items)
    }
}

#[async_trait]
impl DnsApi for CloudflareClient {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.list_all("/zones", "list zones").await
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let path = format!("/zones/{}/dns_records", zone_id);
        self.list_all(&path, "list DNS records").await
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let url = format!("{}/zones/{}/dns_records/{}", self.api_base, zone_id, record_id);
        let _: CloudflareResponse<Value> = self
            .execute(self.client.delete(&url), "delete DNS record")
            .await?;
        Ok(())
    }

    async fn create_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        let url = format!("{}/zones/{}/dns_records", self.api_base, zone_id);
        let response: CloudflareResponse<DnsRecord> = self
            .execute(self.client.post(&url).json(record), "create DNS record")
            .await?;

        response
            .result
            .ok_or_else(|| anyhow::anyhow!("No result in Cloudflare create response"))
    }
}

// Cloudflare API types

#[derive(Debug, Deserialize)]
struct CloudflareResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareError>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct CloudflareError {
    code: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default = "default_total_pages")]
    total_pages: u32,
}

fn default_total_pages() -> u32 {
    1
}
