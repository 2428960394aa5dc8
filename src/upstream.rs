//! Upstream data sources: bearer-token JSON APIs and document importers

pub mod sheet;

use std::path::Path;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::errors::FreightDeskError;
use crate::models::VesselProfile;

/// Client for one upstream API; the key is sent as a bearer token and never logged
#[derive(Debug, Clone)]
pub struct ApiClient {
    name: &'static str,
    http: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    /// Client for API `name`, failing when its URL or key is missing
    pub fn from_config(name: &'static str, config: &ApiConfig) -> Result<Self, FreightDeskError> {
        let (url, key) = config.credentials(name)?;
        Ok(Self::new(name, url.to_string(), key.to_string()))
    }

    pub fn new(name: &'static str, base_url: String, api_key: String) -> Self {
        Self {
            name,
            http: Client::new(),
            base_url,
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET `path` and decode the body, which must be a JSON array
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, FreightDeskError> {
        let url = self.url(path);
        debug!("Fetching {} from {}", self.name, url);

        let body: Value = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items = decode_list(self.name, body)?;
        info!("Fetched {} records from {} API", items.len(), self.name);
        Ok(items)
    }
}

/// Decode an upstream body that must be a JSON array
pub fn decode_list<T: DeserializeOwned>(
    api: &str,
    body: Value,
) -> Result<Vec<T>, FreightDeskError> {
    if !body.is_array() {
        return Err(FreightDeskError::UpstreamShape(format!(
            "Invalid response from {} API",
            api
        )));
    }
    Ok(serde_json::from_value(body)?)
}

/// Q88 questionnaires delivered as PDF files
///
/// Text extraction from the PDFs is not supported; the directory is only
/// checked for existence and nothing is returned.
pub fn import_vessels_from_pdf(directory: &Path) -> Result<Vec<VesselProfile>, FreightDeskError> {
    if !directory.is_dir() {
        return Err(FreightDeskError::NotFound(format!(
            "Directory not found: {}",
            directory.display()
        )));
    }
    info!(
        "PDF import from {} yields no vessels",
        directory.display()
    );
    Ok(Vec::new())
}
