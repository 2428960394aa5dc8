//! FFA forward curves

use std::path::PathBuf;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::{FetchSummary, Upsert};
use crate::config::SourcesConfig;
use crate::database::FfaRepository;
use crate::errors::FreightDeskError;
use crate::mock::mock_ffa_prices;
use crate::models::NewFfaPrice;
use crate::upstream::{sheet, ApiClient};

/// Request options of an FFA fetch
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FfaFetchOptions {
    #[serde(alias = "fromExcel")]
    pub from_sheet: bool,
    #[serde(alias = "excelFilePath")]
    pub sheet_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
enum FfaSource {
    Mock(usize),
    Sheet(PathBuf),
    Api,
}

fn select_source(sources: &SourcesConfig, options: &FfaFetchOptions) -> FfaSource {
    if sources.use_mock_data {
        FfaSource::Mock(sources.mock_ffa_count)
    } else if options.from_sheet {
        FfaSource::Sheet(
            options
                .sheet_path
                .clone()
                .unwrap_or_else(|| sources.ffa_sheet_path.clone()),
        )
    } else {
        FfaSource::Api
    }
}

fn mock_prices(count: usize) -> Result<Vec<NewFfaPrice>, FreightDeskError> {
    mock_ffa_prices(count, Utc::now(), &mut rand::rng())
}

#[derive(Clone)]
pub struct FfaFetcher {
    ffa: FfaRepository,
    sources: SourcesConfig,
}

impl FfaFetcher {
    pub fn new(ffa: FfaRepository, sources: SourcesConfig) -> Self {
        Self { ffa, sources }
    }

    async fn load(&self, options: &FfaFetchOptions) -> Result<Vec<NewFfaPrice>, FreightDeskError> {
        match select_source(&self.sources, options) {
            FfaSource::Mock(count) => {
                info!("Using mock FFA price data");
                mock_prices(count)
            }
            FfaSource::Sheet(path) => {
                info!("Importing FFA prices from {}", path.display());
                sheet::import_sheet(&path, Utc::now())
            }
            FfaSource::Api => {
                info!("Fetching FFA prices from API");
                ApiClient::from_config("FFA", &self.sources.ffa)?
                    .fetch_list("ffa-prices")
                    .await
            }
        }
    }

    /// Load curve snapshots; a snapshot replaces the latest one of its
    /// contract month when both were recorded on the same day
    pub async fn fetch_and_save(
        &self,
        options: &FfaFetchOptions,
    ) -> Result<FetchSummary, FreightDeskError> {
        let prices = self.load(options).await?;
        info!("Processing {} FFA price records", prices.len());

        let mut summary = FetchSummary::new(prices.len());
        for price in &prices {
            let result = self.upsert(price).await;
            summary.record(format!("FFA price for {}", price.contract_month), result);
        }
        Ok(summary)
    }

    async fn upsert(&self, price: &NewFfaPrice) -> Result<Upsert, FreightDeskError> {
        match self.ffa.latest_for_month(&price.contract_month).await? {
            Some(existing) if existing.date_recorded.date_naive() == price.recorded_day() => {
                self.ffa.update(existing.id, price).await?;
                Ok(Upsert::Updated)
            }
            _ => {
                self.ffa.create(price).await?;
                Ok(Upsert::Created)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_options_accept_legacy_names() {
        let options: FfaFetchOptions =
            serde_json::from_str(r#"{ "fromExcel": true, "excelFilePath": "/tmp/curves.csv" }"#)
                .unwrap();
        assert!(options.from_sheet);
        assert_eq!(
            select_source(&SourcesConfig::default(), &options),
            FfaSource::Sheet(PathBuf::from("/tmp/curves.csv"))
        );
    }

    #[test]
    fn defaults_to_api_or_mock() {
        let options = FfaFetchOptions::default();
        assert_eq!(select_source(&SourcesConfig::default(), &options), FfaSource::Api);

        let sources = SourcesConfig {
            use_mock_data: true,
            ..Default::default()
        };
        assert_eq!(select_source(&sources, &options), FfaSource::Mock(8));
    }
}
