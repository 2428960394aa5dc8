//! Q88 vessel questionnaires

use std::path::PathBuf;

use serde::Deserialize;
use tracing::info;

use super::{FetchSummary, Upsert};
use crate::config::SourcesConfig;
use crate::database::VesselRepository;
use crate::errors::FreightDeskError;
use crate::mock::mock_vessels;
use crate::models::VesselProfile;
use crate::upstream::{import_vessels_from_pdf, ApiClient};

/// Request options of a vessel fetch
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VesselFetchOptions {
    #[serde(alias = "fromPDFs")]
    pub from_pdfs: bool,
    pub pdf_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
enum VesselSource {
    Mock(usize),
    Pdf(PathBuf),
    Api,
}

/// Mock data wins, then the PDF directory when asked for, then the API
fn select_source(sources: &SourcesConfig, options: &VesselFetchOptions) -> VesselSource {
    if sources.use_mock_data {
        VesselSource::Mock(sources.mock_vessel_count)
    } else if options.from_pdfs {
        VesselSource::Pdf(
            options
                .pdf_directory
                .clone()
                .unwrap_or_else(|| sources.q88_pdf_directory.clone()),
        )
    } else {
        VesselSource::Api
    }
}

#[derive(Clone)]
pub struct Q88Fetcher {
    vessels: VesselRepository,
    sources: SourcesConfig,
}

impl Q88Fetcher {
    pub fn new(vessels: VesselRepository, sources: SourcesConfig) -> Self {
        Self { vessels, sources }
    }

    async fn load(&self, options: &VesselFetchOptions) -> Result<Vec<VesselProfile>, FreightDeskError> {
        match select_source(&self.sources, options) {
            VesselSource::Mock(count) => {
                info!("Using mock Q88 vessel data");
                mock_vessels(count)
            }
            VesselSource::Pdf(directory) => {
                info!("Importing vessels from Q88 PDF files");
                import_vessels_from_pdf(&directory)
            }
            VesselSource::Api => {
                info!("Fetching vessels from Q88 API");
                ApiClient::from_config("Q88", &self.sources.q88)?
                    .fetch_list("vessels")
                    .await
            }
        }
    }

    /// Load vessels and upsert each by IMO
    pub async fn fetch_and_save(
        &self,
        options: &VesselFetchOptions,
    ) -> Result<FetchSummary, FreightDeskError> {
        let vessels = self.load(options).await?;
        info!("Processing {} vessels", vessels.len());

        let mut summary = FetchSummary::new(vessels.len());
        for vessel in &vessels {
            let result = self.upsert(vessel).await;
            summary.record(format!("vessel {} ({})", vessel.name, vessel.imo), result);
        }
        Ok(summary)
    }

    async fn upsert(&self, vessel: &VesselProfile) -> Result<Upsert, FreightDeskError> {
        if self.vessels.find_by_imo(&vessel.imo).await?.is_some() {
            self.vessels.update(&vessel.imo, vessel).await?;
            Ok(Upsert::Updated)
        } else {
            self.vessels.create(vessel).await?;
            Ok(Upsert::Created)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_takes_precedence() {
        let sources = SourcesConfig {
            use_mock_data: true,
            mock_vessel_count: 3,
            ..Default::default()
        };
        let options = VesselFetchOptions {
            from_pdfs: true,
            pdf_directory: None,
        };
        assert_eq!(select_source(&sources, &options), VesselSource::Mock(3));
    }

    #[test]
    fn pdf_directory_defaults_to_config() {
        let sources = SourcesConfig::default();
        let options: VesselFetchOptions = serde_json::from_str(r#"{ "fromPDFs": true }"#).unwrap();
        assert_eq!(
            select_source(&sources, &options),
            VesselSource::Pdf(PathBuf::from("./documents"))
        );
        assert_eq!(
            select_source(&sources, &VesselFetchOptions::default()),
            VesselSource::Api
        );
    }
}
