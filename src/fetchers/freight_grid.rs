//! Freight routes and their daily rates

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{FetchSummary, Upsert};
use crate::config::SourcesConfig;
use crate::database::{RateRepository, RouteRepository};
use crate::errors::FreightDeskError;
use crate::mock::{generate_mock_freight_rates, mock_freight_routes};
use crate::models::{NewFreightRate, RouteFilter};

/// Request options of a rate fetch
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateFetchOptions {
    pub use_mock_data: bool,
    pub days_of_history: Option<u32>,
    /// `email`, `excel` or `api`
    pub source_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteInitResult {
    pub success: bool,
    pub count: usize,
    pub message: String,
}

/// Days of mock history to generate, or the reason rates cannot be loaded
fn mock_history_days(
    sources: &SourcesConfig,
    options: &RateFetchOptions,
) -> Result<u32, FreightDeskError> {
    if sources.use_mock_data || options.use_mock_data {
        return Ok(options.days_of_history.unwrap_or(sources.days_of_history));
    }
    let reason = match options.source_type.as_deref() {
        Some("email") => "Email parsing",
        Some("excel") => "Excel file parsing",
        Some("api") => "API fetching",
        _ => {
            return Err(FreightDeskError::InvalidInput(
                "Invalid source type. Use mock data or specify a valid source type.".to_string(),
            ))
        }
    };
    Err(FreightDeskError::NotImplemented(format!(
        "{} not implemented yet",
        reason
    )))
}

#[derive(Clone)]
pub struct FreightGridFetcher {
    routes: RouteRepository,
    rates: RateRepository,
    sources: SourcesConfig,
}

impl FreightGridFetcher {
    pub fn new(routes: RouteRepository, rates: RateRepository, sources: SourcesConfig) -> Self {
        Self {
            routes,
            rates,
            sources,
        }
    }

    /// Seed the route table when it is empty
    pub async fn initialize_routes(&self) -> Result<RouteInitResult, FreightDeskError> {
        let existing = self.routes.count(&RouteFilter::default()).await?;
        if existing > 0 {
            info!("Found {} existing freight routes", existing);
            return Ok(RouteInitResult {
                success: true,
                count: existing as usize,
                message: format!("{} freight routes already exist", existing),
            });
        }

        if !self.sources.use_mock_data {
            return Err(FreightDeskError::ConfigurationError {
                message: "External route data source not configured. \
                    Set USE_MOCK_DATA=true to use mock data."
                    .to_string(),
            });
        }

        info!("Using mock freight route data");
        let created = self.routes.bulk_create(mock_freight_routes()).await?;
        Ok(RouteInitResult {
            success: true,
            count: created.len(),
            message: format!("{} freight routes created successfully", created.len()),
        })
    }

    /// Load rates for every active route and upsert them by (route, date)
    pub async fn fetch_and_save_rates(
        &self,
        options: &RateFetchOptions,
    ) -> Result<FetchSummary, FreightDeskError> {
        let routes = self.routes.active_routes().await?;
        if routes.is_empty() {
            return Err(FreightDeskError::InvalidInput(
                "No freight routes found. Initialize routes first.".to_string(),
            ));
        }
        info!("Found {} routes for rate data", routes.len());

        let days = mock_history_days(&self.sources, options)?;
        info!("Generating mock freight rate data for {} days", days);
        let rates = generate_mock_freight_rates(&routes, days)?;

        info!("Processing {} freight rate records", rates.len());
        let mut summary = FetchSummary::new(rates.len());
        for rate in &rates {
            let result = self.upsert(rate).await;
            summary.record(format!("rate for route {} on {}", rate.route_id, rate.date), result);
        }
        Ok(summary)
    }

    async fn upsert(&self, rate: &NewFreightRate) -> Result<Upsert, FreightDeskError> {
        match self
            .rates
            .find_for_route_on_date(rate.route_id, rate.date)
            .await?
        {
            Some(existing) => {
                self.rates.update(existing.id, rate).await?;
                Ok(Upsert::Updated)
            }
            None => {
                self.rates.create(rate).await?;
                Ok(Upsert::Created)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_can_ask_for_mock_data() {
        let options: RateFetchOptions =
            serde_json::from_str(r#"{ "useMockData": true, "daysOfHistory": 10 }"#).unwrap();
        assert_eq!(mock_history_days(&SourcesConfig::default(), &options).unwrap(), 10);
    }

    #[test]
    fn history_defaults_to_config() {
        let sources = SourcesConfig {
            use_mock_data: true,
            ..Default::default()
        };
        let days = mock_history_days(&sources, &RateFetchOptions::default()).unwrap();
        assert_eq!(days, 30);
    }

    #[test]
    fn real_sources_are_not_implemented() {
        let sources = SourcesConfig::default();
        for (source, message) in [
            ("email", "Not implemented: Email parsing not implemented yet"),
            ("excel", "Not implemented: Excel file parsing not implemented yet"),
            ("api", "Not implemented: API fetching not implemented yet"),
        ] {
            let options = RateFetchOptions {
                source_type: Some(source.to_string()),
                ..Default::default()
            };
            let err = mock_history_days(&sources, &options).unwrap_err();
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn unknown_source_is_invalid() {
        let err = mock_history_days(&SourcesConfig::default(), &RateFetchOptions::default())
            .unwrap_err();
        assert!(matches!(err, FreightDeskError::InvalidInput(_)));
    }
}
