//! Forward freight agreement (FFA) curve snapshots

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{normalize_route_code, ContractMonth};
use crate::errors::FreightDeskError;

/// Price of one route within a curve snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePrice {
    pub route_code: String,
    #[serde(default)]
    pub route_description: Option<String>,
    #[serde(default)]
    pub worldscale: Option<f64>,
    #[serde(default, rename = "dollarPerMT")]
    pub dollar_per_mt: Option<f64>,
    #[serde(default, rename = "centsPerBBL")]
    pub cents_per_bbl: Option<f64>,
    #[serde(default)]
    pub tce: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FfaMetadata {
    #[serde(default)]
    pub is_provisional: bool,
    #[serde(default)]
    pub is_weekend: bool,
    #[serde(default)]
    pub is_holiday: bool,
    #[serde(default)]
    pub has_unusual_activity: bool,
}

/// Snapshot as submitted for creation or replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFfaPrice {
    pub date_recorded: DateTime<Utc>,
    #[serde(default = "default_data_source")]
    pub data_source: String,
    pub contract_month: ContractMonth,
    #[serde(default)]
    pub routes: Vec<RoutePrice>,
    /// Spot WS by route code
    #[serde(default)]
    pub spot_prices: BTreeMap<String, f64>,
    /// Month-to-date by route code
    #[serde(default)]
    pub mtd_prices: BTreeMap<String, f64>,
    /// Year-to-date by route code
    #[serde(default)]
    pub ytd_prices: BTreeMap<String, f64>,
    #[serde(default)]
    pub market_comments: Option<String>,
    #[serde(default)]
    pub metadata: FfaMetadata,
}

fn default_data_source() -> String {
    "Manual Entry".to_string()
}

impl NewFfaPrice {
    /// Uppercase route codes, trim free text
    pub fn normalized(mut self) -> Self {
        self.data_source = self.data_source.trim().to_string();
        for route in &mut self.routes {
            route.route_code = normalize_route_code(&route.route_code);
        }
        self.market_comments = self
            .market_comments
            .map(|comments| comments.trim().to_string());
        self
    }

    pub fn validate(&self) -> Result<(), FreightDeskError> {
        for route in &self.routes {
            if route.route_code.trim().is_empty() {
                return Err(FreightDeskError::ValidationError(
                    "FFA route code is required".to_string(),
                ));
            }
            let prices = [
                route.worldscale,
                route.dollar_per_mt,
                route.cents_per_bbl,
                route.tce,
            ];
            if prices.iter().flatten().any(|price| *price < 0.0) {
                return Err(FreightDeskError::ValidationError(format!(
                    "FFA price for {} cannot be negative",
                    route.route_code
                )));
            }
        }
        let aggregates = self
            .spot_prices
            .iter()
            .chain(self.mtd_prices.iter())
            .chain(self.ytd_prices.iter());
        for (code, price) in aggregates {
            if *price < 0.0 {
                return Err(FreightDeskError::ValidationError(format!(
                    "FFA aggregate price for {} cannot be negative",
                    code
                )));
            }
        }
        Ok(())
    }

    /// Calendar day of the recording, used for same-day upserts
    pub fn recorded_day(&self) -> NaiveDate {
        self.date_recorded.date_naive()
    }
}

/// Stored snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FfaPrice {
    pub id: i64,
    pub date_recorded: DateTime<Utc>,
    pub data_source: String,
    pub contract_month: ContractMonth,
    pub routes: Vec<RoutePrice>,
    pub spot_prices: BTreeMap<String, f64>,
    pub mtd_prices: BTreeMap<String, f64>,
    pub ytd_prices: BTreeMap<String, f64>,
    pub market_comments: Option<String>,
    pub metadata: FfaMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FfaPrice {
    pub fn route(&self, route_code: &str) -> Option<&RoutePrice> {
        let code = normalize_route_code(route_code);
        self.routes.iter().find(|route| route.route_code == code)
    }
}

/// One point of a route's price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteHistoryEntry {
    pub id: i64,
    pub date_recorded: DateTime<Utc>,
    pub contract_month: ContractMonth,
    pub route: RoutePrice,
}

/// Listing filter for FFA snapshots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FfaFilter {
    pub contract_month: Option<ContractMonth>,
    pub route_code: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_curve_snapshot() {
        let price: NewFfaPrice = serde_json::from_str(
            r#"{
                "dateRecorded": "2025-03-04T10:00:00Z",
                "contractMonth": "mar25",
                "routes": [
                    { "routeCode": "td3c", "worldscale": 59.71, "dollarPerMT": 12.89, "centsPerBBL": 175.79 }
                ],
                "spotPrices": { "TD3C": 60.05 }
            }"#,
        )
        .unwrap();
        let price = price.normalized();
        assert_eq!(price.contract_month.as_str(), "MAR25");
        assert_eq!(price.routes[0].route_code, "TD3C");
        assert_eq!(price.routes[0].dollar_per_mt, Some(12.89));
        assert_eq!(price.data_source, "Manual Entry");
        assert!(price.validate().is_ok());
    }

    #[test]
    fn negative_prices_are_rejected() {
        let mut price: NewFfaPrice = serde_json::from_str(
            r#"{ "dateRecorded": "2025-03-04T10:00:00Z", "contractMonth": "APR25" }"#,
        )
        .unwrap();
        price.mtd_prices.insert("TD7".to_string(), -4.0);
        assert!(matches!(
            price.validate(),
            Err(FreightDeskError::ValidationError(_))
        ));
    }
}
