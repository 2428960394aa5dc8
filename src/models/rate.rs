//! Freight rates: dated observations for one route

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::FreightDeskError;

/// Unit of a rate value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateType {
    /// Percentage of the published flat rate
    Worldscale,
    /// Lump sum in USD
    Usd,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Worldscale => "worldscale",
            RateType::Usd => "usd",
        }
    }
}

impl FromStr for RateType {
    type Err = FreightDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worldscale" => Ok(RateType::Worldscale),
            "usd" => Ok(RateType::Usd),
            other => Err(FreightDeskError::DecodeError(format!(
                "unknown rate type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RateSource {
    #[default]
    Manual,
    Email,
    IceMessenger,
    FfaCurve,
    Other,
}

impl RateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSource::Manual => "manual",
            RateSource::Email => "email",
            RateSource::IceMessenger => "iceMessenger",
            RateSource::FfaCurve => "ffaCurve",
            RateSource::Other => "other",
        }
    }
}

impl FromStr for RateSource {
    type Err = FreightDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(RateSource::Manual),
            "email" => Ok(RateSource::Email),
            "iceMessenger" => Ok(RateSource::IceMessenger),
            "ffaCurve" => Ok(RateSource::FfaCurve),
            "other" => Ok(RateSource::Other),
            other => Err(FreightDeskError::DecodeError(format!(
                "unknown rate source '{}'",
                other
            ))),
        }
    }
}

/// Producer details attached to a rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RateMetadata {
    pub is_preliminary: Option<bool>,
    pub publisher: Option<String>,
    /// Publisher confidence, 0-10
    pub confidence: Option<f64>,
}

/// Rate as submitted for creation or replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFreightRate {
    pub route_id: i64,
    pub date: NaiveDate,
    /// Cargo quantity, e.g. 270000 MT
    #[serde(default)]
    pub quantity: Option<f64>,
    /// WS points or USD lump sum, depending on `rate_type`
    pub rate: f64,
    pub rate_type: RateType,
    /// Change from the previous observation, same unit as `rate`
    #[serde(default)]
    pub change: f64,
    /// USD/day
    #[serde(default)]
    pub tce_non_eco: Option<f64>,
    #[serde(default)]
    pub tce_eco: Option<f64>,
    #[serde(default)]
    pub tce_scrubber: Option<f64>,
    #[serde(default)]
    pub source: RateSource,
    #[serde(default)]
    pub metadata: RateMetadata,
}

impl NewFreightRate {
    pub fn validate(&self) -> Result<(), FreightDeskError> {
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(FreightDeskError::ValidationError(
                "Rate must be a non-negative number".to_string(),
            ));
        }
        if self.quantity.is_some_and(|q| q < 0.0) {
            return Err(FreightDeskError::ValidationError(
                "Rate quantity cannot be negative".to_string(),
            ));
        }
        let tces = [self.tce_non_eco, self.tce_eco, self.tce_scrubber];
        if tces.iter().flatten().any(|tce| *tce < 0.0) {
            return Err(FreightDeskError::ValidationError(
                "TCE values cannot be negative".to_string(),
            ));
        }
        if self
            .metadata
            .confidence
            .is_some_and(|c| !(0.0..=10.0).contains(&c))
        {
            return Err(FreightDeskError::ValidationError(
                "Confidence must lie between 0 and 10".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stored rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreightRate {
    pub id: i64,
    pub route_id: i64,
    pub date: NaiveDate,
    pub quantity: Option<f64>,
    pub rate: f64,
    pub rate_type: RateType,
    pub change: f64,
    pub tce_non_eco: Option<f64>,
    pub tce_eco: Option<f64>,
    pub tce_scrubber: Option<f64>,
    pub source: RateSource,
    pub metadata: RateMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Route fields shown next to a rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub id: i64,
    pub route_code: String,
    pub name: String,
    pub origin: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateWithRoute {
    #[serde(flatten)]
    pub rate: FreightRate,
    pub route: RouteSummary,
}

/// Listing filter for rates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateFilter {
    pub route_id: Option<i64>,
    pub route_code: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
