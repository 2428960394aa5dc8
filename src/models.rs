//! Data models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::FreightDeskError;

pub mod ffa;
pub mod position_list;
pub mod rate;
pub mod route;
pub mod vessel;

pub use ffa::{FfaFilter, FfaMetadata, FfaPrice, NewFfaPrice, RouteHistoryEntry, RoutePrice};
pub use position_list::{
    CustomListRequest, ListMetadata, ListSource, NewPositionList, PortCandidate, PortSearch,
    PositionList, StatusChange, VesselEntry, VesselStatus,
};
pub use rate::{
    FreightRate, NewFreightRate, RateFilter, RateMetadata, RateSource, RateType, RateWithRoute,
    RouteSummary,
};
pub use route::{BenchmarkVessel, CanalPassage, FreightRoute, NewFreightRoute, RouteFilter};
pub use vessel::{Vessel, VesselFilter, VesselProfile};

/// International Maritime Organization (IMO) number
///
/// Seven digits, assigned to a hull for its whole operating life.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Imo(String);

impl TryFrom<&str> for Imo {
    type Error = FreightDeskError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("IMO")
            .map(str::trim)
            .unwrap_or(trimmed);
        if digits.len() != 7 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FreightDeskError::InvalidImo(value.to_string()));
        }
        Ok(Self(digits.to_string()))
    }
}

impl TryFrom<String> for Imo {
    type Error = FreightDeskError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl Imo {
    /// Get the raw IMO digits
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Imo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Imo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Imo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Imo::try_from(s.as_str()).map_err(serde::de::Error::custom)
    }
}

/// FFA contract month code, e.g. `MAR25`
///
/// Always stored uppercase, so lookups with `mar25` match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContractMonth(String);

impl ContractMonth {
    pub fn new(value: &str) -> Result<Self, FreightDeskError> {
        let normalized = value.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(FreightDeskError::ValidationError(
                "Contract month cannot be empty".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code has the `MMMYY` shape used in curve sheets
    pub fn is_month_code(value: &str) -> bool {
        let bytes = value.as_bytes();
        bytes.len() == 5
            && bytes[..3].iter().all(|b| b.is_ascii_uppercase())
            && bytes[3..].iter().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for ContractMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ContractMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ContractMonth::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Normalize a route code (`td3c` -> `TD3C`)
pub fn normalize_route_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Tanker size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VesselClass {
    #[serde(rename = "VLCC")]
    Vlcc,
    Suezmax,
    Aframax,
    #[serde(rename = "LR2")]
    Lr2,
    #[serde(rename = "LR1")]
    Lr1,
    #[serde(rename = "MR")]
    Mr,
    Handysize,
    #[serde(other)]
    Other,
}

impl VesselClass {
    pub const ALL: [VesselClass; 8] = [
        VesselClass::Vlcc,
        VesselClass::Suezmax,
        VesselClass::Aframax,
        VesselClass::Lr2,
        VesselClass::Lr1,
        VesselClass::Mr,
        VesselClass::Handysize,
        VesselClass::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VesselClass::Vlcc => "VLCC",
            VesselClass::Suezmax => "Suezmax",
            VesselClass::Aframax => "Aframax",
            VesselClass::Lr2 => "LR2",
            VesselClass::Lr1 => "LR1",
            VesselClass::Mr => "MR",
            VesselClass::Handysize => "Handysize",
            VesselClass::Other => "Other",
        }
    }
}

impl FromStr for VesselClass {
    type Err = FreightDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        VesselClass::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| FreightDeskError::InvalidInput(format!("Unknown vessel class '{}'", s)))
    }
}

impl fmt::Display for VesselClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limit/skip pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub skip: i64,
}

impl Page {
    pub fn new(limit: i64, skip: i64) -> Self {
        Self {
            limit: limit.max(0),
            skip: skip.max(0),
        }
    }

    pub fn first(limit: i64) -> Self {
        Self::new(limit, 0)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(50)
    }
}

/// Sort direction for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }

    /// `1` ascending, anything else descending
    pub fn from_order_param(order: i32) -> Self {
        if order == 1 {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}
