//! Vessel position lists: broker snapshots of tonnage open in a region

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::VesselClass;
use crate::errors::FreightDeskError;

/// Commercial status of a listed vessel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VesselStatus {
    #[default]
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "on Subs")]
    OnSubs,
    #[serde(rename = "fully fixed")]
    FullyFixed,
}

impl VesselStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VesselStatus::Available => "available",
            VesselStatus::OnSubs => "on Subs",
            VesselStatus::FullyFixed => "fully fixed",
        }
    }
}

impl FromStr for VesselStatus {
    type Err = FreightDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(VesselStatus::Available),
            "on Subs" => Ok(VesselStatus::OnSubs),
            "fully fixed" => Ok(VesselStatus::FullyFixed),
            other => Err(FreightDeskError::InvalidInput(format!(
                "Unknown vessel status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for VesselStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: VesselStatus,
    pub timestamp: DateTime<Utc>,
}

/// One vessel line of a position list
///
/// `imo` is kept as the broker wrote it; lists are matched on the raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselEntry {
    pub vessel_name: String,
    pub imo: String,
    #[serde(default)]
    pub build_year: Option<i32>,
    #[serde(default)]
    pub dwt: Option<f64>,
    #[serde(default)]
    pub cbm: Option<f64>,
    pub export_port: String,
    pub open_date: NaiveDate,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub ice_class: Option<String>,
    #[serde(default)]
    pub cargo_preferences: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub status: VesselStatus,
    #[serde(default)]
    pub is_duplicate: bool,
    /// Nautical miles from the export port to the list region
    #[serde(default)]
    pub distance_to_region: Option<f64>,
    #[serde(default)]
    pub region_of_export_port: Option<String>,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
}

impl VesselEntry {
    /// Open for business on `date`
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.status == VesselStatus::Available && self.open_date <= date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListSource {
    Email,
    IceMessenger,
    Api,
    Manual,
}

impl ListSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListSource::Email => "email",
            ListSource::IceMessenger => "iceMessenger",
            ListSource::Api => "api",
            ListSource::Manual => "manual",
        }
    }
}

impl FromStr for ListSource {
    type Err = FreightDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(ListSource::Email),
            "iceMessenger" => Ok(ListSource::IceMessenger),
            "api" => Ok(ListSource::Api),
            "manual" => Ok(ListSource::Manual),
            other => Err(FreightDeskError::DecodeError(format!(
                "unknown list source '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListMetadata {
    pub email_id: Option<String>,
    pub scrape_timestamp: Option<DateTime<Utc>>,
    pub broker: Option<String>,
}

/// Position list as submitted for saving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPositionList {
    pub region: String,
    pub vessel_type: VesselClass,
    pub date: NaiveDate,
    /// Derived on every save
    #[serde(default)]
    pub available_count: u32,
    #[serde(default)]
    pub vessels: Vec<VesselEntry>,
    pub source: ListSource,
    #[serde(default)]
    pub metadata: ListMetadata,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub list_name: Option<String>,
    #[serde(default)]
    pub custom_regions: Vec<String>,
    #[serde(default)]
    pub custom_vessel_types: Vec<VesselClass>,
}

impl NewPositionList {
    /// Number of non-duplicate entries available and open on the list date
    pub fn recompute_available_count(&mut self) -> u32 {
        let date = self.date;
        self.available_count = self
            .vessels
            .iter()
            .filter(|vessel| !vessel.is_duplicate && vessel.is_open_on(date))
            .count() as u32;
        self.available_count
    }

    /// Set the status of the vessel with `imo`
    ///
    /// Returns false when the vessel is missing or already has `status`.
    pub fn update_vessel_status(
        &mut self,
        imo: &str,
        status: VesselStatus,
        at: DateTime<Utc>,
    ) -> bool {
        match self.vessels.iter_mut().find(|vessel| vessel.imo == imo) {
            Some(vessel) if vessel.status != status => {
                vessel.status = status;
                vessel.status_history.push(StatusChange {
                    status,
                    timestamp: at,
                });
                true
            }
            _ => false,
        }
    }

    /// Flag every repeat IMO as duplicate, keeping the entries
    pub fn mark_duplicates(&mut self) {
        let mut seen = HashSet::new();
        for vessel in &mut self.vessels {
            if !seen.insert(vessel.imo.clone()) {
                vessel.is_duplicate = true;
            }
        }
    }

    /// Drop every repeat IMO, first occurrence wins
    pub fn deduplicate_vessels(&mut self) {
        let mut seen = HashSet::new();
        self.vessels.retain(|vessel| seen.insert(vessel.imo.clone()));
    }
}

/// Stored position list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionList {
    pub id: i64,
    #[serde(flatten)]
    pub list: NewPositionList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for merging several lists into a named custom list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomListRequest {
    pub list_name: String,
    pub regions: Vec<String>,
    pub vessel_types: Vec<VesselClass>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Search for tonnage that can reach `port`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortSearch {
    pub port: String,
    pub regions: Option<Vec<String>>,
    pub vessel_types: Option<Vec<VesselClass>>,
    pub date: Option<NaiveDate>,
}

/// A vessel that could reach the searched port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortCandidate {
    pub vessel_name: String,
    pub imo: String,
    pub export_port: String,
    pub open_date: NaiveDate,
    pub region: String,
    pub vessel_type: VesselClass,
    /// Nautical miles
    pub distance_to_port: f64,
    pub transit_time_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(imo: &str, status: VesselStatus, open_date: NaiveDate) -> VesselEntry {
        VesselEntry {
            vessel_name: format!("VESSEL {}", imo),
            imo: imo.to_string(),
            build_year: Some(2015),
            dwt: Some(105000.0),
            cbm: Some(120000.0),
            export_port: "ROTTERDAM".to_string(),
            open_date,
            owner: None,
            ice_class: None,
            cargo_preferences: None,
            comments: None,
            status,
            is_duplicate: false,
            distance_to_region: None,
            region_of_export_port: None,
            status_history: vec![],
        }
    }

    fn list(vessels: Vec<VesselEntry>) -> NewPositionList {
        NewPositionList {
            region: "ARA".to_string(),
            vessel_type: VesselClass::Aframax,
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            available_count: 0,
            vessels,
            source: ListSource::Email,
            metadata: ListMetadata::default(),
            is_custom: false,
            list_name: None,
            custom_regions: vec![],
            custom_vessel_types: vec![],
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn available_count_is_idempotent() {
        let mut l = list(vec![
            entry("1", VesselStatus::Available, day(3)),
            entry("2", VesselStatus::Available, day(10)),
            entry("3", VesselStatus::OnSubs, day(1)),
        ]);
        assert_eq!(l.recompute_available_count(), 1);
        assert_eq!(l.recompute_available_count(), 1);
        assert_eq!(l.available_count, 1);
    }

    #[test]
    fn status_update_records_history_once() {
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap();
        let mut l = list(vec![entry("9321483", VesselStatus::Available, day(3))]);

        assert!(!l.update_vessel_status("9321483", VesselStatus::Available, at));
        assert!(l.vessels[0].status_history.is_empty());

        assert!(l.update_vessel_status("9321483", VesselStatus::OnSubs, at));
        assert_eq!(l.vessels[0].status, VesselStatus::OnSubs);
        assert_eq!(
            l.vessels[0].status_history,
            vec![StatusChange {
                status: VesselStatus::OnSubs,
                timestamp: at
            }]
        );

        assert!(!l.update_vessel_status("0000000", VesselStatus::FullyFixed, at));
    }

    #[test]
    fn dedup_keeps_first_seen() {
        let mut l = list(vec![
            entry("A", VesselStatus::Available, day(3)),
            entry("B", VesselStatus::Available, day(3)),
            entry("A", VesselStatus::FullyFixed, day(4)),
        ]);
        let mut marked = l.clone();

        marked.mark_duplicates();
        assert_eq!(marked.vessels.len(), 3);
        assert!(!marked.vessels[0].is_duplicate);
        assert!(marked.vessels[2].is_duplicate);

        l.deduplicate_vessels();
        assert_eq!(l.vessels.len(), 2);
        assert_eq!(l.vessels[0].status, VesselStatus::Available);
        assert_eq!(l.vessels[1].imo, "B");
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&VesselStatus::OnSubs).unwrap(),
            r#""on Subs""#
        );
        assert_eq!(
            "fully fixed".parse::<VesselStatus>().unwrap(),
            VesselStatus::FullyFixed
        );
        assert!("fixed".parse::<VesselStatus>().is_err());
    }
}
