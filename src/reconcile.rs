//! Position list reconciliation
//!
//! Saving a list runs validate, derive and count as separate steps so each
//! can be called on its own. Merging lists into a custom list and ranking
//! ships against a port work on lists already loaded from the store.

use std::collections::HashSet;

use chrono::{Months, NaiveDate};
use tracing::warn;

use crate::errors::FreightDeskError;
use crate::models::{
    CustomListRequest, ListMetadata, ListSource, NewPositionList, PortCandidate, PortSearch,
    VesselClass,
};

/// Assumed service speed when ranking ships, knots
pub const SERVICE_SPEED_KNOTS: f64 = 14.0;

/// Distance used when no estimate is available, nautical miles
pub const FALLBACK_DISTANCE_NM: f64 = 1000.0;

const PORT_REGIONS: &[(&str, &str)] = &[
    ("ANTWERP", "ARA"),
    ("ROTTERDAM", "ARA"),
    ("FALMOUTH", "ARA"),
    ("AMSTERDAM", "ARA"),
    ("GIBRALTAR", "Mediterranean"),
    ("PIRAEUS", "Mediterranean"),
    ("ALEXANDRIA", "Mediterranean"),
    ("VALENCIA", "Mediterranean"),
    ("HOUSTON", "USGC"),
    ("NEW ORLEANS", "USGC"),
    ("TAMPA", "USGC"),
    ("SINGAPORE", "Singapore"),
    ("JURONG", "Singapore"),
    ("PULAU BUKOM", "Singapore"),
    ("FUJAIRAH", "Middle East"),
    ("JEBEL ALI", "Middle East"),
    ("RAS TANURA", "Middle East"),
];

/// Region a port belongs to, `"Other"` when unknown
pub fn region_of_port(port: &str) -> &'static str {
    let port = port.trim().to_uppercase();
    PORT_REGIONS
        .iter()
        .find(|(name, _)| *name == port)
        .map(|(_, region)| *region)
        .unwrap_or("Other")
}

/// Sea distance between a port and a port or region
pub trait DistanceEstimator: Send + Sync {
    fn distance(&self, from_port: &str, to: &str) -> Result<f64, FreightDeskError>;
}

/// Fixed distance table standing in for a routing service
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceTable;

const DISTANCES: &[(&str, &str, f64)] = &[
    ("ANTWERP", "ARA", 0.0),
    ("GIBRALTAR", "ARA", 500.0),
    ("ROTTERDAM", "ARA", 10.0),
    ("PIRAEUS", "ARA", 1500.0),
    ("ALEXANDRIA", "ARA", 2000.0),
    ("VALENCIA", "ARA", 800.0),
    ("HOUSTON", "ARA", 4000.0),
    ("NEW ORLEANS", "ARA", 4100.0),
    ("TAMPA", "ARA", 4200.0),
    ("SINGAPORE", "ARA", 8000.0),
    ("JURONG", "ARA", 8000.0),
    ("PULAU BUKOM", "ARA", 8000.0),
    ("FUJAIRAH", "ARA", 6000.0),
    ("JEBEL ALI", "ARA", 6000.0),
    ("RAS TANURA", "ARA", 6000.0),
];

impl DistanceEstimator for DistanceTable {
    fn distance(&self, from_port: &str, to: &str) -> Result<f64, FreightDeskError> {
        let from_port = from_port.trim().to_uppercase();
        let to = to.trim();
        let distance = DISTANCES
            .iter()
            .find(|(from, target, _)| *from == from_port && *target == to)
            .map(|(_, _, nm)| *nm)
            .unwrap_or(FALLBACK_DISTANCE_NM);
        Ok(distance)
    }
}

/// Distance estimate, or the fallback when the estimator fails
pub fn distance_or_fallback(estimator: &dyn DistanceEstimator, from_port: &str, to: &str) -> f64 {
    match estimator.distance(from_port, to) {
        Ok(distance) => distance,
        Err(e) => {
            warn!(
                "Failed to calculate distance from {} to {}: {}",
                from_port, to, e
            );
            FALLBACK_DISTANCE_NM
        }
    }
}

/// Check a list before it is derived and saved
pub fn validate_list(list: &NewPositionList) -> Result<(), FreightDeskError> {
    if list.region.trim().is_empty() {
        return Err(FreightDeskError::ValidationError(
            "Region is required".to_string(),
        ));
    }
    if list.is_custom
        && list
            .list_name
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
    {
        return Err(FreightDeskError::ValidationError(
            "List name is required for custom lists".to_string(),
        ));
    }

    let earliest = list
        .date
        .checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN);
    let latest = list
        .date
        .checked_add_months(Months::new(12))
        .unwrap_or(NaiveDate::MAX);

    for vessel in &list.vessels {
        if vessel.export_port.trim().is_empty() {
            return Err(FreightDeskError::ValidationError(format!(
                "Export port cannot be empty ({})",
                vessel.vessel_name
            )));
        }
        if vessel.dwt.is_some_and(|dwt| dwt < 0.0) {
            return Err(FreightDeskError::ValidationError(
                "DWT cannot be negative".to_string(),
            ));
        }
        if vessel.cbm.is_some_and(|cbm| cbm < 0.0) {
            return Err(FreightDeskError::ValidationError(
                "CBM cannot be negative".to_string(),
            ));
        }
        if vessel.open_date < earliest {
            return Err(FreightDeskError::ValidationError(
                "Open date cannot be more than 1 year in the past relative to the list date"
                    .to_string(),
            ));
        }
        if vessel.open_date > latest {
            return Err(FreightDeskError::ValidationError(
                "Open date cannot be more than 1 year in the future relative to the list date"
                    .to_string(),
            ));
        }
    }
    Ok(())
}

/// Fill region of export port and distance to the list region
pub fn derive_fields(list: &mut NewPositionList, estimator: &dyn DistanceEstimator) {
    let region = list.region.clone();
    for vessel in &mut list.vessels {
        vessel.distance_to_region = Some(distance_or_fallback(
            estimator,
            &vessel.export_port,
            &region,
        ));
        vessel.region_of_export_port = Some(region_of_port(&vessel.export_port).to_string());
    }
}

/// Validate, derive and count, in that order
pub fn prepare_for_save(
    list: &mut NewPositionList,
    estimator: &dyn DistanceEstimator,
) -> Result<(), FreightDeskError> {
    validate_list(list)?;
    derive_fields(list, estimator);
    list.recompute_available_count();
    Ok(())
}

/// Whether a stored list takes part in a custom merge
pub fn matches_custom_request(list: &NewPositionList, request: &CustomListRequest) -> bool {
    !list.is_custom
        && request.regions.iter().any(|region| *region == list.region)
        && request.vessel_types.contains(&list.vessel_type)
        && list.date >= request.start_date
        && list.date <= request.end_date
}

/// Build a custom list from the matching lists, first entry per IMO wins
pub fn merge_lists<'a, I>(
    request: &CustomListRequest,
    lists: I,
    today: NaiveDate,
) -> Result<NewPositionList, FreightDeskError>
where
    I: IntoIterator<Item = &'a NewPositionList>,
{
    if request.list_name.trim().is_empty() {
        return Err(FreightDeskError::ValidationError(
            "List name is required for custom lists".to_string(),
        ));
    }
    if request.regions.is_empty() || request.vessel_types.is_empty() {
        return Err(FreightDeskError::InvalidInput(
            "At least one region and one vessel type are required".to_string(),
        ));
    }
    if request.start_date > request.end_date {
        return Err(FreightDeskError::InvalidInput(
            "Start date must not be after end date".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let vessels = lists
        .into_iter()
        .filter(|list| matches_custom_request(list, request))
        .flat_map(|list| list.vessels.iter())
        .filter(|vessel| seen.insert(vessel.imo.clone()))
        .cloned()
        .collect();

    let vessel_type = match request.vessel_types.as_slice() {
        [single] => *single,
        _ => VesselClass::Other,
    };

    let mut list = NewPositionList {
        region: request.regions.join(", "),
        vessel_type,
        date: today,
        available_count: 0,
        vessels,
        source: ListSource::Manual,
        metadata: ListMetadata::default(),
        is_custom: true,
        list_name: Some(request.list_name.trim().to_string()),
        custom_regions: request.regions.clone(),
        custom_vessel_types: request.vessel_types.clone(),
    };
    list.recompute_available_count();
    Ok(list)
}

/// Whether a stored list is searched for tonnage on `date`
pub fn matches_port_search(list: &NewPositionList, search: &PortSearch, date: NaiveDate) -> bool {
    !list.is_custom
        && list.date <= date
        && search
            .regions
            .as_ref()
            .filter(|regions| !regions.is_empty())
            .map_or(true, |regions| regions.iter().any(|region| *region == list.region))
        && search
            .vessel_types
            .as_ref()
            .filter(|classes| !classes.is_empty())
            .map_or(true, |classes| classes.contains(&list.vessel_type))
}

/// Available ships that could sail to the searched port, nearest first
pub fn rank_ships_from_port<'a, I>(
    search: &PortSearch,
    lists: I,
    today: NaiveDate,
    estimator: &dyn DistanceEstimator,
) -> Vec<PortCandidate>
where
    I: IntoIterator<Item = &'a NewPositionList>,
{
    let date = search.date.unwrap_or(today);
    let mut lists: Vec<&NewPositionList> = lists
        .into_iter()
        .filter(|list| matches_port_search(list, search, date))
        .collect();
    lists.sort_by(|a, b| b.date.cmp(&a.date));

    let mut candidates = Vec::new();
    for list in lists {
        for vessel in &list.vessels {
            if vessel.is_duplicate || !vessel.is_open_on(date) {
                continue;
            }
            let distance = distance_or_fallback(estimator, &vessel.export_port, &search.port);
            candidates.push(PortCandidate {
                vessel_name: vessel.vessel_name.clone(),
                imo: vessel.imo.clone(),
                export_port: vessel.export_port.clone(),
                open_date: vessel.open_date,
                region: list.region.clone(),
                vessel_type: list.vessel_type,
                distance_to_port: distance,
                transit_time_hours: distance / SERVICE_SPEED_KNOTS,
            });
        }
    }

    // stable, so equal distances keep most-recent-list order
    candidates.sort_by(|a, b| a.distance_to_port.total_cmp(&b.distance_to_port));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{VesselEntry, VesselStatus};

    struct Unreachable;

    impl DistanceEstimator for Unreachable {
        fn distance(&self, _from: &str, _to: &str) -> Result<f64, FreightDeskError> {
            Err(FreightDeskError::NotImplemented(
                "distance service".to_string(),
            ))
        }
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn entry(imo: &str, port: &str, status: VesselStatus, open_date: NaiveDate) -> VesselEntry {
        VesselEntry {
            vessel_name: format!("MT {}", imo),
            imo: imo.to_string(),
            build_year: None,
            dwt: Some(110000.0),
            cbm: None,
            export_port: port.to_string(),
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

    fn list(
        region: &str,
        class: VesselClass,
        date: NaiveDate,
        vessels: Vec<VesselEntry>,
    ) -> NewPositionList {
        NewPositionList {
            region: region.to_string(),
            vessel_type: class,
            date,
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

    #[test]
    fn port_regions() {
        assert_eq!(region_of_port("ROTTERDAM"), "ARA");
        assert_eq!(region_of_port(" jebel ali "), "Middle East");
        assert_eq!(region_of_port("SANTOS"), "Other");
    }

    #[test]
    fn distance_table_lookup() {
        let table = DistanceTable;
        assert_eq!(table.distance("GIBRALTAR", "ARA").unwrap(), 500.0);
        assert_eq!(table.distance("ANTWERP", "ARA").unwrap(), 0.0);
        assert_eq!(table.distance("SANTOS", "ARA").unwrap(), 1000.0);
        assert_eq!(distance_or_fallback(&Unreachable, "HOUSTON", "ARA"), 1000.0);
    }

    #[test]
    fn save_pipeline_derives_fields() {
        let mut l = list(
            "ARA",
            VesselClass::Mr,
            day(3, 4),
            vec![
                entry("1", "GIBRALTAR", VesselStatus::Available, day(3, 2)),
                entry("2", "HOUSTON", VesselStatus::Available, day(3, 20)),
            ],
        );
        prepare_for_save(&mut l, &DistanceTable).unwrap();

        assert_eq!(l.vessels[0].distance_to_region, Some(500.0));
        assert_eq!(
            l.vessels[0].region_of_export_port.as_deref(),
            Some("Mediterranean")
        );
        assert_eq!(l.vessels[1].distance_to_region, Some(4000.0));
        assert_eq!(l.available_count, 1);
    }

    #[test]
    fn estimator_failure_falls_back() {
        let mut l = list(
            "ARA",
            VesselClass::Mr,
            day(3, 4),
            vec![entry("1", "ROTTERDAM", VesselStatus::Available, day(3, 2))],
        );
        prepare_for_save(&mut l, &Unreachable).unwrap();
        assert_eq!(l.vessels[0].distance_to_region, Some(1000.0));
    }

    #[test]
    fn open_date_window() {
        let mut l = list(
            "ARA",
            VesselClass::Mr,
            day(3, 4),
            vec![entry(
                "1",
                "ROTTERDAM",
                VesselStatus::Available,
                NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            )],
        );
        assert!(validate_list(&l).is_err());

        l.vessels[0].open_date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert!(validate_list(&l).is_ok());

        l.vessels[0].open_date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert!(validate_list(&l).is_err());
    }

    #[test]
    fn rejects_empty_port_and_negative_size() {
        let mut l = list(
            "ARA",
            VesselClass::Mr,
            day(3, 4),
            vec![entry("1", "  ", VesselStatus::Available, day(3, 2))],
        );
        assert!(validate_list(&l).is_err());

        l.vessels[0].export_port = "ROTTERDAM".to_string();
        l.vessels[0].cbm = Some(-1.0);
        assert!(validate_list(&l).is_err());
    }

    #[test]
    fn custom_list_needs_name() {
        let mut l = list("ARA", VesselClass::Mr, day(3, 4), vec![]);
        l.is_custom = true;
        assert!(validate_list(&l).is_err());
        l.list_name = Some("North Sea MRs".to_string());
        assert!(validate_list(&l).is_ok());
    }

    #[test]
    fn duplicate_fixed_vessel_counts_once() {
        let today = day(3, 4);
        let yesterday = day(3, 3);
        let mut l = list(
            "ARA",
            VesselClass::Mr,
            today,
            vec![
                entry("A", "ROTTERDAM", VesselStatus::Available, yesterday),
                entry("A", "ROTTERDAM", VesselStatus::FullyFixed, today),
            ],
        );
        l.deduplicate_vessels();
        prepare_for_save(&mut l, &DistanceTable).unwrap();

        assert_eq!(l.vessels.len(), 1);
        assert_eq!(l.available_count, 1);
    }

    #[test]
    fn merges_lists_first_seen() {
        let lists = vec![
            list(
                "ARA",
                VesselClass::Mr,
                day(3, 3),
                vec![
                    entry("1", "ROTTERDAM", VesselStatus::Available, day(3, 1)),
                    entry("2", "ANTWERP", VesselStatus::OnSubs, day(3, 1)),
                ],
            ),
            list(
                "Mediterranean",
                VesselClass::Mr,
                day(3, 4),
                vec![
                    entry("1", "PIRAEUS", VesselStatus::FullyFixed, day(3, 2)),
                    entry("3", "VALENCIA", VesselStatus::Available, day(3, 2)),
                ],
            ),
            list(
                "USGC",
                VesselClass::Mr,
                day(3, 4),
                vec![entry("4", "HOUSTON", VesselStatus::Available, day(3, 2))],
            ),
            list(
                "ARA",
                VesselClass::Lr2,
                day(3, 4),
                vec![entry("5", "ROTTERDAM", VesselStatus::Available, day(3, 2))],
            ),
        ];
        let request = CustomListRequest {
            list_name: "Europe MR".to_string(),
            regions: vec!["ARA".to_string(), "Mediterranean".to_string()],
            vessel_types: vec![VesselClass::Mr],
            start_date: day(3, 1),
            end_date: day(3, 31),
        };

        let merged = merge_lists(&request, &lists, day(3, 5)).unwrap();
        let imos: Vec<&str> = merged.vessels.iter().map(|v| v.imo.as_str()).collect();
        assert_eq!(imos, vec!["1", "2", "3"]);
        assert_eq!(merged.vessels[0].export_port, "ROTTERDAM");
        assert_eq!(merged.region, "ARA, Mediterranean");
        assert_eq!(merged.vessel_type, VesselClass::Mr);
        assert!(merged.is_custom);
        assert_eq!(merged.available_count, 2);
    }

    #[test]
    fn merge_without_name_fails() {
        let request = CustomListRequest {
            list_name: " ".to_string(),
            regions: vec!["ARA".to_string()],
            vessel_types: vec![VesselClass::Mr],
            start_date: day(3, 1),
            end_date: day(3, 31),
        };
        let lists: Vec<NewPositionList> = vec![];
        assert!(merge_lists(&request, &lists, day(3, 5)).is_err());
    }

    #[test]
    fn ranks_ships_by_distance() {
        let mut duplicate = entry("9", "ANTWERP", VesselStatus::Available, day(3, 1));
        duplicate.is_duplicate = true;
        let mut custom = list(
            "ARA",
            VesselClass::Mr,
            day(3, 4),
            vec![entry("7", "ANTWERP", VesselStatus::Available, day(3, 1))],
        );
        custom.is_custom = true;

        let lists = vec![
            list(
                "ARA",
                VesselClass::Mr,
                day(3, 3),
                vec![
                    entry("1", "GIBRALTAR", VesselStatus::Available, day(3, 1)),
                    entry("2", "ROTTERDAM", VesselStatus::Available, day(3, 2)),
                    entry("3", "ANTWERP", VesselStatus::OnSubs, day(3, 1)),
                    entry("4", "ANTWERP", VesselStatus::Available, day(3, 20)),
                    duplicate,
                ],
            ),
            list(
                "ARA",
                VesselClass::Mr,
                day(3, 10),
                vec![entry("5", "ANTWERP", VesselStatus::Available, day(3, 1))],
            ),
            custom,
        ];
        let search = PortSearch {
            port: "ARA".to_string(),
            regions: Some(vec!["ARA".to_string()]),
            vessel_types: None,
            date: Some(day(3, 4)),
        };

        let ranked = rank_ships_from_port(&search, &lists, day(3, 30), &DistanceTable);
        let imos: Vec<&str> = ranked.iter().map(|c| c.imo.as_str()).collect();
        assert_eq!(imos, vec!["2", "1"]);
        assert_eq!(ranked[0].distance_to_port, 10.0);
        assert!((ranked[1].transit_time_hours - 500.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn empty_filter_lists_match_everything() {
        let lists = vec![list(
            "ARA",
            VesselClass::Mr,
            day(3, 3),
            vec![entry("1", "GIBRALTAR", VesselStatus::Available, day(3, 1))],
        )];
        let search = PortSearch {
            port: "ARA".to_string(),
            regions: Some(Vec::new()),
            vessel_types: Some(Vec::new()),
            date: Some(day(3, 4)),
        };
        assert!(matches_port_search(&lists[0], &search, day(3, 4)));
        assert_eq!(
            rank_ships_from_port(&search, &lists, day(3, 4), &DistanceTable).len(),
            1
        );
    }

    #[test]
    fn port_search_defaults_to_today() {
        let lists = vec![list(
            "ARA",
            VesselClass::Mr,
            day(3, 3),
            vec![entry("1", "GIBRALTAR", VesselStatus::Available, day(3, 1))],
        )];
        let search = PortSearch {
            port: "ARA".to_string(),
            ..PortSearch::default()
        };
        assert_eq!(
            rank_ships_from_port(&search, &lists, day(3, 4), &DistanceTable).len(),
            1
        );
        assert!(rank_ships_from_port(&search, &lists, day(3, 2), &DistanceTable).is_empty());
    }
}
