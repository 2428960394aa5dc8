// src/database/models.rs
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;

use super::types::decode_text;
use crate::errors::FreightDeskError;
use crate::models::{
    BenchmarkVessel, CanalPassage, ContractMonth, FfaMetadata, FfaPrice, FreightRate,
    FreightRoute, ListMetadata, NewPositionList, PositionList, RateMetadata, RateWithRoute,
    RouteHistoryEntry, RoutePrice, RouteSummary, Vessel, VesselClass, VesselEntry, VesselProfile,
};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RouteRow {
    id: i64,
    route_code: String,
    name: String,
    origin: String,
    destination: String,
    cargo_type: String,
    quantity: Option<f64>,
    distance: Option<f64>,
    canal_passages: Json<Vec<CanalPassage>>,
    benchmark_vessel: Option<Json<BenchmarkVessel>>,
    notes: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RouteRow> for FreightRoute {
    fn from(row: RouteRow) -> Self {
        Self {
            id: row.id,
            route_code: row.route_code,
            name: row.name,
            origin: row.origin,
            destination: row.destination,
            cargo_type: row.cargo_type,
            quantity: row.quantity,
            distance: row.distance,
            canal_passages: row.canal_passages.0,
            benchmark_vessel: row.benchmark_vessel.map(|vessel| vessel.0),
            notes: row.notes,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RateRow {
    id: i64,
    route_id: i64,
    date: NaiveDate,
    quantity: Option<f64>,
    rate: f64,
    rate_type: String,
    change: f64,
    tce_non_eco: Option<f64>,
    tce_eco: Option<f64>,
    tce_scrubber: Option<f64>,
    source: String,
    metadata: Json<RateMetadata>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RateRow> for FreightRate {
    type Error = FreightDeskError;

    fn try_from(row: RateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            route_id: row.route_id,
            date: row.date,
            quantity: row.quantity,
            rate: row.rate,
            rate_type: decode_text("rate_type", &row.rate_type)?,
            change: row.change,
            tce_non_eco: row.tce_non_eco,
            tce_eco: row.tce_eco,
            tce_scrubber: row.tce_scrubber,
            source: decode_text("source", &row.source)?,
            metadata: row.metadata.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Rate joined with its route's descriptive columns
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RateWithRouteRow {
    #[sqlx(flatten)]
    rate: RateRow,
    route_code: String,
    route_name: String,
    route_origin: String,
    route_destination: String,
}

impl TryFrom<RateWithRouteRow> for RateWithRoute {
    type Error = FreightDeskError;

    fn try_from(row: RateWithRouteRow) -> Result<Self, Self::Error> {
        let rate = FreightRate::try_from(row.rate)?;
        Ok(Self {
            route: RouteSummary {
                id: rate.route_id,
                route_code: row.route_code,
                name: row.route_name,
                origin: row.route_origin,
                destination: row.route_destination,
            },
            rate,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FfaRow {
    id: i64,
    date_recorded: DateTime<Utc>,
    data_source: String,
    contract_month: String,
    routes: Json<Vec<RoutePrice>>,
    spot_prices: Json<BTreeMap<String, f64>>,
    mtd_prices: Json<BTreeMap<String, f64>>,
    ytd_prices: Json<BTreeMap<String, f64>>,
    market_comments: Option<String>,
    metadata: Json<FfaMetadata>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FfaRow> for FfaPrice {
    type Error = FreightDeskError;

    fn try_from(row: FfaRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            date_recorded: row.date_recorded,
            data_source: row.data_source,
            contract_month: ContractMonth::new(&row.contract_month)?,
            routes: row.routes.0,
            spot_prices: row.spot_prices.0,
            mtd_prices: row.mtd_prices.0,
            ytd_prices: row.ytd_prices.0,
            market_comments: row.market_comments,
            metadata: row.metadata.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RouteHistoryRow {
    id: i64,
    date_recorded: DateTime<Utc>,
    contract_month: String,
    route: Json<RoutePrice>,
}

impl TryFrom<RouteHistoryRow> for RouteHistoryEntry {
    type Error = FreightDeskError;

    fn try_from(row: RouteHistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            date_recorded: row.date_recorded,
            contract_month: ContractMonth::new(&row.contract_month)?,
            route: row.route.0,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VesselRow {
    id: i64,
    profile: Json<VesselProfile>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VesselRow> for Vessel {
    fn from(row: VesselRow) -> Self {
        Self {
            id: row.id,
            profile: row.profile.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PositionListRow {
    id: i64,
    region: String,
    vessel_type: String,
    date: NaiveDate,
    available_count: i32,
    vessels: Json<Vec<VesselEntry>>,
    source: String,
    metadata: Json<ListMetadata>,
    is_custom: bool,
    list_name: Option<String>,
    custom_regions: Json<Vec<String>>,
    custom_vessel_types: Json<Vec<VesselClass>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PositionListRow> for PositionList {
    type Error = FreightDeskError;

    fn try_from(row: PositionListRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            list: NewPositionList {
                region: row.region,
                vessel_type: decode_text("vessel_type", &row.vessel_type)?,
                date: row.date,
                available_count: u32::try_from(row.available_count).map_err(|_| {
                    FreightDeskError::DecodeError(format!(
                        "available_count {}",
                        row.available_count
                    ))
                })?,
                vessels: row.vessels.0,
                source: decode_text("source", &row.source)?,
                metadata: row.metadata.0,
                is_custom: row.is_custom,
                list_name: row.list_name,
                custom_regions: row.custom_regions.0,
                custom_vessel_types: row.custom_vessel_types.0,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Convert a batch of rows, failing on the first undecodable one
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, FreightDeskError>
where
    T: TryFrom<R, Error = FreightDeskError>,
{
    rows.into_iter().map(T::try_from).collect()
}
