//! JSON handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::query::{self, Params};
use super::{failed, ApiError, AppState};
use crate::fetchers::{FfaFetchOptions, RateFetchOptions, VesselFetchOptions};
use crate::models::{
    CustomListRequest, FfaFilter, Imo, NewFreightRate, NewFreightRoute, NewPositionList,
    PortSearch, RouteFilter, SortOrder, VesselFilter, VesselStatus,
};

const DEFAULT_LIMIT: i64 = 50;

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(value: &str, what: &str) -> ApiResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} ID '{}'", what, value)))
}

fn parse_imo(value: &str) -> ApiResult<Imo> {
    Imo::try_from(value).map_err(|e| ApiError::bad_request(e.to_string()))
}

// ---------------------------------------------------------------------------
// Vessels
// ---------------------------------------------------------------------------

pub(crate) async fn list_vessels(
    State(st): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<impl IntoResponse> {
    let filter = VesselFilter {
        vessel_type: query::text(&params, "vesselType").map(str::to_string),
        flag: query::text(&params, "flag").map(str::to_string),
        built_after: query::parsed(&params, "builtAfter")?,
        search: query::text(&params, "search").map(str::to_string),
    };
    let page = query::page(&params, DEFAULT_LIMIT)?;
    let vessels = st
        .db
        .vessels()
        .find_all(&filter, page)
        .await
        .map_err(failed("Failed to fetch vessels"))?;
    Ok(Json(vessels))
}

pub(crate) async fn get_vessel(
    State(st): State<Arc<AppState>>,
    Path(imo): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let imo = parse_imo(&imo)?;
    let vessel = st
        .db
        .vessels()
        .find_by_imo(&imo)
        .await
        .map_err(failed("Failed to fetch vessel"))?
        .ok_or_else(|| ApiError::not_found("Vessel not found"))?;
    Ok(Json(vessel))
}

pub(crate) async fn fetch_vessels(
    State(st): State<Arc<AppState>>,
    options: Option<Json<VesselFetchOptions>>,
) -> ApiResult<impl IntoResponse> {
    let options = options.map(|Json(options)| options).unwrap_or_default();
    let summary = st
        .fetchers
        .q88
        .fetch_and_save(&options)
        .await
        .map_err(failed("Failed to fetch vessel data"))?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// FFA
// ---------------------------------------------------------------------------

pub(crate) async fn list_ffa(
    State(st): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<impl IntoResponse> {
    let page = query::page(&params, DEFAULT_LIMIT)?;
    let order = query::parsed::<i32>(&params, "order")?
        .map(SortOrder::from_order_param)
        .unwrap_or_default();
    let prices = st
        .db
        .ffa()
        .find_all(&FfaFilter::default(), page, order)
        .await
        .map_err(failed("Failed to fetch FFA prices"))?;
    Ok(Json(prices))
}

pub(crate) async fn latest_ffa(State(st): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let prices = st
        .db
        .ffa()
        .latest_prices()
        .await
        .map_err(failed("Failed to fetch latest FFA prices"))?;
    Ok(Json(prices))
}

pub(crate) async fn ffa_by_month(
    State(st): State<Arc<AppState>>,
    Path(contract_month): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let prices = st
        .db
        .ffa()
        .find_by_contract_month(&contract_month)
        .await
        .map_err(failed("Failed to fetch FFA prices"))?;
    Ok(Json(prices))
}

pub(crate) async fn ffa_route_history(
    State(st): State<Arc<AppState>>,
    Path(route_code): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<impl IntoResponse> {
    let start = query::day_start(&params, "startDate")?;
    let end = query::day_end(&params, "endDate")?;
    let limit = query::parsed(&params, "limit")?;
    let history = st
        .db
        .ffa()
        .route_history(&route_code, start, end, limit)
        .await
        .map_err(failed("Failed to fetch route price history"))?;
    Ok(Json(history))
}

pub(crate) async fn fetch_ffa(
    State(st): State<Arc<AppState>>,
    options: Option<Json<FfaFetchOptions>>,
) -> ApiResult<impl IntoResponse> {
    let options = options.map(|Json(options)| options).unwrap_or_default();
    let summary = st
        .fetchers
        .ffa
        .fetch_and_save(&options)
        .await
        .map_err(failed("Failed to fetch FFA data"))?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// Freight routes
// ---------------------------------------------------------------------------

pub(crate) async fn list_routes(
    State(st): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<impl IntoResponse> {
    let filter = RouteFilter {
        vessel_type: query::parsed(&params, "vesselType")?,
        cargo_type: query::text(&params, "cargoType").map(str::to_string),
        search: query::text(&params, "search").map(str::to_string),
        active_only: query::parsed(&params, "activeOnly")?.unwrap_or(false),
    };
    let page = query::page(&params, DEFAULT_LIMIT)?;
    let routes = st
        .db
        .routes()
        .find_all(&filter, page)
        .await
        .map_err(failed("Failed to fetch freight routes"))?;
    Ok(Json(routes))
}

pub(crate) async fn get_route(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "route")?;
    let route = st
        .db
        .routes()
        .find_by_id(id)
        .await
        .map_err(failed("Failed to fetch freight route"))?
        .ok_or_else(|| ApiError::not_found("Freight route not found"))?;
    Ok(Json(route))
}

pub(crate) async fn get_route_by_code(
    State(st): State<Arc<AppState>>,
    Path(route_code): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let route = st
        .db
        .routes()
        .find_by_route_code(&route_code)
        .await
        .map_err(failed("Failed to fetch freight route"))?
        .ok_or_else(|| ApiError::not_found("Freight route not found"))?;
    Ok(Json(route))
}

pub(crate) async fn create_route(
    State(st): State<Arc<AppState>>,
    Json(route): Json<NewFreightRoute>,
) -> ApiResult<impl IntoResponse> {
    let route = st
        .db
        .routes()
        .create(route)
        .await
        .map_err(failed("Failed to create freight route"))?;
    Ok((StatusCode::CREATED, Json(route)))
}

pub(crate) async fn update_route(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(route): Json<NewFreightRoute>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "route")?;
    let route = st
        .db
        .routes()
        .update(id, route)
        .await
        .map_err(failed("Failed to update freight route"))?;
    Ok(Json(route))
}

// ---------------------------------------------------------------------------
// Freight rates
// ---------------------------------------------------------------------------

/// Latest rate of every route
pub(crate) async fn freight_grid(State(st): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let rates = st
        .db
        .rates()
        .latest_rates()
        .await
        .map_err(failed("Failed to fetch freight grid data"))?;
    Ok(Json(rates))
}

/// Rates of the route with the given ID
pub(crate) async fn route_rates(
    State(st): State<Arc<AppState>>,
    Path(route_id): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<impl IntoResponse> {
    let route_id = parse_id(&route_id, "route")?;
    let start = query::date(&params, "startDate")?;
    let end = query::date(&params, "endDate")?;
    let limit = query::parsed(&params, "limit")?;
    let rates = st
        .db
        .rates()
        .route_rates(route_id, start, end, limit)
        .await
        .map_err(failed("Failed to fetch freight rates"))?;
    Ok(Json(rates))
}

pub(crate) async fn rates_by_date(
    State(st): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let date = query::parse_date(&date)?;
    let rates = st
        .db
        .rates()
        .rates_by_date(date)
        .await
        .map_err(failed("Failed to fetch freight rates"))?;
    Ok(Json(rates))
}

/// A zero `change` is filled in from the previous rate of the route
pub(crate) async fn create_rate(
    State(st): State<Arc<AppState>>,
    Json(mut rate): Json<NewFreightRate>,
) -> ApiResult<impl IntoResponse> {
    let rates = st.db.rates();
    if rate.change == 0.0 {
        rate.change = rates
            .calculate_rate_change(rate.route_id, rate.rate, rate.rate_type)
            .await;
    }
    let rate = rates
        .create(&rate)
        .await
        .map_err(failed("Failed to create freight rate"))?;
    Ok((StatusCode::CREATED, Json(rate)))
}

pub(crate) async fn update_rate(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(rate): Json<NewFreightRate>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "rate")?;
    let rate = st
        .db
        .rates()
        .update(id, &rate)
        .await
        .map_err(failed("Failed to update freight rate"))?;
    Ok(Json(rate))
}

pub(crate) async fn init_routes(State(st): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let result = st
        .fetchers
        .freight_grid
        .initialize_routes()
        .await
        .map_err(failed("Failed to initialize freight routes"))?;
    Ok(Json(result))
}

pub(crate) async fn fetch_rates(
    State(st): State<Arc<AppState>>,
    options: Option<Json<RateFetchOptions>>,
) -> ApiResult<impl IntoResponse> {
    let options = options.map(|Json(options)| options).unwrap_or_default();
    let summary = st
        .fetchers
        .freight_grid
        .fetch_and_save_rates(&options)
        .await
        .map_err(failed("Failed to fetch freight rates"))?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// Position lists
// ---------------------------------------------------------------------------

pub(crate) async fn save_position_list(
    State(st): State<Arc<AppState>>,
    Json(list): Json<NewPositionList>,
) -> ApiResult<impl IntoResponse> {
    let list = st
        .db
        .position_lists()
        .save(list)
        .await
        .map_err(failed("Failed to save position list"))?;
    Ok((StatusCode::CREATED, Json(list)))
}

pub(crate) async fn get_position_list(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "position list")?;
    let list = st
        .db
        .position_lists()
        .find_by_id(id)
        .await
        .map_err(failed("Failed to fetch position list"))?
        .ok_or_else(|| ApiError::not_found("Position list not found"))?;
    Ok(Json(list))
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdate {
    imo: String,
    status: VesselStatus,
}

pub(crate) async fn update_vessel_status(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "position list")?;
    let updated = st
        .db
        .position_lists()
        .update_vessel_status(id, &update.imo, update.status)
        .await
        .map_err(failed("Failed to update vessel status"))?;
    Ok(Json(json!({ "updated": updated })))
}

pub(crate) async fn deduplicate_position_list(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "position list")?;
    let list = st
        .db
        .position_lists()
        .deduplicate(id)
        .await
        .map_err(failed("Failed to deduplicate position list"))?;
    Ok(Json(list))
}

pub(crate) async fn create_custom_list(
    State(st): State<Arc<AppState>>,
    Json(request): Json<CustomListRequest>,
) -> ApiResult<impl IntoResponse> {
    let list = st
        .db
        .position_lists()
        .create_custom_list(&request)
        .await
        .map_err(failed("Failed to create custom list"))?;
    Ok((StatusCode::CREATED, Json(list)))
}

pub(crate) async fn ships_from_port(
    State(st): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<impl IntoResponse> {
    let port = query::text(&params, "port")
        .ok_or_else(|| ApiError::bad_request("Port is required"))?;
    let search = PortSearch {
        port: port.to_string(),
        regions: query::list(&params, "regions")?,
        vessel_types: query::list(&params, "vesselTypes")?,
        date: query::date(&params, "date")?,
    };
    let candidates = st
        .db
        .position_lists()
        .find_ships_from_port(&search)
        .await
        .map_err(failed("Failed to find ships from port"))?;
    Ok(Json(candidates))
}
