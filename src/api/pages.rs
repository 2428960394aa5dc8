//! Server-rendered HTML pages
//!
//! Pages share one layout and render plain tables. Filter parameters follow
//! the JSON API: `all` or empty means no filter, `limit`/`skip` paginate.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use super::query::{self, Params};
use super::{ApiError, AppState};
use crate::errors::FreightDeskError;
use crate::models::{
    ContractMonth, FfaFilter, FfaPrice, FreightRate, Imo, Page, RateFilter, RateWithRoute,
    RouteFilter, SortOrder, Vessel, VesselFilter,
};

const PAGE_SIZE: i64 = 20;
const GRID_ROUTES: i64 = 500;

const NAV: [(&str, &str, &str); 6] = [
    ("dashboard", "/", "Dashboard"),
    ("freight-grid", "/freight-grid", "Freight Grid"),
    ("routes", "/routes", "Routes"),
    ("rates", "/rates", "Rates"),
    ("vessels", "/vessels", "Vessels"),
    ("ffa", "/ffa", "FFA"),
];

/// Error page with a status
#[derive(Debug)]
pub(crate) struct PageError {
    status: StatusCode,
    message: String,
}

impl PageError {
    fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.to_string(),
        }
    }
}

impl From<ApiError> for PageError {
    fn from(e: ApiError) -> Self {
        Self {
            status: e.status,
            message: e.message,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let body = format!(
            "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"/\">Back to dashboard</a></p>",
            self.status.as_u16(),
            escape(&self.message)
        );
        (self.status, Html(layout("Error", "", &body))).into_response()
    }
}

/// `map_err` adapter for page handlers; the cause is only logged
fn failed(context: &'static str) -> impl FnOnce(FreightDeskError) -> PageError {
    move |e| {
        error!("{}: {}", context, e);
        PageError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: context.to_string(),
        }
    }
}

type PageResult = Result<Html<String>, PageError>;

pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, current: &str, body: &str) -> String {
    let nav: String = NAV
        .iter()
        .map(|(key, href, label)| {
            let class = if *key == current { " class=\"active\"" } else { "" };
            format!("<a href=\"{}\"{}>{}</a>", href, class, label)
        })
        .collect::<Vec<_>>()
        .join(" | ");
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} - Freight Desk</title>\n</head>\n<body>\n<nav>{}</nav>\n\
         <main>\n{}\n</main>\n</body>\n</html>\n",
        escape(title),
        nav,
        body
    )
}

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "<p>No data found.</p>".to_string();
    }
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect();
    let body: String = rows
        .into_iter()
        .map(|cells| {
            let cells: String = cells.into_iter().map(|c| format!("<td>{}</td>", c)).collect();
            format!("<tr>{}</tr>\n", cells)
        })
        .collect();
    format!(
        "<table>\n<thead><tr>{}</tr></thead>\n<tbody>\n{}</tbody>\n</table>",
        head, body
    )
}

fn num(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn text(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_else(|| "-".to_string())
}

/// Query string carrying the active filters, without `skip`
fn pagination_query(params: &Params, keys: &[&str], limit: i64) -> String {
    let mut pairs: Vec<String> = keys
        .iter()
        .filter_map(|key| query::text(params, key).map(|value| (key, value)))
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();
    if limit != PAGE_SIZE {
        pairs.push(format!("limit={}", limit));
    }
    pairs.join("&")
}

/// Previous/next links around "Showing x-y of n"
pub(crate) fn pagination(path: &str, query: &str, page: Page, total: i64) -> String {
    if total == 0 {
        return String::new();
    }
    let link = |skip: i64, label: &str| {
        let sep = if query.is_empty() { "" } else { "&" };
        let href = format!("{}?{}{}skip={}", path, query, sep, skip);
        format!("<a href=\"{}\">{}</a>", escape(&href), label)
    };
    let first = page.skip.min(total) + 1;
    let last = (page.skip + page.limit).min(total);
    let mut parts = Vec::new();
    if page.skip > 0 {
        parts.push(link((page.skip - page.limit).max(0), "Previous"));
    }
    parts.push(format!("Showing {}-{} of {}", first.min(last), last, total));
    if page.skip + page.limit < total {
        parts.push(link(page.skip + page.limit, "Next"));
    }
    format!("<p class=\"pagination\">{}</p>", parts.join(" "))
}

fn rate_row(rate: &RateWithRoute) -> Vec<String> {
    vec![
        format!(
            "<a href=\"/routes/{}\">{}</a>",
            urlencoding::encode(&rate.route.route_code),
            escape(&rate.route.route_code)
        ),
        escape(&rate.route.name),
        rate.rate.date.to_string(),
        format!("{:.2}", rate.rate.rate),
        rate.rate.rate_type.to_string(),
        format!("{:+.2}", rate.rate.change),
    ]
}

fn history_row(rate: &FreightRate) -> Vec<String> {
    vec![
        rate.date.to_string(),
        format!("{:.2}", rate.rate),
        rate.rate_type.to_string(),
        format!("{:+.2}", rate.change),
        num(rate.tce_non_eco),
        num(rate.tce_eco),
        num(rate.tce_scrubber),
        rate.source.as_str().to_string(),
    ]
}

fn ffa_row(price: &FfaPrice) -> Vec<String> {
    let routes = price
        .routes
        .iter()
        .map(|route| format!("{} {}", escape(&route.route_code), num(route.worldscale)))
        .collect::<Vec<_>>()
        .join(", ");
    vec![
        price.date_recorded.format("%Y-%m-%d %H:%M").to_string(),
        escape(price.contract_month.as_str()),
        escape(&price.data_source),
        routes,
    ]
}

fn vessel_row(vessel: &Vessel) -> Vec<String> {
    let profile = &vessel.profile;
    vec![
        format!(
            "<a href=\"/vessels/{}\">{}</a>",
            profile.imo,
            escape(&profile.name)
        ),
        profile.imo.to_string(),
        text(profile.vessel_type.as_deref()),
        text(profile.flag.as_deref()),
        profile
            .date_delivered
            .map(|d| d.format("%Y").to_string())
            .unwrap_or_else(|| "-".to_string()),
        num(profile.summer_deadweight()),
        num(profile.cargo_capacity()),
    ]
}

fn options(name: &str, values: &[String], selected: Option<&str>) -> String {
    let mut html = format!(
        "<select name=\"{}\"><option value=\"all\">All</option>",
        name
    );
    for value in values {
        let mark = if Some(value.as_str()) == selected {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(value),
            mark
        ));
    }
    html.push_str("</select>");
    html
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

pub(crate) async fn dashboard(State(st): State<Arc<AppState>>) -> PageResult {
    let fail = || failed("Error loading dashboard");
    let vessel_count = st
        .db
        .vessels()
        .count(&VesselFilter::default())
        .await
        .map_err(fail())?;
    let route_count = st
        .db
        .routes()
        .count(&RouteFilter::default())
        .await
        .map_err(fail())?;
    let rate_count = st
        .db
        .rates()
        .count(&RateFilter::default())
        .await
        .map_err(fail())?;
    let ffa_count = st
        .db
        .ffa()
        .count(&FfaFilter::default())
        .await
        .map_err(fail())?;
    let latest_rates = st.db.rates().latest_rates().await.map_err(fail())?;
    let latest_ffa = st.db.ffa().latest_prices().await.map_err(fail())?;

    let stats = table(
        &["Vessels", "Routes", "Rates", "FFA snapshots"],
        vec![vec![
            vessel_count.to_string(),
            route_count.to_string(),
            rate_count.to_string(),
            ffa_count.to_string(),
        ]],
    );
    let rates = table(
        &["Route", "Name", "Date", "Rate", "Unit", "Change"],
        latest_rates.iter().take(5).map(rate_row).collect(),
    );
    let ffa = table(
        &["Recorded", "Month", "Source", "Routes (WS)"],
        latest_ffa.iter().take(5).map(ffa_row).collect(),
    );
    let body = format!(
        "<h1>Dashboard</h1>\n{}\n<h2>Latest rates</h2>\n{}\n<h2>Latest FFA</h2>\n{}",
        stats, rates, ffa
    );
    Ok(Html(layout("Dashboard", "dashboard", &body)))
}

// ---------------------------------------------------------------------------
// GET /freight-grid
// ---------------------------------------------------------------------------

pub(crate) async fn freight_grid(
    State(st): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> PageResult {
    let filter = RouteFilter {
        vessel_type: query::parsed(&params, "vesselType")?,
        cargo_type: query::text(&params, "cargoType").map(str::to_string),
        ..Default::default()
    };
    let display_tce = params.get("displayTCE").is_some_and(|v| v == "true");

    let fail = || failed("Error loading freight grid");
    let routes = st
        .db
        .routes()
        .find_all(&filter, Page::first(GRID_ROUTES))
        .await
        .map_err(fail())?;
    let latest: HashMap<i64, FreightRate> = st
        .db
        .rates()
        .latest_rates()
        .await
        .map_err(fail())?
        .into_iter()
        .map(|rate| (rate.route.id, rate.rate))
        .collect();

    let mut headers = vec!["Route", "Name", "Vessel", "Cargo", "Date", "Rate", "Change"];
    if display_tce {
        headers.extend(["TCE non-eco", "TCE eco", "TCE scrubber"]);
    }
    let rows = routes
        .iter()
        .map(|route| {
            let rate = latest.get(&route.id);
            let mut row = vec![
                format!(
                    "<a href=\"/routes/{}\">{}</a>",
                    urlencoding::encode(&route.route_code),
                    escape(&route.route_code)
                ),
                escape(&route.name),
                route
                    .vessel_class()
                    .map(|class| class.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                escape(&route.cargo_type),
                rate.map(|r| r.date.to_string()).unwrap_or_else(|| "-".to_string()),
                num(rate.map(|r| r.rate)),
                rate.map(|r| format!("{:+.2}", r.change))
                    .unwrap_or_else(|| "-".to_string()),
            ];
            if display_tce {
                row.push(num(rate.and_then(|r| r.tce_non_eco)));
                row.push(num(rate.and_then(|r| r.tce_eco)));
                row.push(num(rate.and_then(|r| r.tce_scrubber)));
            }
            row
        })
        .collect();

    let body = format!("<h1>Freight Grid</h1>\n{}", table(&headers, rows));
    Ok(Html(layout("Freight Grid", "freight-grid", &body)))
}

// ---------------------------------------------------------------------------
// GET /routes, /routes/:route_code
// ---------------------------------------------------------------------------

pub(crate) async fn routes(
    State(st): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> PageResult {
    let filter = RouteFilter {
        vessel_type: query::parsed(&params, "vesselType")?,
        cargo_type: query::text(&params, "cargoType").map(str::to_string),
        search: query::text(&params, "search").map(str::to_string),
        active_only: false,
    };
    let page = query::page(&params, PAGE_SIZE)?;

    let fail = || failed("Error loading routes");
    let routes = st
        .db
        .routes()
        .find_all(&filter, page)
        .await
        .map_err(fail())?;
    let total = st.db.routes().count(&filter).await.map_err(fail())?;

    let rows = routes
        .iter()
        .map(|route| {
            vec![
                format!(
                    "<a href=\"/routes/{}\">{}</a>",
                    urlencoding::encode(&route.route_code),
                    escape(&route.route_code)
                ),
                escape(&route.name),
                escape(&route.origin),
                escape(&route.destination),
                escape(&route.cargo_type),
                num(route.quantity),
                num(route.distance),
            ]
        })
        .collect();
    let query = pagination_query(&params, &["vesselType", "cargoType", "search"], page.limit);
    let body = format!(
        "<h1>Routes</h1>\n{}\n{}",
        table(
            &["Code", "Name", "Origin", "Destination", "Cargo", "Quantity", "Distance"],
            rows
        ),
        pagination("/routes", &query, page, total)
    );
    Ok(Html(layout("Routes", "routes", &body)))
}

pub(crate) async fn route_detail(
    State(st): State<Arc<AppState>>,
    Path(route_code): Path<String>,
) -> PageResult {
    let fail = || failed("Error loading route details");
    let route = st
        .db
        .routes()
        .find_by_route_code(&route_code)
        .await
        .map_err(fail())?
        .ok_or_else(|| PageError::not_found("Route not found"))?;
    let history = st
        .db
        .rates()
        .find_by_route_code(&route.route_code, 30)
        .await
        .map_err(fail())?;

    let details = table(
        &["Origin", "Destination", "Cargo", "Quantity", "Distance", "Vessel"],
        vec![vec![
            escape(&route.origin),
            escape(&route.destination),
            escape(&route.cargo_type),
            num(route.quantity),
            num(route.distance),
            route
                .vessel_class()
                .map(|class| class.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]],
    );
    let rates = table(
        &[
            "Date",
            "Rate",
            "Unit",
            "Change",
            "TCE non-eco",
            "TCE eco",
            "TCE scrubber",
            "Source",
        ],
        history.iter().map(history_row).collect(),
    );
    let title = format!("Route {}", route.route_code);
    let body = format!(
        "<h1>{} - {}</h1>\n{}\n<h2>Rate history</h2>\n{}",
        escape(&route.route_code),
        escape(&route.name),
        details,
        rates
    );
    Ok(Html(layout(&title, "routes", &body)))
}

// ---------------------------------------------------------------------------
// GET /rates
// ---------------------------------------------------------------------------

pub(crate) async fn rates(
    State(st): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> PageResult {
    let filter = RateFilter {
        route_code: query::text(&params, "routeCode").map(str::to_string),
        start_date: query::date(&params, "startDate")?,
        end_date: query::date(&params, "endDate")?,
        ..Default::default()
    };
    let page = query::page(&params, PAGE_SIZE)?;

    let fail = || failed("Error loading rates");
    let rates = st
        .db
        .rates()
        .find_all(&filter, page)
        .await
        .map_err(fail())?;
    let total = st.db.rates().count(&filter).await.map_err(fail())?;
    let codes: Vec<String> = st
        .db
        .routes()
        .find_all(&RouteFilter::default(), Page::first(GRID_ROUTES))
        .await
        .map_err(fail())?
        .into_iter()
        .map(|route| route.route_code)
        .collect();

    let form = format!(
        "<form method=\"get\">{} <input type=\"date\" name=\"startDate\" value=\"{}\"> \
         <input type=\"date\" name=\"endDate\" value=\"{}\"> <button>Filter</button></form>",
        options("routeCode", &codes, query::text(&params, "routeCode")),
        escape(query::text(&params, "startDate").unwrap_or("")),
        escape(query::text(&params, "endDate").unwrap_or(""))
    );
    let query = pagination_query(&params, &["routeCode", "startDate", "endDate"], page.limit);
    let body = format!(
        "<h1>Freight Rates</h1>\n{}\n{}\n{}",
        form,
        table(
            &["Route", "Name", "Date", "Rate", "Unit", "Change"],
            rates.iter().map(rate_row).collect()
        ),
        pagination("/rates", &query, page, total)
    );
    Ok(Html(layout("Freight Rates", "rates", &body)))
}

// ---------------------------------------------------------------------------
// GET /vessels, /vessels/:imo
// ---------------------------------------------------------------------------

pub(crate) async fn vessels(
    State(st): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> PageResult {
    let filter = VesselFilter {
        vessel_type: query::text(&params, "vesselType").map(str::to_string),
        flag: query::text(&params, "flag").map(str::to_string),
        built_after: query::parsed(&params, "builtAfter")?,
        search: query::text(&params, "search").map(str::to_string),
    };
    let page = query::page(&params, PAGE_SIZE)?;

    let fail = || failed("Error loading vessels");
    let vessels = st
        .db
        .vessels()
        .find_all(&filter, page)
        .await
        .map_err(fail())?;
    let total = st.db.vessels().count(&filter).await.map_err(fail())?;

    let query = pagination_query(
        &params,
        &["vesselType", "flag", "builtAfter", "search"],
        page.limit,
    );
    let body = format!(
        "<h1>Vessels</h1>\n{}\n{}",
        table(
            &["Name", "IMO", "Type", "Flag", "Built", "DWT", "Capacity"],
            vessels.iter().map(vessel_row).collect()
        ),
        pagination("/vessels", &query, page, total)
    );
    Ok(Html(layout("Vessels", "vessels", &body)))
}

pub(crate) async fn vessel_detail(
    State(st): State<Arc<AppState>>,
    Path(imo): Path<String>,
) -> PageResult {
    let imo = Imo::try_from(imo.as_str()).map_err(|_| PageError::not_found("Vessel not found"))?;
    let vessel = st
        .db
        .vessels()
        .find_by_imo(&imo)
        .await
        .map_err(failed("Error loading vessel details"))?
        .ok_or_else(|| PageError::not_found("Vessel not found"))?;
    let profile = &vessel.profile;

    let owner = profile
        .registered_owner
        .as_ref()
        .and_then(|owner| owner.name.as_deref());
    let operator = profile
        .commercial_operator
        .as_ref()
        .and_then(|operator| operator.name.as_deref());
    let fields = vec![
        vec!["IMO".to_string(), profile.imo.to_string()],
        vec!["Type".to_string(), text(profile.vessel_type.as_deref())],
        vec!["Flag".to_string(), text(profile.flag.as_deref())],
        vec!["Builder".to_string(), text(profile.builder.as_deref())],
        vec![
            "Delivered".to_string(),
            profile
                .date_delivered
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ],
        vec!["Registered owner".to_string(), text(owner)],
        vec!["Commercial operator".to_string(), text(operator)],
        vec![
            "Class society".to_string(),
            text(profile.classification_society.as_deref()),
        ],
        vec!["Summer DWT".to_string(), num(profile.summer_deadweight())],
        vec!["Cargo capacity".to_string(), num(profile.cargo_capacity())],
        vec!["Data source".to_string(), escape(&profile.data_source)],
        vec![
            "Updated".to_string(),
            profile.date_updated.format("%Y-%m-%d %H:%M").to_string(),
        ],
    ];
    let body = format!(
        "<h1>{}</h1>\n{}",
        escape(&profile.name),
        table(&["Field", "Value"], fields)
    );
    Ok(Html(layout(&profile.name, "vessels", &body)))
}

// ---------------------------------------------------------------------------
// GET /ffa
// ---------------------------------------------------------------------------

pub(crate) async fn ffa(
    State(st): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> PageResult {
    let contract_month = query::text(&params, "contractMonth")
        .map(ContractMonth::new)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let filter = FfaFilter {
        contract_month,
        route_code: query::text(&params, "routeCode").map(str::to_string),
        start: query::day_start(&params, "startDate")?,
        end: query::day_end(&params, "endDate")?,
    };
    let page = query::page(&params, PAGE_SIZE)?;

    let fail = || failed("Error loading FFA prices");
    let repo = st.db.ffa();
    let prices = repo
        .find_all(&filter, page, SortOrder::Descending)
        .await
        .map_err(fail())?;
    let total = repo.count(&filter).await.map_err(fail())?;
    let months = repo.unique_contract_months().await.map_err(fail())?;
    let codes = repo.unique_route_codes().await.map_err(fail())?;

    let form = format!(
        "<form method=\"get\">{} {} <input type=\"date\" name=\"startDate\" value=\"{}\"> \
         <input type=\"date\" name=\"endDate\" value=\"{}\"> <button>Filter</button></form>",
        options("contractMonth", &months, query::text(&params, "contractMonth")),
        options("routeCode", &codes, query::text(&params, "routeCode")),
        escape(query::text(&params, "startDate").unwrap_or("")),
        escape(query::text(&params, "endDate").unwrap_or(""))
    );
    let query = pagination_query(
        &params,
        &["contractMonth", "routeCode", "startDate", "endDate"],
        page.limit,
    );
    let body = format!(
        "<h1>FFA Prices</h1>\n{}\n{}\n{}",
        form,
        table(
            &["Recorded", "Month", "Source", "Routes (WS)"],
            prices.iter().map(ffa_row).collect()
        ),
        pagination("/ffa", &query, page, total)
    );
    Ok(Html(layout("FFA Prices", "ffa", &body)))
}
