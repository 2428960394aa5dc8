//! Forward curve snapshots shaped like the broker's oil curves sheet

use std::collections::BTreeMap;

use chrono::{DateTime, Months, Utc};
use rand::Rng;

use super::round2;
use crate::errors::FreightDeskError;
use crate::models::{ContractMonth, FfaMetadata, NewFfaPrice, RoutePrice};

pub const DATA_SOURCE: &str = "Mock Data";

const ROUTE_DESCRIPTIONS: &[(&str, &str)] = &[
    ("TD3C", "Middle East Gulf to China, 270,000mt"),
    ("TD7", "North Sea to Continent, 80,000mt"),
    ("TD8", "Kuwait to Singapore, 80,000mt"),
    ("TD9", "Caribbean to US Gulf, 70,000mt"),
    ("TD14", "SE Asia to EC Australia, 80,000mt"),
    ("TD17", "Baltic to UK-Continent, 100,000mt"),
    ("TD19", "Cross Med, 80,000mt"),
    ("TD20", "West Africa to UK-Continent, 130,000mt"),
    ("TC1", "Middle East to Japan, 75,000mt, clean"),
    ("TC2", "Continent to USAC, 37,000mt, clean"),
    ("TC3", "Japan to Singapore, 50,000mt, clean"),
    ("TC5", "Middle East to Japan, 55,000mt, clean"),
    ("TC6", "Algeria to Euromed, 30,000mt, clean"),
    ("TC7", "Singapore to EC Australia, 35,000mt, clean"),
    ("TC14", "US Gulf to Continent, 38,000mt, clean"),
    ("TC15", "Mediterranean to Japan, 80,000mt, clean"),
];

/// Description of a curve route, e.g. `TD3C`
pub fn route_description(route_code: &str) -> Option<&'static str> {
    ROUTE_DESCRIPTIONS
        .iter()
        .find(|(code, _)| *code == route_code)
        .map(|(_, description)| *description)
}

/// (route, worldscale, $/MT, cents/bbl)
type CurvePoint = (&'static str, f64, f64, f64);

struct CurveMonth {
    month: &'static str,
    points: [CurvePoint; 5],
    comments: &'static str,
}

const CURVE: [CurveMonth; 4] = [
    CurveMonth {
        month: "MAR25",
        points: [
            ("TD3C", 59.71, 12.89, 175.79),
            ("TD7", 108.0, 10.39, 155.07),
            ("TD8", 139.5, 20.77, 310.02),
            ("TD9", 128.44, 14.49, 216.31),
            ("TD14", 86.36, 9.97, 148.78),
        ],
        comments: "Middle East market slightly firmer, West African market steady.",
    },
    CurveMonth {
        month: "APR25",
        points: [
            ("TD3C", 60.0, 12.95, 176.64),
            ("TD7", 103.0, 9.91, 147.89),
            ("TD8", 136.5, 20.32, 303.36),
            ("TD9", 137.0, 14.49, 216.31),
            ("TD14", 86.36, 9.97, 148.78),
        ],
        comments: "Forward curves show contango structure in major routes.",
    },
    CurveMonth {
        month: "MAY25",
        points: [
            ("TD3C", 58.25, 12.57, 171.49),
            ("TD7", 100.0, 9.62, 143.58),
            ("TD8", 135.0, 20.10, 300.02),
            ("TD9", 137.0, 12.81, 191.19),
            ("TD14", 86.36, 9.97, 148.78),
        ],
        comments: "Seasonal expectations showing softening in Middle East rates for May.",
    },
    CurveMonth {
        month: "JUN25",
        points: [
            ("TD3C", 56.25, 12.14, 165.60),
            ("TD7", 99.0, 9.52, 142.15),
            ("TD8", 133.0, 19.80, 295.58),
            ("TD9", 137.0, 12.81, 191.19),
            ("TD14", 86.36, 9.97, 148.78),
        ],
        comments: "Summer trading patterns beginning to influence forward curves.",
    },
];

const EXTRA_MONTHS: [&str; 8] = [
    "JUL25", "AUG25", "SEP25", "OCT25", "NOV25", "DEC25", "JAN26", "FEB26",
];

const SPOT: [(&str, f64); 5] = [
    ("TD3C", 60.05),
    ("TD7", 107.5),
    ("TD8", 144.54),
    ("TD9", 128.44),
    ("TD14", 86.36),
];
const MTD: [(&str, f64); 5] = [
    ("TD3C", 57.85),
    ("TD7", 108.49),
    ("TD8", 139.44),
    ("TD9", 128.64),
    ("TD14", 86.36),
];
const YTD: [(&str, f64); 5] = [
    ("TD3C", 59.43),
    ("TD7", 110.08),
    ("TD8", 163.95),
    ("TD9", 126.67),
    ("TD14", 86.36),
];

fn aggregates(values: &[(&str, f64)]) -> BTreeMap<String, f64> {
    values
        .iter()
        .map(|(code, price)| (code.to_string(), *price))
        .collect()
}

fn snapshot(
    month: &CurveMonth,
    contract_month: &str,
    recorded: DateTime<Utc>,
    factor: f64,
) -> Result<NewFfaPrice, FreightDeskError> {
    let adjust = |value: f64| round2(value * factor);
    Ok(NewFfaPrice {
        date_recorded: recorded,
        data_source: DATA_SOURCE.to_string(),
        contract_month: ContractMonth::new(contract_month)?,
        routes: month
            .points
            .iter()
            .map(|(code, ws, per_mt, per_bbl)| RoutePrice {
                route_code: code.to_string(),
                route_description: route_description(code).map(str::to_string),
                worldscale: Some(adjust(*ws)),
                dollar_per_mt: Some(adjust(*per_mt)),
                cents_per_bbl: Some(adjust(*per_bbl)),
                tce: None,
            })
            .collect(),
        spot_prices: aggregates(&SPOT),
        mtd_prices: aggregates(&MTD),
        ytd_prices: aggregates(&YTD),
        market_comments: Some(month.comments.to_string()),
        metadata: FfaMetadata::default(),
    })
}

/// Up to twelve curve snapshots recorded at `now`
///
/// The first four are fixed. Later months reuse them in turn, shifted one
/// month further per record and scaled by a random factor in 0.95-1.05.
pub fn mock_ffa_prices<R: Rng + ?Sized>(
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Vec<NewFfaPrice>, FreightDeskError> {
    let mut prices = CURVE
        .iter()
        .take(count)
        .map(|month| snapshot(month, month.month, now, 1.0))
        .collect::<Result<Vec<_>, _>>()?;

    let extra = count.saturating_sub(CURVE.len()).min(EXTRA_MONTHS.len());
    for (i, contract_month) in EXTRA_MONTHS.iter().take(extra).enumerate() {
        let base = &CURVE[i % CURVE.len()];
        let recorded = now
            .checked_add_months(Months::new(i as u32 + 1))
            .unwrap_or(now);
        let factor = rng.random_range(0.95..1.05);
        prices.push(snapshot(base, contract_month, recorded, factor)?);
    }
    Ok(prices)
}
