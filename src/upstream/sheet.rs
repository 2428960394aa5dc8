//! FFA oil curves sheet, read from its CSV export
//!
//! The sheet has a header area naming the routes, followed by one row per
//! contract month (`MAR25`, `APR25`, ...). Each route occupies three
//! consecutive columns: worldscale, $/MT and cents/bbl.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use tracing::info;

use crate::errors::FreightDeskError;
use crate::mock::ffa::route_description;
use crate::models::{ContractMonth, FfaMetadata, NewFfaPrice, RoutePrice};

pub const DATA_SOURCE: &str = "Sheet Import";

/// Routes looked up in the sheet header
pub const CURVE_ROUTES: [&str; 8] = [
    "TD3C", "TD7", "TD8", "TD9", "TD14", "TD17", "TD19", "TD20",
];

/// Import the sheet at `path`, stamping every snapshot with `now`
pub fn import_sheet(path: &Path, now: DateTime<Utc>) -> Result<Vec<NewFfaPrice>, FreightDeskError> {
    if !path.is_file() {
        return Err(FreightDeskError::NotFound(format!(
            "File not found: {}",
            path.display()
        )));
    }
    let prices = parse_sheet(File::open(path)?, now)?;
    info!(
        "Imported {} FFA snapshots from {}",
        prices.len(),
        path.display()
    );
    Ok(prices)
}

pub fn parse_sheet<R: Read>(
    reader: R,
    now: DateTime<Utc>,
) -> Result<Vec<NewFfaPrice>, FreightDeskError> {
    let rows = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()?;

    let (first_month_row, month_column) = find_month_cell(&rows).ok_or_else(|| {
        FreightDeskError::InvalidInput("Could not find month data in sheet".to_string())
    })?;
    let route_columns = find_route_columns(&rows[..first_month_row]);

    let mut prices = Vec::new();
    for row in &rows[first_month_row..] {
        let Some(month) = row.get(month_column).map(str::trim) else {
            continue;
        };
        if !ContractMonth::is_month_code(month) {
            continue;
        }

        let routes: Vec<RoutePrice> = route_columns
            .iter()
            .filter_map(|(code, column)| {
                let worldscale = number(row, *column)?;
                Some(RoutePrice {
                    route_code: code.to_string(),
                    route_description: route_description(code).map(str::to_string),
                    worldscale: Some(worldscale),
                    dollar_per_mt: number(row, column + 1),
                    cents_per_bbl: number(row, column + 2),
                    tce: None,
                })
            })
            .collect();

        if routes.is_empty() {
            continue;
        }
        prices.push(NewFfaPrice {
            date_recorded: now,
            data_source: DATA_SOURCE.to_string(),
            contract_month: ContractMonth::new(month)?,
            routes,
            spot_prices: Default::default(),
            mtd_prices: Default::default(),
            ytd_prices: Default::default(),
            market_comments: None,
            metadata: FfaMetadata::default(),
        });
    }

    Ok(prices)
}

/// Row and column of the first `MMMYY` cell
fn find_month_cell(rows: &[StringRecord]) -> Option<(usize, usize)> {
    rows.iter().enumerate().find_map(|(i, row)| {
        row.iter()
            .position(|cell| ContractMonth::is_month_code(cell.trim()))
            .map(|column| (i, column))
    })
}

/// First column holding each known route code in the header area
fn find_route_columns(header: &[StringRecord]) -> Vec<(&'static str, usize)> {
    CURVE_ROUTES
        .iter()
        .filter_map(|code| {
            header.iter().find_map(|row| {
                row.iter()
                    .position(|cell| cell.trim().eq_ignore_ascii_case(code))
                    .map(|column| (*code, column))
            })
        })
        .collect()
}

fn number(row: &StringRecord, column: usize) -> Option<f64> {
    row.get(column)
        .map(|cell| cell.trim().replace(',', ""))
        .filter(|cell| !cell.is_empty())
        .and_then(|cell| cell.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SHEET: &str = "\
FFA Oil Curves,,,,,,,
,,TD3C,,,td7,,
Month,,WS,$/MT,c/bbl,WS,$/MT,c/bbl
,MAR25,57.5,15.2,207.4,130,9.1,123.5
,APR25,56,14.8,,128.5,n/a,
,Q2 25,55,14.5,200,127,8.9,120
,MAY25,,,,,,
";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap()
    }

    #[test]
    fn reads_month_rows() {
        let prices = parse_sheet(SHEET.as_bytes(), now()).unwrap();
        let months: Vec<&str> = prices.iter().map(|p| p.contract_month.as_str()).collect();
        assert_eq!(months, ["MAR25", "APR25"]);

        let mar = &prices[0];
        assert_eq!(mar.data_source, DATA_SOURCE);
        assert_eq!(mar.date_recorded, now());
        assert_eq!(mar.routes.len(), 2);
        assert_eq!(mar.routes[0].route_code, "TD3C");
        assert_eq!(mar.routes[0].worldscale, Some(57.5));
        assert_eq!(mar.routes[0].dollar_per_mt, Some(15.2));
        assert_eq!(mar.routes[0].cents_per_bbl, Some(207.4));
        assert_eq!(
            mar.routes[0].route_description.as_deref(),
            Some("Middle East Gulf to China, 270,000mt")
        );
    }

    #[test]
    fn missing_neighbours_are_none() {
        let prices = parse_sheet(SHEET.as_bytes(), now()).unwrap();
        let td7 = prices[1].routes.iter().find(|r| r.route_code == "TD7").unwrap();
        assert_eq!(td7.worldscale, Some(128.5));
        assert_eq!(td7.dollar_per_mt, None);
        assert_eq!(td7.cents_per_bbl, None);
    }

    #[test]
    fn sheet_without_months_fails() {
        let err = parse_sheet("a,b,c\n1,2,3\n".as_bytes(), now()).unwrap_err();
        assert!(matches!(err, FreightDeskError::InvalidInput(_)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_sheet(&dir.path().join("curves.csv"), now()).unwrap_err();
        assert!(matches!(err, FreightDeskError::NotFound(_)));
    }

    #[test]
    fn imports_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curves.csv");
        std::fs::write(&path, SHEET).unwrap();
        assert_eq!(import_sheet(&path, now()).unwrap().len(), 2);
    }
}
