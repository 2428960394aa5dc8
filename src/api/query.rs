//! Query-string parsing shared by handlers and pages
//!
//! Parameters arrive as optional strings; `all` and empty values mean "no
//! filter". A value that does not parse is a 400.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::ApiError;
use crate::models::Page;

pub(crate) type Params = HashMap<String, String>;

/// Trimmed value of `name`, unless empty or `all`
pub(crate) fn text<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("all"))
}

pub(crate) fn parsed<T: FromStr>(params: &Params, name: &str) -> Result<Option<T>, ApiError> {
    text(params, name)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ApiError::bad_request(format!("Invalid {} '{}'", name, value)))
        })
        .transpose()
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid date format. Use YYYY-MM-DD."))
}

pub(crate) fn date(params: &Params, name: &str) -> Result<Option<NaiveDate>, ApiError> {
    text(params, name).map(parse_date).transpose()
}

/// `name` as the first instant of that UTC day
pub(crate) fn day_start(params: &Params, name: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    Ok(date(params, name)?.map(|d| d.and_time(NaiveTime::MIN).and_utc()))
}

/// `name` as the last instant of that UTC day
pub(crate) fn day_end(params: &Params, name: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    Ok(date(params, name)?.and_then(|d| d.succ_opt()).map(|next| {
        next.and_time(NaiveTime::MIN).and_utc() - chrono::Duration::microseconds(1)
    }))
}

/// `limit`/`skip` with the given default page size
pub(crate) fn page(params: &Params, default_limit: i64) -> Result<Page, ApiError> {
    let limit = parsed::<i64>(params, "limit")?
        .filter(|limit| *limit > 0)
        .unwrap_or(default_limit);
    let skip = parsed::<i64>(params, "skip")?.unwrap_or(0);
    Ok(Page::new(limit, skip))
}

/// Comma-separated list, empty entries dropped
pub(crate) fn list<T: FromStr>(params: &Params, name: &str) -> Result<Option<Vec<T>>, ApiError> {
    let Some(value) = text(params, name) else {
        return Ok(None);
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse()
                .map_err(|_| ApiError::bad_request(format!("Invalid {} '{}'", name, item)))
        })
        .collect::<Result<Vec<T>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VesselClass;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn all_means_no_filter() {
        let p = params(&[("vesselType", "all"), ("search", "  ")]);
        assert_eq!(text(&p, "vesselType"), None);
        assert_eq!(text(&p, "search"), None);
        assert_eq!(text(&p, "missing"), None);
    }

    #[test]
    fn page_defaults() {
        assert_eq!(page(&Params::new(), 20).unwrap(), Page::new(20, 0));
        let p = params(&[("limit", "5"), ("skip", "10")]);
        assert_eq!(page(&p, 20).unwrap(), Page::new(5, 10));
        let p = params(&[("limit", "ten")]);
        assert_eq!(page(&p, 20).unwrap_err().status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn dates_cover_whole_days() {
        let p = params(&[("startDate", "2025-03-04"), ("endDate", "2025-03-04")]);
        let start = day_start(&p, "startDate").unwrap().unwrap();
        let end = day_end(&p, "endDate").unwrap().unwrap();
        assert_eq!(start.to_rfc3339(), "2025-03-04T00:00:00+00:00");
        assert!(end > start);
        assert_eq!(end.date_naive(), start.date_naive());

        let bad = params(&[("startDate", "04/03/2025")]);
        assert_eq!(
            date(&bad, "startDate").unwrap_err().message,
            "Invalid date format. Use YYYY-MM-DD."
        );
    }

    #[test]
    fn comma_lists() {
        let p = params(&[("vesselTypes", "MR, lr1,")]);
        let classes: Vec<VesselClass> = list(&p, "vesselTypes").unwrap().unwrap();
        assert_eq!(classes, [VesselClass::Mr, VesselClass::Lr1]);
        assert!(list::<VesselClass>(&params(&[("vesselTypes", "MR,Capesize")]), "vesselTypes").is_err());
    }
}
