//! Fetch-and-save orchestration for each upstream domain
//!
//! A fetch loads a batch from the configured source, then upserts record by
//! record. A failing record is logged and counted; the batch continues.

pub mod ffa;
pub mod freight_grid;
pub mod q88;

use serde::Serialize;
use tracing::error;

use crate::config::SourcesConfig;
use crate::database::Database;
use crate::errors::FreightDeskError;

pub use ffa::{FfaFetchOptions, FfaFetcher};
pub use freight_grid::{FreightGridFetcher, RateFetchOptions, RouteInitResult};
pub use q88::{Q88Fetcher, VesselFetchOptions};

/// Outcome of persisting one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// One record that could not be saved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchFailure {
    pub record: String,
    pub error: String,
}

/// Counters of one fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<FetchFailure>,
}

impl FetchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Count the result of saving `record`
    pub fn record(&mut self, record: impl Into<String>, result: Result<Upsert, FreightDeskError>) {
        match result {
            Ok(Upsert::Created) => self.created += 1,
            Ok(Upsert::Updated) => self.updated += 1,
            Err(e) => {
                let record = record.into();
                error!("Error processing {}: {}", record, e);
                self.errors.push(FetchFailure {
                    record,
                    error: e.to_string(),
                });
            }
        }
    }
}

/// The three fetchers sharing one store
#[derive(Clone)]
pub struct Fetchers {
    pub q88: Q88Fetcher,
    pub ffa: FfaFetcher,
    pub freight_grid: FreightGridFetcher,
}

impl Fetchers {
    pub fn new(db: &Database, sources: &SourcesConfig) -> Self {
        Self {
            q88: Q88Fetcher::new(db.vessels(), sources.clone()),
            ffa: FfaFetcher::new(db.ffa(), sources.clone()),
            freight_grid: FreightGridFetcher::new(db.routes(), db.rates(), sources.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_do_not_stop_counting() {
        let mut summary = FetchSummary::new(4);
        summary.record("TD3C 2025-03-03", Ok(Upsert::Created));
        summary.record(
            "TD3C 2025-03-04",
            Err(FreightDeskError::ValidationError("Rate must be a non-negative number".into())),
        );
        summary.record("TD7 2025-03-03", Ok(Upsert::Updated));
        summary.record("TD7 2025-03-04", Ok(Upsert::Created));

        assert_eq!(summary.total, 4);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].record, "TD3C 2025-03-04");
        assert_eq!(
            summary.errors[0].error,
            "Validation failed: Rate must be a non-negative number"
        );
    }

    #[test]
    fn serializes_counters() {
        let json = serde_json::to_value(FetchSummary::new(0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "total": 0, "created": 0, "updated": 0, "errors": [] })
        );
    }
}
