//! Freight rate repository

use chrono::NaiveDate;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use tracing::{error, info};

use super::models::{convert_all, RateRow, RateWithRouteRow};
use crate::errors::FreightDeskError;
use crate::models::{
    normalize_route_code, FreightRate, NewFreightRate, Page, RateFilter, RateType, RateWithRoute,
};

const COLUMNS: &str = "r.id, r.route_id, r.date, r.quantity, r.rate, r.rate_type, r.change, \
    r.tce_non_eco, r.tce_eco, r.tce_scrubber, r.source, r.metadata, r.created_at, r.updated_at";

const ROUTE_COLUMNS: &str = "fr.route_code, fr.name AS route_name, \
    fr.origin AS route_origin, fr.destination AS route_destination";

#[derive(Clone)]
pub struct RateRepository {
    pool: PgPool,
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RateFilter) {
    if let Some(route_id) = filter.route_id {
        builder.push(" AND r.route_id = ").push_bind(route_id);
    }
    if let Some(code) = &filter.route_code {
        builder
            .push(" AND fr.route_code = ")
            .push_bind(normalize_route_code(code));
    }
    if let Some(start) = filter.start_date {
        builder.push(" AND r.date >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        builder.push(" AND r.date <= ").push_bind(end);
    }
}

fn not_found(id: i64) -> FreightDeskError {
    FreightDeskError::NotFound(format!("Freight rate with ID {} not found", id))
}

impl RateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, rate: &NewFreightRate) -> Result<FreightRate, FreightDeskError> {
        rate.validate()?;
        let row: RateRow = sqlx::query_as(&format!(
            "INSERT INTO freight_rates AS r (
                route_id, date, quantity, rate, rate_type, change,
                tce_non_eco, tce_eco, tce_scrubber, source, metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}"
        ))
        .bind(rate.route_id)
        .bind(rate.date)
        .bind(rate.quantity)
        .bind(rate.rate)
        .bind(rate.rate_type.as_str())
        .bind(rate.change)
        .bind(rate.tce_non_eco)
        .bind(rate.tce_eco)
        .bind(rate.tce_scrubber)
        .bind(rate.source.as_str())
        .bind(Json(&rate.metadata))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<FreightRate>, FreightDeskError> {
        let row: Option<RateRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM freight_rates r WHERE r.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(FreightRate::try_from).transpose()
    }

    /// Most recent rate of one route
    pub async fn latest_for_route(
        &self,
        route_id: i64,
    ) -> Result<Option<FreightRate>, FreightDeskError> {
        let row: Option<RateRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM freight_rates r
            WHERE r.route_id = $1
            ORDER BY r.date DESC, r.id DESC
            LIMIT 1"
        ))
        .bind(route_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(FreightRate::try_from).transpose()
    }

    /// Latest rate per route with the route summary, ordered by route code
    pub async fn latest_rates(&self) -> Result<Vec<RateWithRoute>, FreightDeskError> {
        let rows: Vec<RateWithRouteRow> = sqlx::query_as(&format!(
            "SELECT * FROM (
                SELECT DISTINCT ON (r.route_id) {COLUMNS}, {ROUTE_COLUMNS}
                FROM freight_rates r
                JOIN freight_routes fr ON fr.id = r.route_id
                ORDER BY r.route_id, r.date DESC, r.id DESC
            ) latest
            ORDER BY route_code"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    /// Rates of one route, newest first; default limit 30
    pub async fn route_rates(
        &self,
        route_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: Option<i64>,
    ) -> Result<Vec<FreightRate>, FreightDeskError> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM freight_rates r WHERE r.route_id = "
        ));
        builder.push_bind(route_id);
        if let Some(start) = start {
            builder.push(" AND r.date >= ").push_bind(start);
        }
        if let Some(end) = end {
            builder.push(" AND r.date <= ").push_bind(end);
        }
        builder
            .push(" ORDER BY r.date DESC LIMIT ")
            .push_bind(limit.unwrap_or(30));

        let rows: Vec<RateRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    /// Every rate dated `date`, with its route
    pub async fn rates_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<RateWithRoute>, FreightDeskError> {
        let rows: Vec<RateWithRouteRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS}, {ROUTE_COLUMNS}
            FROM freight_rates r
            JOIN freight_routes fr ON fr.id = r.route_id
            WHERE r.date = $1
            ORDER BY fr.route_code"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub async fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FreightRate>, FreightDeskError> {
        let rows: Vec<RateRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM freight_rates r
            WHERE r.date BETWEEN $1 AND $2
            ORDER BY r.date DESC, r.route_id"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    /// The rate of `route_id` on `date`, used for upserts
    pub async fn find_for_route_on_date(
        &self,
        route_id: i64,
        date: NaiveDate,
    ) -> Result<Option<FreightRate>, FreightDeskError> {
        let row: Option<RateRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM freight_rates r
            WHERE r.route_id = $1 AND r.date = $2
            ORDER BY r.id DESC
            LIMIT 1"
        ))
        .bind(route_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        row.map(FreightRate::try_from).transpose()
    }

    /// Rates of the route with code `route_code`, newest first
    pub async fn find_by_route_code(
        &self,
        route_code: &str,
        limit: i64,
    ) -> Result<Vec<FreightRate>, FreightDeskError> {
        let rows: Vec<RateRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM freight_rates r
            JOIN freight_routes fr ON fr.id = r.route_id
            WHERE fr.route_code = $1
            ORDER BY r.date DESC
            LIMIT $2"
        ))
        .bind(normalize_route_code(route_code))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub async fn update(
        &self,
        id: i64,
        rate: &NewFreightRate,
    ) -> Result<FreightRate, FreightDeskError> {
        rate.validate()?;
        let row: Option<RateRow> = sqlx::query_as(&format!(
            "UPDATE freight_rates AS r SET
                route_id = $2, date = $3, quantity = $4, rate = $5, rate_type = $6,
                change = $7, tce_non_eco = $8, tce_eco = $9, tce_scrubber = $10,
                source = $11, metadata = $12, updated_at = now()
            WHERE r.id = $1
            RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(rate.route_id)
        .bind(rate.date)
        .bind(rate.quantity)
        .bind(rate.rate)
        .bind(rate.rate_type.as_str())
        .bind(rate.change)
        .bind(rate.tce_non_eco)
        .bind(rate.tce_eco)
        .bind(rate.tce_scrubber)
        .bind(rate.source.as_str())
        .bind(Json(&rate.metadata))
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| not_found(id))?.try_into()
    }

    pub async fn delete(&self, id: i64) -> Result<(), FreightDeskError> {
        let result = sqlx::query("DELETE FROM freight_rates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Filtered listing, newest first, with route summaries
    pub async fn find_all(
        &self,
        filter: &RateFilter,
        page: Page,
    ) -> Result<Vec<RateWithRoute>, FreightDeskError> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {COLUMNS}, {ROUTE_COLUMNS}
            FROM freight_rates r
            JOIN freight_routes fr ON fr.id = r.route_id
            WHERE TRUE"
        ));
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY r.date DESC, fr.route_code LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.skip);

        let rows: Vec<RateWithRouteRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    pub async fn count(&self, filter: &RateFilter) -> Result<i64, FreightDeskError> {
        let mut builder = QueryBuilder::new(
            "SELECT COUNT(*) FROM freight_rates r
            JOIN freight_routes fr ON fr.id = r.route_id
            WHERE TRUE",
        );
        push_filter(&mut builder, filter);
        let (count,): (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Difference between `rate` and the latest stored rate of the same
    /// unit on the route; 0 when there is none or the lookup fails
    pub async fn calculate_rate_change(
        &self,
        route_id: i64,
        rate: f64,
        rate_type: RateType,
    ) -> f64 {
        let previous: Result<Option<(f64,)>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT rate FROM freight_rates
            WHERE route_id = $1 AND rate_type = $2
            ORDER BY date DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(route_id)
        .bind(rate_type.as_str())
        .fetch_optional(&self.pool)
        .await;

        match previous {
            Ok(Some((previous,))) => rate - previous,
            Ok(None) => 0.0,
            Err(e) => {
                error!("Failed to calculate rate change for route {}: {}", route_id, e);
                0.0
            }
        }
    }

    /// Insert all rates in one transaction
    pub async fn bulk_create(
        &self,
        rates: &[NewFreightRate],
    ) -> Result<Vec<FreightRate>, FreightDeskError> {
        for rate in rates {
            rate.validate()?;
        }

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(rates.len());
        for rate in rates {
            let row: RateRow = sqlx::query_as(&format!(
                "INSERT INTO freight_rates AS r (
                    route_id, date, quantity, rate, rate_type, change,
                    tce_non_eco, tce_eco, tce_scrubber, source, metadata
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING {COLUMNS}"
            ))
            .bind(rate.route_id)
            .bind(rate.date)
            .bind(rate.quantity)
            .bind(rate.rate)
            .bind(rate.rate_type.as_str())
            .bind(rate.change)
            .bind(rate.tce_non_eco)
            .bind(rate.tce_eco)
            .bind(rate.tce_scrubber)
            .bind(rate.source.as_str())
            .bind(Json(&rate.metadata))
            .fetch_one(&mut *tx)
            .await?;
            created.push(FreightRate::try_from(row)?);
        }
        tx.commit().await?;

        info!("Created {} freight rates", created.len());
        Ok(created)
    }
}
