//! FFA forward curve repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};

use super::models::{convert_all, FfaRow, RouteHistoryRow};
use crate::errors::FreightDeskError;
use crate::models::{
    normalize_route_code, ContractMonth, FfaFilter, FfaPrice, NewFfaPrice, Page,
    RouteHistoryEntry, SortOrder,
};

const COLUMNS: &str = "id, date_recorded, data_source, contract_month, routes, spot_prices, \
    mtd_prices, ytd_prices, market_comments, metadata, created_at, updated_at";

#[derive(Clone)]
pub struct FfaRepository {
    pool: PgPool,
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &FfaFilter) {
    if let Some(month) = &filter.contract_month {
        builder
            .push(" AND contract_month = ")
            .push_bind(month.as_str().to_string());
    }
    if let Some(code) = &filter.route_code {
        let element = serde_json::json!([{ "routeCode": normalize_route_code(code) }]);
        builder.push(" AND routes @> ").push_bind(element);
    }
    if let Some(start) = filter.start {
        builder.push(" AND date_recorded >= ").push_bind(start);
    }
    if let Some(end) = filter.end {
        builder.push(" AND date_recorded <= ").push_bind(end);
    }
}

fn prepare(price: &NewFfaPrice) -> Result<NewFfaPrice, FreightDeskError> {
    let price = price.clone().normalized();
    price.validate()?;
    Ok(price)
}

fn not_found(id: i64) -> FreightDeskError {
    FreightDeskError::NotFound(format!("FFA price with ID {} not found", id))
}

impl FfaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, price: &NewFfaPrice) -> Result<FfaPrice, FreightDeskError> {
        let price = prepare(price)?;
        let row: FfaRow = sqlx::query_as(&format!(
            "INSERT INTO ffa_prices (
                date_recorded, data_source, contract_month, routes, spot_prices,
                mtd_prices, ytd_prices, market_comments, metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}"
        ))
        .bind(price.date_recorded)
        .bind(&price.data_source)
        .bind(price.contract_month.as_str())
        .bind(Json(&price.routes))
        .bind(Json(&price.spot_prices))
        .bind(Json(&price.mtd_prices))
        .bind(Json(&price.ytd_prices))
        .bind(&price.market_comments)
        .bind(Json(&price.metadata))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<FfaPrice>, FreightDeskError> {
        let row: Option<FfaRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM ffa_prices WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(FfaPrice::try_from).transpose()
    }

    /// Snapshots of one contract month, newest first; `mar25` finds `MAR25`
    pub async fn find_by_contract_month(
        &self,
        contract_month: &str,
    ) -> Result<Vec<FfaPrice>, FreightDeskError> {
        let month = ContractMonth::new(contract_month)?;
        let rows: Vec<FfaRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM ffa_prices
            WHERE contract_month = $1
            ORDER BY date_recorded DESC"
        ))
        .bind(month.as_str())
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    /// Latest snapshot per contract month, ordered by the month code text
    pub async fn latest_prices(&self) -> Result<Vec<FfaPrice>, FreightDeskError> {
        let rows: Vec<FfaRow> = sqlx::query_as(&format!(
            "SELECT DISTINCT ON (contract_month) {COLUMNS}
            FROM ffa_prices
            ORDER BY contract_month, date_recorded DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FfaPrice>, FreightDeskError> {
        let rows: Vec<FfaRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM ffa_prices
            WHERE date_recorded BETWEEN $1 AND $2
            ORDER BY date_recorded DESC, contract_month"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    /// Price points of one route across snapshots, newest first; default
    /// limit 90. Only the matching route element is returned.
    pub async fn route_history(
        &self,
        route_code: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<i64>,
    ) -> Result<Vec<RouteHistoryEntry>, FreightDeskError> {
        let mut builder = QueryBuilder::new(
            "SELECT p.id, p.date_recorded, p.contract_month, elem AS route
            FROM ffa_prices p
            CROSS JOIN LATERAL jsonb_array_elements(p.routes) elem
            WHERE elem->>'routeCode' = ",
        );
        builder.push_bind(normalize_route_code(route_code));
        if let Some(start) = start {
            builder.push(" AND p.date_recorded >= ").push_bind(start);
        }
        if let Some(end) = end {
            builder.push(" AND p.date_recorded <= ").push_bind(end);
        }
        builder
            .push(" ORDER BY p.date_recorded DESC, p.contract_month LIMIT ")
            .push_bind(limit.unwrap_or(90));

        let rows: Vec<RouteHistoryRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    /// Snapshots recorded on calendar day `date` (UTC)
    pub async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<FfaPrice>, FreightDeskError> {
        let rows: Vec<FfaRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM ffa_prices
            WHERE (date_recorded AT TIME ZONE 'UTC')::date = $1
            ORDER BY contract_month"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    /// Newest snapshot of `contract_month`, used for same-day upserts
    pub async fn latest_for_month(
        &self,
        contract_month: &ContractMonth,
    ) -> Result<Option<FfaPrice>, FreightDeskError> {
        let row: Option<FfaRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM ffa_prices
            WHERE contract_month = $1
            ORDER BY date_recorded DESC, id DESC
            LIMIT 1"
        ))
        .bind(contract_month.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(FfaPrice::try_from).transpose()
    }

    pub async fn update(&self, id: i64, price: &NewFfaPrice) -> Result<FfaPrice, FreightDeskError> {
        let price = prepare(price)?;
        let row: Option<FfaRow> = sqlx::query_as(&format!(
            "UPDATE ffa_prices SET
                date_recorded = $2, data_source = $3, contract_month = $4, routes = $5,
                spot_prices = $6, mtd_prices = $7, ytd_prices = $8, market_comments = $9,
                metadata = $10, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(price.date_recorded)
        .bind(&price.data_source)
        .bind(price.contract_month.as_str())
        .bind(Json(&price.routes))
        .bind(Json(&price.spot_prices))
        .bind(Json(&price.mtd_prices))
        .bind(Json(&price.ytd_prices))
        .bind(&price.market_comments)
        .bind(Json(&price.metadata))
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| not_found(id))?.try_into()
    }

    pub async fn delete(&self, id: i64) -> Result<(), FreightDeskError> {
        let result = sqlx::query("DELETE FROM ffa_prices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Filtered listing ordered by recording time
    pub async fn find_all(
        &self,
        filter: &FfaFilter,
        page: Page,
        order: SortOrder,
    ) -> Result<Vec<FfaPrice>, FreightDeskError> {
        let mut builder = QueryBuilder::new(format!("SELECT {COLUMNS} FROM ffa_prices WHERE TRUE"));
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY date_recorded ")
            .push(order.as_sql())
            .push(", contract_month LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.skip);

        let rows: Vec<FfaRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    pub async fn count(&self, filter: &FfaFilter) -> Result<i64, FreightDeskError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ffa_prices WHERE TRUE");
        push_filter(&mut builder, filter);
        let (count,): (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub async fn unique_contract_months(&self) -> Result<Vec<String>, FreightDeskError> {
        let months: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT contract_month FROM ffa_prices ORDER BY contract_month",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(months.into_iter().map(|(month,)| month).collect())
    }

    pub async fn unique_route_codes(&self) -> Result<Vec<String>, FreightDeskError> {
        let codes: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT elem->>'routeCode' AS route_code
            FROM ffa_prices
            CROSS JOIN LATERAL jsonb_array_elements(routes) elem
            WHERE elem->>'routeCode' IS NOT NULL
            ORDER BY route_code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(codes.into_iter().map(|(code,)| code).collect())
    }
}
