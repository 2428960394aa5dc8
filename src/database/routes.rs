//! Freight route repository

use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use tracing::info;

use super::models::RouteRow;
use super::types::{contains_pattern, unique_violation};
use crate::errors::FreightDeskError;
use crate::models::{normalize_route_code, FreightRoute, NewFreightRoute, Page, RouteFilter};

const COLUMNS: &str = "id, route_code, name, origin, destination, cargo_type, quantity, \
    distance, canal_passages, benchmark_vessel, notes, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct RouteRepository {
    pool: PgPool,
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RouteFilter) {
    if let Some(class) = filter.vessel_type {
        builder.push(" AND vessel_type = ").push_bind(class.as_str());
    }
    if let Some(cargo_type) = &filter.cargo_type {
        builder.push(" AND cargo_type = ").push_bind(cargo_type.clone());
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = contains_pattern(search);
        builder
            .push(" AND (route_code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if filter.active_only {
        builder.push(" AND is_active");
    }
}

fn prepare(route: NewFreightRoute) -> Result<NewFreightRoute, FreightDeskError> {
    let route = route.normalized();
    route.validate()?;
    Ok(route)
}

fn not_found(id: i64) -> FreightDeskError {
    FreightDeskError::NotFound(format!("Freight route with ID {} not found", id))
}

impl RouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, route: NewFreightRoute) -> Result<FreightRoute, FreightDeskError> {
        let route = prepare(route)?;
        let code = route.route_code.clone();
        let row: RouteRow = sqlx::query_as(&format!(
            "INSERT INTO freight_routes (
                route_code, name, origin, destination, cargo_type, quantity, distance,
                canal_passages, benchmark_vessel, vessel_type, notes, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}"
        ))
        .bind(&route.route_code)
        .bind(&route.name)
        .bind(&route.origin)
        .bind(&route.destination)
        .bind(&route.cargo_type)
        .bind(route.quantity)
        .bind(route.distance)
        .bind(Json(&route.canal_passages))
        .bind(route.benchmark_vessel.as_ref().map(Json))
        .bind(vessel_type_column(&route))
        .bind(&route.notes)
        .bind(route.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, || format!("Freight route {} already exists", code)))?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<FreightRoute>, FreightDeskError> {
        let row: Option<RouteRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM freight_routes WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(FreightRoute::from))
    }

    /// Lookup ignoring case, `td3c` finds `TD3C`
    pub async fn find_by_route_code(
        &self,
        route_code: &str,
    ) -> Result<Option<FreightRoute>, FreightDeskError> {
        let row: Option<RouteRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM freight_routes WHERE route_code = $1"
        ))
        .bind(normalize_route_code(route_code))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FreightRoute::from))
    }

    pub async fn active_routes(&self) -> Result<Vec<FreightRoute>, FreightDeskError> {
        let rows: Vec<RouteRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM freight_routes WHERE is_active ORDER BY route_code"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FreightRoute::from).collect())
    }

    pub async fn find_all(
        &self,
        filter: &RouteFilter,
        page: Page,
    ) -> Result<Vec<FreightRoute>, FreightDeskError> {
        let mut builder =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM freight_routes WHERE TRUE"));
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY route_code LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.skip);

        let rows: Vec<RouteRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(FreightRoute::from).collect())
    }

    pub async fn count(&self, filter: &RouteFilter) -> Result<i64, FreightDeskError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM freight_routes WHERE TRUE");
        push_filter(&mut builder, filter);
        let (count,): (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Replace every field of route `id`
    pub async fn update(
        &self,
        id: i64,
        route: NewFreightRoute,
    ) -> Result<FreightRoute, FreightDeskError> {
        let route = prepare(route)?;
        let code = route.route_code.clone();
        let row: Option<RouteRow> = sqlx::query_as(&format!(
            "UPDATE freight_routes SET
                route_code = $2, name = $3, origin = $4, destination = $5, cargo_type = $6,
                quantity = $7, distance = $8, canal_passages = $9, benchmark_vessel = $10,
                vessel_type = $11, notes = $12, is_active = $13, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&route.route_code)
        .bind(&route.name)
        .bind(&route.origin)
        .bind(&route.destination)
        .bind(&route.cargo_type)
        .bind(route.quantity)
        .bind(route.distance)
        .bind(Json(&route.canal_passages))
        .bind(route.benchmark_vessel.as_ref().map(Json))
        .bind(vessel_type_column(&route))
        .bind(&route.notes)
        .bind(route.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_violation(e, || format!("Freight route {} already exists", code)))?;

        row.map(FreightRoute::from).ok_or_else(|| not_found(id))
    }

    /// Deactivate without removing rates
    pub async fn soft_delete(&self, id: i64) -> Result<FreightRoute, FreightDeskError> {
        let row: Option<RouteRow> = sqlx::query_as(&format!(
            "UPDATE freight_routes SET is_active = FALSE, updated_at = now()
            WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(FreightRoute::from).ok_or_else(|| not_found(id))
    }

    /// Remove the route and, by cascade, its rates
    pub async fn delete(&self, id: i64) -> Result<(), FreightDeskError> {
        let result = sqlx::query("DELETE FROM freight_routes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Insert all routes in one transaction
    pub async fn bulk_create(
        &self,
        routes: Vec<NewFreightRoute>,
    ) -> Result<Vec<FreightRoute>, FreightDeskError> {
        let routes = routes
            .into_iter()
            .map(prepare)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(routes.len());
        for route in &routes {
            let row: RouteRow = sqlx::query_as(&format!(
                "INSERT INTO freight_routes (
                    route_code, name, origin, destination, cargo_type, quantity, distance,
                    canal_passages, benchmark_vessel, vessel_type, notes, is_active
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING {COLUMNS}"
            ))
            .bind(&route.route_code)
            .bind(&route.name)
            .bind(&route.origin)
            .bind(&route.destination)
            .bind(&route.cargo_type)
            .bind(route.quantity)
            .bind(route.distance)
            .bind(Json(&route.canal_passages))
            .bind(route.benchmark_vessel.as_ref().map(Json))
            .bind(vessel_type_column(route))
            .bind(&route.notes)
            .bind(route.is_active)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                unique_violation(e, || {
                    format!("Freight route {} already exists", route.route_code)
                })
            })?;
            created.push(FreightRoute::from(row));
        }
        tx.commit().await?;

        info!("Created {} freight routes", created.len());
        Ok(created)
    }
}

/// Benchmark class, denormalized for filtering
fn vessel_type_column(route: &NewFreightRoute) -> Option<&'static str> {
    route
        .benchmark_vessel
        .as_ref()
        .and_then(|vessel| vessel.vessel_type)
        .map(|class| class.as_str())
}
