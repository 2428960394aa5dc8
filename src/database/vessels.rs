//! Q88 vessel profile repository
//!
//! The full profile lives in a JSONB column; identity and the fields used for
//! filtering are copied into plain columns on every write.

use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};

use super::models::VesselRow;
use super::types::{contains_pattern, unique_violation};
use crate::errors::FreightDeskError;
use crate::models::{Imo, Page, Vessel, VesselFilter, VesselProfile};

const COLUMNS: &str = "id, profile, created_at, updated_at";

#[derive(Clone)]
pub struct VesselRepository {
    pool: PgPool,
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &VesselFilter) {
    if let Some(vessel_type) = filter.vessel_type.as_deref().filter(|t| !t.is_empty()) {
        builder
            .push(" AND vessel_type ILIKE ")
            .push_bind(vessel_type.trim().to_string());
    }
    if let Some(flag) = filter.flag.as_deref().filter(|f| !f.is_empty()) {
        builder
            .push(" AND flag ILIKE ")
            .push_bind(flag.trim().to_string());
    }
    if let Some(year) = filter.built_after {
        builder
            .push(" AND EXTRACT(YEAR FROM date_delivered) >= ")
            .push_bind(year);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = contains_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR imo ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR profile->'registeredOwner'->>'name' ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn imo_not_found(imo: &Imo) -> FreightDeskError {
    FreightDeskError::NotFound(format!("Vessel with IMO {} not found", imo))
}

impl VesselRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_imo(&self, imo: &Imo) -> Result<Option<Vessel>, FreightDeskError> {
        let row: Option<VesselRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM vessels WHERE imo = $1"))
                .bind(imo.value())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Vessel::from))
    }

    /// Partial, case-insensitive name match
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Vessel>, FreightDeskError> {
        let rows: Vec<VesselRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM vessels WHERE name ILIKE $1 ORDER BY name"
        ))
        .bind(contains_pattern(name))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Vessel::from).collect())
    }

    pub async fn find_by_type(&self, vessel_type: &str) -> Result<Vec<Vessel>, FreightDeskError> {
        let rows: Vec<VesselRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM vessels WHERE vessel_type ILIKE $1 ORDER BY name"
        ))
        .bind(vessel_type.trim())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Vessel::from).collect())
    }

    pub async fn find_by_flag(&self, flag: &str) -> Result<Vec<Vessel>, FreightDeskError> {
        let rows: Vec<VesselRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM vessels WHERE flag ILIKE $1 ORDER BY name"
        ))
        .bind(flag.trim())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Vessel::from).collect())
    }

    /// Summer deadweight within `[min, max]` tons, largest first
    pub async fn find_by_deadweight_range(
        &self,
        min: f64,
        max: f64,
    ) -> Result<Vec<Vessel>, FreightDeskError> {
        let rows: Vec<VesselRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM vessels
            WHERE summer_deadweight BETWEEN $1 AND $2
            ORDER BY summer_deadweight DESC"
        ))
        .bind(min)
        .bind(max)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Vessel::from).collect())
    }

    /// Cargo capacity within `[min, max]` m3, largest first
    pub async fn find_by_cargo_capacity_range(
        &self,
        min: f64,
        max: f64,
    ) -> Result<Vec<Vessel>, FreightDeskError> {
        let rows: Vec<VesselRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM vessels
            WHERE cargo_capacity BETWEEN $1 AND $2
            ORDER BY cargo_capacity DESC"
        ))
        .bind(min)
        .bind(max)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Vessel::from).collect())
    }

    pub async fn create(&self, profile: &VesselProfile) -> Result<Vessel, FreightDeskError> {
        profile.validate()?;
        let row: VesselRow = sqlx::query_as(&format!(
            "INSERT INTO vessels (
                imo, name, vessel_type, flag, date_delivered,
                summer_deadweight, cargo_capacity, profile
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}"
        ))
        .bind(profile.imo.value())
        .bind(profile.name.trim())
        .bind(&profile.vessel_type)
        .bind(&profile.flag)
        .bind(profile.date_delivered)
        .bind(profile.summer_deadweight())
        .bind(profile.cargo_capacity())
        .bind(Json(profile))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            unique_violation(e, || {
                format!("Vessel with IMO {} already exists", profile.imo)
            })
        })?;

        Ok(row.into())
    }

    /// Replace the stored profile of `imo`
    ///
    /// The IMO itself is the key and is kept even if `profile` carries
    /// another one.
    pub async fn update(
        &self,
        imo: &Imo,
        profile: &VesselProfile,
    ) -> Result<Vessel, FreightDeskError> {
        profile.validate()?;
        let mut profile = profile.clone();
        profile.imo = imo.clone();

        let row: Option<VesselRow> = sqlx::query_as(&format!(
            "UPDATE vessels SET
                name = $2, vessel_type = $3, flag = $4, date_delivered = $5,
                summer_deadweight = $6, cargo_capacity = $7, profile = $8,
                updated_at = now()
            WHERE imo = $1
            RETURNING {COLUMNS}"
        ))
        .bind(imo.value())
        .bind(profile.name.trim())
        .bind(&profile.vessel_type)
        .bind(&profile.flag)
        .bind(profile.date_delivered)
        .bind(profile.summer_deadweight())
        .bind(profile.cargo_capacity())
        .bind(Json(&profile))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vessel::from).ok_or_else(|| imo_not_found(imo))
    }

    pub async fn delete(&self, imo: &Imo) -> Result<(), FreightDeskError> {
        let result = sqlx::query("DELETE FROM vessels WHERE imo = $1")
            .bind(imo.value())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(imo_not_found(imo));
        }
        Ok(())
    }

    pub async fn find_all(
        &self,
        filter: &VesselFilter,
        page: Page,
    ) -> Result<Vec<Vessel>, FreightDeskError> {
        let mut builder = QueryBuilder::new(format!("SELECT {COLUMNS} FROM vessels WHERE TRUE"));
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY name LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.skip);

        let rows: Vec<VesselRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Vessel::from).collect())
    }

    pub async fn count(&self, filter: &VesselFilter) -> Result<i64, FreightDeskError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM vessels WHERE TRUE");
        push_filter(&mut builder, filter);
        let (count,): (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }
}
