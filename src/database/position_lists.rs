//! Vessel position list repository
//!
//! Loading and persisting happen here; the list logic itself lives in
//! [`crate::reconcile`] and the list model.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use tracing::info;

use super::models::{convert_all, PositionListRow};
use crate::errors::FreightDeskError;
use crate::models::{
    CustomListRequest, NewPositionList, Page, PortCandidate, PortSearch, PositionList,
    VesselClass, VesselStatus,
};
use crate::reconcile::{self, DistanceEstimator};

const COLUMNS: &str = "id, region, vessel_type, date, available_count, vessels, source, \
    metadata, is_custom, list_name, custom_regions, custom_vessel_types, created_at, updated_at";

#[derive(Clone)]
pub struct PositionListRepository {
    pool: PgPool,
    estimator: Arc<dyn DistanceEstimator>,
}

fn not_found(id: i64) -> FreightDeskError {
    FreightDeskError::NotFound(format!("Position list with ID {} not found", id))
}

fn class_names(classes: &[VesselClass]) -> Vec<String> {
    classes.iter().map(|class| class.as_str().to_string()).collect()
}

impl PositionListRepository {
    pub fn new(pool: PgPool, estimator: Arc<dyn DistanceEstimator>) -> Self {
        Self { pool, estimator }
    }

    /// Validate, derive distances and regions, recount, then insert
    pub async fn save(&self, mut list: NewPositionList) -> Result<PositionList, FreightDeskError> {
        reconcile::prepare_for_save(&mut list, self.estimator.as_ref())?;

        let row: PositionListRow = sqlx::query_as(&format!(
            "INSERT INTO vessel_position_lists (
                region, vessel_type, date, available_count, vessels, source, metadata,
                is_custom, list_name, custom_regions, custom_vessel_types
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}"
        ))
        .bind(&list.region)
        .bind(list.vessel_type.as_str())
        .bind(list.date)
        .bind(count_column(list.available_count)?)
        .bind(Json(&list.vessels))
        .bind(list.source.as_str())
        .bind(Json(&list.metadata))
        .bind(list.is_custom)
        .bind(&list.list_name)
        .bind(Json(&list.custom_regions))
        .bind(Json(&list.custom_vessel_types))
        .fetch_one(&self.pool)
        .await?;

        let saved = PositionList::try_from(row)?;
        info!(
            "Saved position list {} ({} {}, {} vessels, {} available)",
            saved.id,
            saved.list.region,
            saved.list.vessel_type,
            saved.list.vessels.len(),
            saved.list.available_count
        );
        Ok(saved)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<PositionList>, FreightDeskError> {
        let row: Option<PositionListRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM vessel_position_lists WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(PositionList::try_from).transpose()
    }

    /// Newest lists first, optionally narrowed by region and vessel class
    pub async fn find_all(
        &self,
        region: Option<&str>,
        vessel_type: Option<VesselClass>,
        page: Page,
    ) -> Result<Vec<PositionList>, FreightDeskError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM vessel_position_lists WHERE TRUE"
        ));
        if let Some(region) = region {
            builder.push(" AND region = ").push_bind(region.to_string());
        }
        if let Some(class) = vessel_type {
            builder.push(" AND vessel_type = ").push_bind(class.as_str());
        }
        builder
            .push(" ORDER BY date DESC, id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.skip);

        let rows: Vec<PositionListRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    /// Change the status of vessel `imo` in list `id`
    ///
    /// Returns false, without writing, when the vessel is missing or already
    /// has `status`.
    pub async fn update_vessel_status(
        &self,
        id: i64,
        imo: &str,
        status: VesselStatus,
    ) -> Result<bool, FreightDeskError> {
        let mut stored = self.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
        if !stored.list.update_vessel_status(imo, status, Utc::now()) {
            return Ok(false);
        }
        stored.list.recompute_available_count();
        self.store_vessels(id, &stored.list).await?;

        info!("Vessel {} in position list {} is now {}", imo, id, status);
        Ok(true)
    }

    /// Flag repeated IMOs in list `id`, keeping the entries
    pub async fn deduplicate(&self, id: i64) -> Result<PositionList, FreightDeskError> {
        let mut stored = self.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
        stored.list.mark_duplicates();
        stored.list.recompute_available_count();
        self.store_vessels(id, &stored.list).await
    }

    /// Merge matching regular lists into a new named list
    pub async fn create_custom_list(
        &self,
        request: &CustomListRequest,
    ) -> Result<PositionList, FreightDeskError> {
        // newest first, so a repeated IMO keeps its most recent position
        let rows: Vec<PositionListRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM vessel_position_lists
            WHERE NOT is_custom
                AND region = ANY($1)
                AND vessel_type = ANY($2)
                AND date BETWEEN $3 AND $4
            ORDER BY date DESC, id"
        ))
        .bind(&request.regions)
        .bind(class_names(&request.vessel_types))
        .bind(request.start_date)
        .bind(request.end_date)
        .fetch_all(&self.pool)
        .await?;
        let lists: Vec<PositionList> = convert_all(rows)?;

        let merged = reconcile::merge_lists(
            request,
            lists.iter().map(|stored| &stored.list),
            Utc::now().date_naive(),
        )?;
        info!(
            "Custom list '{}' merged from {} lists",
            request.list_name,
            lists.len()
        );
        self.save(merged).await
    }

    /// Open vessels that could reach `search.port`, nearest first
    pub async fn find_ships_from_port(
        &self,
        search: &PortSearch,
    ) -> Result<Vec<PortCandidate>, FreightDeskError> {
        if search.port.trim().is_empty() {
            return Err(FreightDeskError::InvalidInput(
                "Port is required".to_string(),
            ));
        }
        let today = Utc::now().date_naive();
        let date: NaiveDate = search.date.unwrap_or(today);

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM vessel_position_lists WHERE NOT is_custom AND date <= "
        ));
        builder.push_bind(date);
        if let Some(regions) = search.regions.as_ref().filter(|r| !r.is_empty()) {
            builder.push(" AND region = ANY(").push_bind(regions.clone()).push(")");
        }
        if let Some(classes) = search.vessel_types.as_ref().filter(|c| !c.is_empty()) {
            builder
                .push(" AND vessel_type = ANY(")
                .push_bind(class_names(classes))
                .push(")");
        }
        builder.push(" ORDER BY date DESC");

        let rows: Vec<PositionListRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        let lists: Vec<PositionList> = convert_all(rows)?;

        Ok(reconcile::rank_ships_from_port(
            search,
            lists.iter().map(|stored| &stored.list),
            today,
            self.estimator.as_ref(),
        ))
    }

    async fn store_vessels(
        &self,
        id: i64,
        list: &NewPositionList,
    ) -> Result<PositionList, FreightDeskError> {
        let row: Option<PositionListRow> = sqlx::query_as(&format!(
            "UPDATE vessel_position_lists SET
                vessels = $2, available_count = $3, updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(Json(&list.vessels))
        .bind(count_column(list.available_count)?)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| not_found(id))?.try_into()
    }
}

fn count_column(count: u32) -> Result<i32, FreightDeskError> {
    i32::try_from(count)
        .map_err(|_| FreightDeskError::InvalidInput(format!("available count {}", count)))
}
