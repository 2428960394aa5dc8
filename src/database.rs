//! PostgreSQL store and per-domain repositories

pub mod ffa;
pub mod models;
pub mod position_lists;
pub mod rates;
pub mod routes;
pub mod types;
pub mod vessels;

use std::sync::Arc;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{error, info};

use crate::{
    config::DatabaseConfig,
    errors::FreightDeskError,
    reconcile::{DistanceEstimator, DistanceTable},
};

pub use ffa::FfaRepository;
pub use position_lists::PositionListRepository;
pub use rates::RateRepository;
pub use routes::RouteRepository;
pub use vessels::VesselRepository;

/// Connection pool with migrations applied
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect with the configured pool size and run migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, FreightDeskError> {
        config.validate()?;

        info!(
            "Connecting to database, max_connections={}",
            config.max_connections
        );
        let pool = match PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to connect to database: {}", e);
                return Err(e.into());
            }
        };

        Self::new(pool).await
    }

    /// Wrap an existing pool, running migrations first
    pub async fn new(pool: PgPool) -> Result<Self, FreightDeskError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
        Ok(Self { pool })
    }

    /// Wrap a pool without touching the schema
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn routes(&self) -> RouteRepository {
        RouteRepository::new(self.pool.clone())
    }

    pub fn rates(&self) -> RateRepository {
        RateRepository::new(self.pool.clone())
    }

    pub fn ffa(&self) -> FfaRepository {
        FfaRepository::new(self.pool.clone())
    }

    pub fn vessels(&self) -> VesselRepository {
        VesselRepository::new(self.pool.clone())
    }

    /// Position lists with the fixed distance table
    pub fn position_lists(&self) -> PositionListRepository {
        self.position_lists_with(Arc::new(DistanceTable))
    }

    pub fn position_lists_with(
        &self,
        estimator: Arc<dyn DistanceEstimator>,
    ) -> PositionListRepository {
        PositionListRepository::new(self.pool.clone(), estimator)
    }
}
