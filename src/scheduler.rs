//! Periodic fetch cycles

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::errors::FreightDeskError;
use crate::fetchers::{FfaFetchOptions, Fetchers, RateFetchOptions, VesselFetchOptions};

/// Run `cycle` now and then on every `period` tick until the task is aborted
pub fn run_every<F, Fut, T>(name: &'static str, period: Duration, mut cycle: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, FreightDeskError>> + Send + 'static,
    T: Debug + Send + 'static,
{
    tokio::spawn(async move {
        info!("Scheduling {} every {:?}", name, period);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match cycle().await {
                Ok(result) => info!("{} completed: {:?}", name, result),
                Err(e) => error!("Error in {}: {}", name, e),
            }
        }
    })
}

/// One task per domain. The freight grid seeds its routes before the
/// first rate fetch.
pub fn spawn_fetch_cycles(fetchers: Fetchers, period: Duration) -> Vec<JoinHandle<()>> {
    let q88 = fetchers.q88.clone();
    let ffa = fetchers.ffa.clone();
    let grid = fetchers.freight_grid.clone();

    let mut handles = vec![
        run_every("Q88 vessel fetch", period, move || {
            let q88 = q88.clone();
            async move { q88.fetch_and_save(&VesselFetchOptions::default()).await }
        }),
        run_every("FFA price fetch", period, move || {
            let ffa = ffa.clone();
            async move { ffa.fetch_and_save(&FfaFetchOptions::default()).await }
        }),
    ];

    handles.push(tokio::spawn(async move {
        match grid.initialize_routes().await {
            Ok(result) => info!("Freight routes initialized: {}", result.message),
            Err(e) => error!("Error initializing freight routes: {}", e),
        }
        let cycle = run_every("freight rate fetch", period, move || {
            let grid = grid.clone();
            async move { grid.fetch_and_save_rates(&RateFetchOptions::default()).await }
        });
        if let Err(e) = cycle.await {
            error!("Freight rate schedule stopped: {}", e);
        }
    }));

    handles
}

/// Populate an empty store once: routes then rates, vessels, FFA prices
pub fn seed_mock_data(fetchers: Fetchers) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Seeding mock data");
        match fetchers.freight_grid.initialize_routes().await {
            Ok(result) => {
                info!("{}", result.message);
                match fetchers
                    .freight_grid
                    .fetch_and_save_rates(&RateFetchOptions::default())
                    .await
                {
                    Ok(summary) => info!("Mock freight rates saved: {:?}", summary),
                    Err(e) => error!("Error seeding freight rates: {}", e),
                }
            }
            Err(e) => error!("Error seeding freight routes: {}", e),
        }

        match fetchers.q88.fetch_and_save(&VesselFetchOptions::default()).await {
            Ok(summary) => info!("Mock vessels saved: {:?}", summary),
            Err(e) => error!("Error seeding vessels: {}", e),
        }
        match fetchers.ffa.fetch_and_save(&FfaFetchOptions::default()).await {
            Ok(summary) => info!("Mock FFA prices saved: {:?}", summary),
            Err(e) => error!("Error seeding FFA prices: {}", e),
        }
    })
}
