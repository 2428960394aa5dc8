//! Store-backed tests; each gets a fresh database from `DATABASE_URL`

use chrono::{NaiveDate, TimeZone, Utc};
use sqlx::PgPool;

use freight_desk::{
    config::SourcesConfig,
    database::Database,
    errors::FreightDeskError,
    fetchers::{Fetchers, RateFetchOptions},
    mock::{mock_freight_routes, mock_vessels},
    models::{
        ContractMonth, CustomListRequest, FfaMetadata, ListMetadata, ListSource, NewFfaPrice,
        NewFreightRate, NewPositionList, PortSearch, RateMetadata, RateSource, RateType,
        RoutePrice, VesselClass, VesselEntry, VesselStatus,
    },
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn mock_sources() -> SourcesConfig {
    SourcesConfig {
        use_mock_data: true,
        ..Default::default()
    }
}

fn entry(imo: &str, port: &str, open_date: NaiveDate) -> VesselEntry {
    VesselEntry {
        vessel_name: format!("VESSEL {}", imo),
        imo: imo.to_string(),
        build_year: Some(2016),
        dwt: Some(109000.0),
        cbm: Some(124000.0),
        export_port: port.to_string(),
        open_date,
        owner: None,
        ice_class: None,
        cargo_preferences: None,
        comments: None,
        status: VesselStatus::Available,
        is_duplicate: false,
        distance_to_region: None,
        region_of_export_port: None,
        status_history: vec![],
    }
}

fn position_list(
    region: &str,
    class: VesselClass,
    day: NaiveDate,
    vessels: Vec<VesselEntry>,
) -> NewPositionList {
    NewPositionList {
        region: region.to_string(),
        vessel_type: class,
        date: day,
        available_count: 0,
        vessels,
        source: ListSource::Email,
        metadata: ListMetadata::default(),
        is_custom: false,
        list_name: None,
        custom_regions: vec![],
        custom_vessel_types: vec![],
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn route_codes_are_unique(pool: PgPool) {
    let db = Database::from_pool(pool);
    let routes = db.routes();
    let td3c = mock_freight_routes()
        .into_iter()
        .find(|route| route.route_code == "TD3C")
        .unwrap();

    let created = routes.create(td3c.clone()).await.unwrap();
    assert_eq!(created.route_code, "TD3C");

    let mut lowercase = td3c;
    lowercase.route_code = "td3c".to_string();
    match routes.create(lowercase).await {
        Err(FreightDeskError::AlreadyExists(message)) => {
            assert_eq!(message, "Freight route TD3C already exists")
        }
        other => panic!("expected duplicate error, got {:?}", other.map(|r| r.id)),
    }

    let found = routes.find_by_route_code("td3c").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn rate_fetch_upserts_by_route_and_day(pool: PgPool) {
    let db = Database::from_pool(pool);
    let fetchers = Fetchers::new(&db, &mock_sources());
    let grid = &fetchers.freight_grid;

    let init = grid.initialize_routes().await.unwrap();
    assert_eq!(init.count, mock_freight_routes().len());
    let again = grid.initialize_routes().await.unwrap();
    assert_eq!(
        again.message,
        format!("{} freight routes already exist", init.count)
    );

    let options = RateFetchOptions {
        days_of_history: Some(3),
        ..Default::default()
    };
    let first = grid.fetch_and_save_rates(&options).await.unwrap();
    assert!(first.errors.is_empty());
    assert_eq!(first.created, first.total);

    let second = grid.fetch_and_save_rates(&options).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, second.total);

    let latest = db.rates().latest_rates().await.unwrap();
    assert_eq!(latest.len(), init.count);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn rate_change_follows_previous_rate(pool: PgPool) {
    let db = Database::from_pool(pool);
    let route = db
        .routes()
        .create(mock_freight_routes().remove(0))
        .await
        .unwrap();
    let rates = db.rates();

    let mut rate = NewFreightRate {
        route_id: route.id,
        date: date(2025, 3, 3),
        quantity: None,
        rate: 55.0,
        rate_type: RateType::Worldscale,
        change: 0.0,
        tce_non_eco: None,
        tce_eco: None,
        tce_scrubber: None,
        source: RateSource::Manual,
        metadata: RateMetadata::default(),
    };
    assert_eq!(
        rates
            .calculate_rate_change(route.id, rate.rate, rate.rate_type)
            .await,
        0.0
    );
    rates.create(&rate).await.unwrap();

    rate.date = date(2025, 3, 4);
    rate.rate = 57.5;
    let change = rates
        .calculate_rate_change(route.id, rate.rate, rate.rate_type)
        .await;
    assert!((change - 2.5).abs() < 1e-9);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn contract_month_lookup_ignores_case(pool: PgPool) {
    let db = Database::from_pool(pool);
    let price = NewFfaPrice {
        date_recorded: Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap(),
        data_source: "Manual Entry".to_string(),
        contract_month: ContractMonth::new("MAR25").unwrap(),
        routes: vec![RoutePrice {
            route_code: "td3c".to_string(),
            route_description: None,
            worldscale: Some(59.71),
            dollar_per_mt: Some(12.89),
            cents_per_bbl: Some(175.79),
            tce: None,
        }],
        spot_prices: Default::default(),
        mtd_prices: Default::default(),
        ytd_prices: Default::default(),
        market_comments: None,
        metadata: FfaMetadata::default(),
    };
    db.ffa().create(&price).await.unwrap();

    let found = db.ffa().find_by_contract_month("mar25").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].contract_month.as_str(), "MAR25");
    assert_eq!(found[0].routes[0].route_code, "TD3C");

    let history = db
        .ffa()
        .route_history("TD3C", None, None, None)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].route.worldscale, Some(59.71));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn vessels_are_keyed_by_imo(pool: PgPool) {
    let db = Database::from_pool(pool);
    let vessels = db.vessels();
    let profile = mock_vessels(1).unwrap().remove(0);

    vessels.create(&profile).await.unwrap();
    assert!(matches!(
        vessels.create(&profile).await,
        Err(FreightDeskError::AlreadyExists(_))
    ));

    let stored = vessels.find_by_imo(&profile.imo).await.unwrap().unwrap();
    assert_eq!(stored.profile.name, profile.name);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn status_update_reports_change(pool: PgPool) {
    let db = Database::from_pool(pool);
    let lists = db.position_lists();
    let day = date(2025, 3, 4);
    let saved = lists
        .save(position_list(
            "ARA",
            VesselClass::Lr2,
            day,
            vec![entry("9321483", "Rotterdam", day)],
        ))
        .await
        .unwrap();
    assert_eq!(saved.list.available_count, 1);
    assert_eq!(saved.list.vessels[0].distance_to_region, Some(10.0));

    assert!(lists
        .update_vessel_status(saved.id, "9321483", VesselStatus::OnSubs)
        .await
        .unwrap());
    assert!(!lists
        .update_vessel_status(saved.id, "9321483", VesselStatus::OnSubs)
        .await
        .unwrap());

    let stored = lists.find_by_id(saved.id).await.unwrap().unwrap();
    assert_eq!(stored.list.available_count, 0);
    assert_eq!(stored.list.vessels[0].status_history.len(), 1);

    assert!(matches!(
        lists
            .update_vessel_status(saved.id + 1000, "9321483", VesselStatus::OnSubs)
            .await,
        Err(FreightDeskError::NotFound(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deduplicate_flags_repeat_imos(pool: PgPool) {
    let db = Database::from_pool(pool);
    let lists = db.position_lists();
    let day = date(2025, 3, 4);
    let saved = lists
        .save(position_list(
            "ARA",
            VesselClass::Lr2,
            day,
            vec![
                entry("9321483", "Rotterdam", day),
                entry("9321483", "Antwerp", day),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(saved.list.available_count, 2);

    let deduplicated = lists.deduplicate(saved.id).await.unwrap();
    assert_eq!(deduplicated.list.vessels.len(), 2);
    assert!(!deduplicated.list.vessels[0].is_duplicate);
    assert!(deduplicated.list.vessels[1].is_duplicate);
    assert_eq!(deduplicated.list.available_count, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn custom_list_merges_matching_lists(pool: PgPool) {
    let db = Database::from_pool(pool);
    let lists = db.position_lists();
    let day = date(2025, 3, 4);
    lists
        .save(position_list(
            "ARA",
            VesselClass::Lr2,
            day,
            vec![entry("9321483", "Rotterdam", day), entry("9400001", "Antwerp", day)],
        ))
        .await
        .unwrap();
    lists
        .save(position_list(
            "Mediterranean",
            VesselClass::Lr2,
            date(2025, 3, 3),
            vec![entry("9321483", "Gibraltar", day), entry("9400002", "Piraeus", day)],
        ))
        .await
        .unwrap();
    lists
        .save(position_list(
            "ARA",
            VesselClass::Mr,
            day,
            vec![entry("9400003", "Rotterdam", day)],
        ))
        .await
        .unwrap();

    let custom = lists
        .create_custom_list(&CustomListRequest {
            list_name: "Med and ARA LR2".to_string(),
            regions: vec!["ARA".to_string(), "Mediterranean".to_string()],
            vessel_types: vec![VesselClass::Lr2],
            start_date: date(2025, 3, 1),
            end_date: date(2025, 3, 31),
        })
        .await
        .unwrap();

    assert!(custom.list.is_custom);
    assert_eq!(custom.list.region, "ARA, Mediterranean");
    assert_eq!(custom.list.vessel_type, VesselClass::Lr2);
    let imos: Vec<&str> = custom.list.vessels.iter().map(|v| v.imo.as_str()).collect();
    assert_eq!(imos, ["9321483", "9400001", "9400002"]);
    // newest list wins for an IMO listed twice
    assert_eq!(custom.list.vessels[0].export_port, "Rotterdam");
    assert_eq!(
        custom.list.vessels[0].region_of_export_port.as_deref(),
        Some("ARA")
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn ships_from_port_are_ranked_by_distance(pool: PgPool) {
    let db = Database::from_pool(pool);
    let lists = db.position_lists();
    let day = date(2025, 3, 4);
    lists
        .save(position_list(
            "ARA",
            VesselClass::Lr2,
            day,
            vec![
                entry("9400010", "Gibraltar", day),
                entry("9400011", "Antwerp", day),
                entry("9400012", "Rotterdam", date(2025, 3, 20)),
            ],
        ))
        .await
        .unwrap();

    let candidates = lists
        .find_ships_from_port(&PortSearch {
            port: "ARA".to_string(),
            date: Some(day),
            ..Default::default()
        })
        .await
        .unwrap();

    let imos: Vec<&str> = candidates.iter().map(|c| c.imo.as_str()).collect();
    assert_eq!(imos, ["9400011", "9400010"]);
    assert_eq!(candidates[0].distance_to_port, 0.0);
    assert!((candidates[1].transit_time_hours - 500.0 / 14.0).abs() < 1e-9);

    assert!(matches!(
        lists
            .find_ships_from_port(&PortSearch {
                port: " ".to_string(),
                ..Default::default()
            })
            .await,
        Err(FreightDeskError::InvalidInput(_))
    ));
}
