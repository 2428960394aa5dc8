//! Benchmark tanker routes used to seed an empty route table

use crate::models::{
    route::PassageDirection, BenchmarkVessel, CanalPassage, NewFreightRoute, VesselClass,
};

struct RouteSeed {
    code: &'static str,
    name: &'static str,
    origin: &'static str,
    destination: &'static str,
    clean: bool,
    quantity: f64,
    distance: f64,
    class: VesselClass,
    size: f64,
    consumption: f64,
    passage: Option<(&'static str, PassageDirection)>,
    notes: Option<&'static str>,
}

#[allow(clippy::too_many_arguments)]
fn seed(
    code: &'static str,
    name: &'static str,
    origin: &'static str,
    destination: &'static str,
    clean: bool,
    quantity: f64,
    distance: f64,
    class: VesselClass,
    size: f64,
    consumption: f64,
) -> RouteSeed {
    RouteSeed {
        code,
        name,
        origin,
        destination,
        clean,
        quantity,
        distance,
        class,
        size,
        consumption,
        passage: None,
        notes: None,
    }
}

#[rustfmt::skip]
fn seeds() -> Vec<RouteSeed> {
    use VesselClass::*;

    vec![
        RouteSeed {
            passage: Some(("Cape of Good Hope", PassageDirection::Eastbound)),
            notes: Some("Ballast via Cape of Good Hope"),
            ..seed("TD1", "Persian Gulf to US Gulf", "Persian Gulf", "US Gulf", false, 280000.0, 12650.0, Vlcc, 300000.0, 90.0)
        },
        seed("TD2", "Persian Gulf to Singapore", "Persian Gulf", "Singapore", false, 260000.0, 3650.0, Vlcc, 300000.0, 80.0),
        seed("TD3C", "Persian Gulf to China", "Persian Gulf", "China", false, 270000.0, 5620.0, Vlcc, 300000.0, 82.0),
        RouteSeed {
            passage: Some(("Cape of Good Hope", PassageDirection::Eastbound)),
            ..seed("TD15", "West Africa to China", "West Africa", "China", false, 260000.0, 10730.0, Vlcc, 300000.0, 85.0)
        },
        RouteSeed {
            passage: Some(("Bosphorus", PassageDirection::Southbound)),
            ..seed("TD6", "Black Sea to Mediterranean", "Black Sea", "Mediterranean", false, 135000.0, 1230.0, Suezmax, 145000.0, 52.0)
        },
        seed("TD20", "West Africa to UK/Continent", "West Africa", "UK/Continent", false, 130000.0, 4040.0, Suezmax, 145000.0, 50.0),
        seed("TD7", "North Sea to Continent", "North Sea", "Continent", false, 80000.0, 830.0, Aframax, 105000.0, 45.0),
        seed("TD8", "Kuwait to Singapore", "Kuwait", "Singapore", false, 80000.0, 3800.0, Aframax, 105000.0, 42.0),
        seed("TD9", "Caribbean to US Gulf", "Caribbean", "US Gulf", false, 70000.0, 1950.0, Aframax, 105000.0, 40.0),
        seed("TD19", "Cross Mediterranean", "Mediterranean", "Mediterranean", false, 80000.0, 850.0, Aframax, 105000.0, 44.0),
        seed("TC1", "Persian Gulf to Japan", "Persian Gulf", "Japan", true, 75000.0, 6570.0, Lr2, 110000.0, 46.0),
        seed("TC2", "Continent to USAC", "Continent", "US Atlantic Coast", true, 37000.0, 3450.0, Mr, 50000.0, 30.0),
        seed("TC5", "Persian Gulf to Japan", "Persian Gulf", "Japan", true, 55000.0, 6570.0, Lr1, 75000.0, 38.0),
        seed("TC14", "US Gulf to Continent", "US Gulf", "Continent", true, 38000.0, 4825.0, Mr, 50000.0, 32.0),
    ]
}

/// The standard Baltic tanker routes, crude first
pub fn mock_freight_routes() -> Vec<NewFreightRoute> {
    seeds()
        .into_iter()
        .map(|seed| NewFreightRoute {
            route_code: seed.code.to_string(),
            name: seed.name.to_string(),
            origin: seed.origin.to_string(),
            destination: seed.destination.to_string(),
            cargo_type: if seed.clean {
                "Clean Petroleum Products".to_string()
            } else {
                "Crude Oil".to_string()
            },
            quantity: Some(seed.quantity),
            distance: Some(seed.distance),
            canal_passages: seed
                .passage
                .into_iter()
                .map(|(name, direction)| CanalPassage {
                    name: name.to_string(),
                    direction: Some(direction),
                })
                .collect(),
            benchmark_vessel: Some(BenchmarkVessel {
                vessel_type: Some(seed.class),
                size: Some(seed.size),
                consumption: Some(seed.consumption),
            }),
            notes: seed.notes.map(str::to_string),
            is_active: true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn routes_are_valid_and_unique() {
        let routes = mock_freight_routes();
        assert_eq!(routes.len(), 14);

        let codes: HashSet<&str> = routes.iter().map(|r| r.route_code.as_str()).collect();
        assert_eq!(codes.len(), routes.len());

        for route in &routes {
            route.validate().unwrap();
        }
    }

    #[test]
    fn td1_passes_the_cape() {
        let routes = mock_freight_routes();
        let td1 = routes.iter().find(|r| r.route_code == "TD1").unwrap();
        assert_eq!(td1.canal_passages[0].name, "Cape of Good Hope");
        assert_eq!(
            td1.benchmark_vessel.as_ref().unwrap().vessel_type,
            Some(VesselClass::Vlcc)
        );
    }
}
