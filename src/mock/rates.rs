//! Random-walk daily rate series per route

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use rand::Rng;

use super::round2;
use crate::errors::FreightDeskError;
use crate::models::{
    FreightRoute, NewFreightRate, RateMetadata, RateSource, RateType, VesselClass,
};

/// Routes quoted as a USD lump sum instead of Worldscale
pub const USD_ROUTES: [&str; 2] = ["TD1", "TC14"];

pub const PUBLISHER: &str = "Mock Data Generator";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.min..self.max)
    }
}

/// USD/day TCE bands by fuel tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TceBands {
    pub non_eco: Band,
    pub eco: Band,
    pub scrubber: Band,
}

/// Worldscale band of a class; unknown classes trade like Aframaxes
pub fn worldscale_band(class: VesselClass) -> Band {
    match class {
        VesselClass::Vlcc => Band::new(45.0, 65.0),
        VesselClass::Suezmax => Band::new(70.0, 110.0),
        VesselClass::Lr2 => Band::new(90.0, 130.0),
        VesselClass::Lr1 => Band::new(110.0, 150.0),
        VesselClass::Mr => Band::new(120.0, 180.0),
        VesselClass::Aframax | VesselClass::Handysize | VesselClass::Other => {
            Band::new(90.0, 140.0)
        }
    }
}

pub fn tce_bands(class: VesselClass) -> TceBands {
    let (non_eco, eco, scrubber) = match class {
        VesselClass::Vlcc => ((15000.0, 35000.0), (18000.0, 40000.0), (22000.0, 45000.0)),
        VesselClass::Suezmax => ((14000.0, 30000.0), (16000.0, 35000.0), (19000.0, 38000.0)),
        VesselClass::Lr2 => ((13000.0, 29000.0), (15000.0, 33000.0), (18000.0, 36000.0)),
        VesselClass::Lr1 => ((12000.0, 26000.0), (14000.0, 30000.0), (16000.0, 33000.0)),
        VesselClass::Mr => ((10000.0, 24000.0), (12000.0, 27000.0), (14000.0, 30000.0)),
        VesselClass::Aframax | VesselClass::Handysize | VesselClass::Other => {
            ((12000.0, 28000.0), (14000.0, 32000.0), (17000.0, 35000.0))
        }
    };
    TceBands {
        non_eco: Band::new(non_eco.0, non_eco.1),
        eco: Band::new(eco.0, eco.1),
        scrubber: Band::new(scrubber.0, scrubber.1),
    }
}

fn usd_scale(class: VesselClass) -> f64 {
    match class {
        VesselClass::Vlcc => 100_000.0,
        VesselClass::Suezmax => 50_000.0,
        _ => 20_000.0,
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Generate `days` of history for every route, anchored on today (UTC)
pub fn generate_mock_freight_rates(
    routes: &[FreightRoute],
    days: u32,
) -> Result<Vec<NewFreightRate>, FreightDeskError> {
    generate_with(routes, days, Utc::now().date_naive(), &mut rand::rng())
}

/// Generate with an explicit anchor date and random source
///
/// Records run backwards from `today`, one per weekday, per route in input
/// order.
pub fn generate_with<R: Rng + ?Sized>(
    routes: &[FreightRoute],
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Result<Vec<NewFreightRate>, FreightDeskError> {
    if routes.is_empty() {
        return Err(FreightDeskError::InvalidInput(
            "Routes are required to generate mock freight rates".to_string(),
        ));
    }

    let mut rates = Vec::with_capacity(routes.len() * days as usize);
    for route in routes {
        let class = route.vessel_class().unwrap_or(VesselClass::Aframax);
        let rate_type = if USD_ROUTES.contains(&route.route_code.as_str()) {
            RateType::Usd
        } else {
            RateType::Worldscale
        };
        let band = worldscale_band(class);
        let tce = tce_bands(class);

        let mut current = band.sample(rng);
        if rate_type == RateType::Usd {
            current *= usd_scale(class);
        }

        for i in 0..days {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(i))) else {
                break;
            };
            if is_weekend(date) {
                continue;
            }

            let step = match rate_type {
                RateType::Worldscale => rng.random_range(0.5..2.5),
                RateType::Usd => rng.random_range(50_000.0..150_000.0),
            };
            let direction = if rng.random_bool(0.55) { 1.0 } else { -1.0 };
            let proposed = current + direction * step;
            let next = match rate_type {
                RateType::Worldscale => proposed.clamp(band.min * 0.8, band.max * 1.2),
                RateType::Usd => proposed.clamp(current * 0.8, current * 1.2),
            };
            let change = next - current;
            current = next;

            let round = |value: f64| match rate_type {
                RateType::Worldscale => round2(value),
                RateType::Usd => value.round(),
            };

            rates.push(NewFreightRate {
                route_id: route.id,
                date,
                quantity: route.quantity,
                rate: round(next),
                rate_type,
                change: round(change),
                tce_non_eco: Some(tce.non_eco.sample(rng).round()),
                tce_eco: Some(tce.eco.sample(rng).round()),
                tce_scrubber: Some(tce.scrubber.sample(rng).round()),
                source: RateSource::Manual,
                metadata: RateMetadata {
                    is_preliminary: Some(rng.random_bool(0.1)),
                    publisher: Some(PUBLISHER.to_string()),
                    confidence: Some((rng.random_range(7.0..=10.0) * 10.0_f64).round() / 10.0),
                },
            });
        }
    }
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BenchmarkVessel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn route(id: i64, code: &str, class: Option<VesselClass>) -> FreightRoute {
        FreightRoute {
            id,
            route_code: code.to_string(),
            name: code.to_string(),
            origin: "A".to_string(),
            destination: "B".to_string(),
            cargo_type: "Crude Oil".to_string(),
            quantity: Some(80000.0),
            distance: None,
            canal_passages: vec![],
            benchmark_vessel: class.map(|class| BenchmarkVessel {
                vessel_type: Some(class),
                size: None,
                consumption: None,
            }),
            notes: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn empty_routes_is_invalid_input() {
        let result = generate_with(&[], 10, monday(), &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(FreightDeskError::InvalidInput(_))));
    }

    #[test]
    fn skips_weekends_and_stays_in_window() {
        let today = monday();
        let routes = vec![route(1, "TD7", Some(VesselClass::Aframax))];
        let rates = generate_with(&routes, 30, today, &mut StdRng::seed_from_u64(7)).unwrap();

        assert!(!rates.is_empty());
        for rate in &rates {
            assert!(!is_weekend(rate.date));
            assert!(rate.date <= today);
            assert!(rate.date >= today - Days::new(30));
        }
    }

    #[test]
    fn mr_route_scenario() {
        let routes = vec![route(1, "TC2", Some(VesselClass::Mr))];
        let rates = generate_with(&routes, 10, monday(), &mut StdRng::seed_from_u64(42)).unwrap();

        assert!(rates.len() <= 10);
        // Mon 3 Mar back to Sat 22 Feb
        assert_eq!(rates.len(), 6);
        for rate in &rates {
            assert_eq!(rate.route_id, 1);
            assert_eq!(rate.rate_type, RateType::Worldscale);
            assert!(rate.rate >= 120.0 * 0.8 - 1e-9);
            assert!(rate.rate <= 180.0 * 1.2 + 1e-9);
            assert_eq!(rate.source, RateSource::Manual);
            assert_eq!(rate.metadata.publisher.as_deref(), Some(PUBLISHER));
        }
    }

    #[test]
    fn worldscale_stays_in_class_band_over_long_runs() {
        for class in VesselClass::ALL {
            let band = worldscale_band(class);
            let routes = vec![route(3, "TDX", Some(class))];
            let rates =
                generate_with(&routes, 400, monday(), &mut StdRng::seed_from_u64(3)).unwrap();
            for rate in rates {
                assert!(rate.rate >= band.min * 0.8 - 1e-9, "{} below band", rate.rate);
                assert!(rate.rate <= band.max * 1.2 + 1e-9, "{} above band", rate.rate);
            }
        }
    }

    #[test]
    fn usd_routes_move_within_twenty_percent() {
        let routes = vec![route(9, "TD1", Some(VesselClass::Vlcc))];
        let rates = generate_with(&routes, 60, monday(), &mut StdRng::seed_from_u64(11)).unwrap();

        assert!(rates.iter().all(|r| r.rate_type == RateType::Usd));
        assert!(rates[0].rate > 1_000_000.0);
        for pair in rates.windows(2) {
            let (prev, next) = (pair[0].rate, pair[1].rate);
            assert!(next >= prev * 0.8 - 1.0);
            assert!(next <= prev * 1.2 + 1.0);
            assert_eq!(next.fract(), 0.0);
        }
    }

    #[test]
    fn same_shape_for_same_day() {
        let routes = vec![
            route(1, "TD3C", Some(VesselClass::Vlcc)),
            route(2, "TC14", Some(VesselClass::Mr)),
            route(3, "TD9", None),
        ];
        let shape = |seed| {
            generate_with(&routes, 21, monday(), &mut StdRng::seed_from_u64(seed))
                .unwrap()
                .into_iter()
                .map(|r| (r.route_id, r.date))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(1), shape(2));
    }

    #[test]
    fn tce_figures_are_whole_dollars_in_band() {
        let routes = vec![route(1, "TD3C", Some(VesselClass::Vlcc))];
        let rates = generate_with(&routes, 15, monday(), &mut StdRng::seed_from_u64(5)).unwrap();
        let bands = tce_bands(VesselClass::Vlcc);
        for rate in rates {
            let scrubber = rate.tce_scrubber.unwrap();
            assert_eq!(scrubber.fract(), 0.0);
            assert!(scrubber >= bands.scrubber.min && scrubber <= bands.scrubber.max);
            let confidence = rate.metadata.confidence.unwrap();
            assert!((7.0..=10.0).contains(&confidence));
        }
    }

    #[test]
    fn unknown_class_defaults_to_aframax() {
        assert_eq!(worldscale_band(VesselClass::Handysize), Band::new(90.0, 140.0));
        assert_eq!(tce_bands(VesselClass::Other), tce_bands(VesselClass::Aframax));
    }
}
