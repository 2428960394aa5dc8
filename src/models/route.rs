//! Freight routes: static route descriptors (TD3C, TC2, ...)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{normalize_route_code, VesselClass};
use crate::errors::FreightDeskError;

/// Standard vessel used to quote a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BenchmarkVessel {
    #[serde(rename = "type")]
    pub vessel_type: Option<VesselClass>,
    /// Typical size in DWT
    pub size: Option<f64>,
    /// Typical consumption in MT/day
    pub consumption: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassageDirection {
    Northbound,
    Southbound,
    Eastbound,
    Westbound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanalPassage {
    pub name: String,
    pub direction: Option<PassageDirection>,
}

/// Route as submitted for creation or replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFreightRoute {
    pub route_code: String,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub cargo_type: String,
    /// Typical cargo size in metric tons
    #[serde(default)]
    pub quantity: Option<f64>,
    /// Distance in nautical miles
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub canal_passages: Vec<CanalPassage>,
    #[serde(default)]
    pub benchmark_vessel: Option<BenchmarkVessel>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Stored route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreightRoute {
    pub id: i64,
    pub route_code: String,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub cargo_type: String,
    pub quantity: Option<f64>,
    pub distance: Option<f64>,
    pub canal_passages: Vec<CanalPassage>,
    pub benchmark_vessel: Option<BenchmarkVessel>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FreightRoute {
    /// Benchmark vessel class, if the route names one
    pub fn vessel_class(&self) -> Option<VesselClass> {
        self.benchmark_vessel
            .as_ref()
            .and_then(|vessel| vessel.vessel_type)
    }
}

impl NewFreightRoute {
    /// Trim text fields and uppercase the route code
    pub fn normalized(mut self) -> Self {
        self.route_code = normalize_route_code(&self.route_code);
        self.name = self.name.trim().to_string();
        self.origin = self.origin.trim().to_string();
        self.destination = self.destination.trim().to_string();
        self.cargo_type = self.cargo_type.trim().to_string();
        self.notes = self.notes.map(|notes| notes.trim().to_string());
        self
    }

    pub fn validate(&self) -> Result<(), FreightDeskError> {
        let required = [
            ("routeCode", &self.route_code),
            ("name", &self.name),
            ("origin", &self.origin),
            ("destination", &self.destination),
            ("cargoType", &self.cargo_type),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(FreightDeskError::ValidationError(format!(
                    "Route {} is required",
                    field
                )));
            }
        }
        if self.quantity.is_some_and(|q| q < 0.0) {
            return Err(FreightDeskError::ValidationError(
                "Route quantity cannot be negative".to_string(),
            ));
        }
        if self.distance.is_some_and(|d| d < 0.0) {
            return Err(FreightDeskError::ValidationError(
                "Route distance cannot be negative".to_string(),
            ));
        }
        if let Some(vessel) = &self.benchmark_vessel {
            if vessel.size.is_some_and(|size| size <= 0.0) {
                return Err(FreightDeskError::ValidationError(
                    "Benchmark vessel size must be positive".to_string(),
                ));
            }
            if vessel.consumption.is_some_and(|c| c < 0.0) {
                return Err(FreightDeskError::ValidationError(
                    "Benchmark vessel consumption cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl From<&FreightRoute> for NewFreightRoute {
    fn from(route: &FreightRoute) -> Self {
        Self {
            route_code: route.route_code.clone(),
            name: route.name.clone(),
            origin: route.origin.clone(),
            destination: route.destination.clone(),
            cargo_type: route.cargo_type.clone(),
            quantity: route.quantity,
            distance: route.distance,
            canal_passages: route.canal_passages.clone(),
            benchmark_vessel: route.benchmark_vessel.clone(),
            notes: route.notes.clone(),
            is_active: route.is_active,
        }
    }
}

/// Listing filter for routes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteFilter {
    pub vessel_type: Option<VesselClass>,
    pub cargo_type: Option<String>,
    /// Case-insensitive match on code or name
    pub search: Option<String>,
    pub active_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn td3c() -> NewFreightRoute {
        NewFreightRoute {
            route_code: " td3c ".to_string(),
            name: "Persian Gulf to China".to_string(),
            origin: "Persian Gulf".to_string(),
            destination: "China".to_string(),
            cargo_type: "Crude Oil".to_string(),
            quantity: Some(270000.0),
            distance: Some(5620.0),
            canal_passages: vec![],
            benchmark_vessel: Some(BenchmarkVessel {
                vessel_type: Some(VesselClass::Vlcc),
                size: Some(300000.0),
                consumption: Some(82.0),
            }),
            notes: None,
            is_active: true,
        }
    }

    #[test]
    fn normalizes_route_code() {
        assert_eq!(td3c().normalized().route_code, "TD3C");
    }

    #[test]
    fn rejects_invalid_benchmark_size() {
        let mut route = td3c();
        route.benchmark_vessel.as_mut().unwrap().size = Some(0.0);
        assert!(matches!(
            route.validate(),
            Err(FreightDeskError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_missing_origin() {
        let mut route = td3c();
        route.origin = "  ".to_string();
        assert!(route.validate().is_err());
        assert!(td3c().validate().is_ok());
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let route: NewFreightRoute = serde_json::from_str(
            r#"{
                "routeCode": "TC2",
                "name": "Continent to USAC",
                "origin": "Rotterdam",
                "destination": "New York",
                "cargoType": "Clean Petroleum Products",
                "quantity": 37000,
                "benchmarkVessel": { "type": "MR", "size": 37000 }
            }"#,
        )
        .unwrap();
        assert!(route.is_active);
        assert_eq!(
            route.benchmark_vessel.unwrap().vessel_type,
            Some(VesselClass::Mr)
        );
    }
}
