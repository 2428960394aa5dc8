//! Vessel technical profiles (Q88 questionnaire data)
//!
//! Every section of the questionnaire is an explicit struct of optional
//! fields. A section the source did not provide is `None`, not an empty
//! object.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Imo;
use crate::errors::FreightDeskError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviousName {
    pub name: Option<String>,
    pub date_changed: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactDetails {
    pub tel: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct OwnerInfo {
    pub name: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub tel: Option<String>,
    pub fax: Option<String>,
    pub telex: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "companyIMO")]
    pub company_imo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ParallelBodyCondition {
    pub forward_to_mid_point_manifold: Option<f64>,
    pub aft_to_mid_point_manifold: Option<f64>,
    pub length: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ParallelBody {
    pub lightship: Option<ParallelBodyCondition>,
    pub normal_ballast: Option<ParallelBodyCondition>,
    pub summer_dwt: Option<ParallelBodyCondition>,
}

/// Main dimensions, metres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Dimensions {
    pub length_overall: Option<f64>,
    pub length_between_perpendiculars: Option<f64>,
    pub beam: Option<f64>,
    pub moulded_depth: Option<f64>,
    pub keel_to_masthead: Option<f64>,
    pub bridge_front_to_manifold: Option<f64>,
    pub bow_to_center_manifold: Option<f64>,
    pub stern_to_center_manifold: Option<f64>,
    pub parallel_body: Option<ParallelBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Tonnages {
    pub net: Option<f64>,
    pub gross: Option<f64>,
    pub reduced_gross: Option<f64>,
    pub suez_canal_gross: Option<f64>,
    pub suez_canal_net: Option<f64>,
    pub panama_canal_net: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadlineCondition {
    pub freeboard: Option<f64>,
    pub draft: Option<f64>,
    pub deadweight: Option<f64>,
    pub displacement: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct AirDraft {
    pub summer_deadweight: Option<f64>,
    pub normal_ballast: Option<f64>,
    pub lightship: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Loadline {
    pub summer: Option<LoadlineCondition>,
    pub winter: Option<LoadlineCondition>,
    pub tropical: Option<LoadlineCondition>,
    pub air_draft: Option<AirDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Certificate {
    pub issued: Option<NaiveDate>,
    pub last_annual: Option<NaiveDate>,
    pub last_intermediate: Option<NaiveDate>,
    pub expires: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Certificates {
    pub safety_equipment: Option<Certificate>,
    pub safety_radio: Option<Certificate>,
    pub safety_construction: Option<Certificate>,
    pub loadline: Option<Certificate>,
    pub oil_pollution_prevention: Option<Certificate>,
    pub ship_security: Option<Certificate>,
    pub maritime_labour: Option<Certificate>,
    pub ism_safety_management: Option<Certificate>,
    pub document_of_compliance: Option<Certificate>,
    pub uscg_certificate_of_compliance: Option<Certificate>,
    pub civil_liability_convention: Option<Certificate>,
    pub bunker_oil_pollution: Option<Certificate>,
    pub liability_for_removal_of_wrecks: Option<Certificate>,
    pub us_certificate_of_financial_responsibility: Option<Certificate>,
    pub class_of_certificate: Option<Certificate>,
    pub sewage_pollution_prevention: Option<Certificate>,
    pub certificate_of_fitness: Option<Certificate>,
    pub energy_efficiency: Option<Certificate>,
    pub air_pollution_prevention: Option<Certificate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Complement {
    pub number: Option<u32>,
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Crew {
    pub officers: Option<Complement>,
    pub crew: Option<Complement>,
    pub common_working_language: Option<String>,
    pub officers_speak_english: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UsCallsInfo {
    pub vessel_spill_response_plan: Option<bool>,
    pub qualified_individual: Option<String>,
    pub oil_spill_response_organization: Option<String>,
    pub salvage_and_firefighting: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct HelicopterFacilities {
    /// "Winching" or "Landing"
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub circle_diameter: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Segregation {
    pub name: Option<String>,
    pub capacity: Option<f64>,
    pub tanks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CenterlineBulkhead {
    pub fitted: Option<bool>,
    /// Solid or perforated
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SlopTanks {
    pub number: Option<u32>,
    pub total_capacity: Option<f64>,
    pub segregations: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifoldRates {
    pub per_manifold: Option<f64>,
    pub all_manifolds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoadingRates {
    #[serde(rename = "withVECS")]
    pub with_vecs: Option<ManifoldRates>,
    #[serde(rename = "withoutVECS")]
    pub without_vecs: Option<ManifoldRates>,
}

/// Cargo tank arrangement, capacities in m3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CargoTanks {
    pub number: Option<u32>,
    pub total_capacity: Option<f64>,
    pub natural_segregations: Vec<Segregation>,
    pub centerline_bulkhead: Option<CenterlineBulkhead>,
    pub slop_tanks: Option<SlopTanks>,
    pub residual_tank_capacity: Option<f64>,
    pub sbt_capacity: Option<f64>,
    pub sbt_percentage: Option<f64>,
    #[serde(rename = "meetsMARPOLRequirements")]
    pub meets_marpol_requirements: Option<bool>,
    pub grades_load_discharge: Option<u32>,
    pub filling_restrictions: Option<String>,
    pub loading_rates: Option<LoadingRates>,
    pub cargo_control_room: Option<bool>,
    #[serde(rename = "ullageReadFromCCR")]
    pub ullage_read_from_ccr: Option<bool>,
}

/// Pump or eductor: capacity m3/hr, head metres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Pump {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub capacity: Option<f64>,
    pub head: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CargoPumps {
    pub max_simultaneous_pumps: Option<u32>,
    pub pumps: Vec<Pump>,
    pub eductors: Vec<Pump>,
    pub stripping: Vec<Pump>,
    pub emergency_portable_pump: Option<bool>,
}

/// Manifold arrangement, distances in mm unless noted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Manifold {
    pub total_number: Option<u32>,
    pub size: Option<f64>,
    pub type_of_valves: Option<String>,
    pub material: Option<String>,
    pub rating: Option<String>,
    pub distance_between_centers: Option<f64>,
    pub distance_ships_rail_to_manifold: Option<f64>,
    pub distance_manifold_to_ships_side: Option<f64>,
    pub top_of_rail_to_center_manifold: Option<f64>,
    pub distance_main_deck_to_center_manifold: Option<f64>,
    pub spill_tank_grating_to_center_manifold: Option<f64>,
    /// metres
    pub height_above_waterline_normal_ballast: Option<f64>,
    /// metres
    #[serde(rename = "heightAboveWaterlineSDWT")]
    pub height_above_waterline_sdwt: Option<f64>,
    pub reducers: Option<String>,
    pub stern_manifold_fitted: Option<bool>,
    pub stern_manifold_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct HeatingSystem {
    pub system: Option<String>,
    pub material: Option<String>,
}

/// Degrees Celsius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TemperatureLimits {
    pub load: Option<f64>,
    pub maintain: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Heating {
    pub cargo_tanks: Option<HeatingSystem>,
    pub slop_tanks: Option<HeatingSystem>,
    pub max_temperature: Option<TemperatureLimits>,
    pub min_temperature: Option<TemperatureLimits>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct InertGasSystem {
    pub fitted: Option<bool>,
    pub operational: Option<bool>,
    pub supplied_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CrudeOilWashing {
    pub fitted: Option<bool>,
    pub operational: Option<bool>,
}

/// Full questionnaire as fetched or submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselProfile {
    pub imo: Imo,
    pub name: String,
    pub date_updated: DateTime<Utc>,
    #[serde(default)]
    pub previous_names: Vec<PreviousName>,
    #[serde(default)]
    pub date_delivered: Option<NaiveDate>,
    #[serde(default)]
    pub builder: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub port_of_registry: Option<String>,
    #[serde(default)]
    pub call_sign: Option<String>,
    #[serde(default)]
    pub mmsi: Option<String>,
    #[serde(default)]
    pub contact_details: Option<ContactDetails>,
    /// e.g. "Oil Tanker"
    #[serde(default)]
    pub vessel_type: Option<String>,
    /// e.g. "Double Hull"
    #[serde(default)]
    pub hull_type: Option<String>,

    #[serde(default)]
    pub registered_owner: Option<OwnerInfo>,
    #[serde(default)]
    pub technical_operator: Option<OwnerInfo>,
    #[serde(default)]
    pub commercial_operator: Option<OwnerInfo>,
    #[serde(default)]
    pub disponent_owner: Option<OwnerInfo>,

    #[serde(default)]
    pub classification_society: Option<String>,
    #[serde(default)]
    pub class_notation: Option<String>,
    #[serde(default)]
    pub subject_to_conditions_of_class: Option<bool>,
    #[serde(default)]
    pub conditions_of_class_details: Option<String>,
    #[serde(default)]
    pub previous_classification_society: Option<String>,
    #[serde(default)]
    pub ice_class: Option<bool>,
    #[serde(default)]
    pub ice_class_level: Option<String>,
    #[serde(default)]
    pub last_dry_dock: Option<NaiveDate>,
    #[serde(default)]
    pub last_dry_dock_place: Option<String>,
    #[serde(default)]
    pub next_dry_dock_due: Option<NaiveDate>,
    #[serde(default)]
    pub next_annual_survey_due: Option<NaiveDate>,
    #[serde(default)]
    pub last_special_survey: Option<NaiveDate>,
    #[serde(default)]
    pub next_special_survey_due: Option<NaiveDate>,

    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub tonnages: Option<Tonnages>,
    #[serde(default)]
    pub loadline: Option<Loadline>,
    #[serde(default)]
    pub certificates: Option<Certificates>,
    #[serde(default)]
    pub crew: Option<Crew>,
    #[serde(default)]
    pub us_calls_info: Option<UsCallsInfo>,

    #[serde(default)]
    pub quality_management_system: Option<bool>,
    #[serde(default)]
    pub qms_type: Option<String>,
    #[serde(default)]
    pub helicopter_guidelines: Option<bool>,
    #[serde(default)]
    pub helicopter_facilities: Option<HelicopterFacilities>,

    #[serde(default)]
    pub cargo_tanks: Option<CargoTanks>,
    #[serde(default)]
    pub cargo_pumps: Option<CargoPumps>,
    #[serde(default)]
    pub manifold: Option<Manifold>,
    #[serde(default)]
    pub heating: Option<Heating>,
    #[serde(default)]
    pub inert_gas_system: Option<InertGasSystem>,
    #[serde(default)]
    pub crude_oil_washing: Option<CrudeOilWashing>,
    #[serde(default)]
    pub ballast_pumps: Vec<Pump>,
    #[serde(default)]
    pub ballast_eductors: Vec<Pump>,

    #[serde(default = "default_data_source")]
    pub data_source: String,
}

fn default_data_source() -> String {
    "Q88".to_string()
}

impl VesselProfile {
    /// Summer deadweight in metric tons
    pub fn summer_deadweight(&self) -> Option<f64> {
        self.loadline
            .as_ref()
            .and_then(|loadline| loadline.summer.as_ref())
            .and_then(|summer| summer.deadweight)
    }

    /// Total cargo tank capacity in m3
    pub fn cargo_capacity(&self) -> Option<f64> {
        self.cargo_tanks
            .as_ref()
            .and_then(|tanks| tanks.total_capacity)
    }

    pub fn validate(&self) -> Result<(), FreightDeskError> {
        if self.name.trim().is_empty() {
            return Err(FreightDeskError::ValidationError(
                "Vessel name is required".to_string(),
            ));
        }
        if self.summer_deadweight().is_some_and(|dwt| dwt < 0.0) {
            return Err(FreightDeskError::ValidationError(
                "Deadweight cannot be negative".to_string(),
            ));
        }
        if self.cargo_capacity().is_some_and(|cbm| cbm < 0.0) {
            return Err(FreightDeskError::ValidationError(
                "Cargo capacity cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stored vessel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vessel {
    pub id: i64,
    #[serde(flatten)]
    pub profile: VesselProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing filter for vessels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VesselFilter {
    pub vessel_type: Option<String>,
    pub flag: Option<String>,
    /// Delivered in or after this year
    pub built_after: Option<i32>,
    /// Case-insensitive match on name, IMO or registered owner
    pub search: Option<String>,
}
