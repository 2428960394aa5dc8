//! Q88 profiles derived from one template tanker

use crate::errors::FreightDeskError;
use crate::models::{Imo, VesselProfile};

const TEMPLATE: &str = include_str!("vessel_template.json");

pub fn template_vessel() -> Result<VesselProfile, FreightDeskError> {
    Ok(serde_json::from_str(TEMPLATE)?)
}

/// `count` profiles; after the template each copy gets a numbered name,
/// IMO and call sign
pub fn mock_vessels(count: usize) -> Result<Vec<VesselProfile>, FreightDeskError> {
    let template = template_vessel()?;
    let base_imo: u32 = template
        .imo
        .value()
        .parse()
        .map_err(|_| FreightDeskError::InvalidImo(template.imo.to_string()))?;

    let mut vessels = Vec::with_capacity(count);
    for i in 0..count {
        if i == 0 {
            vessels.push(template.clone());
            continue;
        }
        let suffix = i + 1;
        let mut vessel = template.clone();
        vessel.name = format!("{} {}", template.name, suffix);
        vessel.imo = Imo::try_from(format!("{:07}", base_imo + suffix as u32))?;
        vessel.call_sign = template
            .call_sign
            .as_ref()
            .map(|call_sign| format!("{}{}", call_sign, suffix));
        vessels.push(vessel);
    }
    Ok(vessels)
}
