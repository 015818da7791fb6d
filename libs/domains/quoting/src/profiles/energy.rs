use super::{ProfileKind, check, is_negative, is_positive};
use crate::error::{QuotingError, QuotingResult};
use crate::models::EnergyProfile;
use crate::presets::{PresetFamily, PresetPayload};
use crate::requests::EnergyInline;

pub struct EnergyKind;

fn location_name(location: &str, year: i32) -> String {
    format!("{} {}", location.trim(), year)
}

impl ProfileKind for EnergyKind {
    type Inline = EnergyInline;
    type Profile = EnergyProfile;

    const ENTITY: &'static str = "energy profile";
    const FAMILY: PresetFamily = PresetFamily::Energy;

    fn has_inline_values(inline: &EnergyInline) -> bool {
        *inline != EnergyInline::default()
    }

    fn validate_inline(inline: &EnergyInline) -> QuotingResult<()> {
        let mut violations = Vec::new();
        if inline.location.trim().is_empty() {
            violations.push("location is required".to_string());
        }
        if inline.year <= 0 {
            violations.push("year is required".to_string());
        }
        if !is_positive(inline.base_tariff) {
            violations.push("base_tariff must be greater than 0".to_string());
        }
        if is_negative(inline.flag_surcharge) {
            violations.push("flag_surcharge must not be negative".to_string());
        }
        check(Self::ENTITY, violations)
    }

    fn synthesize_name(inline: &EnergyInline) -> String {
        location_name(&inline.location, inline.year)
    }

    fn inline_name(inline: &EnergyInline) -> &str {
        &inline.name
    }

    /// Inline tariffs are private to whoever entered them.
    fn from_inline(inline: &EnergyInline, name: String, requester_id: &str) -> EnergyProfile {
        EnergyProfile {
            name,
            base_tariff: inline.base_tariff,
            flag_surcharge: inline.flag_surcharge,
            location: inline.location.trim().to_string(),
            year: inline.year,
            description: inline.description.clone(),
            owner_user_id: Some(requester_id.to_string()),
        }
    }

    fn from_preset(key: &str, payload: PresetPayload) -> QuotingResult<EnergyProfile> {
        let PresetPayload::Energy(data) = payload else {
            return Err(QuotingError::invalid_preset(key, "not an energy preset"));
        };

        if !is_positive(data.base_tariff) {
            return Err(QuotingError::invalid_preset(
                key,
                "base_tariff must be greater than 0",
            ));
        }

        Ok(EnergyProfile {
            name: location_name(&data.location, data.year),
            base_tariff: data.base_tariff,
            flag_surcharge: data.flag_surcharge,
            location: data.location,
            year: data.year,
            description: data.description,
            owner_user_id: None,
        })
    }
}
