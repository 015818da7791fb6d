use rust_decimal::Decimal;

use super::{ProfileKind, check, is_negative, is_positive};
use crate::error::{QuotingError, QuotingResult};
use crate::models::MachineProfile;
use crate::presets::{PresetFamily, PresetPayload};
use crate::requests::MachineInline;

pub struct MachineKind;

impl ProfileKind for MachineKind {
    type Inline = MachineInline;
    type Profile = MachineProfile;

    const ENTITY: &'static str = "machine profile";
    const FAMILY: PresetFamily = PresetFamily::Machine;

    fn has_inline_values(inline: &MachineInline) -> bool {
        *inline != MachineInline::default()
    }

    fn validate_inline(inline: &MachineInline) -> QuotingResult<()> {
        let mut violations = Vec::new();
        for (field, value) in [
            ("name", &inline.name),
            ("brand", &inline.brand),
            ("model", &inline.model),
        ] {
            if value.trim().is_empty() {
                violations.push(format!("{field} is required"));
            }
        }
        if !is_positive(inline.watt) {
            violations.push("watt must be greater than 0".to_string());
        }
        if is_negative(inline.idle_factor) || inline.idle_factor > Decimal::ONE {
            violations.push("idle_factor must be between 0 and 1".to_string());
        }
        check(Self::ENTITY, violations)
    }

    fn synthesize_name(inline: &MachineInline) -> String {
        format!("{} {}", inline.brand.trim(), inline.model.trim())
    }

    fn inline_name(inline: &MachineInline) -> &str {
        &inline.name
    }

    fn from_inline(inline: &MachineInline, name: String, _requester_id: &str) -> MachineProfile {
        MachineProfile {
            name,
            brand: inline.brand.trim().to_string(),
            model: inline.model.trim().to_string(),
            watt: inline.watt,
            idle_factor: inline.idle_factor,
            description: inline.description.clone(),
            url: inline.url.clone(),
            owner_user_id: None,
        }
    }

    fn from_preset(key: &str, payload: PresetPayload) -> QuotingResult<MachineProfile> {
        let PresetPayload::Machine(data) = payload else {
            return Err(QuotingError::invalid_preset(key, "not a machine preset"));
        };

        if !is_positive(data.watt) {
            return Err(QuotingError::invalid_preset(key, "watt must be greater than 0"));
        }

        let name = if data.name.trim().is_empty() {
            format!("{} {}", data.brand, data.model)
        } else {
            data.name
        };

        Ok(MachineProfile {
            name,
            brand: data.brand,
            model: data.model,
            watt: data.watt,
            idle_factor: data.idle_factor,
            description: data.description,
            url: data.url,
            owner_user_id: None,
        })
    }
}
