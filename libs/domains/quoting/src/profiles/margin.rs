use rust_decimal::Decimal;

use super::{ProfileKind, check, is_negative};
use crate::error::{QuotingError, QuotingResult};
use crate::models::{MarginProfile, round_half_up};
use crate::presets::{PresetFamily, PresetPayload};
use crate::requests::MarginInline;

pub struct MarginKind;

fn custom_name(printing_only: Decimal, full_service: Decimal) -> String {
    format!(
        "Custom Margin Profile - Print {:.1}% Service {:.1}%",
        round_half_up(printing_only, 1),
        round_half_up(full_service, 1)
    )
}

impl ProfileKind for MarginKind {
    type Inline = MarginInline;
    type Profile = MarginProfile;

    const ENTITY: &'static str = "margin profile";
    const FAMILY: PresetFamily = PresetFamily::Margin;

    fn has_inline_values(inline: &MarginInline) -> bool {
        *inline != MarginInline::default()
    }

    fn validate_inline(inline: &MarginInline) -> QuotingResult<()> {
        let mut violations = Vec::new();
        for (field, value) in [
            ("printing_only_margin", inline.printing_only_margin),
            ("printing_plus_margin", inline.printing_plus_margin),
            ("full_service_margin", inline.full_service_margin),
        ] {
            if value.is_zero() {
                violations.push(format!("{field} is required"));
            } else if is_negative(value) {
                violations.push(format!("{field} must not be negative"));
            }
        }
        for (field, value) in [
            ("operator_rate_per_hour", inline.operator_rate_per_hour),
            ("modeler_rate_per_hour", inline.modeler_rate_per_hour),
        ] {
            if is_negative(value) {
                violations.push(format!("{field} must not be negative"));
            }
        }
        check(Self::ENTITY, violations)
    }

    fn synthesize_name(inline: &MarginInline) -> String {
        custom_name(inline.printing_only_margin, inline.full_service_margin)
    }

    fn inline_name(inline: &MarginInline) -> &str {
        &inline.name
    }

    fn from_inline(inline: &MarginInline, name: String, _requester_id: &str) -> MarginProfile {
        MarginProfile {
            name,
            printing_only_margin: inline.printing_only_margin,
            printing_plus_margin: inline.printing_plus_margin,
            full_service_margin: inline.full_service_margin,
            operator_rate_per_hour: inline.operator_rate_per_hour,
            modeler_rate_per_hour: inline.modeler_rate_per_hour,
            description: inline.description.clone(),
            owner_user_id: None,
        }
    }

    fn from_preset(key: &str, payload: PresetPayload) -> QuotingResult<MarginProfile> {
        let PresetPayload::Margin(data) = payload else {
            return Err(QuotingError::invalid_preset(key, "not a margin preset"));
        };

        for (field, value) in [
            ("printing_only_margin", data.printing_only_margin),
            ("printing_plus_margin", data.printing_plus_margin),
            ("full_service_margin", data.full_service_margin),
        ] {
            if is_negative(value) {
                return Err(QuotingError::invalid_preset(
                    key,
                    format!("{field} must not be negative"),
                ));
            }
        }

        let name = if data.name.trim().is_empty() {
            custom_name(data.printing_only_margin, data.full_service_margin)
        } else {
            data.name
        };

        Ok(MarginProfile {
            name,
            printing_only_margin: data.printing_only_margin,
            printing_plus_margin: data.printing_plus_margin,
            full_service_margin: data.full_service_margin,
            operator_rate_per_hour: data.operator_rate_per_hour,
            modeler_rate_per_hour: data.modeler_rate_per_hour,
            description: data.description,
            owner_user_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::MarginPreset;
    use rust_decimal_macros::dec;

    fn inline() -> MarginInline {
        MarginInline {
            printing_only_margin: dec!(40),
            printing_plus_margin: dec!(65),
            full_service_margin: dec!(150),
            operator_rate_per_hour: dec!(25),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_three_tiers_required() {
        assert!(MarginKind::validate_inline(&inline()).is_ok());

        let missing = MarginInline {
            printing_plus_margin: Decimal::ZERO,
            ..inline()
        };
        let err = MarginKind::validate_inline(&missing).unwrap_err();
        assert!(err.to_string().contains("printing_plus_margin"));
    }

    #[test]
    fn test_negative_margins_rejected_inline() {
        let negative = MarginInline {
            printing_only_margin: dec!(-150),
            printing_plus_margin: dec!(-150),
            full_service_margin: dec!(-150),
            ..inline()
        };
        let err = MarginKind::validate_inline(&negative).unwrap_err();
        assert!(matches!(err, QuotingError::Validation(_)));
        let message = err.to_string();
        assert!(message.contains("printing_only_margin must not be negative"));
        assert!(message.contains("full_service_margin must not be negative"));
    }

    #[test]
    fn test_negative_margin_preset_rejected() {
        let payload = PresetPayload::Margin(MarginPreset {
            name: "Clearance".to_string(),
            printing_only_margin: dec!(40),
            printing_plus_margin: dec!(-150),
            full_service_margin: dec!(90),
            operator_rate_per_hour: Decimal::ZERO,
            modeler_rate_per_hour: Decimal::ZERO,
            description: String::new(),
        });

        let err = MarginKind::from_preset("margin_clearance", payload).unwrap_err();
        match err {
            QuotingError::InvalidPreset { key, reason } => {
                assert_eq!(key, "margin_clearance");
                assert!(reason.contains("printing_plus_margin"));
            }
            other => panic!("expected invalid preset, got {other:?}"),
        }
    }

    #[test]
    fn test_synthesized_name_rounds_half_up() {
        let fractional = MarginInline {
            printing_only_margin: dec!(33.35),
            full_service_margin: dec!(149.99),
            ..inline()
        };
        assert_eq!(
            MarginKind::synthesize_name(&fractional),
            "Custom Margin Profile - Print 33.4% Service 150.0%"
        );
    }

    #[test]
    fn test_synthesized_margin_name() {
        assert_eq!(
            MarginKind::synthesize_name(&inline()),
            "Custom Margin Profile - Print 40.0% Service 150.0%"
        );
    }

    #[test]
    fn test_unnamed_preset_gets_synthesized_name() {
        let payload = PresetPayload::Margin(MarginPreset {
            name: String::new(),
            printing_only_margin: dec!(30),
            printing_plus_margin: dec!(50),
            full_service_margin: dec!(90),
            operator_rate_per_hour: Decimal::ZERO,
            modeler_rate_per_hour: Decimal::ZERO,
            description: String::new(),
        });

        let profile = MarginKind::from_preset("margin_lean", payload).unwrap();
        assert_eq!(profile.name, "Custom Margin Profile - Print 30.0% Service 90.0%");
        assert_eq!(profile.owner_user_id, None);
    }
}
