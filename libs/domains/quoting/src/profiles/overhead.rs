use rust_decimal::Decimal;

use super::{ProfileKind, check, is_negative};
use crate::error::{QuotingError, QuotingResult};
use crate::models::{OverheadProfile, round_half_up};
use crate::presets::{PresetFamily, PresetPayload};
use crate::requests::OverheadInline;

pub struct OverheadKind;

fn custom_name(wear_percentage: Decimal, overhead_amount: Decimal) -> String {
    format!(
        "Custom Cost Profile - Wear {:.1}% Overhead {:.2}",
        round_half_up(wear_percentage, 1),
        round_half_up(overhead_amount, 2)
    )
}

impl ProfileKind for OverheadKind {
    type Inline = OverheadInline;
    type Profile = OverheadProfile;

    const ENTITY: &'static str = "overhead profile";
    const FAMILY: PresetFamily = PresetFamily::Overhead;

    fn has_inline_values(inline: &OverheadInline) -> bool {
        *inline != OverheadInline::default()
    }

    fn validate_inline(inline: &OverheadInline) -> QuotingResult<()> {
        let mut violations = Vec::new();
        if inline.wear_percentage.is_zero() && inline.overhead_amount.is_zero() {
            violations.push("wear_percentage or overhead_amount must be set".to_string());
        }
        if is_negative(inline.wear_percentage) || inline.wear_percentage > Decimal::ONE_HUNDRED {
            violations.push("wear_percentage must be between 0 and 100".to_string());
        }
        if is_negative(inline.overhead_amount) {
            violations.push("overhead_amount must not be negative".to_string());
        }
        check(Self::ENTITY, violations)
    }

    fn synthesize_name(inline: &OverheadInline) -> String {
        custom_name(inline.wear_percentage, inline.overhead_amount)
    }

    fn inline_name(inline: &OverheadInline) -> &str {
        &inline.name
    }

    fn from_inline(inline: &OverheadInline, name: String, _requester_id: &str) -> OverheadProfile {
        OverheadProfile {
            name,
            wear_percentage: inline.wear_percentage,
            overhead_amount: inline.overhead_amount,
            description: inline.description.clone(),
            owner_user_id: None,
        }
    }

    fn from_preset(key: &str, payload: PresetPayload) -> QuotingResult<OverheadProfile> {
        let PresetPayload::Overhead(data) = payload else {
            return Err(QuotingError::invalid_preset(key, "not an overhead preset"));
        };

        let name = if data.name.trim().is_empty() {
            custom_name(data.wear_percentage, data.overhead_amount)
        } else {
            data.name
        };

        Ok(OverheadProfile {
            name,
            wear_percentage: data.wear_percentage,
            overhead_amount: data.overhead_amount,
            description: data.description,
            owner_user_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_synthesized_overhead_name() {
        let inline = OverheadInline {
            wear_percentage: dec!(10),
            overhead_amount: dec!(8),
            ..Default::default()
        };
        assert_eq!(
            OverheadKind::synthesize_name(&inline),
            "Custom Cost Profile - Wear 10.0% Overhead 8.00"
        );
    }

    #[test]
    fn test_synthesized_name_rounds_half_up() {
        let inline = OverheadInline {
            wear_percentage: dec!(12.25),
            overhead_amount: dec!(3.456),
            ..Default::default()
        };
        assert_eq!(
            OverheadKind::synthesize_name(&inline),
            "Custom Cost Profile - Wear 12.3% Overhead 3.46"
        );
    }

    #[test]
    fn test_overhead_needs_one_non_zero_value() {
        let inline = OverheadInline {
            description: "empty".to_string(),
            ..Default::default()
        };
        assert!(OverheadKind::validate_inline(&inline).is_err());

        let wear_only = OverheadInline {
            wear_percentage: dec!(5),
            ..Default::default()
        };
        assert!(OverheadKind::validate_inline(&wear_only).is_ok());
    }

    #[test]
    fn test_wear_percentage_capped_at_one_hundred() {
        let inline = OverheadInline {
            wear_percentage: dec!(100.5),
            ..Default::default()
        };
        let err = OverheadKind::validate_inline(&inline).unwrap_err();
        assert!(err.to_string().contains("between 0 and 100"));
    }
}
