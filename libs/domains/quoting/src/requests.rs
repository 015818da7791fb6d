use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("must_not_be_negative"));
    }
    Ok(())
}

/// One filament line of a quote request.
///
/// Either `filament_id` references a catalog entry, or the manual attribute
/// fields describe the filament directly. When an id is given the manual
/// fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FilamentLineRequest {
    #[serde(default)]
    pub filament_id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub color_hex: String,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative"))]
    pub price_per_kg: Option<Decimal>,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative"))]
    pub price_per_meter: Option<Decimal>,
    #[serde(default)]
    pub url: String,
    #[validate(custom(function = "validate_non_negative"))]
    pub weight_grams: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative"))]
    pub length_meters: Option<Decimal>,
}

impl FilamentLineRequest {
    pub fn from_catalog(filament_id: u64, weight_grams: Decimal) -> Self {
        Self {
            filament_id: Some(filament_id),
            weight_grams,
            ..Default::default()
        }
    }

    /// Names of required manual attributes that are blank.
    pub(crate) fn missing_manual_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("name", &self.name),
            ("brand", &self.brand),
            ("material", &self.material),
            ("color", &self.color),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }
        if !self.price_per_kg.is_some_and(|price| price > Decimal::ZERO) {
            missing.push("price_per_kg");
        }
        missing
    }
}

/// Either a preset key or inline profile data; exactly one must be supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRequest<I> {
    #[serde(default)]
    pub preset_key: Option<String>,
    #[serde(flatten)]
    pub inline: I,
}

impl<I: Default> ProfileRequest<I> {
    pub fn preset(key: impl Into<String>) -> Self {
        Self {
            preset_key: Some(key.into()),
            inline: I::default(),
        }
    }
}

impl<I> ProfileRequest<I> {
    pub fn inline(inline: I) -> Self {
        Self {
            preset_key: None,
            inline,
        }
    }

    /// Trimmed preset key, `None` when absent or blank.
    pub fn preset_key(&self) -> Option<&str> {
        self.preset_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineInline {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub watt: Decimal,
    pub idle_factor: Decimal,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyInline {
    pub name: String,
    pub base_tariff: Decimal,
    pub flag_surcharge: Decimal,
    pub location: String,
    pub year: i32,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverheadInline {
    pub name: String,
    pub wear_percentage: Decimal,
    pub overhead_amount: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginInline {
    pub name: String,
    pub printing_only_margin: Decimal,
    pub printing_plus_margin: Decimal,
    pub full_service_margin: Decimal,
    pub operator_rate_per_hour: Decimal,
    pub modeler_rate_per_hour: Decimal,
    pub description: String,
}

pub type MachineProfileRequest = ProfileRequest<MachineInline>;
pub type EnergyProfileRequest = ProfileRequest<EnergyInline>;
pub type OverheadProfileRequest = ProfileRequest<OverheadInline>;
pub type MarginProfileRequest = ProfileRequest<MarginInline>;

/// Full contents of a quote. Used for creation and for wholesale updates,
/// where an omitted profile clears the corresponding slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct QuoteRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[validate(length(min = 1, message = "at least one filament line is required"))]
    #[validate(nested)]
    pub filament_lines: Vec<FilamentLineRequest>,
    #[serde(default)]
    pub machine_profile: Option<MachineProfileRequest>,
    #[serde(default)]
    pub energy_profile: Option<EnergyProfileRequest>,
    #[serde(default, alias = "cost_profile")]
    pub overhead_profile: Option<OverheadProfileRequest>,
    #[serde(default)]
    pub margin_profile: Option<MarginProfileRequest>,
}

pub type CreateQuoteRequest = QuoteRequest;
pub type UpdateQuoteRequest = QuoteRequest;

/// Timing and tier inputs for a single price calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CalculationInput {
    #[validate(custom(function = "validate_non_negative"))]
    pub print_time_hours: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative"))]
    pub operator_minutes: Decimal,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative"))]
    pub modeler_minutes: Decimal,
    pub service_type: String,
}

impl CalculationInput {
    pub fn new(print_time_hours: Decimal, service_type: impl Into<String>) -> Self {
        Self {
            print_time_hours,
            service_type: service_type.into(),
            ..Default::default()
        }
    }

    pub fn with_labor(mut self, operator_minutes: Decimal, modeler_minutes: Decimal) -> Self {
        self.operator_minutes = operator_minutes;
        self.modeler_minutes = modeler_minutes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_weight_rejected() {
        let line = FilamentLineRequest::from_catalog(3, dec!(-1));
        let err = line.validate().unwrap_err();
        assert!(err.to_string().contains("weight_grams"));
    }

    #[test]
    fn test_missing_manual_fields_are_named() {
        let line = FilamentLineRequest {
            name: "PLA".to_string(),
            color: "  ".to_string(),
            price_per_kg: Some(Decimal::ZERO),
            weight_grams: dec!(10),
            ..Default::default()
        };
        assert_eq!(
            line.missing_manual_fields(),
            vec!["brand", "material", "color", "price_per_kg"]
        );
    }

    #[test]
    fn test_blank_preset_key_treated_as_absent() {
        let request: EnergyProfileRequest = ProfileRequest::preset("   ");
        assert_eq!(request.preset_key(), None);

        let request: EnergyProfileRequest = ProfileRequest::preset(" energy_pr_2025 ");
        assert_eq!(request.preset_key(), Some("energy_pr_2025"));
    }

    #[test]
    fn test_profile_request_flattens_inline_fields() {
        let json = r#"{"location": "Curitiba", "year": 2025, "base_tariff": "0.65"}"#;
        let request: EnergyProfileRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.preset_key, None);
        assert_eq!(request.inline.location, "Curitiba");
        assert_eq!(request.inline.base_tariff, dec!(0.65));
    }

    #[test]
    fn test_quote_request_accepts_cost_profile_alias() {
        let json = r#"{
            "title": "Bracket",
            "filament_lines": [{"filament_id": 1, "weight_grams": "25"}],
            "cost_profile": {"preset_key": "overhead_default"}
        }"#;
        let request: QuoteRequest = serde_json::from_str(json).unwrap();

        assert!(request.validate().is_ok());
        let overhead = request.overhead_profile.unwrap();
        assert_eq!(overhead.preset_key(), Some("overhead_default"));
    }

    #[test]
    fn test_line_without_weight_is_rejected() {
        let json = r#"{"title": "t", "filament_lines": [{"filament_id": 1}]}"#;
        let err = serde_json::from_str::<QuoteRequest>(json).unwrap_err();
        assert!(err.to_string().contains("weight_grams"));
    }

    #[test]
    fn test_manual_line_only_needs_weight() {
        let json = r#"{"name": "PLA Basic", "weight_grams": "12.5"}"#;
        let line: FilamentLineRequest = serde_json::from_str(json).unwrap();

        assert_eq!(line.filament_id, None);
        assert_eq!(line.weight_grams, dec!(12.5));
        assert!(line.brand.is_empty());
    }

    #[test]
    fn test_quote_request_requires_lines() {
        let request = QuoteRequest {
            title: "Empty".to_string(),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_negative_calculation_input_rejected() {
        let input = CalculationInput::new(dec!(1), "printing_only").with_labor(dec!(-5), dec!(0));
        assert!(input.validate().is_err());
    }
}
