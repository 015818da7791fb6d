use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::access::Owned;
use crate::requests::{CalculationInput, FilamentLineRequest};

/// Grams per kilogram, used to price filament by weight.
const GRAMS_PER_KG: Decimal = Decimal::ONE_THOUSAND;

/// Rounds half away from zero, the rule used for every displayed amount.
pub fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Service level a quote can be priced at
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceTier {
    PrintingOnly,
    PrintingPlus,
    FullService,
}

/// Live filament entry as returned by the catalog. Prices may change at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilamentAttributes {
    pub id: u64,
    pub name: String,
    pub brand: String,
    pub material: String,
    pub color: String,
    #[serde(default)]
    pub color_hex: String,
    pub price_per_kg: Decimal,
    pub price_per_meter: Option<Decimal>,
    #[serde(default)]
    pub url: String,
    pub owner_user_id: Option<String>,
}

impl Owned for FilamentAttributes {
    fn owner_user_id(&self) -> Option<&str> {
        self.owner_user_id.as_deref()
    }
}

/// Frozen copy of filament pricing data taken when a quote is built.
///
/// Snapshots have no mutating API. A line is replaced wholesale by resolving
/// it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilamentUsageSnapshot {
    weight_grams: Decimal,
    length_meters: Option<Decimal>,
    name: String,
    brand: String,
    material: String,
    color: String,
    color_hex: String,
    price_per_kg: Decimal,
    price_per_meter: Option<Decimal>,
    url: String,
    source_filament_id: Option<u64>,
    captured_at: DateTime<Utc>,
}

impl FilamentUsageSnapshot {
    pub(crate) fn from_catalog(
        entry: &FilamentAttributes,
        weight_grams: Decimal,
        length_meters: Option<Decimal>,
    ) -> Self {
        Self {
            weight_grams,
            length_meters,
            name: entry.name.clone(),
            brand: entry.brand.clone(),
            material: entry.material.clone(),
            color: entry.color.clone(),
            color_hex: entry.color_hex.clone(),
            price_per_kg: entry.price_per_kg,
            price_per_meter: entry.price_per_meter,
            url: entry.url.clone(),
            source_filament_id: Some(entry.id),
            captured_at: Utc::now(),
        }
    }

    pub(crate) fn from_manual(line: &FilamentLineRequest, price_per_kg: Decimal) -> Self {
        Self {
            weight_grams: line.weight_grams,
            length_meters: line.length_meters,
            name: line.name.trim().to_string(),
            brand: line.brand.trim().to_string(),
            material: line.material.trim().to_string(),
            color: line.color.trim().to_string(),
            color_hex: line.color_hex.trim().to_string(),
            price_per_kg,
            price_per_meter: line.price_per_meter,
            url: line.url.trim().to_string(),
            source_filament_id: None,
            captured_at: Utc::now(),
        }
    }

    pub fn weight_grams(&self) -> Decimal {
        self.weight_grams
    }

    pub fn length_meters(&self) -> Option<Decimal> {
        self.length_meters
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn color_hex(&self) -> &str {
        &self.color_hex
    }

    pub fn price_per_kg(&self) -> Decimal {
        self.price_per_kg
    }

    pub fn price_per_meter(&self) -> Option<Decimal> {
        self.price_per_meter
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Catalog id the snapshot was copied from. Informational only.
    pub fn source_filament_id(&self) -> Option<u64> {
        self.source_filament_id
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Material cost of this line, priced by weight.
    pub fn cost(&self) -> Decimal {
        self.weight_grams * self.price_per_kg / GRAMS_PER_KG
    }

    pub fn label(&self) -> String {
        if self.color.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.color)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineProfile {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub watt: Decimal,
    pub idle_factor: Decimal,
    pub description: String,
    pub url: String,
    pub owner_user_id: Option<String>,
}

impl MachineProfile {
    /// Energy drawn for a print, including idle overhead on top of the print time.
    pub fn energy_consumption_kwh(&self, print_time_hours: Decimal) -> Decimal {
        let effective_hours = print_time_hours * (Decimal::ONE + self.idle_factor);
        self.watt * effective_hours / Decimal::ONE_THOUSAND
    }
}

impl Owned for MachineProfile {
    fn owner_user_id(&self) -> Option<&str> {
        self.owner_user_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyProfile {
    pub name: String,
    pub base_tariff: Decimal,
    pub flag_surcharge: Decimal,
    pub location: String,
    pub year: i32,
    pub description: String,
    pub owner_user_id: Option<String>,
}

impl EnergyProfile {
    pub fn total_tariff(&self) -> Decimal {
        self.base_tariff + self.flag_surcharge
    }

    pub fn energy_cost(&self, kwh: Decimal) -> Decimal {
        kwh * self.total_tariff()
    }
}

impl Owned for EnergyProfile {
    fn owner_user_id(&self) -> Option<&str> {
        self.owner_user_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadProfile {
    pub name: String,
    pub wear_percentage: Decimal,
    pub overhead_amount: Decimal,
    pub description: String,
    pub owner_user_id: Option<String>,
}

impl OverheadProfile {
    /// Machine wear, charged as a percentage of material cost.
    pub fn wear_cost(&self, material_cost: Decimal) -> Decimal {
        material_cost * self.wear_percentage / Decimal::ONE_HUNDRED
    }
}

impl Owned for OverheadProfile {
    fn owner_user_id(&self) -> Option<&str> {
        self.owner_user_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginProfile {
    pub name: String,
    pub printing_only_margin: Decimal,
    pub printing_plus_margin: Decimal,
    pub full_service_margin: Decimal,
    pub operator_rate_per_hour: Decimal,
    pub modeler_rate_per_hour: Decimal,
    pub description: String,
    pub owner_user_id: Option<String>,
}

impl MarginProfile {
    pub fn margin_for(&self, tier: ServiceTier) -> Decimal {
        match tier {
            ServiceTier::PrintingOnly => self.printing_only_margin,
            ServiceTier::PrintingPlus => self.printing_plus_margin,
            ServiceTier::FullService => self.full_service_margin,
        }
    }

    /// Margin percentage for a tier label. Unknown labels yield zero.
    pub fn margin_by_service_type(&self, service_type: &str) -> Decimal {
        service_type
            .parse::<ServiceTier>()
            .map(|tier| self.margin_for(tier))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn labor_cost(&self, operator_minutes: Decimal, modeler_minutes: Decimal) -> Decimal {
        let sixty = Decimal::from(60);
        operator_minutes * self.operator_rate_per_hour / sixty
            + modeler_minutes * self.modeler_rate_per_hour / sixty
    }
}

impl Owned for MarginProfile {
    fn owner_user_id(&self) -> Option<&str> {
        self.owner_user_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilamentLineCost {
    pub label: String,
    pub weight_grams: Decimal,
    pub price_per_kg: Decimal,
    pub cost: Decimal,
}

/// Price of a job at one service tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPrice {
    pub tier: ServiceTier,
    pub margin: Decimal,
    pub price: Decimal,
    /// Share of the price that is profit, in percent.
    pub markup: Decimal,
    /// Profit relative to direct cost, in percent.
    pub effective_margin: Decimal,
}

/// Layered cost of a print job, kept at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub filament_costs: Vec<FilamentLineCost>,
    pub material_cost: Decimal,
    pub energy_kwh: Decimal,
    pub energy_cost: Decimal,
    pub wear_cost: Decimal,
    pub labor_cost: Decimal,
    pub overhead_amount: Decimal,
    pub direct_cost: Decimal,
    pub applied_margin: Decimal,
    pub final_price: Decimal,
    pub tier_prices: Vec<TierPrice>,
    pub input: CalculationInput,
}

impl CostBreakdown {
    pub fn price_for(&self, tier: ServiceTier) -> Option<&TierPrice> {
        self.tier_prices.iter().find(|p| p.tier == tier)
    }

    /// Presentation copy with every amount rounded half away from zero.
    pub fn rounded(&self, scale: u32) -> Self {
        let round = |value: Decimal| round_half_up(value, scale);

        Self {
            filament_costs: self
                .filament_costs
                .iter()
                .map(|line| FilamentLineCost {
                    cost: round(line.cost),
                    ..line.clone()
                })
                .collect(),
            material_cost: round(self.material_cost),
            energy_kwh: round(self.energy_kwh),
            energy_cost: round(self.energy_cost),
            wear_cost: round(self.wear_cost),
            labor_cost: round(self.labor_cost),
            overhead_amount: round(self.overhead_amount),
            direct_cost: round(self.direct_cost),
            applied_margin: round(self.applied_margin),
            final_price: round(self.final_price),
            tier_prices: self
                .tier_prices
                .iter()
                .map(|p| TierPrice {
                    tier: p.tier,
                    margin: round(p.margin),
                    price: round(p.price),
                    markup: round(p.markup),
                    effective_margin: round(p.effective_margin),
                })
                .collect(),
            input: self.input.clone(),
        }
    }
}

/// Breakdown cached on a quote together with when it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub breakdown: CostBreakdown,
    pub calculated_at: DateTime<Utc>,
}
