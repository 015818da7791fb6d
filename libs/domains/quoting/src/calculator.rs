//! Layered cost computation.
//!
//! ```text
//! materials ─┐
//! energy    ─┤
//! wear      ─┼─► direct cost ─► × (1 + margin/100) ─► final price
//! labor     ─┤
//! overhead  ─┘
//! ```
//!
//! Everything here is pure: the same quote and input always yield the same
//! breakdown, at full decimal precision.

use rust_decimal::Decimal;
use strum::IntoEnumIterator;
use validator::Validate;

use crate::error::QuotingResult;
use crate::models::{CostBreakdown, FilamentLineCost, ServiceTier, TierPrice};
use crate::quote::Quote;
use crate::requests::CalculationInput;

/// Price after applying a percentage margin on top of direct cost.
pub fn apply_margin(direct_cost: Decimal, margin_percentage: Decimal) -> Decimal {
    direct_cost * (Decimal::ONE + margin_percentage / Decimal::ONE_HUNDRED)
}

/// Profit as a percentage of the selling price. Zero for non-positive prices.
pub fn markup_percentage(direct_cost: Decimal, price: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (price - direct_cost) / price * Decimal::ONE_HUNDRED
}

/// Profit as a percentage of direct cost. Zero for non-positive costs.
pub fn effective_margin_percentage(direct_cost: Decimal, price: Decimal) -> Decimal {
    if direct_cost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (price - direct_cost) / direct_cost * Decimal::ONE_HUNDRED
}

pub fn compute_cost_breakdown(
    quote: &Quote,
    input: &CalculationInput,
) -> QuotingResult<CostBreakdown> {
    quote.validate()?;
    input.validate()?;

    let filament_costs: Vec<FilamentLineCost> = quote
        .filament_usage()
        .iter()
        .map(|usage| FilamentLineCost {
            label: usage.label(),
            weight_grams: usage.weight_grams(),
            price_per_kg: usage.price_per_kg(),
            cost: usage.cost(),
        })
        .collect();
    let material_cost: Decimal = filament_costs.iter().map(|line| line.cost).sum();

    let energy_kwh = quote
        .machine_profile()
        .map(|machine| machine.energy_consumption_kwh(input.print_time_hours))
        .unwrap_or_default();
    let energy_cost = quote
        .energy_profile()
        .map(|energy| energy.energy_cost(energy_kwh))
        .unwrap_or_default();

    let (wear_cost, overhead_amount) = quote
        .overhead_profile()
        .map(|overhead| (overhead.wear_cost(material_cost), overhead.overhead_amount))
        .unwrap_or_default();

    let margin_profile = quote.margin_profile();
    let labor_cost = margin_profile
        .map(|margin| margin.labor_cost(input.operator_minutes, input.modeler_minutes))
        .unwrap_or_default();

    let direct_cost = material_cost + energy_cost + wear_cost + labor_cost + overhead_amount;

    let applied_margin = margin_profile
        .map(|margin| margin.margin_by_service_type(&input.service_type))
        .unwrap_or_default();
    let final_price = apply_margin(direct_cost, applied_margin);

    let tier_prices = ServiceTier::iter()
        .map(|tier| {
            let margin = margin_profile
                .map(|profile| profile.margin_for(tier))
                .unwrap_or_default();
            let price = apply_margin(direct_cost, margin);
            TierPrice {
                tier,
                margin,
                price,
                markup: markup_percentage(direct_cost, price),
                effective_margin: effective_margin_percentage(direct_cost, price),
            }
        })
        .collect();

    Ok(CostBreakdown {
        filament_costs,
        material_cost,
        energy_kwh,
        energy_cost,
        wear_cost,
        labor_cost,
        overhead_amount,
        direct_cost,
        applied_margin,
        final_price,
        tier_prices,
        input: input.clone(),
    })
}
