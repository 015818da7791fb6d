use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::access::Owned;
use crate::error::QuotingResult;
use crate::models::{
    CalculationRecord, CostBreakdown, EnergyProfile, FilamentUsageSnapshot, MachineProfile,
    MarginProfile, OverheadProfile,
};

const MAX_TITLE_CHARS: usize = 255;

/// Resolved contents of a quote, everything except identity and ownership.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteContents {
    pub title: String,
    pub notes: String,
    pub filament_usage: Vec<FilamentUsageSnapshot>,
    pub machine_profile: Option<MachineProfile>,
    pub energy_profile: Option<EnergyProfile>,
    pub overhead_profile: Option<OverheadProfile>,
    pub margin_profile: Option<MarginProfile>,
}

/// A priced job request owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Quote {
    id: Uuid,
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    title: String,
    notes: String,
    #[validate(length(min = 1, message = "owner is required"))]
    owner_user_id: String,
    #[validate(length(min = 1, message = "at least one filament usage is required"))]
    filament_usage: Vec<FilamentUsageSnapshot>,
    machine_profile: Option<MachineProfile>,
    energy_profile: Option<EnergyProfile>,
    overhead_profile: Option<OverheadProfile>,
    margin_profile: Option<MarginProfile>,
    last_calculation: Option<CalculationRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(owner_user_id: impl Into<String>, contents: QuoteContents) -> QuotingResult<Self> {
        let now = Utc::now();
        let quote = Self {
            id: Uuid::now_v7(),
            title: contents.title,
            notes: contents.notes,
            owner_user_id: owner_user_id.into(),
            filament_usage: contents.filament_usage,
            machine_profile: contents.machine_profile,
            energy_profile: contents.energy_profile,
            overhead_profile: contents.overhead_profile,
            margin_profile: contents.margin_profile,
            last_calculation: None,
            created_at: now,
            updated_at: now,
        };
        quote.validate()?;
        Ok(quote)
    }

    /// Check the aggregate invariants. Also used on rehydrated quotes.
    pub fn validate(&self) -> QuotingResult<()> {
        Validate::validate(self)?;
        Ok(())
    }

    /// Owner or admin. Quotes are never global.
    pub fn can_access(&self, user_id: &str, is_admin: bool) -> bool {
        self.can_user_access(user_id, is_admin)
    }

    /// Replace every snapshot and profile slot at once. The quote is left
    /// untouched when the new contents break an invariant.
    pub fn replace_contents(&mut self, contents: QuoteContents) -> QuotingResult<()> {
        let mut candidate = self.clone();
        candidate.title = contents.title;
        candidate.notes = contents.notes;
        candidate.filament_usage = contents.filament_usage;
        candidate.machine_profile = contents.machine_profile;
        candidate.energy_profile = contents.energy_profile;
        candidate.overhead_profile = contents.overhead_profile;
        candidate.margin_profile = contents.margin_profile;
        candidate.last_calculation = None;
        candidate.validate()?;

        candidate.updated_at = Utc::now();
        *self = candidate;
        Ok(())
    }

    /// Copy this quote for `owner_user_id` under a fresh id.
    pub fn duplicate_for(&self, owner_user_id: impl Into<String>) -> QuotingResult<Self> {
        let title: String = format!("Copy of {}", self.title)
            .chars()
            .take(MAX_TITLE_CHARS)
            .collect();

        Self::new(
            owner_user_id,
            QuoteContents {
                title,
                notes: self.notes.clone(),
                filament_usage: self.filament_usage.clone(),
                machine_profile: self.machine_profile.clone(),
                energy_profile: self.energy_profile.clone(),
                overhead_profile: self.overhead_profile.clone(),
                margin_profile: self.margin_profile.clone(),
            },
        )
    }

    pub(crate) fn record_calculation(&mut self, breakdown: CostBreakdown) {
        let now = Utc::now();
        self.last_calculation = Some(CalculationRecord {
            breakdown,
            calculated_at: now,
        });
        self.updated_at = now;
    }

    pub fn total_weight_grams(&self) -> Decimal {
        self.filament_usage.iter().map(|f| f.weight_grams()).sum()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn owner(&self) -> &str {
        &self.owner_user_id
    }

    pub fn filament_usage(&self) -> &[FilamentUsageSnapshot] {
        &self.filament_usage
    }

    pub fn machine_profile(&self) -> Option<&MachineProfile> {
        self.machine_profile.as_ref()
    }

    pub fn energy_profile(&self) -> Option<&EnergyProfile> {
        self.energy_profile.as_ref()
    }

    pub fn overhead_profile(&self) -> Option<&OverheadProfile> {
        self.overhead_profile.as_ref()
    }

    pub fn margin_profile(&self) -> Option<&MarginProfile> {
        self.margin_profile.as_ref()
    }

    /// Most recent breakdown. A read convenience only; recompute for pricing.
    pub fn last_calculation(&self) -> Option<&CalculationRecord> {
        self.last_calculation.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Owned for Quote {
    fn owner_user_id(&self) -> Option<&str> {
        Some(&self.owner_user_id)
    }
}
