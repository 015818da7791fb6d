use futures::future::try_join_all;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::instrument;
use validator::Validate;

use crate::calculator::compute_cost_breakdown;
use crate::catalog::{FilamentCatalog, RequesterScope};
use crate::config::QuotingConfig;
use crate::error::{QuotingError, QuotingResult};
use crate::models::{CostBreakdown, round_half_up};
use crate::presets::PresetStore;
use crate::profiles::{
    EnergyProfileResolver, MachineProfileResolver, MarginProfileResolver, OverheadProfileResolver,
};
use crate::quote::{Quote, QuoteContents};
use crate::requests::{CalculationInput, CreateQuoteRequest, QuoteRequest, UpdateQuoteRequest};
use crate::snapshot::SnapshotResolver;

/// Who is asking, and until when they are willing to wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub requester_id: String,
    pub is_admin: bool,
    pub deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(requester_id: impl Into<String>) -> Self {
        Self {
            requester_id: requester_id.into(),
            is_admin: false,
            deadline: None,
        }
    }

    pub fn as_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn scope(&self) -> RequesterScope {
        RequesterScope {
            user_id: self.requester_id.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// Service layer for building and pricing quotes
pub struct QuoteService<C: FilamentCatalog, S: PresetStore> {
    snapshots: SnapshotResolver<C>,
    machines: MachineProfileResolver<S>,
    energy: EnergyProfileResolver<S>,
    overheads: OverheadProfileResolver<S>,
    margins: MarginProfileResolver<S>,
    config: QuotingConfig,
}

impl<C: FilamentCatalog, S: PresetStore> Clone for QuoteService<C, S> {
    fn clone(&self) -> Self {
        Self {
            snapshots: self.snapshots.clone(),
            machines: self.machines.clone(),
            energy: self.energy.clone(),
            overheads: self.overheads.clone(),
            margins: self.margins.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C: FilamentCatalog, S: PresetStore> QuoteService<C, S> {
    pub fn new(catalog: C, presets: S, config: QuotingConfig) -> Self {
        let presets = Arc::new(presets);
        Self {
            snapshots: SnapshotResolver::new(Arc::new(catalog)),
            machines: MachineProfileResolver::new(Arc::clone(&presets)),
            energy: EnergyProfileResolver::new(Arc::clone(&presets)),
            overheads: OverheadProfileResolver::new(Arc::clone(&presets)),
            margins: MarginProfileResolver::new(presets),
            config,
        }
    }

    pub fn config(&self) -> &QuotingConfig {
        &self.config
    }

    /// Resolve every line and profile, then build a new quote owned by the requester
    #[instrument(skip(self, request, ctx), fields(user_id = %ctx.requester_id))]
    pub async fn create_quote(
        &self,
        request: CreateQuoteRequest,
        ctx: &RequestContext,
    ) -> QuotingResult<Quote> {
        let contents = self.resolve_contents(request, ctx).await?;
        let quote = Quote::new(ctx.requester_id.clone(), contents)?;

        tracing::info!(
            quote_id = %quote.id(),
            lines = quote.filament_usage().len(),
            "Created quote"
        );
        Ok(quote)
    }

    /// Replace the quote's contents. Profiles omitted from the request are cleared.
    #[instrument(skip(self, quote, request, ctx), fields(quote_id = %quote.id(), user_id = %ctx.requester_id))]
    pub async fn update_quote(
        &self,
        quote: &mut Quote,
        request: UpdateQuoteRequest,
        ctx: &RequestContext,
    ) -> QuotingResult<()> {
        Self::ensure_access(quote, ctx)?;

        let contents = self.resolve_contents(request, ctx).await?;
        quote.replace_contents(contents)?;

        tracing::info!(quote_id = %quote.id(), "Updated quote");
        Ok(())
    }

    /// Price the quote and cache the breakdown on it
    #[instrument(skip(self, quote, input, ctx), fields(quote_id = %quote.id(), service_type = %input.service_type))]
    pub async fn calculate_quote(
        &self,
        quote: &mut Quote,
        input: CalculationInput,
        ctx: &RequestContext,
    ) -> QuotingResult<CostBreakdown> {
        Self::ensure_access(quote, ctx)?;

        let breakdown = compute_cost_breakdown(quote, &input)?;
        quote.record_calculation(breakdown.clone());

        tracing::info!(
            quote_id = %quote.id(),
            direct_cost = %self.display(breakdown.direct_cost),
            final_price = %self.display(breakdown.final_price),
            "Calculated quote"
        );
        Ok(breakdown)
    }

    #[instrument(skip(self, quote, ctx), fields(quote_id = %quote.id(), user_id = %ctx.requester_id))]
    pub async fn duplicate_quote(&self, quote: &Quote, ctx: &RequestContext) -> QuotingResult<Quote> {
        Self::ensure_access(quote, ctx)?;

        let copy = quote.duplicate_for(ctx.requester_id.clone())?;
        tracing::info!(source_id = %quote.id(), quote_id = %copy.id(), "Duplicated quote");
        Ok(copy)
    }

    fn ensure_access(quote: &Quote, ctx: &RequestContext) -> QuotingResult<()> {
        if !quote.can_access(&ctx.requester_id, ctx.is_admin) {
            tracing::warn!(quote_id = %quote.id(), user_id = %ctx.requester_id, "Quote access denied");
            return Err(QuotingError::access_denied("quote", quote.id()));
        }
        Ok(())
    }

    fn display(&self, value: Decimal) -> Decimal {
        round_half_up(value, self.config.price_scale)
    }

    /// Fan out every lookup concurrently and join them under one deadline.
    /// The first failure or the deadline drops the remaining lookups.
    async fn resolve_contents(
        &self,
        request: QuoteRequest,
        ctx: &RequestContext,
    ) -> QuotingResult<QuoteContents> {
        request.validate()?;

        let started = Instant::now();
        let deadline = ctx
            .deadline
            .unwrap_or_else(|| started + self.config.lookup_timeout());
        let scope = ctx.scope();
        let requester = ctx.requester_id.as_str();

        let lookups = async {
            tokio::try_join!(
                try_join_all(
                    request
                        .filament_lines
                        .iter()
                        .map(|line| self.snapshots.resolve(line, &scope))
                ),
                self.machines
                    .resolve_optional(request.machine_profile.as_ref(), requester),
                self.energy
                    .resolve_optional(request.energy_profile.as_ref(), requester),
                self.overheads
                    .resolve_optional(request.overhead_profile.as_ref(), requester),
                self.margins
                    .resolve_optional(request.margin_profile.as_ref(), requester),
            )
        };

        let (filament_usage, machine_profile, energy_profile, overhead_profile, margin_profile) =
            match tokio::time::timeout_at(deadline, lookups).await {
                Ok(resolved) => resolved?,
                Err(_) => {
                    let elapsed = started.elapsed();
                    tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "Quote resolution timed out");
                    return Err(QuotingError::DeadlineExceeded(elapsed));
                }
            };

        Ok(QuoteContents {
            title: request.title,
            notes: request.notes,
            filament_usage,
            machine_profile,
            energy_profile,
            overhead_profile,
            margin_profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockFilamentCatalog;
    use crate::models::FilamentAttributes;
    use crate::presets::{MockPresetStore, OverheadPreset, Preset, PresetPayload};
    use crate::requests::{EnergyInline, FilamentLineRequest, ProfileRequest};
    use rust_decimal_macros::dec;

    fn entry(id: u64) -> FilamentAttributes {
        FilamentAttributes {
            id,
            name: "PLA".to_string(),
            brand: "Esun".to_string(),
            material: "PLA".to_string(),
            color: "Blue".to_string(),
            color_hex: "#0000FF".to_string(),
            price_per_kg: dec!(100),
            price_per_meter: None,
            url: String::new(),
            owner_user_id: None,
        }
    }

    fn request() -> CreateQuoteRequest {
        CreateQuoteRequest {
            title: "Drone frame".to_string(),
            filament_lines: vec![
                FilamentLineRequest::from_catalog(1, dec!(80)),
                FilamentLineRequest::from_catalog(2, dec!(20)),
            ],
            energy_profile: Some(ProfileRequest::inline(EnergyInline {
                base_tariff: dec!(0.7),
                location: "Recife".to_string(),
                year: 2025,
                ..Default::default()
            })),
            overhead_profile: Some(ProfileRequest::preset("overhead_default")),
            ..Default::default()
        }
    }

    fn service() -> QuoteService<MockFilamentCatalog, MockPresetStore> {
        let mut catalog = MockFilamentCatalog::new();
        catalog
            .expect_get_by_id()
            .returning(|id, _| Ok(entry(id)));

        let mut presets = MockPresetStore::new();
        presets.expect_get_by_key().returning(|_| {
            Ok(Some(Preset::new(
                "overhead_default",
                PresetPayload::Overhead(OverheadPreset {
                    name: "Default".to_string(),
                    wear_percentage: dec!(10),
                    overhead_amount: dec!(2),
                    description: String::new(),
                }),
            )))
        });

        QuoteService::new(catalog, presets, QuotingConfig::default())
    }

    #[tokio::test]
    async fn test_create_quote_resolves_everything() {
        let service = service();
        let quote = service
            .create_quote(request(), &RequestContext::new("u1"))
            .await
            .unwrap();

        assert_eq!(quote.owner(), "u1");
        assert_eq!(quote.filament_usage().len(), 2);
        assert_eq!(quote.total_weight_grams(), dec!(100));
        assert_eq!(quote.energy_profile().unwrap().name, "Recife 2025");
        assert_eq!(
            quote.energy_profile().unwrap().owner_user_id.as_deref(),
            Some("u1")
        );
        assert_eq!(quote.overhead_profile().unwrap().name, "Default");
        assert!(quote.machine_profile().is_none());
    }

    #[tokio::test]
    async fn test_create_quote_fails_fast_on_profile_error() {
        let service = service();
        let mut bad = request();
        bad.machine_profile = Some(ProfileRequest::default());

        let result = service.create_quote(bad, &RequestContext::new("u1")).await;
        assert!(matches!(result, Err(QuotingError::Ambiguous(_))));
    }

    #[test]
    fn test_display_rounds_midpoints_away_from_zero() {
        let service = QuoteService::new(
            MockFilamentCatalog::new(),
            MockPresetStore::new(),
            QuotingConfig::default(),
        );

        assert_eq!(service.display(dec!(18.105)), dec!(18.11));
        assert_eq!(service.display(dec!(0.125)), dec!(0.13));
        assert_eq!(service.display(dec!(-2.675)), dec!(-2.68));
    }

    #[tokio::test]
    async fn test_create_quote_rejects_empty_lines_before_lookups() {
        let service = QuoteService::new(
            MockFilamentCatalog::new(),
            MockPresetStore::new(),
            QuotingConfig::default(),
        );
        let empty = CreateQuoteRequest {
            title: "Nothing".to_string(),
            ..Default::default()
        };

        let result = service.create_quote(empty, &RequestContext::new("u1")).await;
        assert!(matches!(result, Err(QuotingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_calculate_caches_breakdown() {
        let service = service();
        let ctx = RequestContext::new("u1");
        let mut quote = service.create_quote(request(), &ctx).await.unwrap();

        let breakdown = service
            .calculate_quote(&mut quote, CalculationInput::new(dec!(0), "printing_only"), &ctx)
            .await
            .unwrap();

        // 100 g at 100/kg, 10% wear, 2 flat overhead
        assert_eq!(breakdown.direct_cost, dec!(13));
        let cached = quote.last_calculation().unwrap();
        assert_eq!(cached.breakdown, breakdown);
    }

    #[tokio::test]
    async fn test_other_users_cannot_touch_quote() {
        let service = service();
        let mut quote = service
            .create_quote(request(), &RequestContext::new("u1"))
            .await
            .unwrap();
        let stranger = RequestContext::new("u2");

        let calc = service
            .calculate_quote(&mut quote, CalculationInput::new(dec!(1), "printing_only"), &stranger)
            .await;
        assert!(matches!(calc, Err(QuotingError::AccessDenied { entity: "quote", .. })));

        let update = service.update_quote(&mut quote, request(), &stranger).await;
        assert!(matches!(update, Err(QuotingError::AccessDenied { .. })));

        let copy = service.duplicate_quote(&quote, &stranger.as_admin()).await.unwrap();
        assert_eq!(copy.owner(), "u2");
    }

    #[tokio::test]
    async fn test_update_clears_omitted_profiles() {
        let service = service();
        let ctx = RequestContext::new("u1");
        let mut quote = service.create_quote(request(), &ctx).await.unwrap();

        let mut update = request();
        update.title = "Drone frame v2".to_string();
        update.overhead_profile = None;
        service.update_quote(&mut quote, update, &ctx).await.unwrap();

        assert_eq!(quote.title(), "Drone frame v2");
        assert!(quote.overhead_profile().is_none());
        assert!(quote.energy_profile().is_some());
    }
}
