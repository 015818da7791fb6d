//! Quoting Domain
//!
//! Prices 3D-print jobs. Filament prices are frozen into each quote when it is
//! built, cost profiles come from shared presets or inline data, and the cost
//! pipeline turns a quote plus timing inputs into a layered breakdown.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   QuoteService   │  ← Orchestration, deadlines, access checks
//! └────────┬─────────┘
//!          │ fan-out
//! ┌────────▼─────────┐     ┌──────────────────┐
//! │    Resolvers     │ ──► │  Catalog/Presets │  ← Collaborator traits
//! │ snapshot/profile │     └──────────────────┘
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │      Quote       │  ← Aggregate, invariants, ownership
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │    Calculator    │  ← Pure cost pipeline
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_quoting::{
//!     CalculationInput, CreateQuoteRequest, FilamentLineRequest, InMemoryFilamentCatalog,
//!     InMemoryPresetStore, ProfileRequest, QuoteService, QuotingConfig, RequestContext,
//! };
//! use rust_decimal::Decimal;
//!
//! # async fn run() -> domain_quoting::QuotingResult<()> {
//! let service = QuoteService::new(
//!     InMemoryFilamentCatalog::new(),
//!     InMemoryPresetStore::new(),
//!     QuotingConfig::default(),
//! );
//! let ctx = RequestContext::new("user-1");
//!
//! let request = CreateQuoteRequest {
//!     title: "Bracket".to_string(),
//!     filament_lines: vec![FilamentLineRequest::from_catalog(1, Decimal::from(100))],
//!     margin_profile: Some(ProfileRequest::preset("margin_default")),
//!     ..Default::default()
//! };
//! let mut quote = service.create_quote(request, &ctx).await?;
//!
//! let input = CalculationInput::new(Decimal::from(2), "printing_only");
//! let breakdown = service.calculate_quote(&mut quote, input, &ctx).await?;
//! println!("{}", breakdown.rounded(2).final_price);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod calculator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod presets;
pub mod profiles;
pub mod quote;
pub mod requests;
pub mod service;
pub mod snapshot;

// Re-export commonly used types
pub use access::Owned;
pub use calculator::compute_cost_breakdown;
pub use catalog::{FilamentCatalog, InMemoryFilamentCatalog, RequesterScope};
pub use config::QuotingConfig;
pub use error::{QuotingError, QuotingResult};
pub use models::{
    CalculationRecord, CostBreakdown, EnergyProfile, FilamentAttributes, FilamentLineCost,
    FilamentUsageSnapshot, MachineProfile, MarginProfile, OverheadProfile, ServiceTier, TierPrice,
};
pub use presets::{
    EnergyPreset, InMemoryPresetStore, MachinePreset, MarginPreset, OverheadPreset, Preset,
    PresetFamily, PresetPayload, PresetStore,
};
pub use profiles::{
    EnergyKind, EnergyProfileResolver, MachineKind, MachineProfileResolver, MarginKind,
    MarginProfileResolver, OverheadKind, OverheadProfileResolver, ProfileKind, ProfileResolver,
};
pub use quote::{Quote, QuoteContents};
pub use requests::{
    CalculationInput, CreateQuoteRequest, EnergyInline, EnergyProfileRequest,
    FilamentLineRequest, MachineInline, MachineProfileRequest, MarginInline, MarginProfileRequest,
    OverheadInline, OverheadProfileRequest, ProfileRequest, QuoteRequest, UpdateQuoteRequest,
};
pub use service::{QuoteService, RequestContext};
pub use snapshot::SnapshotResolver;
