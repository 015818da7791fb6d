//! Profile resolution.
//!
//! Each profile kind (machine, energy, overhead, margin) describes how to
//! validate its inline form, how to read its preset family and how to name
//! itself. [`ProfileResolver`] drives those steps identically for every kind.

mod energy;
mod machine;
mod margin;
mod overhead;

pub use energy::EnergyKind;
pub use machine::MachineKind;
pub use margin::MarginKind;
pub use overhead::OverheadKind;

use std::marker::PhantomData;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{QuotingError, QuotingResult};
use crate::presets::{PresetFamily, PresetPayload, PresetStore};
use crate::requests::ProfileRequest;

/// Capabilities a profile kind provides to the generic resolver
pub trait ProfileKind: Send + Sync + 'static {
    type Inline: Send + Sync;
    type Profile: Send;

    /// Entity name used in errors and logs
    const ENTITY: &'static str;
    const FAMILY: PresetFamily;

    /// Whether the inline form carries any data at all
    fn has_inline_values(inline: &Self::Inline) -> bool;

    fn validate_inline(inline: &Self::Inline) -> QuotingResult<()>;

    /// Name derived from the inline data, used when no explicit name is given
    fn synthesize_name(inline: &Self::Inline) -> String;

    fn inline_name(inline: &Self::Inline) -> &str;

    fn from_inline(inline: &Self::Inline, name: String, requester_id: &str) -> Self::Profile;

    /// Build the profile from a payload already known to be of `FAMILY`.
    fn from_preset(key: &str, payload: PresetPayload) -> QuotingResult<Self::Profile>;
}

/// Resolves a [`ProfileRequest`] of one kind into its profile record
pub struct ProfileResolver<K, S> {
    store: Arc<S>,
    _kind: PhantomData<fn() -> K>,
}

impl<K, S> Clone for ProfileResolver<K, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _kind: PhantomData,
        }
    }
}

pub type MachineProfileResolver<S> = ProfileResolver<MachineKind, S>;
pub type EnergyProfileResolver<S> = ProfileResolver<EnergyKind, S>;
pub type OverheadProfileResolver<S> = ProfileResolver<OverheadKind, S>;
pub type MarginProfileResolver<S> = ProfileResolver<MarginKind, S>;

impl<K: ProfileKind, S: PresetStore> ProfileResolver<K, S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    #[instrument(skip(self, request), fields(kind = K::ENTITY))]
    pub async fn resolve(
        &self,
        request: &ProfileRequest<K::Inline>,
        requester_id: &str,
    ) -> QuotingResult<K::Profile> {
        let has_inline = K::has_inline_values(&request.inline);

        match (request.preset_key(), has_inline) {
            (Some(key), true) => Err(QuotingError::Ambiguous(format!(
                "{} request has both preset_key '{}' and inline fields",
                K::ENTITY,
                key
            ))),
            (None, false) => Err(QuotingError::Ambiguous(format!(
                "{} request has neither preset_key nor inline fields",
                K::ENTITY
            ))),
            (Some(key), false) => self.resolve_preset(key).await,
            (None, true) => {
                K::validate_inline(&request.inline)?;

                let name = match K::inline_name(&request.inline).trim() {
                    "" => K::synthesize_name(&request.inline),
                    explicit => explicit.to_string(),
                };
                tracing::debug!(kind = K::ENTITY, name = %name, "Resolved inline profile");
                Ok(K::from_inline(&request.inline, name, requester_id))
            }
        }
    }

    /// Resolve an optional request; an absent request leaves the slot empty.
    pub async fn resolve_optional(
        &self,
        request: Option<&ProfileRequest<K::Inline>>,
        requester_id: &str,
    ) -> QuotingResult<Option<K::Profile>> {
        match request {
            Some(request) => self.resolve(request, requester_id).await.map(Some),
            None => Ok(None),
        }
    }

    async fn resolve_preset(&self, key: &str) -> QuotingResult<K::Profile> {
        let preset = self
            .store
            .get_by_key(key)
            .await?
            .ok_or_else(|| QuotingError::not_found("preset", key))?;

        let family = preset.family();
        if family != K::FAMILY {
            return Err(QuotingError::invalid_preset(
                key,
                format!("expected a {} preset, found {}", K::FAMILY, family),
            ));
        }

        tracing::debug!(kind = K::ENTITY, preset_key = %key, "Resolved preset profile");
        K::from_preset(key, preset.payload)
    }
}

pub(crate) fn is_positive(value: rust_decimal::Decimal) -> bool {
    value > rust_decimal::Decimal::ZERO
}

pub(crate) fn is_negative(value: rust_decimal::Decimal) -> bool {
    value < rust_decimal::Decimal::ZERO
}

/// Join violations into a single validation error, or succeed when there are none.
pub(crate) fn check(entity: &str, violations: Vec<String>) -> QuotingResult<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(QuotingError::Validation(format!(
            "{entity}: {}",
            violations.join("; ")
        )))
    }
}
