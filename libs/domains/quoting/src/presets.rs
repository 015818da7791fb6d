use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use strum::{Display, EnumString};
use tokio::sync::RwLock;

use crate::error::{QuotingError, QuotingResult};

/// Preset families, one per profile kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PresetFamily {
    Machine,
    Energy,
    Overhead,
    Margin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachinePreset {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub watt: Decimal,
    #[serde(default)]
    pub idle_factor: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnergyPreset {
    pub base_tariff: Decimal,
    #[serde(default)]
    pub flag_surcharge: Decimal,
    pub location: String,
    pub year: i32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverheadPreset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub wear_percentage: Decimal,
    #[serde(default)]
    pub overhead_amount: Decimal,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarginPreset {
    #[serde(default)]
    pub name: String,
    pub printing_only_margin: Decimal,
    pub printing_plus_margin: Decimal,
    pub full_service_margin: Decimal,
    #[serde(default)]
    pub operator_rate_per_hour: Decimal,
    #[serde(default)]
    pub modeler_rate_per_hour: Decimal,
    #[serde(default)]
    pub description: String,
}

/// Typed preset data. Serialized as `{"kind": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PresetPayload {
    Machine(MachinePreset),
    Energy(EnergyPreset),
    Overhead(OverheadPreset),
    Margin(MarginPreset),
}

impl PresetPayload {
    pub fn family(&self) -> PresetFamily {
        match self {
            Self::Machine(_) => PresetFamily::Machine,
            Self::Energy(_) => PresetFamily::Energy,
            Self::Overhead(_) => PresetFamily::Overhead,
            Self::Margin(_) => PresetFamily::Margin,
        }
    }
}

/// Named, reusable bundle of profile data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub key: String,
    pub payload: PresetPayload,
}

impl Preset {
    pub fn new(key: impl Into<String>, payload: PresetPayload) -> Self {
        Self {
            key: key.into(),
            payload,
        }
    }

    /// Decode a stored JSON payload. Malformed data is reported against the key.
    pub fn decode(key: impl Into<String>, raw: &str) -> QuotingResult<Self> {
        let key = key.into();
        match serde_json::from_str::<PresetPayload>(raw) {
            Ok(payload) => Ok(Self { key, payload }),
            Err(e) => Err(QuotingError::invalid_preset(key, e.to_string())),
        }
    }

    pub fn family(&self) -> PresetFamily {
        self.payload.family()
    }
}

/// Read-only lookup of presets by key
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresetStore: Send + Sync {
    /// Returns `None` when no preset is stored under `key`
    async fn get_by_key(&self, key: &str) -> QuotingResult<Option<Preset>>;
}

/// In-memory implementation of PresetStore (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryPresetStore {
    presets: Arc<RwLock<HashMap<String, Preset>>>,
}

impl InMemoryPresetStore {
    pub fn new() -> Self {
        Self {
            presets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, preset: Preset) -> QuotingResult<()> {
        if preset.key.trim().is_empty() {
            return Err(QuotingError::Validation(
                "preset key must not be empty".to_string(),
            ));
        }

        let mut presets = self.presets.write().await;
        tracing::info!(preset_key = %preset.key, family = %preset.family(), "Stored preset");
        presets.insert(preset.key.clone(), preset);
        Ok(())
    }

    /// Decode and store a raw JSON payload under `key`.
    pub async fn insert_raw(&self, key: &str, raw: &str) -> QuotingResult<()> {
        let preset = Preset::decode(key, raw)?;
        self.insert(preset).await
    }

    pub async fn remove(&self, key: &str) -> bool {
        let mut presets = self.presets.write().await;
        presets.remove(key).is_some()
    }

    pub async fn list_by_family(&self, family: PresetFamily) -> Vec<Preset> {
        let presets = self.presets.read().await;
        let mut result: Vec<Preset> = presets
            .values()
            .filter(|p| p.family() == family)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.key.cmp(&b.key));
        result
    }
}

#[async_trait]
impl PresetStore for InMemoryPresetStore {
    async fn get_by_key(&self, key: &str) -> QuotingResult<Option<Preset>> {
        let presets = self.presets.read().await;
        Ok(presets.get(key).cloned())
    }
}
