use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::access::Owned;
use crate::error::{QuotingError, QuotingResult};
use crate::models::FilamentAttributes;

/// Identity a catalog lookup is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterScope {
    pub user_id: String,
    pub is_admin: bool,
}

impl RequesterScope {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }
}

/// Read access to the live filament catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FilamentCatalog: Send + Sync {
    /// Fetch the current attributes of a filament visible to `scope`.
    ///
    /// Fails with `NotFound` for unknown ids and `AccessDenied` when the entry
    /// belongs to another user.
    async fn get_by_id(&self, id: u64, scope: &RequesterScope)
    -> QuotingResult<FilamentAttributes>;
}

/// In-memory implementation of FilamentCatalog (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryFilamentCatalog {
    filaments: Arc<RwLock<HashMap<u64, FilamentAttributes>>>,
}

impl InMemoryFilamentCatalog {
    pub fn new() -> Self {
        Self {
            filaments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace an entry
    pub async fn upsert(&self, entry: FilamentAttributes) {
        let mut filaments = self.filaments.write().await;
        tracing::info!(filament_id = entry.id, "Stored filament");
        filaments.insert(entry.id, entry);
    }

    pub async fn update_price(
        &self,
        id: u64,
        price_per_kg: Decimal,
        price_per_meter: Option<Decimal>,
    ) -> QuotingResult<FilamentAttributes> {
        let mut filaments = self.filaments.write().await;
        let entry = filaments
            .get_mut(&id)
            .ok_or_else(|| QuotingError::not_found("filament", id))?;

        entry.price_per_kg = price_per_kg;
        entry.price_per_meter = price_per_meter;

        tracing::info!(filament_id = id, price_per_kg = %price_per_kg, "Updated filament price");
        Ok(entry.clone())
    }

    pub async fn remove(&self, id: u64) -> bool {
        let mut filaments = self.filaments.write().await;
        let removed = filaments.remove(&id).is_some();
        if removed {
            tracing::info!(filament_id = id, "Removed filament");
        }
        removed
    }
}

#[async_trait]
impl FilamentCatalog for InMemoryFilamentCatalog {
    async fn get_by_id(
        &self,
        id: u64,
        scope: &RequesterScope,
    ) -> QuotingResult<FilamentAttributes> {
        let filaments = self.filaments.read().await;
        let entry = filaments
            .get(&id)
            .ok_or_else(|| QuotingError::not_found("filament", id))?;

        if !entry.can_user_access(&scope.user_id, scope.is_admin) {
            return Err(QuotingError::access_denied("filament", id));
        }

        Ok(entry.clone())
    }
}
