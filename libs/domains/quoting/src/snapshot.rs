use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::access::Owned;
use crate::catalog::{FilamentCatalog, RequesterScope};
use crate::error::{QuotingError, QuotingResult};
use crate::models::FilamentUsageSnapshot;
use crate::requests::FilamentLineRequest;

/// Turns a filament line into a frozen usage snapshot
pub struct SnapshotResolver<C: FilamentCatalog> {
    catalog: Arc<C>,
}

impl<C: FilamentCatalog> Clone for SnapshotResolver<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<C: FilamentCatalog> SnapshotResolver<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    /// Resolve one line. Catalog references are copied field by field; the
    /// snapshot never points back at the live entry.
    #[instrument(skip(self, line), fields(filament_id = ?line.filament_id, user_id = %scope.user_id))]
    pub async fn resolve(
        &self,
        line: &FilamentLineRequest,
        scope: &RequesterScope,
    ) -> QuotingResult<FilamentUsageSnapshot> {
        line.validate()?;

        match line.filament_id {
            Some(0) => Err(QuotingError::Validation(
                "filament_id must be greater than 0".to_string(),
            )),
            Some(id) => {
                let entry = self.catalog.get_by_id(id, scope).await?;
                if !entry.can_user_access(&scope.user_id, scope.is_admin) {
                    return Err(QuotingError::access_denied("filament", id));
                }

                tracing::debug!(filament_id = id, price_per_kg = %entry.price_per_kg, "Captured catalog snapshot");
                Ok(FilamentUsageSnapshot::from_catalog(
                    &entry,
                    line.weight_grams,
                    line.length_meters,
                ))
            }
            None => {
                let missing = line.missing_manual_fields();
                if !missing.is_empty() {
                    return Err(QuotingError::Validation(format!(
                        "manual filament requires: {}",
                        missing.join(", ")
                    )));
                }

                // missing_manual_fields guarantees a positive price here
                let price_per_kg = line.price_per_kg.unwrap_or_default();
                Ok(FilamentUsageSnapshot::from_manual(line, price_per_kg))
            }
        }
    }
}
