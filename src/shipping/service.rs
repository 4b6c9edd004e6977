use rust_decimal::Decimal;
use uuid::Uuid;

use crate::shipping::error::ShippingConfigError;
use crate::shipping::models::{CreateTierRequest, ShippingTier, UpdateTierRequest};
use crate::shipping::repository::ShippingTierRepository;

/// Service for shipping tier administration. Overlap between active tiers is
/// rejected here, at write time, so resolution never has to arbitrate
/// double-matches in the normal case.
#[derive(Clone)]
pub struct ShippingService {
    repo: ShippingTierRepository,
}

/// Whether the candidate range [min, max] (inclusive, None = unbounded)
/// overlaps any of the given tiers' ranges.
fn find_overlap(
    min: Decimal,
    max: Option<Decimal>,
    others: &[ShippingTier],
) -> Option<&ShippingTier> {
    others.iter().find(|tier| {
        let candidate_starts_before_other_ends = match tier.max_amount {
            Some(other_max) => min <= other_max,
            None => true,
        };
        let other_starts_before_candidate_ends = match max {
            Some(candidate_max) => tier.min_amount <= candidate_max,
            None => true,
        };
        candidate_starts_before_other_ends && other_starts_before_candidate_ends
    })
}

fn validate_range(
    min: Decimal,
    max: Option<Decimal>,
    charge: Decimal,
) -> Result<(), ShippingConfigError> {
    if min < Decimal::ZERO {
        return Err(ShippingConfigError::NegativeMinAmount);
    }
    if charge < Decimal::ZERO {
        return Err(ShippingConfigError::NegativeCharge);
    }
    if let Some(max) = max {
        if max <= min {
            return Err(ShippingConfigError::InvertedRange);
        }
    }
    Ok(())
}

impl ShippingService {
    pub fn new(repo: ShippingTierRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &ShippingTierRepository {
        &self.repo
    }

    pub async fn create_tier(
        &self,
        request: CreateTierRequest,
    ) -> Result<ShippingTier, ShippingConfigError> {
        validate_range(
            request.min_amount,
            request.max_amount,
            request.shipping_charge,
        )?;

        if request.is_active {
            let existing = self.repo.find_active_excluding(None).await?;
            if let Some(other) = find_overlap(request.min_amount, request.max_amount, &existing) {
                return Err(ShippingConfigError::RangeOverlap(format!(
                    "overlaps with tier {}",
                    other.range_label()
                )));
            }
        }

        let tier = ShippingTier {
            id: Uuid::new_v4(),
            min_amount: request.min_amount,
            max_amount: request.max_amount,
            shipping_charge: request.shipping_charge,
            is_active: request.is_active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let created = self.repo.insert(&tier).await?;
        tracing::info!(
            "Created shipping tier {} ({})",
            created.id,
            created.range_label()
        );
        Ok(created)
    }

    pub async fn update_tier(
        &self,
        id: Uuid,
        request: UpdateTierRequest,
    ) -> Result<ShippingTier, ShippingConfigError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ShippingConfigError::NotFound)?;

        let mut tier = existing;
        if let Some(min) = request.min_amount {
            tier.min_amount = min;
        }
        if let Some(max) = request.max_amount {
            tier.max_amount = Some(max);
        }
        if let Some(charge) = request.shipping_charge {
            tier.shipping_charge = charge;
        }
        if let Some(active) = request.is_active {
            tier.is_active = active;
        }

        validate_range(tier.min_amount, tier.max_amount, tier.shipping_charge)?;

        if tier.is_active {
            let others = self.repo.find_active_excluding(Some(id)).await?;
            if let Some(other) = find_overlap(tier.min_amount, tier.max_amount, &others) {
                return Err(ShippingConfigError::RangeOverlap(format!(
                    "overlaps with tier {}",
                    other.range_label()
                )));
            }
        }

        self.repo.update(&tier).await
    }

    /// Flip active status; activation re-checks overlap against the other
    /// active tiers.
    pub async fn toggle_tier(&self, id: Uuid) -> Result<ShippingTier, ShippingConfigError> {
        let mut tier = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ShippingConfigError::NotFound)?;

        tier.is_active = !tier.is_active;

        if tier.is_active {
            let others = self.repo.find_active_excluding(Some(id)).await?;
            if let Some(other) = find_overlap(tier.min_amount, tier.max_amount, &others) {
                return Err(ShippingConfigError::RangeOverlap(format!(
                    "cannot activate, overlaps with tier {}",
                    other.range_label()
                )));
            }
        }

        self.repo.update(&tier).await
    }

    pub async fn delete_tier(&self, id: Uuid) -> Result<(), ShippingConfigError> {
        self.repo.delete(id).await?;
        tracing::info!("Deleted shipping tier {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn tier(min: Decimal, max: Option<Decimal>) -> ShippingTier {
        ShippingTier {
            id: Uuid::new_v4(),
            min_amount: min,
            max_amount: max,
            shipping_charge: dec!(49),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_disjoint_ranges_do_not_overlap() {
        let others = vec![tier(dec!(0), Some(dec!(499)))];
        assert!(find_overlap(dec!(499.01), Some(dec!(999)), &others).is_none());
        assert!(find_overlap(dec!(500), None, &others).is_none());
    }

    #[test]
    fn test_candidate_starting_inside_existing_overlaps() {
        let others = vec![tier(dec!(0), Some(dec!(499)))];
        assert!(find_overlap(dec!(250), Some(dec!(999)), &others).is_some());
    }

    #[test]
    fn test_candidate_ending_inside_existing_overlaps() {
        let others = vec![tier(dec!(500), Some(dec!(999)))];
        assert!(find_overlap(dec!(0), Some(dec!(600)), &others).is_some());
    }

    #[test]
    fn test_candidate_containing_existing_overlaps() {
        let others = vec![tier(dec!(300), Some(dec!(400)))];
        assert!(find_overlap(dec!(0), None, &others).is_some());
    }

    #[test]
    fn test_unbounded_existing_blocks_everything_above_its_min() {
        let others = vec![tier(dec!(999), None)];
        assert!(find_overlap(dec!(1500), Some(dec!(2000)), &others).is_some());
        assert!(find_overlap(dec!(0), Some(dec!(998.99)), &others).is_none());
    }

    #[test]
    fn test_shared_boundary_value_counts_as_overlap() {
        // max is inclusive, so a tier ending at 499 and one starting at 499
        // would both match subtotal 499
        let others = vec![tier(dec!(0), Some(dec!(499)))];
        assert!(find_overlap(dec!(499), Some(dec!(999)), &others).is_some());
    }

    #[test]
    fn test_validate_range_rejects_bad_input() {
        assert!(matches!(
            validate_range(dec!(-1), None, dec!(49)),
            Err(ShippingConfigError::NegativeMinAmount)
        ));
        assert!(matches!(
            validate_range(dec!(0), None, dec!(-5)),
            Err(ShippingConfigError::NegativeCharge)
        ));
        assert!(matches!(
            validate_range(dec!(500), Some(dec!(500)), dec!(49)),
            Err(ShippingConfigError::InvertedRange)
        ));
        assert!(validate_range(dec!(0), Some(dec!(499)), dec!(49)).is_ok());
    }
}
