use crate::domain::model::{PricingTier, TierFeeType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

fn sorted(tiers: &[PricingTier]) -> Vec<&PricingTier> {
    let mut sorted: Vec<&PricingTier> = tiers.iter().collect();
    sorted.sort_by(|a, b| a.from_units.total_cmp(&b.from_units));
    sorted
}

/// Progressive fee for `units` across `tiers`.
///
/// Each tier charges for the part of `units` falling inside it; an unbounded
/// tier ends at `units` itself. The tier set is expected to be valid (see
/// [`validate_slabs`]); an empty set costs nothing.
pub fn slab_fee(units: f64, tiers: &[PricingTier]) -> f64 {
    if tiers.is_empty() || !(units > 0.0) {
        return 0.0;
    }

    let mut fee = 0.0;
    for tier in sorted(tiers) {
        let tier_end = tier.to_units.unwrap_or(units);
        let units_in_tier = units.min(tier_end) - tier.from_units.max(0.0);

        if units_in_tier > 0.0 {
            fee += match tier.fee_type {
                TierFeeType::PerUnit => units_in_tier * tier.rate_per_unit,
                TierFeeType::Flat => tier.rate_per_unit,
            };
        }

        if tier_end >= units {
            break;
        }
    }
    fee
}

/// Checks a tier set for structural correctness and reports every violation.
pub fn validate_slabs(tiers: &[PricingTier]) -> SlabValidation {
    let mut errors = Vec::new();
    let tiers = sorted(tiers);

    if let Some(first) = tiers.first() {
        if first.from_units != 0.0 {
            errors.push(format!(
                "First slab must start at 0 units (starts at {})",
                first.from_units
            ));
        }
    }

    for (i, tier) in tiers.iter().enumerate() {
        let n = i + 1;

        if let Some(to) = tier.to_units {
            if to <= tier.from_units {
                errors.push(format!(
                    "Slab {}: upper bound {} must be greater than lower bound {}",
                    n, to, tier.from_units
                ));
            }
        }

        if !(tier.rate_per_unit >= 0.0) {
            errors.push(format!(
                "Slab {}: rate per unit must not be negative ({})",
                n, tier.rate_per_unit
            ));
        }

        let Some(next) = tiers.get(i + 1) else {
            continue;
        };
        match tier.to_units {
            Some(end) if end < next.from_units => errors.push(format!(
                "Gap between slab {} (ends at {}) and slab {} (starts at {})",
                n,
                end,
                n + 1,
                next.from_units
            )),
            Some(end) if end > next.from_units => errors.push(format!(
                "Overlap between slab {} (ends at {}) and slab {} (starts at {})",
                n,
                end,
                n + 1,
                next.from_units
            )),
            Some(_) => {}
            None => errors.push(format!(
                "Overlap between slab {} (unbounded) and slab {} (starts at {}); only the last slab may be unbounded",
                n,
                n + 1,
                next.from_units
            )),
        }
    }

    SlabValidation {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tiers() -> Vec<PricingTier> {
        vec![
            PricingTier::new(0.0, Some(100.0), 100.0),
            PricingTier::new(100.0, None, 75.0),
        ]
    }

    #[test]
    fn test_slab_fee_spans_tiers() {
        assert_eq!(slab_fee(150.0, &two_tiers()), 13_750.0);
    }

    #[test]
    fn test_slab_fee_within_first_tier() {
        assert_eq!(slab_fee(40.0, &two_tiers()), 4_000.0);
        assert_eq!(slab_fee(100.0, &two_tiers()), 10_000.0);
    }

    #[test]
    fn test_slab_fee_empty_or_zero() {
        assert_eq!(slab_fee(500.0, &[]), 0.0);
        assert_eq!(slab_fee(0.0, &two_tiers()), 0.0);
    }

    #[test]
    fn test_slab_fee_sorts_tiers() {
        let mut tiers = two_tiers();
        tiers.reverse();
        assert_eq!(slab_fee(150.0, &tiers), 13_750.0);
    }

    #[test]
    fn test_bounded_last_tier_does_not_charge_beyond_bound() {
        let tiers = vec![
            PricingTier::new(0.0, Some(10.0), 2.0),
            PricingTier::new(10.0, Some(20.0), 1.0),
        ];
        assert_eq!(slab_fee(50.0, &tiers), 30.0);
    }

    #[test]
    fn test_flat_tier_charges_block_fee() {
        let mut tiers = two_tiers();
        tiers[1].fee_type = TierFeeType::Flat;
        tiers[1].rate_per_unit = 500.0;

        assert_eq!(slab_fee(100.0, &tiers), 10_000.0);
        assert_eq!(slab_fee(101.0, &tiers), 10_500.0);
        assert_eq!(slab_fee(900.0, &tiers), 10_500.0);
    }

    #[test]
    fn test_slab_fee_is_monotonic() {
        let tiers = vec![
            PricingTier::new(0.0, Some(10.0), 5.0),
            PricingTier::new(10.0, Some(100.0), 3.0),
            PricingTier::new(100.0, None, 1.0),
        ];
        let mut previous = 0.0;
        for units in 0..300 {
            let fee = slab_fee(units as f64, &tiers);
            assert!(fee >= previous);
            previous = fee;
        }
    }

    #[test]
    fn test_validate_contiguous_tiers() {
        let result = validate_slabs(&two_tiers());
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(validate_slabs(&[]).valid);
    }

    #[test]
    fn test_validate_reports_gap() {
        let tiers = vec![
            PricingTier::new(0.0, Some(50.0), 10.0),
            PricingTier::new(60.0, None, 8.0),
        ];
        let result = validate_slabs(&tiers);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Gap"));
    }

    #[test]
    fn test_validate_reports_overlap() {
        let tiers = vec![
            PricingTier::new(0.0, Some(80.0), 10.0),
            PricingTier::new(60.0, None, 8.0),
        ];
        let result = validate_slabs(&tiers);
        assert!(result.errors.iter().any(|e| e.starts_with("Overlap")));
    }

    #[test]
    fn test_validate_first_slab_must_start_at_zero() {
        let result = validate_slabs(&[PricingTier::new(50.0, None, 10.0)]);
        assert!(!result.valid);
        assert!(result.errors[0].contains("must start at 0"));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let tiers = vec![
            PricingTier::new(5.0, Some(10.0), -1.0),
            PricingTier::new(20.0, None, 2.0),
        ];
        let result = validate_slabs(&tiers);
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_validate_unbounded_tier_must_be_last() {
        let tiers = vec![
            PricingTier::new(0.0, None, 1.0),
            PricingTier::new(100.0, None, 1.0),
        ];
        let result = validate_slabs(&tiers);
        assert!(result.errors[0].contains("only the last slab may be unbounded"));
    }
}
