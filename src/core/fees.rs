use crate::core::growth::check_non_negative;
use crate::core::slab::slab_fee;
use crate::domain::model::{Module, PricingType};
use crate::utils::error::Result;

/// Fee of one module for one period, given the units of its unit type.
///
/// The module minimum, when set, is a floor for every pricing type.
pub fn module_fee(units: f64, module: &Module) -> Result<f64> {
    check_non_negative("units", units)?;

    let monthly_fee = module.monthly_fee.unwrap_or(0.0);
    let fee = match module.pricing_type {
        PricingType::Flat => monthly_fee,
        PricingType::PerUnit => units * monthly_fee,
        PricingType::Slab => slab_fee(units, &module.slabs),
    };

    Ok(match module.module_minimum_fee {
        Some(minimum) if fee < minimum => minimum,
        _ => fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PricingTier;

    #[test]
    fn test_flat_ignores_units() {
        let module = Module::flat("f", "Platform", 1000.0);
        assert_eq!(module_fee(0.0, &module).unwrap(), 1000.0);
        assert_eq!(module_fee(5000.0, &module).unwrap(), 1000.0);
    }

    #[test]
    fn test_per_unit_multiplies() {
        let module = Module::per_unit("p", "Seats", "seats", 12.5);
        assert_eq!(module_fee(8.0, &module).unwrap(), 100.0);
    }

    #[test]
    fn test_slab_uses_tiers() {
        let module = Module::slab(
            "s",
            "API",
            "calls",
            vec![
                PricingTier::new(0.0, Some(100.0), 100.0),
                PricingTier::new(100.0, None, 75.0),
            ],
        );
        assert_eq!(module_fee(150.0, &module).unwrap(), 13_750.0);
    }

    #[test]
    fn test_module_minimum_is_a_floor() {
        let mut module = Module::per_unit("p", "Seats", "seats", 10.0);
        module.module_minimum_fee = Some(250.0);

        for units in [0.0, 3.0, 25.0, 26.0, 1000.0] {
            assert!(module_fee(units, &module).unwrap() >= 250.0);
        }
        assert_eq!(module_fee(3.0, &module).unwrap(), 250.0);
        assert_eq!(module_fee(30.0, &module).unwrap(), 300.0);
    }

    #[test]
    fn test_missing_monthly_fee_counts_as_zero() {
        let mut module = Module::flat("f", "Free", 0.0);
        module.monthly_fee = None;
        assert_eq!(module_fee(10.0, &module).unwrap(), 0.0);
    }

    #[test]
    fn test_negative_units_are_rejected() {
        let module = Module::flat("f", "Platform", 1000.0);
        assert!(module_fee(-1.0, &module).is_err());
    }
}
