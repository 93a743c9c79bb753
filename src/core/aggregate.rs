use crate::core::fees::module_fee;
use crate::core::growth::{check_non_negative, grow_from, unit_type_units};
use crate::domain::model::{FeeBreakdown, ModuleFee, PricingModel, UnitOverride, UnitType};
use crate::utils::error::{PricingError, Result};
use std::collections::BTreeMap;

/// Periods in which the implementation fee is charged.
pub const IMPLEMENTATION_FEE_PERIODS: [u32; 2] = [0, 1];

/// Manually edited unit counts, per unit type and period.
///
/// An edit replaces the projected value at its period and re-seeds growth for
/// every later period, keeping the unit type's configured growth law.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOverrides {
    edits: BTreeMap<String, BTreeMap<u32, f64>>,
}

impl UnitOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Returns a new override set with `units` recorded for `unit_type_id` at `period`.
    pub fn apply(
        &self,
        model: &PricingModel,
        unit_type_id: &str,
        period: u32,
        units: f64,
    ) -> Result<Self> {
        if model.unit_type(unit_type_id).is_none() {
            return Err(PricingError::NotFoundError {
                kind: "unit type".to_string(),
                id: unit_type_id.to_string(),
            });
        }
        check_non_negative("units", units)?;

        let mut next = self.clone();
        next.edits
            .entry(unit_type_id.to_string())
            .or_default()
            .insert(period, units);
        Ok(next)
    }

    pub fn from_entries(model: &PricingModel, entries: &[UnitOverride]) -> Result<Self> {
        entries.iter().try_fold(Self::new(), |overrides, entry| {
            overrides.apply(model, &entry.unit_type_id, entry.period, entry.units)
        })
    }

    pub fn entries(&self) -> Vec<UnitOverride> {
        self.edits
            .iter()
            .flat_map(|(unit_type_id, periods)| {
                periods.iter().map(move |(&period, &units)| UnitOverride {
                    unit_type_id: unit_type_id.clone(),
                    period,
                    units,
                })
            })
            .collect()
    }

    /// The latest edit at or before `period`.
    fn governing(&self, unit_type_id: &str, period: u32) -> Option<(u32, f64)> {
        self.edits
            .get(unit_type_id)?
            .range(..=period)
            .next_back()
            .map(|(&p, &units)| (p, units))
    }
}

/// Units of `unit_type` at `period_index`, honouring any edits.
pub fn unit_type_units_with(
    unit_type: &UnitType,
    period_index: u32,
    overrides: Option<&UnitOverrides>,
) -> Result<f64> {
    match overrides.and_then(|o| o.governing(&unit_type.id, period_index)) {
        Some((edited_period, edited_units)) => Ok(grow_from(
            edited_units,
            unit_type.growth_type,
            unit_type.growth_value,
            period_index - edited_period,
        )),
        None => unit_type_units(unit_type, period_index),
    }
}

/// Sum of units across all of the model's unit types.
pub fn period_units(
    model: &PricingModel,
    period_index: u32,
    overrides: Option<&UnitOverrides>,
) -> Result<f64> {
    model.unit_types().try_fold(0.0, |sum, unit_type| -> Result<f64> {
        Ok(sum + unit_type_units_with(unit_type, period_index, overrides)?)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTotal {
    pub total: f64,
    pub breakdown: FeeBreakdown,
}

pub fn period_total(
    model: &PricingModel,
    period_index: u32,
    overrides: Option<&UnitOverrides>,
) -> Result<PeriodTotal> {
    let mut module_fees = Vec::new();
    let mut raw_total = 0.0;
    let mut one_time_fee = 0.0;

    for module in model.modules_in_order() {
        let units = if module.pricing_type.is_usage_based() {
            let unit_type_id = module.unit_type_id.as_deref().unwrap_or_default();
            let unit_type = model.unit_type(unit_type_id).ok_or_else(|| {
                PricingError::UnknownUnitTypeError {
                    module: module.module_name.clone(),
                    unit_type_id: unit_type_id.to_string(),
                }
            })?;
            unit_type_units_with(unit_type, period_index, overrides)?
        } else {
            0.0
        };

        let fee = module_fee(units, module)?;
        raw_total += fee;
        module_fees.push(ModuleFee {
            module_name: module.module_name.clone(),
            fee,
        });

        if period_index == 0 {
            one_time_fee += module.one_time_fee.unwrap_or(0.0);
        }
    }

    let minimum_applied = raw_total < model.minimum_fee;
    let recurring = raw_total.max(model.minimum_fee);

    let implementation_fee = if IMPLEMENTATION_FEE_PERIODS.contains(&period_index) {
        model.implementation_fee
    } else {
        0.0
    };

    Ok(PeriodTotal {
        total: recurring + implementation_fee + one_time_fee,
        breakdown: FeeBreakdown {
            module_fees,
            raw_total,
            minimum_fee: model.minimum_fee,
            minimum_applied,
            implementation_fee,
            one_time_fee,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{GrowthType, Module};

    fn model() -> PricingModel {
        let mut model = PricingModel::new("m1", "Usage");
        model.minimum_fee = 500.0;
        model.implementation_fee = 2000.0;
        model
            .add_unit_type(UnitType::new("seats", 100.0, GrowthType::Percentage, 10.0))
            .unwrap();
        model
            .add_module(Module::per_unit("seat", "Seats", "seats", 10.0))
            .unwrap();
        model
    }

    #[test]
    fn test_minimum_floor_and_implementation_fee() {
        let model = model();

        let first = period_total(&model, 0, None).unwrap();
        assert_eq!(first.breakdown.raw_total, 0.0);
        assert!(first.breakdown.minimum_applied);
        assert_eq!(first.breakdown.implementation_fee, 2000.0);
        assert_eq!(first.total, 2500.0);

        let second = period_total(&model, 1, None).unwrap();
        assert_eq!(second.breakdown.raw_total, 1100.0);
        assert!(!second.breakdown.minimum_applied);
        assert_eq!(second.total, 3100.0);

        let third = period_total(&model, 2, None).unwrap();
        assert_eq!(third.breakdown.implementation_fee, 0.0);
        assert_eq!(third.total, 1210.0);
    }

    #[test]
    fn test_one_time_fees_only_in_first_period() {
        let mut model = model();
        let mut onboarding = Module::flat("onb", "Onboarding", 0.0);
        onboarding.one_time_fee = Some(300.0);
        model.add_module(onboarding).unwrap();

        assert_eq!(period_total(&model, 0, None).unwrap().breakdown.one_time_fee, 300.0);
        assert_eq!(period_total(&model, 1, None).unwrap().breakdown.one_time_fee, 0.0);
    }

    #[test]
    fn test_override_reseeds_growth() {
        let model = model();
        let overrides = UnitOverrides::new().apply(&model, "seats", 2, 200.0).unwrap();
        let seats = model.unit_type("seats").unwrap();

        assert_eq!(unit_type_units_with(seats, 1, Some(&overrides)).unwrap(), 110.0);
        assert_eq!(unit_type_units_with(seats, 2, Some(&overrides)).unwrap(), 200.0);
        assert_eq!(unit_type_units_with(seats, 3, Some(&overrides)).unwrap(), 220.0);
        assert_eq!(unit_type_units_with(seats, 4, Some(&overrides)).unwrap(), 242.0);

        let total = period_total(&model, 3, Some(&overrides)).unwrap();
        assert_eq!(total.breakdown.raw_total, 2200.0);
    }

    #[test]
    fn test_latest_override_governs() {
        let model = model();
        let overrides = UnitOverrides::new()
            .apply(&model, "seats", 2, 200.0)
            .unwrap()
            .apply(&model, "seats", 4, 50.0)
            .unwrap();
        let seats = model.unit_type("seats").unwrap();

        assert_eq!(unit_type_units_with(seats, 3, Some(&overrides)).unwrap(), 220.0);
        assert_eq!(unit_type_units_with(seats, 5, Some(&overrides)).unwrap(), 55.0);
        assert_eq!(overrides.entries().len(), 2);
    }

    #[test]
    fn test_apply_leaves_original_untouched() {
        let model = model();
        let base = UnitOverrides::new();
        let edited = base.apply(&model, "seats", 1, 5.0).unwrap();
        assert!(base.is_empty());
        assert!(!edited.is_empty());
    }

    #[test]
    fn test_apply_rejects_unknown_unit_type() {
        let model = model();
        assert!(UnitOverrides::new().apply(&model, "calls", 1, 5.0).is_err());
        assert!(UnitOverrides::new().apply(&model, "seats", 1, -5.0).is_err());
    }

    #[test]
    fn test_missing_unit_type_is_a_domain_error() {
        let json = serde_json::json!({
            "id": "broken",
            "name": "Broken",
            "modules": [
                {"id": "x", "module_name": "API", "pricing_type": "per_unit",
                 "unit_type_id": "calls", "monthly_fee": 1}
            ]
        });
        let model: PricingModel = serde_json::from_value(json).unwrap();

        assert!(matches!(
            period_total(&model, 1, None),
            Err(PricingError::UnknownUnitTypeError { .. })
        ));
    }
}
