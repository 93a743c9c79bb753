//! Unit growth over time.
//!
//! Period 0 is the ramp-up period and always projects zero units; the
//! starting value only seeds growth from period 1 onwards.

use crate::domain::model::{GrowthType, UnitType};
use crate::utils::error::{PricingError, Result};

/// Multiplier applied to `starting_units` after `periods` periods.
///
/// Fixed growth is expressed as a ratio of the starting value so the same
/// function re-seeds growth from an edited unit count. A zero start has no
/// ratio and keeps a factor of 1.
pub fn growth_factor(
    starting_units: f64,
    growth_type: GrowthType,
    growth_value: f64,
    periods: u32,
) -> f64 {
    match growth_type {
        GrowthType::Percentage => (1.0 + growth_value / 100.0).powf(f64::from(periods)),
        GrowthType::Fixed => {
            if starting_units == 0.0 {
                1.0
            } else {
                1.0 + (growth_value * periods as f64) / starting_units
            }
        }
    }
}

/// Units after `periods` periods of growth from `base`, rounded and floored at 0.
pub fn grow_from(base: f64, growth_type: GrowthType, growth_value: f64, periods: u32) -> f64 {
    let units = base * growth_factor(base, growth_type, growth_value, periods);
    units.round().max(0.0)
}

pub fn units_at_period(
    starting_units: f64,
    growth_type: GrowthType,
    growth_value: f64,
    period_index: u32,
) -> Result<f64> {
    check_non_negative("starting_units", starting_units)?;
    check_non_negative("growth_value", growth_value)?;

    if period_index == 0 {
        return Ok(0.0);
    }
    Ok(grow_from(starting_units, growth_type, growth_value, period_index))
}

/// Convenience wrapper over [`units_at_period`] for a model's unit type.
pub fn unit_type_units(unit_type: &UnitType, period_index: u32) -> Result<f64> {
    units_at_period(
        unit_type.starting_units,
        unit_type.growth_type,
        unit_type.growth_value,
        period_index,
    )
}

pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PricingError::InvalidInputError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be a finite number >= 0".to_string(),
        });
    }
    Ok(())
}
