use crate::core::aggregate::{period_total, period_units, UnitOverrides};
use crate::domain::model::{Interval, PricingModel, ProjectionResult};
use crate::utils::error::{PricingError, Result};
use chrono::{DateTime, Months, NaiveDate};

/// Parses `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is used.
pub fn parse_start_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|e| PricingError::InvalidDateError {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Calendar date of period `index`. Days past the end of a shorter month clamp
/// to its last day (Jan 31 + 1 month = Feb 28/29).
pub fn period_date(start: NaiveDate, index: u32, interval: Interval) -> Result<NaiveDate> {
    let months = match interval {
        Interval::Monthly => Some(index),
        Interval::Yearly => index.checked_mul(12),
    };
    months
        .and_then(|m| start.checked_add_months(Months::new(m)))
        .ok_or_else(|| PricingError::InvalidDateError {
            value: start.to_string(),
            reason: format!("period {} ({}) is out of range", index, interval),
        })
}

pub fn generate_projection(
    model: &PricingModel,
    start_date: &str,
    periods: u32,
    interval: Interval,
) -> Result<Vec<ProjectionResult>> {
    generate_projection_with_overrides(model, start_date, periods, interval, None)
}

/// Projects `periods` periods from `start_date`; the same inputs always give
/// the same rows.
pub fn generate_projection_with_overrides(
    model: &PricingModel,
    start_date: &str,
    periods: u32,
    interval: Interval,
    overrides: Option<&UnitOverrides>,
) -> Result<Vec<ProjectionResult>> {
    if periods == 0 {
        return Err(PricingError::InvalidInputError {
            field: "periods".to_string(),
            value: periods.to_string(),
            reason: "at least one period is required".to_string(),
        });
    }
    let start = parse_start_date(start_date)?;

    tracing::debug!(
        "Projecting model '{}' for {} {} periods from {}",
        model.name,
        periods,
        interval,
        start
    );

    (0..periods)
        .map(|index| -> Result<ProjectionResult> {
            let period = period_total(model, index, overrides)?;
            Ok(ProjectionResult {
                period: index,
                date: period_date(start, index, interval)?,
                units: period_units(model, index, overrides)?,
                total_fee: period.total,
                breakdown: period.breakdown,
            })
        })
        .collect()
}
