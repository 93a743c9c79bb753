use crate::core::slab::validate_slabs;
use crate::domain::model::{PricingModel, PricingType};
use crate::utils::error::{PricingError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PricingError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| PricingError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_date(field_name: &str, value: &str) -> Result<()> {
    crate::core::projection::parse_start_date(value)
        .map(|_| ())
        .map_err(|e| PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn check_amount(errors: &mut Vec<String>, label: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(format!("{} must be a number >= 0 (got {})", label, value));
    }
}

/// Collects every structural problem in a model instead of stopping at the first.
pub fn model_issues(model: &PricingModel) -> Vec<String> {
    let mut errors = Vec::new();

    if model.name.trim().is_empty() {
        errors.push("Model name must not be empty".to_string());
    }
    check_amount(&mut errors, "Minimum fee", model.minimum_fee);
    check_amount(&mut errors, "Implementation fee", model.implementation_fee);

    for unit_type in model.unit_types() {
        let label = format!("Unit type '{}'", unit_type.id);
        check_amount(&mut errors, &format!("{}: starting units", label), unit_type.starting_units);
        check_amount(&mut errors, &format!("{}: growth value", label), unit_type.growth_value);
    }

    for module in model.modules_in_order() {
        let label = format!("Module '{}'", module.module_name);

        if module.pricing_type.is_usage_based() {
            match module.unit_type_id.as_deref() {
                Some(id) if model.unit_type(id).is_some() => {}
                Some(id) => errors.push(format!("{}: unknown unit type '{}'", label, id)),
                None => errors.push(format!("{}: a unit type is required", label)),
            }
        }

        for (field, value) in [
            ("monthly fee", module.monthly_fee),
            ("one-time fee", module.one_time_fee),
            ("minimum fee", module.module_minimum_fee),
        ] {
            if let Some(value) = value {
                check_amount(&mut errors, &format!("{}: {}", label, field), value);
            }
        }

        if module.pricing_type == PricingType::Slab {
            if module.slabs.is_empty() {
                tracing::warn!("{} uses slab pricing without any slabs", label);
            }
            for error in validate_slabs(&module.slabs).errors {
                errors.push(format!("{}: {}", label, error));
            }
        }
    }

    errors
}

impl Validate for PricingModel {
    fn validate(&self) -> Result<()> {
        let errors = model_issues(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PricingError::ValidationError { errors })
        }
    }
}
