use crate::domain::model::ProjectionResult;
use crate::utils::error::{PricingError, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CsvRow {
    #[serde(rename = "Period")]
    period: String,
    #[serde(rename = "Units")]
    units: String,
    #[serde(rename = "Monthly Fee")]
    monthly_fee: String,
    #[serde(rename = "One-Time Fee")]
    one_time_fee: String,
    #[serde(rename = "Minimum Applied")]
    minimum_applied: &'static str,
    #[serde(rename = "Total")]
    total: String,
}

impl From<&ProjectionResult> for CsvRow {
    fn from(row: &ProjectionResult) -> Self {
        let breakdown = &row.breakdown;
        let one_time = breakdown.implementation_fee + breakdown.one_time_fee;
        Self {
            period: row.date.format("%Y-%m-%d").to_string(),
            units: format!("{}", row.units),
            monthly_fee: format!("{:.2}", row.total_fee - one_time),
            one_time_fee: format!("{:.2}", one_time),
            minimum_applied: if breakdown.minimum_applied { "Yes" } else { "No" },
            total: format!("{:.2}", row.total_fee),
        }
    }
}

/// Renders projection rows as CSV with a header line.
pub fn to_csv(rows: &[ProjectionResult]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(CsvRow::from(row))?;
    }
    if rows.is_empty() {
        writer.write_record([
            "Period",
            "Units",
            "Monthly Fee",
            "One-Time Fee",
            "Minimum Applied",
            "Total",
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PricingError::IoError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| PricingError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

pub fn to_json(rows: &[ProjectionResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}
