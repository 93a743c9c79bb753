use crate::domain::model::{Interval, PricingModel, ProjectionReport, UnitOverride};
use crate::utils::error::{PricingError, Result};
use async_trait::async_trait;
use std::str::FromStr;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Where the model snapshot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Path of a model JSON document, read through [`Storage`].
    File(String),
    /// `GET` endpoint of the model REST API.
    Api(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(PricingError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: csv, json".to_string(),
            }),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn model_source(&self) -> ModelSource;
    fn start_date(&self) -> &str;
    fn periods(&self) -> u32;
    fn interval(&self) -> Interval;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> Vec<OutputFormat>;
    /// Name of the zip bundle, when outputs should be bundled.
    fn archive_name(&self) -> Option<&str>;
    fn overrides(&self) -> &[UnitOverride];

    fn request_timeout_seconds(&self) -> Option<u64> {
        None
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<PricingModel>;
    async fn transform(&self, model: PricingModel) -> Result<ProjectionReport>;
    async fn load(&self, report: ProjectionReport) -> Result<String>;
}
