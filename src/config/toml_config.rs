use crate::config::MAX_PERIODS;
use crate::core::{ConfigProvider, ModelSource, OutputFormat};
use crate::domain::model::{Interval, UnitOverride};
use crate::utils::error::{PricingError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub projection: ProjectionConfig,
    pub source: SourceConfig,
    pub export: ExportConfig,
    #[serde(default)]
    pub overrides: Vec<UnitOverride>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub name: Option<String>,
    pub start_date: String,
    pub periods: u32,
    #[serde(default)]
    pub interval: Interval,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `file` or `api`
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub verbose: Option<bool>,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PricingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PricingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PricingError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        match self.source.r#type.as_str() {
            "file" => {
                let path = validation::validate_required_field("source.path", &self.source.path)?;
                validation::validate_path("source.path", path)?;
            }
            "api" => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                validation::validate_url("source.endpoint", endpoint)?;
            }
            other => {
                return Err(PricingError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Valid types: file, api".to_string(),
                })
            }
        }

        validation::validate_date("projection.start_date", &self.projection.start_date)?;
        validation::validate_range("projection.periods", self.projection.periods, 1, MAX_PERIODS)?;
        validation::validate_path("export.output_path", &self.export.output_path)?;

        if self.export.output_formats.is_empty() {
            return Err(PricingError::MissingConfigError {
                field: "export.output_formats".to_string(),
            });
        }
        for format in &self.export.output_formats {
            format.parse::<OutputFormat>()?;
        }

        if let Some(compression) = self.export.compression.as_ref().filter(|c| c.enabled) {
            validation::validate_path("export.compression.filename", &compression.filename)?;
        }

        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn model_source(&self) -> ModelSource {
        match self.source.r#type.as_str() {
            "api" => ModelSource::Api(self.source.endpoint.clone().unwrap_or_default()),
            _ => ModelSource::File(self.source.path.clone().unwrap_or_default()),
        }
    }

    fn start_date(&self) -> &str {
        &self.projection.start_date
    }

    fn periods(&self) -> u32 {
        self.projection.periods
    }

    fn interval(&self) -> Interval {
        self.projection.interval
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.export
            .output_formats
            .iter()
            .filter_map(|f| f.parse().ok())
            .collect()
    }

    fn archive_name(&self) -> Option<&str> {
        self.export
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }

    fn overrides(&self) -> &[UnitOverride] {
        &self.overrides
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        self.source
            .headers
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
