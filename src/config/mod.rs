pub mod local_storage;
pub mod toml_config;

/// Upper bound on projection length accepted from configuration.
pub const MAX_PERIODS: u32 = 1200;

#[cfg(feature = "cli")]
pub use cli_config::{parse_override, CliConfig};

#[cfg(feature = "cli")]
mod cli_config {
    use super::MAX_PERIODS;
    use crate::core::{ConfigProvider, ModelSource, OutputFormat};
    use crate::domain::model::{Interval, UnitOverride};
    use crate::utils::error::{PricingError, Result};
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "pricing-projector")]
    #[command(about = "Revenue projections for SaaS pricing models")]
    pub struct CliConfig {
        #[arg(long, help = "Path to a pricing model JSON document")]
        pub model: Option<String>,

        #[arg(long, help = "Model REST endpoint, e.g. https://host/models/<id>")]
        pub model_url: Option<String>,

        #[arg(long)]
        pub start_date: String,

        #[arg(long, default_value = "12")]
        pub periods: u32,

        #[arg(long, default_value = "monthly")]
        pub interval: Interval,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "csv")]
        pub formats: Vec<String>,

        #[arg(long, help = "Bundle the outputs into projection.zip")]
        pub zip: bool,

        #[arg(
            long = "override",
            value_parser = parse_override,
            help = "Edited unit count as UNIT_TYPE@PERIOD=UNITS (repeatable)"
        )]
        pub overrides: Vec<UnitOverride>,

        #[arg(long, help = "Only validate the model, do not project")]
        pub validate_only: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    /// Parses `seats@3=250`.
    pub fn parse_override(value: &str) -> std::result::Result<UnitOverride, String> {
        let (target, units) = value
            .split_once('=')
            .ok_or_else(|| format!("expected UNIT_TYPE@PERIOD=UNITS, got '{}'", value))?;
        let (unit_type_id, period) = target
            .split_once('@')
            .ok_or_else(|| format!("expected UNIT_TYPE@PERIOD=UNITS, got '{}'", value))?;

        Ok(UnitOverride {
            unit_type_id: unit_type_id.trim().to_string(),
            period: period
                .trim()
                .parse()
                .map_err(|e| format!("invalid period '{}': {}", period, e))?,
            units: units
                .trim()
                .parse()
                .map_err(|e| format!("invalid units '{}': {}", units, e))?,
        })
    }

    impl ConfigProvider for CliConfig {
        fn model_source(&self) -> ModelSource {
            match (&self.model_url, &self.model) {
                (Some(url), _) => ModelSource::Api(url.clone()),
                (None, Some(path)) => ModelSource::File(path.clone()),
                (None, None) => ModelSource::File("model.json".to_string()),
            }
        }

        fn start_date(&self) -> &str {
            &self.start_date
        }

        fn periods(&self) -> u32 {
            self.periods
        }

        fn interval(&self) -> Interval {
            self.interval
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> Vec<OutputFormat> {
            self.formats.iter().filter_map(|f| f.parse().ok()).collect()
        }

        fn archive_name(&self) -> Option<&str> {
            self.zip.then_some("projection.zip")
        }

        fn overrides(&self) -> &[UnitOverride] {
            &self.overrides
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            match (&self.model, &self.model_url) {
                (Some(_), Some(_)) => {
                    return Err(PricingError::ConfigError {
                        message: "use either --model or --model-url, not both".to_string(),
                    })
                }
                (None, None) => {
                    return Err(PricingError::MissingConfigError {
                        field: "--model or --model-url".to_string(),
                    })
                }
                (Some(path), None) => validation::validate_path("--model", path)?,
                (None, Some(url)) => validation::validate_url("--model-url", url)?,
            }

            validation::validate_date("--start-date", &self.start_date)?;
            validation::validate_range("--periods", self.periods, 1, MAX_PERIODS)?;
            validation::validate_path("--output-path", &self.output_path)?;
            for format in &self.formats {
                format.parse::<OutputFormat>()?;
            }
            Ok(())
        }
    }

}
