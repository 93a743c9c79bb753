use crate::core::aggregate::UnitOverrides;
use crate::core::export::{to_csv, to_json};
use crate::core::projection::generate_projection_with_overrides;
use crate::core::{
    ConfigProvider, ModelSource, OutputFormat, Pipeline, PricingModel, ProjectionReport, Storage,
};
use crate::utils::error::{PricingError, Result};
use crate::utils::validation::Validate;
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

/// 讀取定價模型、產生預測並輸出 CSV / JSON
pub struct ProjectionPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> ProjectionPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    async fn fetch_model(&self, endpoint: &str) -> Result<PricingModel> {
        let mut request = self.client.get(endpoint);

        for (key, value) in self.config.request_headers() {
            request = request.header(key, value);
        }

        if let Some(timeout) = self.config.request_timeout_seconds() {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        tracing::debug!("Making API request to: {}", endpoint);
        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(PricingError::ApiStatusError {
                status: response.status().as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn bundle(files: &[(String, &str)]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, content) in files {
            zip.start_file(name.as_str(), SimpleFileOptions::default())?;
            zip.write_all(content.as_bytes())?;
        }
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ProjectionPipeline<S, C> {
    async fn extract(&self) -> Result<PricingModel> {
        let model = match self.config.model_source() {
            ModelSource::File(path) => {
                tracing::info!("📂 Loading pricing model from file: {}", path);
                let data = self.storage.read_file(&path).await?;
                serde_json::from_slice::<PricingModel>(&data)?
            }
            ModelSource::Api(endpoint) => {
                tracing::info!("🌐 Fetching pricing model from: {}", endpoint);
                self.fetch_model(&endpoint).await?
            }
        };

        tracing::info!(
            "Loaded model '{}' ({} unit types, {} modules)",
            model.name,
            model.unit_types().count(),
            model.modules().count()
        );
        Ok(model)
    }

    async fn transform(&self, model: PricingModel) -> Result<ProjectionReport> {
        model.validate()?;

        let overrides = UnitOverrides::from_entries(&model, self.config.overrides())?;
        if !overrides.is_empty() {
            tracing::info!("✏️ Applying {} unit override(s)", overrides.entries().len());
        }

        let rows = generate_projection_with_overrides(
            &model,
            self.config.start_date(),
            self.config.periods(),
            self.config.interval(),
            Some(&overrides),
        )?;

        let total: f64 = rows.iter().map(|r| r.total_fee).sum();
        tracing::info!(
            "📈 Projected {} {} periods, total revenue {:.2}",
            rows.len(),
            self.config.interval(),
            total
        );

        Ok(ProjectionReport {
            model_name: model.name,
            csv_output: to_csv(&rows)?,
            json_output: to_json(&rows)?,
            rows,
        })
    }

    async fn load(&self, report: ProjectionReport) -> Result<String> {
        let files: Vec<(String, &str)> = self
            .config
            .output_formats()
            .into_iter()
            .map(|format| {
                let content = match format {
                    OutputFormat::Csv => report.csv_output.as_str(),
                    OutputFormat::Json => report.json_output.as_str(),
                };
                (format!("projection.{}", format.extension()), content)
            })
            .collect();

        if files.is_empty() {
            return Err(PricingError::MissingConfigError {
                field: "output formats".to_string(),
            });
        }

        if let Some(archive) = self.config.archive_name() {
            tracing::debug!("Creating ZIP file with {} files", files.len());
            let zip_data = Self::bundle(&files)?;
            let output_path = self.output_file(archive);

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&output_path, &zip_data).await?;
            return Ok(output_path);
        }

        let mut written = Vec::with_capacity(files.len());
        for (name, content) in &files {
            let output_path = self.output_file(name);
            self.storage
                .write_file(&output_path, content.as_bytes())
                .await?;
            written.push(output_path);
        }

        tracing::debug!("Wrote projection for '{}'", report.model_name);
        Ok(written.join(", "))
    }
}
