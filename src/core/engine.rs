use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::validation::model_issues;

pub struct ProjectionEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ProjectionEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting projection...");

        // Extract
        let model = self.pipeline.extract().await?;

        // Transform
        let report = self.pipeline.transform(model).await?;
        tracing::info!("Generated {} projection rows", report.rows.len());

        // Load
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }

    /// Loads the model and lists its problems without projecting.
    pub async fn check(&self) -> Result<Vec<String>> {
        let model = self.pipeline.extract().await?;
        let issues = model_issues(&model);
        for issue in &issues {
            tracing::warn!("{}", issue);
        }
        Ok(issues)
    }
}
