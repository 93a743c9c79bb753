use clap::Parser;
use pricing_projector::utils::error::ErrorSeverity;
use pricing_projector::utils::{logger, validation::Validate};
use pricing_projector::{CliConfig, LocalStorage, PricingError, ProjectionEngine, ProjectionPipeline};

fn exit_code(e: &PricingError) -> i32 {
    match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_failure(e: &PricingError) {
    tracing::error!(
        "❌ Projection failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting pricing-projector CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        report_failure(&e);
        std::process::exit(1);
    }

    let validate_only = config.validate_only;
    let storage = LocalStorage::new(".");
    let pipeline = ProjectionPipeline::new(storage, config);
    let engine = ProjectionEngine::new(pipeline);

    if validate_only {
        match engine.check().await {
            Ok(issues) if issues.is_empty() => {
                println!("✅ Model is valid");
                return Ok(());
            }
            Ok(issues) => {
                eprintln!("❌ The pricing model has {} problem(s):", issues.len());
                for issue in &issues {
                    eprintln!("  - {}", issue);
                }
                std::process::exit(1);
            }
            Err(e) => {
                report_failure(&e);
                std::process::exit(exit_code(&e));
            }
        }
    }

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Projection completed successfully!");
            println!("✅ Projection completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            report_failure(&e);
            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
