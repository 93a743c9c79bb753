use anyhow::Context;
use clap::Parser;
use pricing_projector::core::{ConfigProvider, Pipeline};
use pricing_projector::utils::{logger, validation::Validate};
use pricing_projector::{LocalStorage, ProjectionEngine, ProjectionPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-projection")]
#[command(about = "Revenue projections driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "projection.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the number of periods from config
    #[arg(long)]
    periods: Option<u32>,

    /// Dry run - show what would be projected without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Projection Summary:");
    if let Some(name) = &config.projection.name {
        tracing::info!("   Name: {}", name);
    }
    tracing::info!("   Source: {:?}", config.model_source());
    tracing::info!(
        "   Horizon: {} {} periods from {}",
        config.periods(),
        config.interval(),
        config.start_date()
    );
    tracing::info!("   Output Path: {}", config.output_path());
    tracing::info!("   Formats: {:?}", config.output_formats());
    if let Some(archive) = config.archive_name() {
        tracing::info!("   Bundle: {}", archive);
    }
    if !config.overrides().is_empty() {
        tracing::info!("   Overrides: {}", config.overrides().len());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose || config.verbose());
    }

    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(periods) = args.periods {
        config.projection.periods = periods;
        tracing::info!("🔧 Periods overridden to: {}", periods);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let dry_run = args.dry_run;
    let pipeline = ProjectionPipeline::new(LocalStorage::new("."), config);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        let model = pipeline.extract().await?;
        let report = pipeline.transform(model).await?;
        for row in &report.rows {
            println!(
                "{:>4}  {}  units={:<10} total={:.2}",
                row.period, row.date, row.units, row.total_fee
            );
        }
        return Ok(());
    }

    let output_path = ProjectionEngine::new(pipeline).run().await?;
    println!("✅ Projection completed successfully!");
    println!("📁 Output saved to: {}", output_path);

    Ok(())
}
