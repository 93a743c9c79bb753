pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::projection_pipeline::ProjectionPipeline;
pub use config::{local_storage::LocalStorage, toml_config::TomlConfig};
pub use crate::core::aggregate::{period_total, PeriodTotal, UnitOverrides};
pub use crate::core::engine::ProjectionEngine;
pub use crate::core::fees::module_fee as calculate_module_fee;
pub use crate::core::growth::units_at_period;
pub use crate::core::projection::{generate_projection, generate_projection_with_overrides};
pub use crate::core::slab::{slab_fee, validate_slabs, SlabValidation};
pub use domain::model::{
    GrowthType, Interval, Module, PricingModel, PricingTier, PricingType, ProjectionResult,
    UnitType,
};
pub use utils::error::{PricingError, Result};
