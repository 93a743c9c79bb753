pub mod aggregate;
pub mod engine;
pub mod export;
pub mod fees;
pub mod growth;
pub mod projection;
pub mod slab;

pub use crate::domain::model::{PricingModel, ProjectionReport, ProjectionResult};
pub use crate::domain::ports::{ConfigProvider, ModelSource, OutputFormat, Pipeline, Storage};
pub use crate::utils::error::Result;
