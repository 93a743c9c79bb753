pub mod projection_pipeline;
