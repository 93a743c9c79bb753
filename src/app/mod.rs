// Application layer: concrete pipelines wiring storage, config and the core engine.

pub mod pipelines;
