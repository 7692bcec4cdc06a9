//! Render pipelines.

pub mod builder;
pub mod composite;

pub use builder::{BindGroupLayoutBuilder, PipelineBuilder};
pub use composite::{CompositePipeline, PreparedDraw};
