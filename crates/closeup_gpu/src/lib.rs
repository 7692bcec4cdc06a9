//! GPU compositing for the CloseUp viewer.
//!
//! The viewer describes each frame as a list of quads: layer images sampled
//! with a magnification-dependent filter, thresholded difference masks, and
//! flat fills, each clipped by a scissor rectangle. This crate owns the wgpu
//! device, the window surface, and one texture per layer, and draws that
//! list with a single composite pipeline.

pub mod bindings;
pub mod compositor;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod texture;
pub mod uniform;
pub mod vertex;

pub use compositor::{Compositor, DrawCommand, PresentOutcome};
pub use config::{ClearColor, GpuConfig, TextureConfig};
pub use context::GpuContext;
pub use error::{GpuError, Result};
pub use pipeline::CompositePipeline;
pub use texture::Texture;
pub use uniform::{DrawPaint, DrawUniform, Sampling};
pub use vertex::Vertex;
