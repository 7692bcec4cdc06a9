//! Drawing targets for the comparison modes.
//!
//! Modes never touch pixels directly. They describe a frame as a sequence of
//! fills, clipped regions, and image blits against a [`Surface`]:
//!
//! - `GpuSurface` (native builds) turns the calls into quads for the wgpu
//!   compositor that draws the window.
//! - [`RasterSurface`] composites on the CPU into an `RgbaImage`, used for
//!   headless snapshots.
//! - [`DrawList`] records the calls so tests can inspect what a mode drew.

#[cfg(not(target_arch = "wasm32"))]
mod gpu;
mod raster;
mod recorder;

#[cfg(not(target_arch = "wasm32"))]
pub use gpu::GpuSurface;
pub use raster::RasterSurface;
pub use recorder::{DrawList, DrawOp};

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::geometry::{Rect, Size};
use crate::sampler::SamplerRegime;

pub type Color = Rgba<u8>;

/// Which image of the scene a blit shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    A,
    B,
    /// `diff(A, B)`, drawn in A's space.
    DiffAgainstB,
    /// `diff(B, A)`, drawn in B's space.
    DiffAgainstA,
}

/// How sampled texels end up on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// Source-over with the texel's alpha scaled by `opacity`.
    Image { opacity: f32 },
    /// Solid `color` wherever the mask alpha exceeds `threshold`. The alpha
    /// is read from the nearest texel, or blurred in the blur regime.
    Mask { color: Color, threshold: u8 },
}

impl Paint {
    pub const OPAQUE: Paint = Paint::Image { opacity: 1.0 };
}

/// One image draw: texels in `src` (image-local) stretched over `dst` (viewport).
///
/// `image` is the shared buffer so surfaces that keep uploaded copies can
/// tell a new image from one they already hold.
#[derive(Debug, Clone, Copy)]
pub struct Blit<'a> {
    pub layer: Layer,
    pub image: &'a Arc<RgbaImage>,
    pub src: Rect,
    pub dst: Rect,
    pub regime: SamplerRegime,
    pub paint: Paint,
}

pub trait Surface {
    fn size(&self) -> Size;

    /// Fill the whole surface, ignoring clips.
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn blit(&mut self, blit: &Blit<'_>);

    /// Restrict drawing to `rect` intersected with the current clip.
    fn push_clip(&mut self, rect: Rect);

    fn pop_clip(&mut self);
}
