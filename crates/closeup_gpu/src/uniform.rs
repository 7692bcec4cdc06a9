//! Per-draw uniform shared with `shaders/composite.wgsl`.

use bytemuck::{Pod, Zeroable};

/// How a layer texture is filtered, chosen from the camera scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// Texel-snapped with antialiased seams.
    Crisp,
    /// Bilinear.
    Smooth,
    /// 5-tap diagonal blur of bilinear taps.
    Blur,
}

impl Sampling {
    pub(crate) fn code(self) -> u32 {
        match self {
            Sampling::Crisp => 0,
            Sampling::Smooth => 1,
            Sampling::Blur => 2,
        }
    }
}

/// What the fragment shader writes for a draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawPaint {
    /// Texture color with its alpha scaled by `opacity`.
    Image { opacity: f32 },
    /// `color` wherever the texture's alpha exceeds `threshold` (0..=1).
    Mask { color: [f32; 4], threshold: f32 },
    /// Flat `color`; the texture is ignored.
    Solid { color: [f32; 4] },
}

/// Layout matches `struct Draw` in the composite shader (80 bytes, 16-aligned).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawUniform {
    /// Source rectangle in texels: x, y, width, height.
    pub src: [f32; 4],
    /// Texel-to-pixel similarity transform: scale, translate x, translate y.
    pub placement: [f32; 4],
    pub color: [f32; 4],
    pub target_size: [f32; 2],
    pub texture_size: [f32; 2],
    pub opacity: f32,
    pub threshold: f32,
    pub sampling: u32,
    pub paint: u32,
}

pub const PAINT_IMAGE: u32 = 0;
pub const PAINT_MASK: u32 = 1;
pub const PAINT_SOLID: u32 = 2;

impl DrawUniform {
    /// Draw `src` (texels of a `texture_size` texture) scaled by `scale` and
    /// offset by `translate` onto a `target_size` surface.
    pub fn new(
        src: [f32; 4],
        scale: f32,
        translate: [f32; 2],
        texture_size: [u32; 2],
        target_size: [u32; 2],
        sampling: Sampling,
        paint: DrawPaint,
    ) -> Self {
        let (paint_code, color, opacity, threshold) = match paint {
            DrawPaint::Image { opacity } => (PAINT_IMAGE, [0.0; 4], opacity, 0.0),
            DrawPaint::Mask { color, threshold } => (PAINT_MASK, color, 1.0, threshold),
            DrawPaint::Solid { color } => (PAINT_SOLID, color, 1.0, 0.0),
        };
        Self {
            src,
            placement: [scale, translate[0], translate[1], 0.0],
            color,
            target_size: [target_size[0] as f32, target_size[1] as f32],
            texture_size: [texture_size[0] as f32, texture_size[1] as f32],
            opacity,
            threshold,
            sampling: sampling.code(),
            paint: paint_code,
        }
    }

    /// A flat rectangle in surface pixels.
    pub fn solid(rect: [f32; 4], color: [f32; 4], target_size: [u32; 2]) -> Self {
        Self::new(
            rect,
            1.0,
            [0.0, 0.0],
            [1, 1],
            target_size,
            Sampling::Smooth,
            DrawPaint::Solid { color },
        )
    }
}

/// Distance between consecutive uniforms in a dynamic-offset buffer.
pub fn uniform_stride(min_alignment: u32) -> u64 {
    let size = std::mem::size_of::<DrawUniform>() as u64;
    let align = u64::from(min_alignment.max(1));
    size.div_ceil(align) * align
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<DrawUniform>(), 80);
        assert_eq!(std::mem::size_of::<DrawUniform>() % 16, 0);
    }

    #[test]
    fn test_stride_respects_device_alignment() {
        assert_eq!(uniform_stride(256), 256);
        assert_eq!(uniform_stride(64), 128);
        assert_eq!(uniform_stride(16), 80);
    }

    #[test]
    fn test_paint_encoding() {
        let mask = DrawUniform::new(
            [0.0, 0.0, 4.0, 4.0],
            2.0,
            [10.0, 5.0],
            [4, 4],
            [100, 50],
            Sampling::Blur,
            DrawPaint::Mask {
                color: [1.0, 0.0, 0.0, 1.0],
                threshold: 0.5,
            },
        );
        assert_eq!(mask.paint, PAINT_MASK);
        assert_eq!(mask.sampling, 2);
        assert_eq!(mask.threshold, 0.5);
        assert_eq!(mask.placement, [2.0, 10.0, 5.0, 0.0]);
        assert_eq!(mask.target_size, [100.0, 50.0]);

        let fill = DrawUniform::solid([1.0, 2.0, 3.0, 4.0], [0.5; 4], [10, 10]);
        assert_eq!(fill.paint, PAINT_SOLID);
        assert_eq!(fill.placement[0], 1.0);
    }
}
