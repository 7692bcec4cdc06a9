//! Shader binding locations shared with `shaders/composite.wgsl`.
//!
//! ```wgsl
//! @group(0) @binding(0) var<uniform> draw: Draw;
//! @group(1) @binding(0) var layer_texture: texture_2d<f32>;
//! @group(1) @binding(1) var layer_sampler: sampler;
//! ```

/// Binding constants for the composite pipeline.
pub mod composite {
    /// Group 0: per-draw uniform, addressed with a dynamic offset
    pub const DRAW_GROUP: u32 = 0;
    /// Binding 0 in group 0: `Draw` uniform
    pub const DRAW_BINDING: u32 = 0;

    /// Group 1: the layer being drawn
    pub const LAYER_GROUP: u32 = 1;
    /// Binding 0 in group 1: Texture 2D
    pub const TEXTURE_BINDING: u32 = 0;
    /// Binding 1 in group 1: Sampler
    pub const SAMPLER_BINDING: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADER: &str = include_str!("shaders/composite.wgsl");

    fn declares(group: u32, binding: u32) -> bool {
        SHADER.contains(&format!("@group({}) @binding({})", group, binding))
    }

    #[test]
    fn test_shader_uses_binding_constants() {
        assert!(declares(composite::DRAW_GROUP, composite::DRAW_BINDING));
        assert!(declares(composite::LAYER_GROUP, composite::TEXTURE_BINDING));
        assert!(declares(composite::LAYER_GROUP, composite::SAMPLER_BINDING));
    }

    #[test]
    fn test_shader_paint_codes_match_uniform() {
        use crate::uniform::{PAINT_MASK, PAINT_SOLID};
        assert!(SHADER.contains(&format!("const PAINT_MASK: u32 = {}u;", PAINT_MASK)));
        assert!(SHADER.contains(&format!("const PAINT_SOLID: u32 = {}u;", PAINT_SOLID)));
    }

    #[test]
    fn test_shader_sampling_codes_match_uniform() {
        use crate::uniform::Sampling;
        let crisp = format!("const SAMPLING_CRISP: u32 = {}u;", Sampling::Crisp.code());
        let blur = format!("const SAMPLING_BLUR: u32 = {}u;", Sampling::Blur.code());
        assert!(SHADER.contains(&crisp));
        assert!(SHADER.contains(&blur));
    }
}
