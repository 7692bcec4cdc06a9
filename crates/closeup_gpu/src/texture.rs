use crate::config::TextureConfig;
use crate::context::GpuContext;
use crate::error::{GpuError, Result};

/// GPU copy of one RGBA8 layer image.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

fn check_len(data: &[u8], width: u32, height: u32) -> Result<()> {
    let expected_size = width as usize * height as usize * 4;
    if data.len() != expected_size {
        return Err(GpuError::Texture(format!(
            "Invalid data size: expected {} bytes for {}x{} RGBA8, got {}",
            expected_size,
            width,
            height,
            data.len()
        )));
    }
    Ok(())
}

impl Texture {
    /// Create a texture from RGBA8 bytes.
    pub fn from_rgba8(
        ctx: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        config: &TextureConfig,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GpuError::Texture(format!(
                "Texture dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        check_len(data, width, height)?;

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Layer Texture"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Unorm rather than sRGB: blending happens on the stored byte values,
            // the same as the CPU compositor.
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Layer Sampler"),
            address_mode_u: config.address_mode,
            address_mode_v: config.address_mode,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: config.mag_filter,
            min_filter: config.min_filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture = Self {
            texture,
            view,
            sampler,
            width,
            height,
        };
        texture.write(ctx, data)?;
        Ok(texture)
    }

    /// Replace the texture contents. The data must match the texture size.
    pub fn write(&self, ctx: &GpuContext, data: &[u8]) -> Result<()> {
        check_len(data, self.width, self.height)?;
        ctx.queue.write_texture(
            self.texture.as_image_copy(),
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            extent(self.width, self.height),
        );
        Ok(())
    }

    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len_accepts_exact_size() {
        assert!(check_len(&[0; 2 * 3 * 4], 2, 3).is_ok());
    }

    #[test]
    fn test_check_len_rejects_short_buffer() {
        let err = check_len(&[0; 7], 1, 2).unwrap_err();
        assert!(err.to_string().contains("expected 8 bytes"));
    }
}
