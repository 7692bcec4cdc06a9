//! Frame compositing on a window surface.

use std::sync::Arc;

use winit::window::Window;

use crate::config::{ClearColor, GpuConfig, TextureConfig};
use crate::context::GpuContext;
use crate::error::Result;
use crate::pipeline::{CompositePipeline, PreparedDraw};
use crate::texture::Texture;
use crate::uniform::{uniform_stride, DrawUniform};

/// Result of one [`Compositor::present`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// The frame reached the screen.
    Presented,
    /// Nothing was drawn; the caller should try again on the next frame.
    Skipped,
    /// The compositor cannot draw anymore.
    Inert,
    /// The device is out of memory; the host should shut down.
    Fatal,
}

/// One quad of a frame.
#[derive(Debug, Clone, Copy)]
pub struct DrawCommand {
    /// Layer slot to sample, or `None` for a flat fill.
    pub layer: Option<usize>,
    pub uniform: DrawUniform,
    /// x, y, width, height in surface pixels. Must be non-empty.
    pub scissor: [u32; 4],
}

struct LayerTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Uniform buffer holding one `DrawUniform` per draw at `stride` spacing.
struct DrawArena {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

struct Renderer {
    pipeline: CompositePipeline,
    /// 1x1 white texture bound for flat fills.
    blank: LayerTexture,
    arena: Option<DrawArena>,
}

/// Owns the GPU context, the layer textures, and the composite pipeline.
///
/// When the composite shader fails to build the compositor logs the error
/// once and turns inert: later calls return [`PresentOutcome::Inert`]
/// without touching the device.
pub struct Compositor {
    ctx: GpuContext,
    renderer: Option<Renderer>,
    layers: Vec<Option<LayerTexture>>,
    stride: u64,
}

impl Compositor {
    pub fn new(window: Arc<Window>, config: GpuConfig) -> Result<Self> {
        let ctx = pollster::block_on(GpuContext::new(window, config))?;
        let renderer = match Self::build_renderer(&ctx) {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                log::error!("Drawing disabled: {}", e);
                None
            }
        };
        let stride = uniform_stride(ctx.device.limits().min_uniform_buffer_offset_alignment);
        Ok(Self {
            ctx,
            renderer,
            layers: Vec::new(),
            stride,
        })
    }

    fn build_renderer(ctx: &GpuContext) -> Result<Renderer> {
        let pipeline = CompositePipeline::new(ctx)?;
        let texture = Texture::from_rgba8(ctx, &[255; 4], 1, 1, &TextureConfig::nearest())?;
        let bind_group = pipeline.create_layer_bind_group(ctx, &texture);
        Ok(Renderer {
            pipeline,
            blank: LayerTexture { texture, bind_group },
            arena: None,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.ctx.width(), self.ctx.height())
    }

    /// Store `rgba` (tightly packed, `width * height * 4` bytes) in layer
    /// `slot`, reusing the slot's texture when the size is unchanged.
    pub fn upload_layer(&mut self, slot: usize, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
        let Some(renderer) = &self.renderer else {
            return Ok(());
        };
        if self.layers.len() <= slot {
            self.layers.resize_with(slot + 1, || None);
        }
        if let Some(layer) = &self.layers[slot] {
            if layer.texture.matches(width, height) {
                return layer.texture.write(&self.ctx, rgba);
            }
        }
        let texture = Texture::from_rgba8(&self.ctx, rgba, width, height, &TextureConfig::linear())?;
        let bind_group = renderer.pipeline.create_layer_bind_group(&self.ctx, &texture);
        log::debug!("layer {} texture created at {}x{}", slot, width, height);
        self.layers[slot] = Some(LayerTexture { texture, bind_group });
        Ok(())
    }

    /// Clear to `clear` (or the configured color), draw `draws`, and present.
    pub fn present(&mut self, clear: Option<ClearColor>, draws: &[DrawCommand]) -> PresentOutcome {
        let Some(renderer) = self.renderer.as_mut() else {
            return PresentOutcome::Inert;
        };

        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = (self.ctx.width(), self.ctx.height());
                self.ctx.resize(w, h);
                return PresentOutcome::Skipped;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return PresentOutcome::Fatal;
            }
            Err(e) => {
                log::warn!("Surface error: {:?}", e);
                return PresentOutcome::Skipped;
            }
        };

        let stride = self.stride as usize;
        let needed = draws.len().max(1);
        if renderer.arena.as_ref().is_none_or(|a| a.capacity < needed) {
            let capacity = needed.next_power_of_two();
            let buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Draw Uniform Buffer"),
                size: (capacity * stride) as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = renderer.pipeline.create_draw_bind_group(&self.ctx, &buffer);
            log::debug!("draw uniform buffer grown to {} draws", capacity);
            renderer.arena = Some(DrawArena {
                buffer,
                bind_group,
                capacity,
            });
        }
        let Some(arena) = &renderer.arena else {
            return PresentOutcome::Skipped;
        };

        let mut bytes = vec![0u8; draws.len() * stride];
        let mut prepared = Vec::with_capacity(draws.len());
        for (i, draw) in draws.iter().enumerate() {
            let offset = i * stride;
            bytes[offset..offset + std::mem::size_of::<DrawUniform>()]
                .copy_from_slice(bytemuck::bytes_of(&draw.uniform));
            let layer = match draw.layer {
                None => Some(&renderer.blank.bind_group),
                Some(slot) => self.layers.get(slot).and_then(Option::as_ref).map(|l| &l.bind_group),
            };
            let Some(layer) = layer else {
                log::warn!("draw {} references empty layer {:?}", i, draw.layer);
                continue;
            };
            prepared.push(PreparedDraw {
                uniform_offset: offset as u32,
                layer,
                scissor: draw.scissor,
            });
        }
        if !bytes.is_empty() {
            self.ctx.queue.write_buffer(&arena.buffer, 0, &bytes);
        }

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Composite Encoder"),
            });
        let clear = clear.unwrap_or(self.ctx.config.clear_color);
        renderer
            .pipeline
            .render(&mut encoder, &view, clear.into(), &arena.bind_group, &prepared);
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        PresentOutcome::Presented
    }
}
