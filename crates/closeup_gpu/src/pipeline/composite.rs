//! Layer compositing: one textured quad per draw, blended source-over.

use wgpu::util::DeviceExt;

use super::{BindGroupLayoutBuilder, PipelineBuilder};
use crate::bindings::composite::{
    DRAW_BINDING, DRAW_GROUP, LAYER_GROUP, SAMPLER_BINDING, TEXTURE_BINDING,
};
use crate::context::GpuContext;
use crate::error::{GpuError, Result};
use crate::texture::Texture;
use crate::uniform::DrawUniform;
use crate::vertex::Vertex;

/// Straight-alpha source-over, matching the CPU compositor.
const SOURCE_OVER: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent::OVER,
};

/// One draw ready for the render pass.
pub struct PreparedDraw<'a> {
    /// Byte offset of this draw's uniform in the draw buffer.
    pub uniform_offset: u32,
    pub layer: &'a wgpu::BindGroup,
    /// x, y, width, height in surface pixels.
    pub scissor: [u32; 4],
}

pub struct CompositePipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub draw_bind_group_layout: wgpu::BindGroupLayout,
    pub layer_bind_group_layout: wgpu::BindGroupLayout,
}

impl CompositePipeline {
    /// Compile the composite shader and build the pipeline.
    ///
    /// Validation failures are captured in an error scope and returned as
    /// [`GpuError::ShaderCompilation`] instead of reaching the device's
    /// uncaptured-error handler.
    pub fn new(ctx: &GpuContext) -> Result<Self> {
        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Composite Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/composite.wgsl").into()),
            });

        let draw_bind_group_layout = BindGroupLayoutBuilder::new(&ctx.device)
            .with_label("Draw Uniform Layout")
            .add_uniform_buffer::<DrawUniform>(
                DRAW_BINDING,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                true,
            )
            .build();

        let layer_bind_group_layout = BindGroupLayoutBuilder::new(&ctx.device)
            .with_label("Layer Texture Layout")
            .add_texture_2d(TEXTURE_BINDING, wgpu::ShaderStages::FRAGMENT)
            .add_sampler(SAMPLER_BINDING, wgpu::ShaderStages::FRAGMENT)
            .build();

        let render_pipeline = PipelineBuilder::new(&ctx.device, ctx.surface_config.format, &shader)
            .with_label("Composite Pipeline")
            .with_vertex_buffer(Vertex::desc())
            .with_bind_group_layouts(&[&draw_bind_group_layout, &layer_bind_group_layout])
            .with_blend_state(SOURCE_OVER)
            .build();

        if let Some(error) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(GpuError::ShaderCompilation(error.to_string()));
        }

        let (vertices, indices) = Vertex::unit_quad();

        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Quad Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Quad Index Buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Ok(Self {
            render_pipeline,
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
            draw_bind_group_layout,
            layer_bind_group_layout,
        })
    }

    /// Bind group exposing one `DrawUniform`-sized window of `buffer`.
    pub fn create_draw_bind_group(&self, ctx: &GpuContext, buffer: &wgpu::Buffer) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniform Bind Group"),
            layout: &self.draw_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: DRAW_BINDING,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        })
    }

    pub fn create_layer_bind_group(&self, ctx: &GpuContext, texture: &Texture) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Layer Texture Bind Group"),
            layout: &self.layer_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: TEXTURE_BINDING,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    /// Clear `view` and issue `draws` in order.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        clear_color: wgpu::Color,
        draw_bind_group: &wgpu::BindGroup,
        draws: &[PreparedDraw<'_>],
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Composite Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        for draw in draws {
            let [x, y, w, h] = draw.scissor;
            render_pass.set_scissor_rect(x, y, w, h);
            render_pass.set_bind_group(DRAW_GROUP, draw_bind_group, &[draw.uniform_offset]);
            render_pass.set_bind_group(LAYER_GROUP, draw.layer, &[]);
            render_pass.draw_indexed(0..self.num_indices, 0, 0..1);
        }
    }
}
