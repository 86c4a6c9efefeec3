use rig2d::{BlendMode, RenderCommand, TextureHandle};
use wgpu::util::DeviceExt;

use crate::mesh::MeshBuffer;
use crate::pipeline::{self, Globals, GpuVertex, Pipelines, SHADER};

/// Resolves texture handles carried by render commands to bind groups.
/// [`WgpuTextures`](crate::WgpuTextures) is the stock implementation.
pub trait TextureBindings {
    fn bind_group_for(&self, texture: TextureHandle) -> Option<&wgpu::BindGroup>;
}

/// One contiguous index range drawn with a single texture and blend mode.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DrawSpan {
    pub texture: TextureHandle,
    pub blend: BlendMode,
    pub first_index: usize,
    pub index_count: usize,
}

/// Batching renderer for the commands a posed skeleton produces.
///
/// `prepare` repacks a frame's commands into one vertex/index upload;
/// `render` then replays them as indexed draw spans in command order,
/// switching pipeline per blend mode and texture bind group per command.
pub struct RigRenderer {
    pipelines: Pipelines,
    pipelines_pma: Pipelines,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    mesh: MeshBuffer,
    vertices: Vec<GpuVertex>,
    indices: Vec<u32>,
    spans: Vec<DrawSpan>,
}

impl RigRenderer {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("rig2d shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let globals_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("globals bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture bind group layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("rig2d pipeline layout"),
            bind_group_layouts: &[&globals_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipelines =
            pipeline::create_pipelines(device, &pipeline_layout, &shader, color_format, false);
        let pipelines_pma =
            pipeline::create_pipelines(device, &pipeline_layout, &shader, color_format, true);

        let globals = Globals {
            clip_from_world: [[0.0; 4]; 4],
        };
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals buffer"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals bind group"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipelines,
            pipelines_pma,
            globals_buffer,
            globals_bind_group,
            texture_bind_group_layout,
            mesh: MeshBuffer::new(device),
            vertices: Vec::new(),
            indices: Vec::new(),
            spans: Vec::new(),
        }
    }

    pub fn texture_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_bind_group_layout
    }

    /// Projects widget-window pixels to clip space: origin top-left,
    /// y growing downward, matching the coordinate system the world
    /// placement anchors skeletons in.
    pub fn set_viewport(&self, queue: &wgpu::Queue, width: f32, height: f32) {
        let globals = Globals {
            clip_from_world: ortho_projection(width, height).to_cols_array_2d(),
        };
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Repacks `commands` into this frame's vertex/index upload and draw
    /// spans. Must run outside a render pass; call once per frame before
    /// [`render`](Self::render).
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        commands: &[RenderCommand],
    ) {
        self.vertices.clear();
        self.indices.clear();
        self.spans.clear();
        pack_commands(commands, &mut self.vertices, &mut self.indices, &mut self.spans);
        if self.vertices.is_empty() {
            return;
        }

        self.mesh
            .ensure(device, self.vertices.len(), self.indices.len());
        self.mesh.upload(queue, &self.vertices, &self.indices);
    }

    /// Replays the prepared draw spans in order. Spans whose texture failed
    /// to decode (or was never uploaded) are skipped.
    pub fn render<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        textures: &'a dyn TextureBindings,
        premultiplied_alpha: bool,
    ) {
        if self.spans.is_empty() {
            return;
        }

        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass.set_vertex_buffer(0, self.mesh.vertex_buffer().slice(..));
        pass.set_index_buffer(self.mesh.index_buffer().slice(..), wgpu::IndexFormat::Uint32);

        for span in &self.spans {
            let bind_group = match textures.bind_group_for(span.texture) {
                Some(bind_group) => bind_group,
                None => continue,
            };
            let pipeline = if premultiplied_alpha {
                self.pipelines_pma.by_blend(span.blend)
            } else {
                self.pipelines.by_blend(span.blend)
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, bind_group, &[]);
            let start = span.first_index as u32;
            let end = (span.first_index + span.index_count) as u32;
            pass.draw_indexed(start..end, 0, 0..1);
        }
    }
}

/// Flattens per-command geometry into shared vertex/index vectors,
/// rebasing each command's indices onto the shared vertex range and
/// recording one draw span per command. Packed colors come in as
/// `0xAARRGGBB`; the GPU reads bytes as RGBA, so red and blue swap here.
pub(crate) fn pack_commands(
    commands: &[RenderCommand],
    vertices: &mut Vec<GpuVertex>,
    indices: &mut Vec<u32>,
    spans: &mut Vec<DrawSpan>,
) {
    for command in commands {
        let base_vertex = vertices.len() as u32;
        let first_index = indices.len();

        for (((position, uv), color), dark_color) in command
            .positions
            .iter()
            .zip(&command.uvs)
            .zip(&command.colors)
            .zip(&command.dark_colors)
        {
            vertices.push(GpuVertex {
                position: *position,
                uv: *uv,
                color: swap_red_blue(*color),
                dark_color: swap_red_blue(*dark_color),
            });
        }
        indices.extend(command.indices.iter().map(|&i| base_vertex + u32::from(i)));

        spans.push(DrawSpan {
            texture: command.texture,
            blend: command.blend,
            first_index,
            index_count: indices.len() - first_index,
        });
    }
}

/// Swaps the R and B channels of a packed `0xAARRGGBB` color, producing
/// `0xAABBGGRR` (RGBA byte order in little-endian memory).
pub(crate) fn swap_red_blue(color: u32) -> u32 {
    (color & 0xFF00_FF00) | ((color & 0x00FF_0000) >> 16) | ((color & 0x0000_00FF) << 16)
}

/// Top-left origin, y-down pixel projection.
pub(crate) fn ortho_projection(width: f32, height: f32) -> glam::Mat4 {
    glam::Mat4::orthographic_rh(0.0, width.max(1.0), height.max(1.0), 0.0, -1.0, 1.0)
}
