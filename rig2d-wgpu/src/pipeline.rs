use rig2d::BlendMode;

/// Vertex layout uploaded to the GPU. Colors stay packed as the
/// runtime produced them (one byte per channel, RGBA in memory after
/// the red/blue swap) and are expanded by the `Unorm8x4` attribute.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: u32,
    pub dark_color: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Globals {
    pub clip_from_world: [[f32; 4]; 4],
}

pub(crate) struct Pipelines {
    normal: wgpu::RenderPipeline,
    additive: wgpu::RenderPipeline,
    multiply: wgpu::RenderPipeline,
    screen: wgpu::RenderPipeline,
}

impl Pipelines {
    pub(crate) fn by_blend(&self, blend: BlendMode) -> &wgpu::RenderPipeline {
        match blend {
            BlendMode::Normal => &self.normal,
            BlendMode::Additive => &self.additive,
            BlendMode::Multiply => &self.multiply,
            BlendMode::Screen => &self.screen,
        }
    }
}

pub(crate) fn create_pipelines(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    premultiplied_alpha: bool,
) -> Pipelines {
    Pipelines {
        normal: create_pipeline(
            device,
            layout,
            shader,
            color_format,
            BlendMode::Normal,
            premultiplied_alpha,
        ),
        additive: create_pipeline(
            device,
            layout,
            shader,
            color_format,
            BlendMode::Additive,
            premultiplied_alpha,
        ),
        multiply: create_pipeline(
            device,
            layout,
            shader,
            color_format,
            BlendMode::Multiply,
            premultiplied_alpha,
        ),
        screen: create_pipeline(
            device,
            layout,
            shader,
            color_format,
            BlendMode::Screen,
            premultiplied_alpha,
        ),
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    blend: BlendMode,
    premultiplied_alpha: bool,
) -> wgpu::RenderPipeline {
    let label = match (blend, premultiplied_alpha) {
        (BlendMode::Normal, false) => "rig2d pipeline normal",
        (BlendMode::Additive, false) => "rig2d pipeline additive",
        (BlendMode::Multiply, false) => "rig2d pipeline multiply",
        (BlendMode::Screen, false) => "rig2d pipeline screen",
        (BlendMode::Normal, true) => "rig2d pipeline normal pma",
        (BlendMode::Additive, true) => "rig2d pipeline additive pma",
        (BlendMode::Multiply, true) => "rig2d pipeline multiply pma",
        (BlendMode::Screen, true) => "rig2d pipeline screen pma",
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GpuVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x2,
                    1 => Float32x2,
                    2 => Unorm8x4,
                    3 => Unorm8x4
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(blend_state(blend, premultiplied_alpha)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Blend factors per blend mode, matching
/// glBlendFuncSeparate(srcColorBlend, dstBlend, ONE, dstBlend) as the
/// GL backend sets them up. Premultiplied alpha changes the source
/// color factor only.
pub fn blend_state(blend: BlendMode, premultiplied_alpha: bool) -> wgpu::BlendState {
    use wgpu::{BlendComponent, BlendFactor, BlendOperation};

    let (src_color, dst) = match blend {
        BlendMode::Normal => (
            src_color_for_alpha(premultiplied_alpha),
            BlendFactor::OneMinusSrcAlpha,
        ),
        BlendMode::Additive => (src_color_for_alpha(premultiplied_alpha), BlendFactor::One),
        BlendMode::Multiply => (BlendFactor::Dst, BlendFactor::OneMinusSrcAlpha),
        BlendMode::Screen => (BlendFactor::One, BlendFactor::OneMinusSrc),
    };

    wgpu::BlendState {
        color: BlendComponent {
            src_factor: src_color,
            dst_factor: dst,
            operation: BlendOperation::Add,
        },
        alpha: BlendComponent {
            src_factor: BlendFactor::One,
            dst_factor: dst,
            operation: BlendOperation::Add,
        },
    }
}

fn src_color_for_alpha(premultiplied_alpha: bool) -> wgpu::BlendFactor {
    if premultiplied_alpha {
        wgpu::BlendFactor::One
    } else {
        wgpu::BlendFactor::SrcAlpha
    }
}

pub(crate) const SHADER: &str = r#"
struct Globals {
  clip_from_world: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VsIn {
  @location(0) position: vec2<f32>,
  @location(1) uv: vec2<f32>,
  @location(2) light_color: vec4<f32>,
  @location(3) dark_color: vec4<f32>,
};

struct VsOut {
  @builtin(position) position: vec4<f32>,
  @location(0) uv: vec2<f32>,
  @location(1) light_color: vec4<f32>,
  @location(2) dark_color: vec4<f32>,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
  var out: VsOut;
  out.position = globals.clip_from_world * vec4<f32>(in.position, 0.0, 1.0);
  out.uv = in.uv;
  out.light_color = in.light_color;
  out.dark_color = in.dark_color;
  return out;
}

@group(1) @binding(0)
var tex: texture_2d<f32>;

@group(1) @binding(1)
var samp: sampler;

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
  let tex_color = textureSample(tex, samp, in.uv);
  let alpha = tex_color.a * in.light_color.a;
  let rgb = ((tex_color.a - 1.0) * in.dark_color.a + 1.0 - tex_color.rgb) * in.dark_color.rgb
    + tex_color.rgb * in.light_color.rgb;
  return vec4<f32>(rgb, alpha);
}
"#;
