use crate::gfx::Quad;
use crate::math::{Rect, UVec2, Vec2, vec2};
use bytemuck::{Pod, Zeroable};
use wgpu::{BindGroup, BindGroupLayout, Device, RenderPipeline, Sampler, TextureView};

// language=wgsl
const SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uvs: vec2<f32>,
    @location(2) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uvs: vec2<f32>,
    @location(1) color: vec4<f32>,
}

@group(0) @binding(0)
var t_texture: texture_2d<f32>;
@group(0) @binding(1)
var s_texture: sampler;

@vertex
fn vs_main(model: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(model.position, 0.0, 1.0);
    out.uvs = model.uvs;
    out.color = model.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(t_texture, s_texture, in.uvs) * in.color;
}
"#;

pub(crate) const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 2],
    pub uvs: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Converts a pixel position of the target to normalized device coordinates
#[inline]
pub(crate) fn to_ndc(point: Vec2, target: UVec2) -> Vec2 {
    let size = target.as_vec2();
    vec2(point.x / size.x * 2.0 - 1.0, 1.0 - point.y / size.y * 2.0)
}

/// Maps a clip rect in window units to the surface pixels it covers.
/// `None` if nothing of it lands on the surface.
pub(crate) fn scissor_rect(clip: Rect, scale: f32, surface: UVec2) -> Option<Rect> {
    let min = (clip.min().as_vec2() * scale).round().as_ivec2();
    let max = (clip.max().as_vec2() * scale).round().as_ivec2();
    Rect::from_min_max(min, max).intersection(&Rect::from_size(surface))
}

/// Vertices of the quad in top-left, top-right, bottom-right, bottom-left order
pub(crate) fn quad_vertices(quad: &Quad, target: UVec2) -> [Vertex; 4] {
    let min = quad.rect.min().as_vec2();
    let max = quad.rect.max().as_vec2();
    let (uv_min, uv_max) = quad
        .texture
        .map_or((Vec2::ZERO, Vec2::ONE), |t| (t.uv_min, t.uv_max));
    let color = quad.color.to_rgba();

    let vertex = |x: f32, y: f32, u: f32, v: f32| Vertex {
        position: to_ndc(vec2(x, y), target).to_array(),
        uvs: [u, v],
        color,
    };

    [
        vertex(min.x, min.y, uv_min.x, uv_min.y),
        vertex(max.x, min.y, uv_max.x, uv_min.y),
        vertex(max.x, max.y, uv_max.x, uv_max.y),
        vertex(min.x, max.y, uv_min.x, uv_max.y),
    ]
}

/// Pipeline drawing colored quads modulated by a texture
pub(crate) struct QuadPipeline {
    pub raw: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    sampler: Sampler,
}

impl QuadPipeline {
    pub fn new(device: &Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Quad BindGroupLayout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
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

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Quad PipelineLayout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let raw = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Quad Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        // pixel art friendly and exact for 1:1 copies
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Quad Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            raw,
            bind_group_layout,
            sampler,
        }
    }

    pub fn bind_group(&self, device: &Device, view: &TextureView, label: &str) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{Color, QuadTexture, TextureId};
    use crate::math::{Rect, uvec2};

    #[test]
    fn test_ndc_corners() {
        let target = uvec2(800, 600);
        assert_eq!(to_ndc(vec2(0.0, 0.0), target), vec2(-1.0, 1.0));
        assert_eq!(to_ndc(vec2(800.0, 600.0), target), vec2(1.0, -1.0));
        assert_eq!(to_ndc(vec2(400.0, 300.0), target), vec2(0.0, 0.0));
    }

    #[test]
    fn test_ndc_does_not_depend_on_the_scale_factor() {
        // canvas units, the surface may be 1600x1200 at scale 2
        let canvas = uvec2(800, 600);
        assert_eq!(to_ndc(vec2(200.0, 150.0), canvas), vec2(-0.5, 0.5));
        assert_eq!(to_ndc(vec2(600.0, 450.0), canvas), vec2(0.5, -0.5));
    }

    #[test]
    fn test_scissor_rect_scales_to_the_surface() {
        let surface = uvec2(1600, 1200);

        let fill = scissor_rect(Rect::new(200, 150, 400, 300), 2.0, surface);
        assert_eq!(fill, Some(Rect::new(400, 300, 800, 600)));

        let whole = scissor_rect(Rect::new(0, 0, 800, 600), 2.0, surface);
        assert_eq!(whole, Some(Rect::from_size(surface)));

        let half = scissor_rect(Rect::new(1, 1, 3, 3), 1.5, uvec2(1200, 900));
        assert_eq!(half, Some(Rect::new(2, 2, 4, 4)));
    }

    #[test]
    fn test_scissor_rect_clamps_to_the_surface() {
        let surface = uvec2(800, 600);
        assert_eq!(
            scissor_rect(Rect::new(0, 0, 800, 600), 1.0, surface),
            Some(Rect::from_size(surface))
        );
        assert_eq!(
            scissor_rect(Rect::new(700, 500, 200, 200), 1.0, surface),
            Some(Rect::new(700, 500, 100, 100))
        );
        assert_eq!(scissor_rect(Rect::new(900, 0, 10, 10), 1.0, surface), None);
    }

    #[test]
    fn test_quad_vertices() {
        let quad = Quad {
            rect: Rect::new(0, 0, 400, 300),
            clip: Rect::new(0, 0, 800, 600),
            color: Color::RED,
            texture: Some(QuadTexture {
                id: TextureId::from(3),
                uv_min: vec2(0.5, 0.0),
                uv_max: vec2(1.0, 0.5),
            }),
        };

        let [tl, tr, br, bl] = quad_vertices(&quad, uvec2(800, 600));
        assert_eq!(tl.position, [-1.0, 1.0]);
        assert_eq!(br.position, [0.0, 0.0]);
        assert_eq!(tr.uvs, [1.0, 0.0]);
        assert_eq!(bl.uvs, [0.5, 0.5]);
        assert_eq!(tl.color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_untextured_quads_sample_the_whole_texture() {
        let quad = Quad {
            rect: Rect::new(10, 10, 1, 1),
            clip: Rect::new(0, 0, 20, 20),
            color: Color::WHITE,
            texture: None,
        };

        let [tl, _, br, _] = quad_vertices(&quad, uvec2(20, 20));
        assert_eq!(tl.uvs, [0.0, 0.0]);
        assert_eq!(br.uvs, [1.0, 1.0]);
    }
}
