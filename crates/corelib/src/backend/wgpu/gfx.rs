use crate::backend::GfxBackendImpl;
use crate::backend::wgpu::context::Context;
use crate::backend::wgpu::pipeline::{QUAD_INDICES, QuadPipeline, Vertex, quad_vertices, scissor_rect};
use crate::backend::wgpu::surface::Surface;
use crate::backend::wgpu::texture::{Texture, create_texture};
use crate::gfx::{Canvas, Color, Frame, TextureData, TextureId};
use crate::math::{IVec2, Rect, UVec2};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, Buffer, SurfaceTarget};

const WHITE_PIXEL: [u8; 4] = [255; 4];

pub struct GfxBackend {
    next_resource_id: u64,
    ctx: Context,
    surface: Surface,
    pipeline: QuadPipeline,
    white: Texture,
    bind_groups: FxHashMap<TextureId, BindGroup>,
    canvas: Canvas,
    scale_factor: f32,
}

impl GfxBackend {
    /// `size` is the drawing area in window units, `surface_size` the same area in
    /// physical pixels.
    pub(crate) async fn init(
        window: impl Into<SurfaceTarget<'static>>,
        vsync: bool,
        size: UVec2,
        surface_size: UVec2,
        scale_factor: f32,
    ) -> Result<Self, String> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());
        let raw_surface = instance
            .create_surface(window)
            .map_err(|e| e.to_string())?;

        let ctx = Context::new(&instance, &raw_surface).await?;
        let surface = Surface::new(&ctx, raw_surface, surface_size, vsync)?;
        let pipeline = QuadPipeline::new(&ctx.device, surface.format());

        // untextured quads sample this one
        let white = create_texture(
            &ctx.device,
            &ctx.queue,
            TextureId(0),
            Some("White Texture"),
            TextureData {
                bytes: &WHITE_PIXEL,
                width: 1,
                height: 1,
            },
        );

        let mut bind_groups = FxHashMap::default();
        bind_groups.insert(
            white.id,
            pipeline.bind_group(&ctx.device, &white.view, "White Texture BindGroup"),
        );

        let canvas = Canvas::new(size);
        log::debug!(
            "Renderer initiated with size {} (surface {}, scale {scale_factor})",
            canvas.size(),
            surface.size()
        );

        Ok(Self {
            next_resource_id: 1,
            ctx,
            surface,
            pipeline,
            white,
            bind_groups,
            canvas,
            scale_factor,
        })
    }

    fn next_id(&mut self) -> TextureId {
        let id = TextureId(self.next_resource_id);
        self.next_resource_id += 1;
        id
    }

    fn upload(&self, frame: &Frame) -> Option<(Buffer, Buffer)> {
        if frame.quads.is_empty() {
            return None;
        }

        let mut vertices: Vec<Vertex> = Vec::with_capacity(frame.quads.len() * 4);
        let mut indices: Vec<u32> = Vec::with_capacity(frame.quads.len() * 6);
        for quad in &frame.quads {
            let base = vertices.len() as u32;
            vertices.extend(quad_vertices(quad, frame.size));
            indices.extend(QUAD_INDICES.iter().map(|i| base + i));
        }

        let device = &self.ctx.device;
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame VBO"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ebo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame EBO"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Some((vbo, ebo))
    }
}

impl GfxBackendImpl for GfxBackend {
    type Texture = Texture;

    #[inline]
    fn size(&self) -> UVec2 {
        self.canvas.size()
    }

    #[inline]
    fn set_draw_color(&mut self, color: Color) {
        self.canvas.set_color(color);
    }

    #[inline]
    fn draw_color(&self) -> Color {
        self.canvas.color()
    }

    #[inline]
    fn clear(&mut self) {
        self.canvas.clear();
    }

    #[inline]
    fn fill_rect(&mut self, rect: Rect) {
        self.canvas.fill_rect(rect);
    }

    #[inline]
    fn draw_rect(&mut self, rect: Rect) {
        self.canvas.draw_rect(rect);
    }

    #[inline]
    fn draw_line(&mut self, from: IVec2, to: IVec2) {
        self.canvas.draw_line(from, to);
    }

    #[inline]
    fn draw_point(&mut self, point: IVec2) {
        self.canvas.draw_point(point);
    }

    #[inline]
    fn set_viewport(&mut self, viewport: Option<Rect>) {
        self.canvas.set_viewport(viewport);
    }

    #[inline]
    fn viewport(&self) -> Rect {
        self.canvas.viewport()
    }

    fn copy(&mut self, texture: &Self::Texture, src: Option<Rect>, dst: Option<Rect>) {
        self.canvas.copy(texture.id, texture.size, src, dst);
    }

    fn present(&mut self) -> Result<(), String> {
        let frame = self.canvas.take_frame();
        let Some(output) = self.surface.frame(&self.ctx.device)? else {
            return Ok(());
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let surface_size = self.surface.size();
        let buffers = self.upload(&frame);

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let [r, g, b, a] = frame.clear_color.to_rgba();
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as _,
                            g: g as _,
                            b: b as _,
                            a: a as _,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some((vbo, ebo)) = &buffers {
                rpass.set_pipeline(&self.pipeline.raw);
                rpass.set_vertex_buffer(0, vbo.slice(..));
                rpass.set_index_buffer(ebo.slice(..), wgpu::IndexFormat::Uint32);

                for batch in frame.batches() {
                    let Some(clip) = scissor_rect(batch.clip, self.scale_factor, surface_size)
                    else {
                        continue;
                    };

                    let id = batch.texture.unwrap_or(self.white.id);
                    let Some(bind_group) = self.bind_groups.get(&id) else {
                        log::warn!("Skipping draw with unknown texture {id:?}");
                        continue;
                    };

                    rpass.set_scissor_rect(
                        clip.x() as _,
                        clip.y() as _,
                        clip.width() as _,
                        clip.height() as _,
                    );
                    rpass.set_bind_group(0, bind_group, &[]);

                    let start = (batch.quads.start * QUAD_INDICES.len()) as u32;
                    let end = (batch.quads.end * QUAD_INDICES.len()) as u32;
                    rpass.draw_indexed(start..end, 0, 0..1);
                }
            }
        }

        self.ctx.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn create_texture(&mut self, data: TextureData) -> Result<Self::Texture, String> {
        data.validate()?;

        let max = self.ctx.max_texture_size();
        if data.width > max || data.height > max {
            return Err(format!(
                "Texture size {}x{} exceeds the maximum of {max}x{max}",
                data.width, data.height
            ));
        }

        let id = self.next_id();
        let texture = create_texture(&self.ctx.device, &self.ctx.queue, id, Some("Texture"), data);
        let bind_group = self
            .pipeline
            .bind_group(&self.ctx.device, &texture.view, "Texture BindGroup");
        self.bind_groups.insert(id, bind_group);

        log::debug!("Texture {id:?} created with size {}", texture.size);
        Ok(texture)
    }

    fn destroy_texture(&mut self, texture: Self::Texture) {
        self.bind_groups.remove(&texture.id);
        texture.raw.destroy();
        log::debug!("Texture {:?} destroyed", texture.id);
    }
}
