use crate::gfx::{TextureData, TextureId};
use crate::math::UVec2;
use std::fmt::{Debug, Formatter};
use wgpu::{Texture as RawTexture, TextureView};

pub struct Texture {
    pub(crate) id: TextureId,
    pub(crate) raw: RawTexture,
    pub(crate) view: TextureView,
    pub(crate) size: UVec2,
}

impl Texture {
    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }
}

impl Debug for Texture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("size", &self.size)
            .finish()
    }
}

pub(crate) fn create_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    id: TextureId,
    label: Option<&str>,
    data: TextureData,
) -> Texture {
    let size = wgpu::Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };

    let raw = device.create_texture(&wgpu::TextureDescriptor {
        label,
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &raw,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data.bytes,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(data.width * 4),
            rows_per_image: Some(data.height),
        },
        size,
    );

    let view = raw.create_view(&wgpu::TextureViewDescriptor::default());

    Texture {
        id,
        raw,
        view,
        size: data.size(),
    }
}
