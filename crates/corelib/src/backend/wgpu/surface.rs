use crate::backend::wgpu::context::Context;
use crate::math::{UVec2, uvec2};
use wgpu::{Device, Surface as RawSurface, SurfaceConfiguration, SurfaceError, SurfaceTexture};

pub(crate) struct Surface {
    raw: RawSurface<'static>,
    config: SurfaceConfiguration,
}

impl Surface {
    pub fn new(
        ctx: &Context,
        raw: RawSurface<'static>,
        size: UVec2,
        vsync: bool,
    ) -> Result<Self, String> {
        let capabilities = raw.get_capabilities(&ctx.adapter);

        // colors are written as they come, an srgb target would shift them
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| "The surface is not supported by the GPU adapter".to_string())?;

        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.x.max(1),
            height: size.y.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };

        raw.configure(&ctx.device, &config);
        log::debug!(
            "Surface configured: {}x{} {:?} {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self { raw, config })
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        uvec2(self.config.width, self.config.height)
    }

    /// Next frame to draw, `None` when the frame must be skipped
    pub fn frame(&self, device: &Device) -> Result<Option<SurfaceTexture>, String> {
        match self.raw.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.raw.configure(device, &self.config);
                Ok(None)
            }
            Err(SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                Ok(None)
            }
            Err(e) => Err(e.to_string()),
        }
    }
}
