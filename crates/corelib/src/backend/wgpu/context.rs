use std::sync::Arc;

use wgpu::{
    Adapter, Device, ExperimentalFeatures, Instance, PowerPreference, Queue, Surface as RawSurface,
};

pub(crate) struct Context {
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
}

impl Context {
    /// Requests an adapter able to present to `surface` and opens its device
    pub(crate) async fn new(instance: &Instance, surface: &RawSurface<'_>) -> Result<Self, String> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(surface),
                ..Default::default()
            })
            .await
            .map_err(|e| format!("Cannot create WGPU Adapter: {e}"))?;

        let info = adapter.get_info();
        log::debug!("Wgpu Adapter: {info:?}");
        log::info!(
            "GPU Adapter: {} - {} ({}: {})",
            info.backend,
            info.name,
            info.driver,
            info.driver_info
        );

        // a handful of textured quads per frame, the lowest limits are enough
        let limits = wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Renderer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
                experimental_features: ExperimentalFeatures::default(),
            })
            .await
            .map_err(|e| format!("Cannot create WGPU Device: {e}"))?;

        device.on_uncaptured_error(Arc::new(|e| {
            log::error!("WGPU Error: {e}");

            if cfg!(debug_assertions) {
                panic!("WGPU Error: {e}");
            }
        }));

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }

    #[inline]
    pub fn max_texture_size(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
