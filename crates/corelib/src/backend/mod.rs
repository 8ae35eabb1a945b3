#[cfg(feature = "headless")]
mod headless;
mod traits;
mod wgpu;
mod winit;

pub use traits::{BackendImpl, GfxBackendImpl};

pub use winit::{WinitBackend, WinitWindow};

#[cfg(feature = "headless")]
pub use headless::*;

pub mod gfx {
    pub use super::wgpu::{GfxBackend, Texture};
}
