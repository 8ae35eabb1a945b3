pub mod app;
mod backend;
pub mod events;
pub mod gfx;
pub mod images;
pub mod math;
mod utils;

pub use backend::gfx::{GfxBackend, Texture};
pub use backend::{BackendImpl, GfxBackendImpl, WinitBackend, WinitWindow};

#[cfg(feature = "headless")]
pub use backend::{
    Call, CallLog, HeadlessBackend, HeadlessConfig, HeadlessGfx, HeadlessStep, HeadlessTexture,
    HeadlessWindow, PixelBuffer,
};

pub use utils::parse_string_as_usize;
