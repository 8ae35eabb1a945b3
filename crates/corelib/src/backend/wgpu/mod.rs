mod context;
mod gfx;
mod pipeline;
mod surface;
mod texture;

pub use gfx::GfxBackend;
pub use texture::Texture;
