mod canvas;
mod color;
mod texture;

pub use canvas::*;
pub use color::*;
pub use texture::*;

pub use crate::backend::GfxBackendImpl;
