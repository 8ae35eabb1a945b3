use crate::app::WindowConfig;
use crate::events::Event;
use crate::gfx::{Color, TextureData};
use crate::math::{IVec2, Rect, UVec2};

/// Video subsystem: owns the window and the renderer bound to it
pub trait BackendImpl {
    type Window;
    type Gfx: GfxBackendImpl;

    fn init(&mut self) -> Result<(), String>;
    fn create_window(&mut self, config: &WindowConfig) -> Result<Self::Window, String>;
    fn create_gfx(
        &mut self,
        window: &Self::Window,
        config: &WindowConfig,
    ) -> Result<Self::Gfx, String>;

    /// Returns the next pending event without blocking
    fn poll_event(&mut self) -> Option<Event>;

    fn destroy_gfx(&mut self, gfx: Self::Gfx);
    fn destroy_window(&mut self, window: Self::Window);
    fn quit(&mut self);
}

/// Accelerated 2D renderer bound to one window.
///
/// Coordinates are pixels relative to the current viewport origin and
/// drawing is clipped to the viewport. `clear` ignores the viewport.
pub trait GfxBackendImpl {
    type Texture;

    /// Size of the render target in pixels
    fn size(&self) -> UVec2;

    fn set_draw_color(&mut self, color: Color);
    fn draw_color(&self) -> Color;

    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect);
    fn draw_rect(&mut self, rect: Rect);
    fn draw_line(&mut self, from: IVec2, to: IVec2);
    fn draw_point(&mut self, point: IVec2);

    /// `None` resets the viewport to the whole target
    fn set_viewport(&mut self, viewport: Option<Rect>);
    fn viewport(&self) -> Rect;

    /// Draws `src` of the texture (all of it if `None`) stretched over `dst`
    /// (the whole viewport if `None`)
    fn copy(&mut self, texture: &Self::Texture, src: Option<Rect>, dst: Option<Rect>);

    /// Puts everything drawn since the last present on screen
    fn present(&mut self) -> Result<(), String>;

    fn create_texture(&mut self, data: TextureData) -> Result<Self::Texture, String>;
    fn destroy_texture(&mut self, texture: Self::Texture);
}
