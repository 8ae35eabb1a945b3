use corelib::gfx::{Color, GfxBackendImpl};
use corelib::math::{IVec2, Rect, UVec2, ivec2};

/// Draws one frame on the renderer. Presenting is left to the caller.
pub trait RenderPolicy {
    fn render<G: GfxBackendImpl>(&self, gfx: &mut G, texture: Option<&G::Texture>);
}

/// Geometry drawn by [`PrimitivesPolicy`] for a given target size
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitivesLayout {
    pub fill: Rect,
    pub outline: Rect,
    pub line: (IVec2, IVec2),
    pub dots: Vec<IVec2>,
}

impl PrimitivesLayout {
    pub fn new(size: UVec2, outline_scale: f32, dot_spacing: u32) -> Self {
        let (w, h) = (size.x as i32, size.y as i32);

        let fill = Rect::new(w / 4, h / 4, w / 2, h / 2);
        let outline_size = (fill.size.as_vec2() * outline_scale).round().as_ivec2();
        let outline = Rect::from_center(fill.center(), outline_size);

        let line = (ivec2(0, h / 2), ivec2(w, h / 2));

        let step = dot_spacing.max(1) as usize;
        let dots = (0..h).step_by(step).map(|y| ivec2(w / 2, y)).collect();

        Self {
            fill,
            outline,
            line,
            dots,
        }
    }
}

/// White background, red filled rect, green outline, blue line and a yellow dotted line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitivesPolicy {
    pub outline_scale: f32,
    pub dot_spacing: u32,
}

impl Default for PrimitivesPolicy {
    fn default() -> Self {
        Self {
            outline_scale: 1.5,
            dot_spacing: 5,
        }
    }
}

impl RenderPolicy for PrimitivesPolicy {
    fn render<G: GfxBackendImpl>(&self, gfx: &mut G, _texture: Option<&G::Texture>) {
        let layout = PrimitivesLayout::new(gfx.size(), self.outline_scale, self.dot_spacing);

        gfx.set_viewport(None);
        gfx.set_draw_color(Color::WHITE);
        gfx.clear();

        gfx.set_draw_color(Color::RED);
        gfx.fill_rect(layout.fill);

        gfx.set_draw_color(Color::GREEN);
        gfx.draw_rect(layout.outline);

        gfx.set_draw_color(Color::BLUE);
        gfx.draw_line(layout.line.0, layout.line.1);

        gfx.set_draw_color(Color::YELLOW);
        layout.dots.iter().for_each(|p| gfx.draw_point(*p));
    }
}

/// Top-left, top-right and bottom viewports.
/// The top ones leave a one pixel gap at the split lines.
pub fn viewport_rects(size: UVec2) -> [Rect; 3] {
    let (w, h) = (size.x as i32, size.y as i32);
    [
        Rect::new(0, 0, w / 2 - 1, h / 2 - 1),
        Rect::new(w / 2, 0, w / 2, h / 2 - 1),
        Rect::new(0, h / 2, w, h / 2),
    ]
}

/// The texture stretched over each one of the [`viewport_rects`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportsPolicy {
    pub clear_color: Color,
}

impl Default for ViewportsPolicy {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
        }
    }
}

impl RenderPolicy for ViewportsPolicy {
    fn render<G: GfxBackendImpl>(&self, gfx: &mut G, texture: Option<&G::Texture>) {
        gfx.set_viewport(None);
        gfx.set_draw_color(self.clear_color);
        gfx.clear();

        // without texture the viewports stay cleared
        let Some(texture) = texture else {
            return;
        };

        for viewport in viewport_rects(gfx.size()) {
            gfx.set_viewport(Some(viewport));
            gfx.copy(texture, None, None);
        }

        gfx.set_viewport(None);
    }
}

/// Render policy chosen by configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    Primitives(PrimitivesPolicy),
    Viewports(ViewportsPolicy),
}

impl RenderPolicy for Policy {
    fn render<G: GfxBackendImpl>(&self, gfx: &mut G, texture: Option<&G::Texture>) {
        match self {
            Policy::Primitives(p) => p.render(gfx, texture),
            Policy::Viewports(p) => p.render(gfx, texture),
        }
    }
}
