use crate::gfx::{Color, TextureId};
use crate::math::{IVec2, Rect, UVec2, Vec2};
use smallvec::SmallVec;
use std::ops::Range;

/// Region of a texture mapped into a quad, normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadTexture {
    pub id: TextureId,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
}

/// Axis aligned rect to draw, in target coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub rect: Rect,
    /// Viewport clipped to the target, pixels outside are discarded
    pub clip: Rect,
    pub color: Color,
    pub texture: Option<QuadTexture>,
}

/// Consecutive quads sharing clip and texture
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub clip: Rect,
    pub texture: Option<TextureId>,
    pub quads: Range<usize>,
}

/// Everything needed to put one frame on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub size: UVec2,
    pub clear_color: Color,
    pub quads: Vec<Quad>,
}

impl Frame {
    pub fn batches(&self) -> Vec<Batch> {
        let mut batches: Vec<Batch> = vec![];
        for (i, quad) in self.quads.iter().enumerate() {
            let texture = quad.texture.map(|t| t.id);
            match batches.last_mut() {
                Some(batch) if batch.clip == quad.clip && batch.texture == texture => {
                    batch.quads.end = i + 1;
                }
                _ => batches.push(Batch {
                    clip: quad.clip,
                    texture,
                    quads: i..i + 1,
                }),
            }
        }
        batches
    }
}

/// Draw state shared by the backends.
///
/// Keeps the current draw color and viewport and turns each primitive into
/// quads relative to the whole target. `present` implementations take the
/// queued quads with [`Canvas::take_frame`].
#[derive(Debug, Clone)]
pub struct Canvas {
    size: UVec2,
    color: Color,
    viewport: Rect,
    clear_color: Color,
    quads: Vec<Quad>,
}

impl Canvas {
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            color: Color::BLACK,
            viewport: Rect::from_size(size),
            clear_color: Color::BLACK,
            quads: vec![],
        }
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// `None` restores the full target
    pub fn set_viewport(&mut self, viewport: Option<Rect>) {
        self.viewport = viewport.unwrap_or_else(|| Rect::from_size(self.size));
    }

    #[inline]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Fills the whole target with the draw color, ignoring the viewport
    pub fn clear(&mut self) {
        self.clear_color = self.color;
        self.quads.clear();
    }

    pub fn fill_rect(&mut self, rect: Rect) {
        self.push(rect, self.color, None);
    }

    pub fn draw_rect(&mut self, rect: Rect) {
        let color = self.color;
        outline_rects(rect)
            .into_iter()
            .for_each(|r| self.push(r, color, None));
    }

    pub fn draw_line(&mut self, from: IVec2, to: IVec2) {
        let color = self.color;
        line_rects(from, to)
            .into_iter()
            .for_each(|r| self.push(r, color, None));
    }

    pub fn draw_point(&mut self, point: IVec2) {
        self.push(Rect::from_origin_size(point, IVec2::ONE), self.color, None);
    }

    /// Draws `src` (whole texture if `None`) stretched over `dst` (whole viewport if `None`)
    pub fn copy(
        &mut self,
        texture: TextureId,
        texture_size: UVec2,
        src: Option<Rect>,
        dst: Option<Rect>,
    ) {
        let bounds = Rect::from_size(texture_size);
        let Some(src) = src.map_or(Some(bounds), |r| r.intersection(&bounds)) else {
            return;
        };

        let size = texture_size.as_vec2();
        let tex = QuadTexture {
            id: texture,
            uv_min: src.min().as_vec2() / size,
            uv_max: src.max().as_vec2() / size,
        };

        let dst = dst.unwrap_or_else(|| Rect::from_origin_size(IVec2::ZERO, self.viewport.size));
        self.push(dst, Color::WHITE, Some(tex));
    }

    /// Returns the queued frame and starts a new one with the same clear color
    pub fn take_frame(&mut self) -> Frame {
        Frame {
            size: self.size,
            clear_color: self.clear_color,
            quads: std::mem::take(&mut self.quads),
        }
    }

    #[inline]
    pub fn queued(&self) -> &[Quad] {
        &self.quads
    }

    fn push(&mut self, local: Rect, color: Color, texture: Option<QuadTexture>) {
        let Some(clip) = self.viewport.intersection(&Rect::from_size(self.size)) else {
            return;
        };

        let rect = local.translate(self.viewport.origin);
        if !rect.intersects(&clip) {
            return;
        }

        self.quads.push(Quad {
            rect,
            clip,
            color,
            texture,
        });
    }
}

/// One pixel wide border inside `rect`
pub fn outline_rects(rect: Rect) -> SmallVec<Rect, 4> {
    let mut rects = SmallVec::new();
    if rect.is_empty() {
        return rects;
    }

    let Rect { origin, size } = rect;
    if size.x <= 2 || size.y <= 2 {
        // no inner area left
        rects.push(rect);
        return rects;
    }

    rects.push(Rect::new(origin.x, origin.y, size.x, 1));
    rects.push(Rect::new(origin.x, origin.y + size.y - 1, size.x, 1));
    rects.push(Rect::new(origin.x, origin.y + 1, 1, size.y - 2));
    rects.push(Rect::new(origin.x + size.x - 1, origin.y + 1, 1, size.y - 2));
    rects
}

/// Pixels of the line, both ends included
pub fn line_rects(from: IVec2, to: IVec2) -> Vec<Rect> {
    if from.y == to.y {
        let x = from.x.min(to.x);
        let width = (from.x - to.x).abs() + 1;
        return vec![Rect::new(x, from.y, width, 1)];
    }

    if from.x == to.x {
        let y = from.y.min(to.y);
        let height = (from.y - to.y).abs() + 1;
        return vec![Rect::new(from.x, y, 1, height)];
    }

    // bresenham
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = (to.x - from.x).signum();
    let sy = (to.y - from.y).signum();
    let mut err = dx + dy;
    let mut point = from;
    let mut rects = Vec::with_capacity(dx.max(-dy) as usize + 1);

    loop {
        rects.push(Rect::from_origin_size(point, IVec2::ONE));
        if point == to {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            point.x += sx;
        }
        if e2 <= dx {
            err += dx;
            point.y += sy;
        }
    }

    rects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{ivec2, uvec2, vec2};

    #[test]
    fn test_clear_discards_queued_quads() {
        let mut canvas = Canvas::new(uvec2(100, 100));
        canvas.fill_rect(Rect::new(0, 0, 10, 10));
        canvas.set_color(Color::WHITE);
        canvas.clear();

        let frame = canvas.take_frame();
        assert!(frame.quads.is_empty());
        assert_eq!(frame.clear_color, Color::WHITE);
    }

    #[test]
    fn test_viewport_offsets_and_clips() {
        let mut canvas = Canvas::new(uvec2(100, 100));
        canvas.set_viewport(Some(Rect::new(50, 0, 50, 50)));
        canvas.fill_rect(Rect::new(10, 10, 100, 5));

        let quad = canvas.queued()[0];
        assert_eq!(quad.rect, Rect::new(60, 10, 100, 5));
        assert_eq!(quad.clip, Rect::new(50, 0, 50, 50));

        canvas.set_viewport(None);
        assert_eq!(canvas.viewport(), Rect::new(0, 0, 100, 100));
    }

    #[test]
    fn test_quads_outside_the_viewport_are_skipped() {
        let mut canvas = Canvas::new(uvec2(100, 100));
        canvas.set_viewport(Some(Rect::new(0, 0, 10, 10)));
        canvas.fill_rect(Rect::new(20, 20, 5, 5));
        canvas.fill_rect(Rect::new(0, 0, 0, 5));
        assert!(canvas.queued().is_empty());
    }

    #[test]
    fn test_copy_defaults_to_whole_texture_and_viewport() {
        let mut canvas = Canvas::new(uvec2(800, 600));
        canvas.set_viewport(Some(Rect::new(400, 0, 400, 299)));
        canvas.copy(TextureId(1), uvec2(64, 32), None, None);

        let quad = canvas.queued()[0];
        assert_eq!(quad.rect, Rect::new(400, 0, 400, 299));
        assert_eq!(quad.color, Color::WHITE);

        let tex = quad.texture.unwrap();
        assert_eq!(tex.id, TextureId(1));
        assert_eq!(tex.uv_min, vec2(0.0, 0.0));
        assert_eq!(tex.uv_max, vec2(1.0, 1.0));
    }

    #[test]
    fn test_copy_src_region() {
        let mut canvas = Canvas::new(uvec2(100, 100));
        canvas.copy(
            TextureId(2),
            uvec2(64, 64),
            Some(Rect::new(32, 0, 32, 64)),
            Some(Rect::new(0, 0, 10, 10)),
        );

        let tex = canvas.queued()[0].texture.unwrap();
        assert_eq!(tex.uv_min, vec2(0.5, 0.0));
        assert_eq!(tex.uv_max, vec2(1.0, 1.0));
    }

    #[test]
    fn test_outline_rects() {
        let rects = outline_rects(Rect::new(100, 75, 600, 450));
        assert_eq!(
            rects.as_slice(),
            &[
                Rect::new(100, 75, 600, 1),
                Rect::new(100, 524, 600, 1),
                Rect::new(100, 76, 1, 448),
                Rect::new(699, 76, 1, 448),
            ]
        );

        assert_eq!(outline_rects(Rect::new(0, 0, 2, 8)).len(), 1);
        assert!(outline_rects(Rect::new(0, 0, 0, 8)).is_empty());
    }

    #[test]
    fn test_axis_aligned_lines_are_one_rect() {
        assert_eq!(
            line_rects(ivec2(0, 300), ivec2(800, 300)),
            vec![Rect::new(0, 300, 801, 1)]
        );
        assert_eq!(
            line_rects(ivec2(5, 10), ivec2(5, 2)),
            vec![Rect::new(5, 2, 1, 9)]
        );
    }

    #[test]
    fn test_diagonal_line_points() {
        let rects = line_rects(ivec2(0, 0), ivec2(3, 3));
        let points: Vec<IVec2> = rects.iter().map(|r| r.origin).collect();
        assert_eq!(
            points,
            vec![ivec2(0, 0), ivec2(1, 1), ivec2(2, 2), ivec2(3, 3)]
        );

        let rects = line_rects(ivec2(0, 0), ivec2(4, -2));
        assert_eq!(rects.first().unwrap().origin, ivec2(0, 0));
        assert_eq!(rects.last().unwrap().origin, ivec2(4, -2));
        assert_eq!(rects.len(), 5);
    }

    #[test]
    fn test_frame_batches() {
        let mut canvas = Canvas::new(uvec2(100, 100));
        canvas.fill_rect(Rect::new(0, 0, 10, 10));
        canvas.draw_point(ivec2(20, 20));
        canvas.set_viewport(Some(Rect::new(0, 50, 100, 50)));
        canvas.copy(TextureId(7), uvec2(4, 4), None, None);
        canvas.copy(TextureId(7), uvec2(4, 4), None, None);

        let batches = canvas.take_frame().batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].texture, None);
        assert_eq!(batches[0].quads, 0..2);
        assert_eq!(batches[1].texture, Some(TextureId(7)));
        assert_eq!(batches[1].clip, Rect::new(0, 50, 100, 50));
        assert_eq!(batches[1].quads, 2..4);
    }
}
