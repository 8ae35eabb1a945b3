use std::collections::VecDeque;
use std::sync::Arc;

use atomic_refcell::AtomicRefCell;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use strum_macros::Display;

use crate::{
    app::WindowConfig,
    backend::traits::{BackendImpl, GfxBackendImpl},
    events::Event,
    gfx::{Canvas, Color, Frame, TextureData, TextureId},
    math::{IVec2, Rect, UVec2},
};

/// Backend calls that can be scripted to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HeadlessStep {
    Init,
    CreateWindow,
    CreateGfx,
    CreateTexture,
    Present,
}

/// Script for the headless backend
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    fail_at: SmallVec<HeadlessStep, 2>,
    events: VecDeque<VecDeque<Event>>,
}

impl HeadlessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `step` return an error
    pub fn fail_at(mut self, step: HeadlessStep) -> Self {
        if !self.fail_at.contains(&step) {
            self.fail_at.push(step);
        }
        self
    }

    /// Adds the events returned by one drain of the queue.
    /// Once every batch is consumed the backend only returns [`Event::Quit`].
    pub fn events(mut self, batch: &[Event]) -> Self {
        self.events.push_back(batch.iter().copied().collect());
        self
    }

    fn fails(&self, step: HeadlessStep) -> bool {
        self.fail_at.contains(&step)
    }

    fn check(&self, step: HeadlessStep) -> Result<(), String> {
        if self.fails(step) {
            return Err(format!("Headless failure at '{step}'"));
        }

        Ok(())
    }
}

/// Everything the headless backend was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init,
    CreateWindow(UVec2),
    CreateGfx,
    Event(Event),
    SetDrawColor(Color),
    Clear,
    FillRect(Rect),
    DrawRect(Rect),
    DrawLine(IVec2, IVec2),
    DrawPoint(IVec2),
    SetViewport(Option<Rect>),
    Copy {
        texture: TextureId,
        src: Option<Rect>,
        dst: Option<Rect>,
    },
    Present,
    CreateTexture(TextureId),
    DestroyTexture(TextureId),
    DestroyGfx,
    DestroyWindow,
    Quit,
}

impl Call {
    /// Calls that change what the next present shows
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Call::SetDrawColor(_)
                | Call::Clear
                | Call::FillRect(_)
                | Call::DrawRect(_)
                | Call::DrawLine(..)
                | Call::DrawPoint(_)
                | Call::SetViewport(_)
                | Call::Copy { .. }
        )
    }
}

#[derive(Debug, Default)]
struct LogState {
    calls: Vec<Call>,
    last_frame: Option<PixelBuffer>,
}

/// Shared record of the calls made to a [`HeadlessBackend`]
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<AtomicRefCell<LogState>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.borrow_mut().calls.push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    /// Number of calls matching `predicate`
    pub fn count<F: Fn(&Call) -> bool>(&self, predicate: F) -> usize {
        self.0.borrow().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Draw calls made between the last two presents
    pub fn last_frame_calls(&self) -> Vec<Call> {
        let state = self.0.borrow();
        let calls = &state.calls;
        let Some(end) = calls.iter().rposition(|c| *c == Call::Present) else {
            return vec![];
        };

        let start = calls[..end]
            .iter()
            .rposition(|c| *c == Call::Present)
            .map_or(0, |i| i + 1);

        calls[start..end]
            .iter()
            .filter(|c| c.is_draw())
            .cloned()
            .collect()
    }

    /// Pixels of the last successfully presented frame
    pub fn last_frame(&self) -> Option<PixelBuffer> {
        self.0.borrow().last_frame.clone()
    }

    pub fn presents(&self) -> usize {
        self.count(|c| *c == Call::Present)
    }
}

/// Scripted backend without window or GPU.
/// Records every call and rasterizes presented frames on the CPU.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    config: HeadlessConfig,
    log: CallLog,
}

impl HeadlessBackend {
    pub fn new(config: HeadlessConfig) -> Self {
        Self {
            config,
            log: CallLog::default(),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindow {
    pub title: String,
    pub size: UVec2,
}

impl BackendImpl for HeadlessBackend {
    type Window = HeadlessWindow;
    type Gfx = HeadlessGfx;

    fn init(&mut self) -> Result<(), String> {
        self.log.push(Call::Init);
        self.config.check(HeadlessStep::Init)
    }

    fn create_window(&mut self, config: &WindowConfig) -> Result<Self::Window, String> {
        self.log.push(Call::CreateWindow(config.size));
        self.config.check(HeadlessStep::CreateWindow)?;
        Ok(HeadlessWindow {
            title: config.title.clone(),
            size: config.size,
        })
    }

    fn create_gfx(
        &mut self,
        window: &Self::Window,
        _config: &WindowConfig,
    ) -> Result<Self::Gfx, String> {
        self.log.push(Call::CreateGfx);
        self.config.check(HeadlessStep::CreateGfx)?;
        Ok(HeadlessGfx {
            canvas: Canvas::new(window.size),
            textures: FxHashMap::default(),
            next_texture_id: 1,
            fail_texture: self.config.fails(HeadlessStep::CreateTexture),
            fail_present: self.config.fails(HeadlessStep::Present),
            log: self.log.clone(),
        })
    }

    fn poll_event(&mut self) -> Option<Event> {
        let Some(batch) = self.config.events.front_mut() else {
            self.log.push(Call::Event(Event::Quit));
            return Some(Event::Quit);
        };

        match batch.pop_front() {
            Some(evt) => {
                self.log.push(Call::Event(evt));
                Some(evt)
            }
            None => {
                // end of this drain
                self.config.events.pop_front();
                None
            }
        }
    }

    fn destroy_gfx(&mut self, _gfx: Self::Gfx) {
        self.log.push(Call::DestroyGfx);
    }

    fn destroy_window(&mut self, _window: Self::Window) {
        self.log.push(Call::DestroyWindow);
    }

    fn quit(&mut self) {
        self.log.push(Call::Quit);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessTexture {
    id: TextureId,
    size: UVec2,
}

impl HeadlessTexture {
    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }
}

#[derive(Debug)]
pub struct HeadlessGfx {
    canvas: Canvas,
    textures: FxHashMap<TextureId, PixelBuffer>,
    next_texture_id: u64,
    fail_texture: bool,
    fail_present: bool,
    log: CallLog,
}

impl GfxBackendImpl for HeadlessGfx {
    type Texture = HeadlessTexture;

    fn size(&self) -> UVec2 {
        self.canvas.size()
    }

    fn set_draw_color(&mut self, color: Color) {
        self.log.push(Call::SetDrawColor(color));
        self.canvas.set_color(color);
    }

    fn draw_color(&self) -> Color {
        self.canvas.color()
    }

    fn clear(&mut self) {
        self.log.push(Call::Clear);
        self.canvas.clear();
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.log.push(Call::FillRect(rect));
        self.canvas.fill_rect(rect);
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.log.push(Call::DrawRect(rect));
        self.canvas.draw_rect(rect);
    }

    fn draw_line(&mut self, from: IVec2, to: IVec2) {
        self.log.push(Call::DrawLine(from, to));
        self.canvas.draw_line(from, to);
    }

    fn draw_point(&mut self, point: IVec2) {
        self.log.push(Call::DrawPoint(point));
        self.canvas.draw_point(point);
    }

    fn set_viewport(&mut self, viewport: Option<Rect>) {
        self.log.push(Call::SetViewport(viewport));
        self.canvas.set_viewport(viewport);
    }

    fn viewport(&self) -> Rect {
        self.canvas.viewport()
    }

    fn copy(&mut self, texture: &Self::Texture, src: Option<Rect>, dst: Option<Rect>) {
        self.log.push(Call::Copy {
            texture: texture.id,
            src,
            dst,
        });
        self.canvas.copy(texture.id, texture.size, src, dst);
    }

    fn present(&mut self) -> Result<(), String> {
        self.log.push(Call::Present);
        let frame = self.canvas.take_frame();
        if self.fail_present {
            return Err(format!("Headless failure at '{}'", HeadlessStep::Present));
        }

        let pixels = PixelBuffer::rasterize(&frame, &self.textures);
        self.log.0.borrow_mut().last_frame = Some(pixels);
        Ok(())
    }

    fn create_texture(&mut self, data: TextureData) -> Result<Self::Texture, String> {
        if self.fail_texture {
            return Err(format!(
                "Headless failure at '{}'",
                HeadlessStep::CreateTexture
            ));
        }

        data.validate()?;

        let id = TextureId(self.next_texture_id);
        self.next_texture_id += 1;
        self.textures.insert(id, PixelBuffer::from_texture_data(&data));
        self.log.push(Call::CreateTexture(id));

        Ok(HeadlessTexture {
            id,
            size: data.size(),
        })
    }

    fn destroy_texture(&mut self, texture: Self::Texture) {
        self.textures.remove(&texture.id);
        self.log.push(Call::DestroyTexture(texture.id));
    }
}

/// RGBA8 image in CPU memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    size: UVec2,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(size: UVec2, color: Color) -> Self {
        let px = color.to_rgba_u8();
        let len = size.x as usize * size.y as usize;
        Self {
            size,
            bytes: px.repeat(len),
        }
    }

    pub fn from_texture_data(data: &TextureData) -> Self {
        Self {
            size: data.size(),
            bytes: data.bytes.to_vec(),
        }
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Pixel at `x`, `y`, `None` when out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let idx = self.index(x, y)?;
        let mut px = [0; 4];
        px.copy_from_slice(&self.bytes[idx..idx + 4]);
        Some(px)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let inside = x >= 0 && y >= 0 && (x as u32) < self.size.x && (y as u32) < self.size.y;
        inside.then(|| (y as usize * self.size.x as usize + x as usize) * 4)
    }

    fn blend(&mut self, x: i32, y: i32, src: [u8; 4]) {
        let Some(idx) = self.index(x, y) else {
            return;
        };

        let dst = &mut self.bytes[idx..idx + 4];
        match src[3] {
            255 => dst.copy_from_slice(&src),
            0 => {}
            alpha => {
                let a = alpha as f32 / 255.0;
                let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
                let out_a = (alpha as f32 + dst[3] as f32 * (1.0 - a)).round() as u8;
                dst[0] = mix(src[0], dst[0]);
                dst[1] = mix(src[1], dst[1]);
                dst[2] = mix(src[2], dst[2]);
                dst[3] = out_a;
            }
        }
    }

    /// Draws the frame the same way the GPU backend does, textures use nearest sampling
    pub fn rasterize(frame: &Frame, textures: &FxHashMap<TextureId, PixelBuffer>) -> Self {
        let mut out = Self::new(frame.size, frame.clear_color);
        let target = Rect::from_size(frame.size);

        for quad in &frame.quads {
            let Some(area) = quad
                .rect
                .intersection(&quad.clip)
                .and_then(|r| r.intersection(&target))
            else {
                continue;
            };

            let tint = quad.color.to_rgba();
            let texture = quad
                .texture
                .and_then(|t| textures.get(&t.id).map(|pixels| (t, pixels)));

            for y in area.min().y..area.max().y {
                for x in area.min().x..area.max().x {
                    let color = match texture {
                        Some((tex, pixels)) => {
                            let tx = (x - quad.rect.x()) as f32 + 0.5;
                            let ty = (y - quad.rect.y()) as f32 + 0.5;
                            let u = tex.uv_min.x
                                + tx / quad.rect.width() as f32 * (tex.uv_max.x - tex.uv_min.x);
                            let v = tex.uv_min.y
                                + ty / quad.rect.height() as f32 * (tex.uv_max.y - tex.uv_min.y);
                            let texel = pixels.sample(u, v);
                            Color::from(texel).to_rgba()
                        }
                        None => [1.0; 4],
                    };

                    let modulated = Color::new(
                        color[0] * tint[0],
                        color[1] * tint[1],
                        color[2] * tint[2],
                        color[3] * tint[3],
                    );
                    out.blend(x, y, modulated.to_rgba_u8());
                }
            }
        }

        out
    }

    fn sample(&self, u: f32, v: f32) -> [u8; 4] {
        let x = ((u * self.size.x as f32).floor() as i32).clamp(0, self.size.x as i32 - 1);
        let y = ((v * self.size.y as f32).floor() as i32).clamp(0, self.size.y as i32 - 1);
        self.get(x, y).unwrap_or([0; 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{ivec2, uvec2};

    #[test]
    fn test_exhausted_script_yields_quit() {
        let mut backend = HeadlessBackend::new(
            HeadlessConfig::new()
                .events(&[Event::Input])
                .events(&[]),
        );

        assert_eq!(backend.poll_event(), Some(Event::Input));
        assert_eq!(backend.poll_event(), None);
        assert_eq!(backend.poll_event(), None);
        assert_eq!(backend.poll_event(), Some(Event::Quit));
        assert_eq!(backend.poll_event(), Some(Event::Quit));
    }

    #[test]
    fn test_scripted_failures() {
        let mut backend = HeadlessBackend::new(HeadlessConfig::new().fail_at(HeadlessStep::CreateWindow));
        assert!(backend.init().is_ok());
        let err = backend.create_window(&WindowConfig::default()).unwrap_err();
        assert!(err.contains("CreateWindow"), "{err}");
        assert_eq!(
            backend.log().calls(),
            vec![Call::Init, Call::CreateWindow(uvec2(800, 600))]
        );
    }

    #[test]
    fn test_rasterize_primitives() {
        let mut backend = HeadlessBackend::default();
        let config = WindowConfig::default().size(10, 10);
        let win = backend.create_window(&config).unwrap();
        let mut gfx = backend.create_gfx(&win, &config).unwrap();

        gfx.set_draw_color(Color::WHITE);
        gfx.clear();
        gfx.set_draw_color(Color::RED);
        gfx.fill_rect(Rect::new(2, 2, 3, 3));
        gfx.set_draw_color(Color::BLUE);
        gfx.draw_point(ivec2(9, 9));
        gfx.present().unwrap();

        let frame = backend.log().last_frame().unwrap();
        assert_eq!(frame.get(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(frame.get(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(frame.get(4, 4), Some([255, 0, 0, 255]));
        assert_eq!(frame.get(5, 5), Some([255, 255, 255, 255]));
        assert_eq!(frame.get(9, 9), Some([0, 0, 255, 255]));
        assert_eq!(frame.get(10, 9), None);
    }

    #[test]
    fn test_rasterize_copy_into_viewport() {
        let mut backend = HeadlessBackend::default();
        let config = WindowConfig::default().size(8, 8);
        let win = backend.create_window(&config).unwrap();
        let mut gfx = backend.create_gfx(&win, &config).unwrap();

        // 2x1 texture, left red and right green
        let bytes = [255, 0, 0, 255, 0, 255, 0, 255];
        let texture = gfx
            .create_texture(TextureData {
                bytes: &bytes,
                width: 2,
                height: 1,
            })
            .unwrap();

        gfx.set_draw_color(Color::BLACK);
        gfx.clear();
        gfx.set_viewport(Some(Rect::new(4, 0, 4, 4)));
        gfx.copy(&texture, None, None);
        gfx.present().unwrap();

        let frame = backend.log().last_frame().unwrap();
        assert_eq!(frame.get(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(frame.get(4, 0), Some([255, 0, 0, 255]));
        assert_eq!(frame.get(5, 3), Some([255, 0, 0, 255]));
        assert_eq!(frame.get(6, 0), Some([0, 255, 0, 255]));
        assert_eq!(frame.get(7, 3), Some([0, 255, 0, 255]));
        assert_eq!(frame.get(7, 4), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_alpha_blending() {
        let mut backend = HeadlessBackend::default();
        let config = WindowConfig::default().size(2, 2);
        let win = backend.create_window(&config).unwrap();
        let mut gfx = backend.create_gfx(&win, &config).unwrap();

        gfx.set_draw_color(Color::WHITE);
        gfx.clear();
        gfx.set_draw_color(Color::BLACK.with_alpha(0.5));
        gfx.fill_rect(Rect::new(0, 0, 1, 1));
        gfx.present().unwrap();

        let frame = backend.log().last_frame().unwrap();
        assert_eq!(frame.get(0, 0), Some([127, 127, 127, 255]));
        assert_eq!(frame.get(1, 1), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_last_frame_calls() {
        let mut backend = HeadlessBackend::default();
        let config = WindowConfig::default().size(4, 4);
        let win = backend.create_window(&config).unwrap();
        let mut gfx = backend.create_gfx(&win, &config).unwrap();

        gfx.clear();
        gfx.present().unwrap();
        gfx.draw_point(ivec2(1, 1));
        gfx.present().unwrap();

        let log = backend.log();
        assert_eq!(log.presents(), 2);
        assert_eq!(log.last_frame_calls(), vec![Call::DrawPoint(ivec2(1, 1))]);
    }
}
