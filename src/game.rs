use crate::config::GameConfig;
use crate::policy::{Policy, RenderPolicy};
use corelib::images::ImageLoader;
use corelib::{BackendImpl, GfxBackendImpl};
use strum_macros::Display;

type TextureOf<B> = <<B as BackendImpl>::Gfx as GfxBackendImpl>::Texture;

/// Initialization step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum InitStage {
    Video,
    Window,
    Renderer,
    Images,
}

/// Outcome of [`Game::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    pub init: bool,
    pub media: bool,
    pub failed_stage: Option<InitStage>,
    pub frames: u64,
}

/// Owns the window, the renderer and the texture for one run.
///
/// Resources are released by [`Game::close`], which runs once. Dropping
/// the game closes it if nobody did.
pub struct Game<B: BackendImpl> {
    backend: B,
    config: GameConfig,
    policy: Policy,
    window: Option<B::Window>,
    gfx: Option<B::Gfx>,
    images: Option<ImageLoader>,
    texture: Option<TextureOf<B>>,
    failed_stage: Option<InitStage>,
    frames: u64,
    closed: bool,
}

impl<B: BackendImpl> Game<B> {
    pub fn new(backend: B, config: GameConfig) -> Self {
        let policy = config.render_policy();
        Self {
            backend,
            config,
            policy,
            window: None,
            gfx: None,
            images: None,
            texture: None,
            failed_stage: None,
            frames: 0,
            closed: false,
        }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn texture(&self) -> Option<&TextureOf<B>> {
        self.texture.as_ref()
    }

    #[inline]
    pub fn failed_stage(&self) -> Option<InitStage> {
        self.failed_stage
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Acquires the video subsystem, window, renderer and image subsystem.
    /// Stops at the first failure keeping what was acquired for `close`.
    pub fn init(&mut self) -> bool {
        match self.try_init() {
            Ok(()) => {
                log::debug!("Initiated with policy '{}'", self.config.policy);
                true
            }
            Err((stage, reason)) => {
                log::error!("{stage} initialization failed: {reason}");
                self.failed_stage = Some(stage);
                false
            }
        }
    }

    fn try_init(&mut self) -> Result<(), (InitStage, String)> {
        self.backend
            .init()
            .map_err(|e| (InitStage::Video, e))?;

        let window = self
            .backend
            .create_window(&self.config.window)
            .map_err(|e| (InitStage::Window, e))?;
        let window = self.window.insert(window);

        let gfx = self
            .backend
            .create_gfx(window, &self.config.window)
            .map_err(|e| (InitStage::Renderer, e))?;
        self.gfx = Some(gfx);

        let images = ImageLoader::init(&self.config.image_formats)
            .map_err(|e| (InitStage::Images, e))?;
        self.images = Some(images);

        Ok(())
    }

    /// Loads the configured image as texture, it stays `None` on failure
    pub fn load_media(&mut self) -> bool {
        match self.try_load_media() {
            Ok(texture) => {
                self.texture = Some(texture);
                true
            }
            Err(e) => {
                log::error!(
                    "Failed to load texture '{}': {e}",
                    self.config.texture_path.display()
                );
                if matches!(self.policy, Policy::Viewports(_)) {
                    log::warn!("Without texture the viewports will stay empty");
                }
                false
            }
        }
    }

    fn try_load_media(&mut self) -> Result<TextureOf<B>, String> {
        let images = self
            .images
            .as_ref()
            .ok_or_else(|| "Image subsystem is not initiated".to_string())?;
        let gfx = self
            .gfx
            .as_mut()
            .ok_or_else(|| "Renderer is not initiated".to_string())?;

        let image = images.load(&self.config.texture_path)?;
        let texture = gfx.create_texture(image.as_texture_data())?;
        log::info!(
            "Texture '{}' loaded ({}x{})",
            self.config.texture_path.display(),
            image.width,
            image.height
        );
        Ok(texture)
    }

    /// Drains the pending events, returns true if a quit was requested
    fn drain_events(&mut self) -> bool {
        while let Some(evt) = self.backend.poll_event() {
            log::trace!("Event: {evt}");
            if evt.is_quit() {
                log::info!("Quit requested");
                return true;
            }
        }

        false
    }

    /// Draws one frame with the configured policy and presents it
    pub fn render_frame(&mut self) {
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };

        self.policy.render(gfx, self.texture.as_ref());
        if let Err(e) = gfx.present() {
            log::error!("Cannot present frame {}: {e}", self.frames);
        }

        self.frames += 1;
    }

    /// Renders one frame per iteration until a quit event is drained
    pub fn event_loop(&mut self) {
        loop {
            let quit = self.drain_events();
            self.render_frame();

            if quit {
                break;
            }
        }

        log::debug!("Event loop finished after {} frames", self.frames);
    }

    /// Releases texture, renderer and window, then shuts down the subsystems.
    /// Only the first call does something.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(texture) = self.texture.take() {
            if let Some(gfx) = self.gfx.as_mut() {
                gfx.destroy_texture(texture);
            }
        }

        if let Some(gfx) = self.gfx.take() {
            self.backend.destroy_gfx(gfx);
        }

        if let Some(window) = self.window.take() {
            self.backend.destroy_window(window);
        }

        if let Some(images) = self.images.take() {
            images.quit();
        }

        self.backend.quit();
        log::debug!("Closed");
    }

    /// Init, load the media and loop, closing at the end whatever happened
    pub fn run(mut self) -> RunReport {
        let init = self.init();
        let mut media = false;
        if init {
            media = self.load_media();
            self.event_loop();
        }

        self.close();

        RunReport {
            init,
            media,
            failed_stage: self.failed_stage,
            frames: self.frames,
        }
    }
}

impl<B: BackendImpl> Drop for Game<B> {
    fn drop(&mut self) {
        self.close();
    }
}
