use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    app::WindowConfig,
    backend::{traits::BackendImpl, wgpu::GfxBackend},
    events::Event,
    math::uvec2,
};

/// Window handle shared with the wgpu surface
pub type WinitWindow = Arc<Window>;

// the window is created from inside a callback so a few pumps may be needed
const MAX_PUMPS_FOR_WINDOW: usize = 64;

/// Native backend: winit for the window and events, wgpu for rendering
#[derive(Default)]
pub struct WinitBackend {
    event_loop: Option<EventLoop<()>>,
    pump: Pump,
}

impl WinitBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn pump_once(&mut self) -> Result<(), String> {
        let event_loop = self
            .event_loop
            .as_mut()
            .ok_or_else(|| "Video subsystem is not initiated".to_string())?;

        let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.pump);
        if let PumpStatus::Exit(code) = status {
            log::debug!("Event loop exited with code {code}");
            self.pump.exit();
        }

        Ok(())
    }
}

impl BackendImpl for WinitBackend {
    type Window = WinitWindow;
    type Gfx = GfxBackend;

    fn init(&mut self) -> Result<(), String> {
        let event_loop = EventLoop::new().map_err(|e| e.to_string())?;
        event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop = Some(event_loop);
        log::debug!("Video subsystem initiated");
        Ok(())
    }

    fn create_window(&mut self, config: &WindowConfig) -> Result<Self::Window, String> {
        self.pump.request = Some(WindowRequest {
            attrs: window_attrs(config),
            centered: config.centered,
        });

        for _ in 0..MAX_PUMPS_FOR_WINDOW {
            self.pump_once()?;

            if let Some(err) = self.pump.error.take() {
                return Err(err);
            }

            if let Some(win) = self.pump.window.clone() {
                let size = win.inner_size();
                log::info!(
                    "Window '{}' created with size {}x{}",
                    config.title,
                    size.width,
                    size.height
                );
                return Ok(win);
            }

            if self.pump.exited {
                break;
            }
        }

        self.pump.request = None;
        Err("The event loop did not allow to create the window".to_string())
    }

    fn create_gfx(
        &mut self,
        window: &Self::Window,
        config: &WindowConfig,
    ) -> Result<Self::Gfx, String> {
        // draw in window units, the surface takes the physical pixels
        let physical = window.inner_size();
        pollster::block_on(GfxBackend::init(
            window.clone(),
            config.vsync,
            config.size,
            uvec2(physical.width, physical.height),
            window.scale_factor() as f32,
        ))
    }

    fn poll_event(&mut self) -> Option<Event> {
        if self.pump.events.is_empty() {
            if let Err(e) = self.pump_once() {
                log::error!("Cannot poll events: {e}");
                return Some(Event::Quit);
            }
        }

        self.pump.events.pop_front()
    }

    fn destroy_gfx(&mut self, gfx: Self::Gfx) {
        drop(gfx);
        log::debug!("Renderer destroyed");
    }

    fn destroy_window(&mut self, window: Self::Window) {
        self.pump.window = None;
        drop(window);
        log::debug!("Window destroyed");
    }

    fn quit(&mut self) {
        self.pump.events.clear();
        if self.event_loop.take().is_some() {
            log::debug!("Video subsystem closed");
        }
    }
}

struct WindowRequest {
    attrs: WindowAttributes,
    centered: bool,
}

/// Receives the winit callbacks while the event loop is pumped
#[derive(Default)]
struct Pump {
    request: Option<WindowRequest>,
    window: Option<WinitWindow>,
    error: Option<String>,
    resumed: bool,
    exited: bool,
    events: VecDeque<Event>,
}

impl Pump {
    fn exit(&mut self) {
        if !self.exited {
            self.exited = true;
            self.events.push_back(Event::Quit);
        }
    }

    fn create_requested_window(&mut self, event_loop: &ActiveEventLoop) {
        let Some(WindowRequest { attrs, centered }) = self.request.take() else {
            return;
        };

        match event_loop.create_window(attrs) {
            Ok(win) => {
                if centered {
                    center_window(&win, event_loop);
                }
                win.set_visible(true);
                self.window = Some(Arc::new(win));
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}

impl ApplicationHandler for Pump {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.resumed = true;
        self.create_requested_window(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.resumed {
            self.create_requested_window(event_loop);
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let evt = match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => Event::Quit,
            WindowEvent::Resized(size) => Event::Resized(uvec2(size.width, size.height)),
            WindowEvent::Focused(focused) => Event::Focused(focused),
            WindowEvent::KeyboardInput { .. }
            | WindowEvent::ModifiersChanged(_)
            | WindowEvent::Ime(_)
            | WindowEvent::CursorMoved { .. }
            | WindowEvent::CursorEntered { .. }
            | WindowEvent::CursorLeft { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::Touch(_) => Event::Input,
            // the loop renders every iteration
            WindowEvent::RedrawRequested => return,
            _ => Event::Other,
        };

        self.events.push_back(evt);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.exit();
    }
}

fn window_attrs(config: &WindowConfig) -> WindowAttributes {
    let WindowConfig {
        title,
        size,
        resizable,
        centered: _,
        vsync: _,
    } = config;

    // hidden until it is placed
    WindowAttributes::default()
        .with_title(title.clone())
        .with_inner_size(LogicalSize::new(size.x, size.y))
        .with_resizable(*resizable)
        .with_visible(false)
}

fn center_window(win: &Window, event_loop: &ActiveEventLoop) {
    let Some(monitor) = win
        .current_monitor()
        .or_else(|| event_loop.primary_monitor())
    else {
        log::warn!("No monitor found to center the window");
        return;
    };

    let m_pos = monitor.position();
    let m_size = monitor.size();
    let w_size = win.outer_size();
    let x = m_pos.x + (m_size.width as i32 - w_size.width as i32) / 2;
    let y = m_pos.y + (m_size.height as i32 - w_size.height as i32) / 2;
    win.set_outer_position(PhysicalPosition::new(x, y));
}
