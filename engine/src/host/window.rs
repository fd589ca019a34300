use std::sync::Arc;

use log::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::{EngineConfig, SessionMode};
use crate::controls::OrbitControls;
use crate::driver::{FrameScheduler, RenderLoop};
use crate::error::EngineError;
use crate::render::WgpuRenderer;

/// Runs the render loop in a desktop window, one tick per redraw.
///
/// Redraws are requested back to back, so the tick rate follows the
/// surface's present mode (display refresh with vsync on).
pub struct WindowHost {
    config: EngineConfig,
}

impl WindowHost {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl FrameScheduler<WgpuRenderer, OrbitControls> for WindowHost {
    type Output = ();

    fn run(self, render_loop: RenderLoop<WgpuRenderer, OrbitControls>) -> Result<(), EngineError> {
        if self.config.session != SessionMode::Inline {
            return Err(EngineError::SessionUnavailable(format!(
                "{:?} sessions need an XR runtime; only inline sessions can run in a window",
                self.config.session
            )));
        }

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App::new(self.config, render_loop);
        event_loop.run_app(&mut app)?;
        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

enum State {
    Init,
    Ready(Arc<Window>),
}

struct App {
    state: State,
    config: EngineConfig,
    render_loop: RenderLoop<WgpuRenderer, OrbitControls>,
    error: Option<EngineError>,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
}

impl App {
    fn new(config: EngineConfig, render_loop: RenderLoop<WgpuRenderer, OrbitControls>) -> Self {
        Self {
            state: State::Init,
            config,
            render_loop,
            error: None,
            dragging: false,
            cursor: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>, EngineError> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_transparent(self.config.render.transparent);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|err| EngineError::SessionUnavailable(err.to_string()))?,
        );

        let renderer = pollster::block_on(WgpuRenderer::new(window.clone(), &self.config.render))
            .map_err(|err| EngineError::SessionUnavailable(err.to_string()))?;
        self.render_loop.attach_renderer(renderer);

        let size = window.inner_size();
        self.render_loop.resize(size.width, size.height);
        Ok(window)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        error!("{err}");
        self.error = Some(err);
        self.render_loop.stop();
        event_loop.exit();
    }

    fn resized(&mut self, size: PhysicalSize<u32>) {
        self.render_loop.resize(size.width, size.height);
    }

    fn draw(&mut self) {
        self.render_loop.tick();
        if let State::Ready(window) = &self.state {
            if self.render_loop.is_running() {
                window.request_redraw();
            }
        }
    }

    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if let (true, Some(last)) = (self.dragging, self.cursor) {
            let dx = (position.x - last.x) as f32;
            let dy = (position.y - last.y) as f32;
            if let Some(controls) = self.render_loop.controls_mut() {
                controls.rotate_by_pixels(dx, dy);
            }
        }
        self.cursor = Some(position);
    }

    fn wheel(&mut self, delta: MouseScrollDelta) {
        let amount = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
        };
        if let Some(controls) = self.render_loop.controls_mut() {
            controls.zoom(amount);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let State::Init = self.state {
            match self.create_window(event_loop) {
                Ok(window) => self.state = State::Ready(window),
                Err(err) => return self.fail(event_loop, err),
            }
        }
        if let State::Ready(window) = &self.state {
            self.render_loop.start();
            window.request_redraw();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        debug!("host suspended");
        self.render_loop.stop();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) => self.resized(size),
            WindowEvent::RedrawRequested => self.draw(),
            WindowEvent::CloseRequested => {
                info!("window closed");
                self.render_loop.stop();
                event_loop.exit();
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.dragging = state == ElementState::Pressed,
            WindowEvent::CursorMoved { position, .. } => self.cursor_moved(position),
            WindowEvent::MouseWheel { delta, .. } => self.wheel(delta),
            _ => {}
        }
    }
}
