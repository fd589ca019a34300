//! The render loop driver.
//!
//! [`RenderLoop`] owns everything a frame needs: the scene, the camera and
//! its controls, the animated objects, the clock and the renderer. A host
//! ([`FrameScheduler`]) calls [`RenderLoop::tick`] once per display frame.

use log::{debug, info, warn};

use crate::animation::{AnimatedObject, FrameTime};
use crate::camera::PerspectiveCamera;
use crate::clock::TimeSource;
use crate::controls::{CameraControl, OrbitControls};
use crate::error::{EngineError, RenderError};
use crate::scene::Scene;

/// Draws a scene from a camera's point of view.
pub trait Renderer {
    fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError>;

    /// Called when the host's drawable area changes size.
    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Drives a [`RenderLoop`] at the host's frame cadence.
pub trait FrameScheduler<R: Renderer, C: CameraControl> {
    type Output;

    fn run(self, render_loop: RenderLoop<R, C>) -> Result<Self::Output, EngineError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Off,
    Running,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub time: FrameTime,
    /// Animated objects whose transform was written.
    pub updated: usize,
    /// Animated objects skipped because their scene object is gone.
    pub skipped: usize,
    pub drawn: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The session is not running; nothing was touched.
    Stopped,
    Ran(TickReport),
}

impl TickOutcome {
    pub fn drawn(&self) -> bool {
        matches!(self, TickOutcome::Ran(report) if report.drawn)
    }
}

pub struct RenderLoop<R: Renderer, C: CameraControl = OrbitControls> {
    scene: Scene,
    camera: PerspectiveCamera,
    controls: Option<C>,
    animated: Vec<AnimatedObject>,
    clock: Box<dyn TimeSource>,
    renderer: Option<R>,
    state: SessionState,
    ticks: u64,
    frames_drawn: u64,
}

impl<R: Renderer, C: CameraControl> RenderLoop<R, C> {
    pub fn new(scene: Scene, camera: PerspectiveCamera, clock: impl TimeSource + 'static) -> Self {
        Self {
            scene,
            camera,
            controls: None,
            animated: Vec::new(),
            clock: Box::new(clock),
            renderer: None,
            state: SessionState::Off,
            ticks: 0,
            frames_drawn: 0,
        }
    }

    pub fn with_controls(mut self, controls: C) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn with_animations(mut self, animated: impl IntoIterator<Item = AnimatedObject>) -> Self {
        self.animated.extend(animated);
        self
    }

    pub fn with_renderer(mut self, renderer: R) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn add_animation(&mut self, animated: AnimatedObject) {
        self.animated.push(animated);
    }

    /// Install a renderer, returning the previous one.
    pub fn attach_renderer(&mut self, renderer: R) -> Option<R> {
        self.renderer.replace(renderer)
    }

    pub fn detach_renderer(&mut self) -> Option<R> {
        self.renderer.take()
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    pub fn controls_mut(&mut self) -> Option<&mut C> {
        self.controls.as_mut()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn animations(&self) -> &[AnimatedObject] {
        &self.animated
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Ticks run since the loop was created.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Begin (or resume) the session.
    ///
    /// The clock is restarted only before the first tick; it keeps running
    /// across later stop/start cycles.
    pub fn start(&mut self) {
        if self.state == SessionState::Running {
            return;
        }
        if self.ticks == 0 {
            self.clock.restart();
        }
        self.state = SessionState::Running;
        info!(
            "render loop started ({} animated objects, tick {})",
            self.animated.len(),
            self.ticks
        );
    }

    /// End the session. Idempotent; every later tick is a no-op until [`start`](Self::start).
    pub fn stop(&mut self) {
        if self.state == SessionState::Off {
            return;
        }
        self.state = SessionState::Off;
        info!(
            "render loop stopped after {} ticks ({} frames drawn)",
            self.ticks, self.frames_drawn
        );
    }

    /// Propagate a new drawable size to the camera and the renderer.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("ignoring resize to {width}x{height}");
            return;
        }
        self.camera.resize(width, height);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(width, height);
        }
    }

    /// Run one frame: animate, update the camera, draw.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != SessionState::Running {
            return TickOutcome::Stopped;
        }

        self.ticks += 1;
        let time = FrameTime::new(self.clock.elapsed_ms(), self.ticks);

        let mut updated = 0;
        let mut skipped = 0;
        for animated in &self.animated {
            match self.scene.get_mut(animated.target) {
                Some(object) => {
                    animated.evaluate(time).apply(&mut object.transform);
                    updated += 1;
                }
                None => {
                    debug!(
                        "tick {}: object {} is not in the scene, skipping",
                        time.tick, animated.target
                    );
                    skipped += 1;
                }
            }
        }

        if let Some(controls) = self.controls.as_mut() {
            controls.update(&mut self.camera);
        }

        let drawn = match self.renderer.as_mut() {
            Some(renderer) => match renderer.draw(&self.scene, &self.camera) {
                Ok(()) => true,
                Err(err) => {
                    warn!("tick {}: frame dropped: {err}", time.tick);
                    false
                }
            },
            None => {
                debug!("tick {}: no renderer attached, skipping draw", time.tick);
                false
            }
        };
        if drawn {
            self.frames_drawn += 1;
        }

        TickOutcome::Ran(TickReport {
            time,
            updated,
            skipped,
            drawn,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::animation::RotationRate;
    use crate::clock::ManualClock;
    use crate::scene::{Axis, Material, Primitive, Transform};

    #[derive(Default)]
    struct CountingRenderer {
        draws: usize,
        fail: bool,
    }

    impl Renderer for CountingRenderer {
        fn draw(&mut self, _scene: &Scene, _camera: &PerspectiveCamera) -> Result<(), RenderError> {
            self.draws += 1;
            if self.fail {
                return Err(RenderError::AdapterRequest);
            }
            Ok(())
        }
    }

    fn one_object_loop(clock: &ManualClock) -> RenderLoop<CountingRenderer> {
        let mut scene = Scene::new();
        let id = scene.add(
            "ico",
            Primitive::Icosahedron {
                radius: 0.6,
                detail: 0,
            },
            Material::default(),
            Transform::default(),
        );
        RenderLoop::new(scene, PerspectiveCamera::default(), clock.clone())
            .with_animations([AnimatedObject::rotation(id, Axis::Y, RotationRate::PerTick(0.01))])
            .with_renderer(CountingRenderer::default())
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let clock = ManualClock::new();
        let mut render_loop = one_object_loop(&clock);
        assert_eq!(render_loop.tick(), TickOutcome::Stopped);
        assert_eq!(render_loop.ticks(), 0);
        assert_eq!(render_loop.renderer().map(|r| r.draws), Some(0));
    }

    #[test]
    fn test_one_draw_per_tick() {
        let clock = ManualClock::new();
        let mut render_loop = one_object_loop(&clock);
        render_loop.start();
        for _ in 0..5 {
            clock.advance(16.0);
            assert!(render_loop.tick().drawn());
        }
        assert_eq!(render_loop.renderer().map(|r| r.draws), Some(5));
        assert_eq!(render_loop.frames_drawn(), 5);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let clock = ManualClock::new();
        let mut render_loop = one_object_loop(&clock);
        render_loop.start();
        render_loop.stop();
        render_loop.stop();
        assert_eq!(render_loop.state(), SessionState::Off);
        assert_eq!(render_loop.tick(), TickOutcome::Stopped);
    }

    #[test]
    fn test_draw_error_does_not_stop_the_loop() {
        let clock = ManualClock::new();
        let mut render_loop = one_object_loop(&clock);
        if let Some(renderer) = render_loop.renderer_mut() {
            renderer.fail = true;
        }
        render_loop.start();
        let outcome = render_loop.tick();
        assert!(!outcome.drawn());
        assert!(render_loop.is_running());
        if let Some(renderer) = render_loop.renderer_mut() {
            renderer.fail = false;
        }
        assert!(render_loop.tick().drawn());
    }

    #[derive(Default)]
    struct RestartCounter {
        restarts: Rc<Cell<u32>>,
    }

    impl TimeSource for RestartCounter {
        fn elapsed_ms(&self) -> f64 {
            0.0
        }

        fn restart(&mut self) {
            self.restarts.set(self.restarts.get() + 1);
        }
    }

    #[test]
    fn test_clock_restarts_only_on_first_start() {
        let clock = RestartCounter::default();
        let restarts = clock.restarts.clone();
        let mut render_loop: RenderLoop<CountingRenderer> =
            RenderLoop::new(Scene::new(), PerspectiveCamera::default(), clock);
        assert_eq!(restarts.get(), 0);

        render_loop.start();
        render_loop.tick();
        render_loop.stop();
        render_loop.start();
        assert_eq!(restarts.get(), 1);
    }

    #[test]
    fn test_resize_ignores_empty_viewport() {
        let clock = ManualClock::new();
        let mut render_loop = one_object_loop(&clock);
        render_loop.resize(1600, 900);
        render_loop.resize(0, 900);
        assert!((render_loop.camera().aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
