//! # Prism engine
//!
//! A small render loop for animated scenes. A [`RenderLoop`] holds the
//! scene, camera, camera controls, the animated objects and a renderer;
//! a host calls [`RenderLoop::tick`] once per display frame and each tick
//! recomputes every animated transform from the session clock before
//! drawing.
//!
//! ```ignore
//! use prism_engine::prelude::*;
//!
//! let clock = ManualClock::new();
//! let mut scene = Scene::new();
//! let id = scene.add("cube", Primitive::Octahedron { radius: 1.0 }, Material::default(), Transform::default());
//! let render_loop: RenderLoop<MyRenderer> = RenderLoop::new(scene, PerspectiveCamera::default(), clock.clone())
//!     .with_animations([AnimatedObject::scale_oscillation(id, 0.2, 0.002)]);
//! let run = ManualHost::at_interval(clock, 16.0, 60).run(render_loop)?;
//! ```

pub mod animation;
pub mod camera;
pub mod clock;
pub mod config;
pub mod controls;
pub mod driver;
pub mod error;
pub mod host;
pub mod logging;
pub mod render;
pub mod scene;

pub use driver::{FrameScheduler, RenderLoop, Renderer, SessionState, TickOutcome, TickReport};
pub use error::{ConfigError, EngineError, RenderError};

pub mod prelude {
    //! Commonly used types.

    pub use crate::animation::{AnimatedObject, FrameTime, RotationRate, TransformKind, TransformUpdate};
    pub use crate::camera::PerspectiveCamera;
    pub use crate::clock::{ManualClock, SystemClock, TimeSource};
    pub use crate::config::{EngineConfig, SessionMode};
    pub use crate::controls::{CameraControl, OrbitControls};
    pub use crate::driver::{FrameScheduler, RenderLoop, Renderer, SessionState, TickOutcome, TickReport};
    pub use crate::error::{EngineError, RenderError};
    pub use crate::host::{ManualHost, ManualRun, WindowHost};
    pub use crate::scene::{Axis, Light, Material, ObjectId, Primitive, Scene, SceneObject, Transform};
}
