use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use prism_engine::prelude::*;

/// Records the scale of the first object at every draw.
#[derive(Clone, Default)]
struct RecordingRenderer {
    frames: Rc<RefCell<Vec<Vec3>>>,
}

impl RecordingRenderer {
    fn draws(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, scene: &Scene, _camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let scale = scene.objects().first().map(|o| o.transform.scale).unwrap_or(Vec3::ZERO);
        self.frames.borrow_mut().push(scale);
        Ok(())
    }
}

fn octahedron(scene: &mut Scene) -> ObjectId {
    scene.add(
        "octahedron",
        Primitive::Octahedron { radius: 0.6 },
        Material::default(),
        Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
    )
}

fn pulsing_loop(clock: &ManualClock, renderer: RecordingRenderer) -> RenderLoop<RecordingRenderer> {
    let mut scene = Scene::new();
    let id = octahedron(&mut scene);
    RenderLoop::new(scene, PerspectiveCamera::default(), clock.clone())
        .with_animations([AnimatedObject::scale_oscillation(id, 0.2, 0.002)])
        .with_renderer(renderer)
}

#[test]
fn stop_mid_session_prevents_further_draws() {
    let clock = ManualClock::new();
    let renderer = RecordingRenderer::default();
    let render_loop = pulsing_loop(&clock, renderer.clone());

    let run = ManualHost::at_interval(clock, 16.0, 10)
        .stop_after(4)
        .run(render_loop)
        .unwrap();

    assert_eq!(renderer.draws(), 4);
    assert!(run.outcomes[..4].iter().all(TickOutcome::drawn));
    assert!(run.outcomes[4..].iter().all(|o| *o == TickOutcome::Stopped));
    assert_eq!(run.render_loop.state(), SessionState::Off);
}

#[test]
fn stopped_loop_resumes_without_resetting_time() {
    let clock = ManualClock::new();
    let renderer = RecordingRenderer::default();
    let mut render_loop = pulsing_loop(&clock, renderer.clone());

    render_loop.start();
    clock.set(100.0);
    render_loop.tick();
    render_loop.stop();
    clock.set(500.0);
    assert_eq!(render_loop.tick(), TickOutcome::Stopped);

    render_loop.start();
    match render_loop.tick() {
        TickOutcome::Ran(report) => {
            assert_eq!(report.time.elapsed_ms, 500.0);
            assert_eq!(report.time.tick, 2);
        }
        TickOutcome::Stopped => panic!("loop should be running"),
    }
    assert_eq!(renderer.draws(), 2);
}

#[test]
fn missing_object_is_skipped_and_others_still_animate() {
    let clock = ManualClock::new();
    let mut scene = Scene::new();
    let kept = octahedron(&mut scene);
    let removed = octahedron(&mut scene);
    scene.remove(removed);

    let renderer = RecordingRenderer::default();
    let mut render_loop: RenderLoop<RecordingRenderer> =
        RenderLoop::new(scene, PerspectiveCamera::default(), clock.clone())
            .with_animations([
                AnimatedObject::scale_oscillation(removed, 0.2, 0.002),
                AnimatedObject::scale_oscillation(kept, 0.2, 0.002),
            ])
            .with_renderer(renderer.clone());

    render_loop.start();
    clock.set(std::f64::consts::PI / (2.0 * 0.002));
    match render_loop.tick() {
        TickOutcome::Ran(report) => {
            assert_eq!(report.updated, 1);
            assert_eq!(report.skipped, 1);
            assert!(report.drawn);
        }
        TickOutcome::Stopped => panic!("loop should be running"),
    }
    let scale = render_loop.scene().get(kept).map(|o| o.transform.scale);
    assert!((scale.unwrap() - Vec3::splat(1.2)).length() < 1e-5);
}

#[test]
fn missing_renderer_skips_draw_but_keeps_animating() {
    let clock = ManualClock::new();
    let mut scene = Scene::new();
    let id = octahedron(&mut scene);
    let render_loop: RenderLoop<RecordingRenderer> =
        RenderLoop::new(scene, PerspectiveCamera::default(), clock.clone())
            .with_animations([AnimatedObject::position_oscillation(id, Axis::Y, 1.5, 0.05, 0.002)]);

    let run = ManualHost::at_interval(clock, 16.0, 3).run(render_loop).unwrap();
    assert!(run.outcomes.iter().all(|o| matches!(o, TickOutcome::Ran(r) if !r.drawn && r.updated == 1)));
    assert_eq!(run.render_loop.frames_drawn(), 0);

    let y = run.render_loop.scene().get(id).map(|o| o.transform.position.y).unwrap();
    let expected = 1.5 + 0.05 * (0.002_f64 * 48.0).sin();
    assert!((y as f64 - expected).abs() < 1e-6);
}

#[test]
fn renderer_attached_later_starts_drawing() {
    let clock = ManualClock::new();
    let mut scene = Scene::new();
    octahedron(&mut scene);
    let mut render_loop: RenderLoop<RecordingRenderer> =
        RenderLoop::new(scene, PerspectiveCamera::default(), clock.clone());
    render_loop.start();
    assert!(!render_loop.tick().drawn());

    let renderer = RecordingRenderer::default();
    assert!(render_loop.attach_renderer(renderer.clone()).is_none());
    assert!(render_loop.tick().drawn());
    assert_eq!(renderer.draws(), 1);
}

#[test]
fn time_based_animation_is_frame_rate_independent() {
    let run_at = |interval: f64, frames: usize| {
        let clock = ManualClock::new();
        let mut scene = Scene::new();
        let id = octahedron(&mut scene);
        let render_loop: RenderLoop<RecordingRenderer> =
            RenderLoop::new(scene, PerspectiveCamera::default(), clock.clone()).with_animations([
                AnimatedObject::rotation(id, Axis::Y, RotationRate::PerMillisecond(0.001)),
                AnimatedObject::scale_oscillation(id, 0.2, 0.002),
            ]);
        let run = ManualHost::at_interval(clock, interval, frames)
            .run(render_loop)
            .unwrap();
        run.render_loop.scene().get(id).map(|o| o.transform).unwrap()
    };

    // Both end at t = 960ms.
    let smooth = run_at(8.0, 120);
    let choppy = run_at(48.0, 20);
    assert!((smooth.rotation.y - choppy.rotation.y).abs() < 1e-6);
    assert!((smooth.scale - choppy.scale).length() < 1e-6);
    assert!((smooth.rotation.y - 0.96).abs() < 1e-5);
}

#[test]
fn per_tick_rotation_follows_frame_count() {
    let run_at = |interval: f64, frames: usize| {
        let clock = ManualClock::new();
        let mut scene = Scene::new();
        let id = octahedron(&mut scene);
        let render_loop: RenderLoop<RecordingRenderer> =
            RenderLoop::new(scene, PerspectiveCamera::default(), clock.clone())
                .with_animations([AnimatedObject::rotation(id, Axis::Y, RotationRate::PerTick(0.01))]);
        let run = ManualHost::at_interval(clock, interval, frames)
            .run(render_loop)
            .unwrap();
        run.render_loop.scene().get(id).map(|o| o.transform.rotation.y).unwrap()
    };

    assert!((run_at(8.0, 120) - 1.2).abs() < 1e-5);
    assert!((run_at(48.0, 20) - 0.2).abs() < 1e-5);
}

#[test]
fn repeated_ticks_at_the_same_time_are_idempotent() {
    let clock = ManualClock::new();
    let renderer = RecordingRenderer::default();
    let render_loop = pulsing_loop(&clock, renderer.clone());

    let run = ManualHost::new(clock, [300.0, 300.0, 300.0]).run(render_loop).unwrap();
    assert_eq!(run.outcomes.len(), 3);
    let frames = renderer.frames.borrow();
    assert_eq!(frames.len(), 3);
    assert!(frames.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn scale_stays_within_amplitude_over_a_session() {
    let clock = ManualClock::new();
    let renderer = RecordingRenderer::default();
    let render_loop = pulsing_loop(&clock, renderer.clone());

    ManualHost::at_interval(clock, 16.7, 600).run(render_loop).unwrap();
    for scale in renderer.frames.borrow().iter() {
        assert!(scale.x >= 0.8 - 1e-6 && scale.x <= 1.2 + 1e-6);
        assert_eq!(scale.x, scale.y);
        assert_eq!(scale.y, scale.z);
    }
}
