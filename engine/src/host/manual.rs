use crate::clock::ManualClock;
use crate::controls::CameraControl;
use crate::driver::{FrameScheduler, Renderer, RenderLoop, TickOutcome};
use crate::error::EngineError;

/// Drives a render loop synchronously from a list of frame times.
///
/// Each entry moves the shared [`ManualClock`] to that time (in
/// milliseconds) and runs one tick, with no window or GPU involved.
pub struct ManualHost {
    clock: ManualClock,
    frame_times: Vec<f64>,
    stop_after: Option<usize>,
}

/// Result of a [`ManualHost`] run: the loop, handed back for inspection,
/// and what every scheduled frame did.
pub struct ManualRun<R: Renderer, C: CameraControl> {
    pub render_loop: RenderLoop<R, C>,
    pub outcomes: Vec<TickOutcome>,
}

impl ManualHost {
    pub fn new(clock: ManualClock, frame_times: impl IntoIterator<Item = f64>) -> Self {
        Self {
            clock,
            frame_times: frame_times.into_iter().collect(),
            stop_after: None,
        }
    }

    /// Frames spaced `interval_ms` apart, starting at `interval_ms`.
    pub fn at_interval(clock: ManualClock, interval_ms: f64, frames: usize) -> Self {
        Self::new(clock, (1..=frames).map(|i| i as f64 * interval_ms))
    }

    /// Signal session end after `ticks` frames, as a closing window would.
    /// Remaining frame times are still delivered to the stopped loop.
    pub fn stop_after(mut self, ticks: usize) -> Self {
        self.stop_after = Some(ticks);
        self
    }
}

impl<R: Renderer, C: CameraControl> FrameScheduler<R, C> for ManualHost {
    type Output = ManualRun<R, C>;

    fn run(self, mut render_loop: RenderLoop<R, C>) -> Result<Self::Output, EngineError> {
        render_loop.start();
        let mut outcomes = Vec::with_capacity(self.frame_times.len());
        for (index, time) in self.frame_times.into_iter().enumerate() {
            if self.stop_after == Some(index) {
                render_loop.stop();
            }
            self.clock.set(time);
            outcomes.push(render_loop.tick());
        }
        Ok(ManualRun {
            render_loop,
            outcomes,
        })
    }
}
