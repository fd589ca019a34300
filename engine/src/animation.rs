//! Time-driven transform animation.
//!
//! Every transform is recomputed from its fixed parameters and the current
//! [`FrameTime`]; nothing is accumulated from the previous frame.

use std::f64::consts::TAU;

use crate::scene::{Axis, ObjectId, Transform};

/// Time at which a tick is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Milliseconds since the session clock started.
    pub elapsed_ms: f64,
    /// Number of ticks run so far in the session, counting the current one.
    pub tick: u64,
}

impl FrameTime {
    pub fn new(elapsed_ms: f64, tick: u64) -> Self {
        Self { elapsed_ms, tick }
    }
}

/// How fast a rotation advances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationRate {
    /// Fixed step in radians per tick. Speed follows the achieved frame rate.
    PerTick(f64),
    /// Radians per millisecond of elapsed time. Independent of frame rate.
    PerMillisecond(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformKind {
    /// `angle = initial + rate * progress` around `axis`.
    RotationIncrement {
        axis: Axis,
        rate: RotationRate,
        initial: f64,
    },
    /// `scale = 1 + amplitude * sin(frequency * t)` on all three axes.
    ScaleOscillation { amplitude: f64, frequency: f64 },
    /// `position[axis] = base + amplitude * sin(frequency * t)`.
    PositionOscillation {
        axis: Axis,
        base: f64,
        amplitude: f64,
        frequency: f64,
    },
}

/// The result of evaluating a [`TransformKind`] at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformUpdate {
    Rotation { axis: Axis, angle: f64 },
    UniformScale(f64),
    AxisPosition { axis: Axis, value: f64 },
}

impl TransformKind {
    pub fn evaluate(&self, time: FrameTime) -> TransformUpdate {
        let t = time.elapsed_ms;
        match *self {
            TransformKind::RotationIncrement {
                axis,
                rate,
                initial,
            } => {
                let angle = match rate {
                    RotationRate::PerTick(step) => initial + step * time.tick as f64,
                    RotationRate::PerMillisecond(rate) => initial + rate * t,
                };
                TransformUpdate::Rotation { axis, angle }
            }
            TransformKind::ScaleOscillation {
                amplitude,
                frequency,
            } => TransformUpdate::UniformScale(1.0 + amplitude * (frequency * t).sin()),
            TransformKind::PositionOscillation {
                axis,
                base,
                amplitude,
                frequency,
            } => TransformUpdate::AxisPosition {
                axis,
                value: base + amplitude * (frequency * t).sin(),
            },
        }
    }
}

impl TransformUpdate {
    /// Write the update into `transform`, leaving every other component alone.
    ///
    /// Angles are reduced to `[0, 2π)` in `f64` before narrowing, so the
    /// per-frame step survives the cast however long the session runs.
    pub fn apply(self, transform: &mut Transform) {
        match self {
            TransformUpdate::Rotation { axis, angle } => {
                axis.set(&mut transform.rotation, angle.rem_euclid(TAU) as f32)
            }
            TransformUpdate::UniformScale(scale) => transform.scale = glam::Vec3::splat(scale as f32),
            TransformUpdate::AxisPosition { axis, value } => {
                axis.set(&mut transform.position, value as f32)
            }
        }
    }
}

/// A scene object paired with the animation that drives it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedObject {
    pub target: ObjectId,
    pub kind: TransformKind,
}

impl AnimatedObject {
    pub fn new(target: ObjectId, kind: TransformKind) -> Self {
        Self { target, kind }
    }

    pub fn rotation(target: ObjectId, axis: Axis, rate: RotationRate) -> Self {
        Self::new(
            target,
            TransformKind::RotationIncrement {
                axis,
                rate,
                initial: 0.0,
            },
        )
    }

    pub fn scale_oscillation(target: ObjectId, amplitude: f64, frequency: f64) -> Self {
        Self::new(
            target,
            TransformKind::ScaleOscillation {
                amplitude,
                frequency,
            },
        )
    }

    pub fn position_oscillation(
        target: ObjectId,
        axis: Axis,
        base: f64,
        amplitude: f64,
        frequency: f64,
    ) -> Self {
        Self::new(
            target,
            TransformKind::PositionOscillation {
                axis,
                base,
                amplitude,
                frequency,
            },
        )
    }

    pub fn evaluate(&self, time: FrameTime) -> TransformUpdate {
        self.kind.evaluate(time)
    }
}
