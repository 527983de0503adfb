//! Curve-driven arc configuration.

use serde::{Deserialize, Serialize};

/// Keyframe of a piecewise-linear curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Normalized input in `[0, 1]`.
    pub time: f32,
    /// Output at `time`.
    pub value: f32,
}

impl CurveKey {
    /// Creates a keyframe.
    #[must_use]
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Scalar curve sampled over a normalized parameter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    /// Identity ramp from 0 to 1.
    #[default]
    Linear,
    /// Hermite ease-in/ease-out ramp from 0 to 1.
    SmoothStep,
    /// Symmetric hump `4t(1 - t)` rising from 0 to 1 and back.
    Parabolic,
    /// Piecewise-linear interpolation through keyframes sorted by time.
    Keys {
        /// Keyframes in ascending time order.
        keys: Vec<CurveKey>,
    },
}

impl Curve {
    /// Samples the curve; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::Parabolic => 4.0 * t * (1.0 - t),
            Self::Keys { keys } => evaluate_keys(keys, t),
        }
    }
}

fn evaluate_keys(keys: &[CurveKey], t: f32) -> f32 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return 0.0;
    };
    if t <= first.time {
        return first.value;
    }
    if t >= last.time {
        return last.value;
    }

    for pair in keys.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.time {
            let span = b.time - a.time;
            if span <= f32::EPSILON {
                return b.value;
            }
            return a.value + (b.value - a.value) * ((t - a.time) / span);
        }
    }
    last.value
}

/// Read-only parameters shaping every grenade arc.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcConfig {
    /// Apex height of the shortest throws.
    pub near_apex_height: f32,
    /// Apex height of throws at maximum distance.
    pub far_apex_height: f32,
    /// Maps normalized throw distance to the near/far apex blend.
    pub apex_falloff: Curve,
    /// Normalized height profile along the throw; rises from 0 to 1 and back.
    pub height_profile: Curve,
    /// Exponent applied to the falloff blend.
    pub smoothing_exponent: f32,
    /// Longest horizontal throw distance in world units.
    pub max_throw_distance: f32,
    /// Steepest-enough descent for landing on top of an obstacle, in degrees.
    pub min_obstacle_landing_angle_deg: f32,
    /// Arc segments per world unit of horizontal distance.
    pub segments_per_unit: f32,
}

impl ArcConfig {
    /// Straight-ramp configuration used when no asset is supplied.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            apex_falloff: Curve::Linear,
            smoothing_exponent: 1.0,
            ..Self::default()
        }
    }
}

impl Default for ArcConfig {
    fn default() -> Self {
        Self {
            near_apex_height: 1.0,
            far_apex_height: 3.5,
            apex_falloff: Curve::SmoothStep,
            height_profile: Curve::Parabolic,
            smoothing_exponent: 1.0,
            max_throw_distance: 12.0,
            min_obstacle_landing_angle_deg: 35.0,
            segments_per_unit: 2.0,
        }
    }
}
