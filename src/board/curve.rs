use serde::{Deserialize, Serialize};

use super::math::lerp;

/// Tunable 1-D response curve.
///
/// `keys` is a piecewise-linear shape of `(t, v)` pairs with `v` in [0, 1]; evaluation
/// clamps `t` to the keyed domain (no extrapolation) and remaps `v` into
/// `[min_value, max_value]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurve {
    pub min_value: f32,
    pub max_value: f32,
    #[serde(default = "default_keys")]
    pub keys: Vec<[f32; 2]>,
}

fn default_keys() -> Vec<[f32; 2]> {
    vec![[0.0, 0.0], [1.0, 1.0]]
}

impl ResponseCurve {
    /// Linear ramp from `min_value` at t=0 to `max_value` at t=1.
    pub fn linear(min_value: f32, max_value: f32) -> Self {
        Self {
            min_value,
            max_value,
            keys: default_keys(),
        }
    }

    pub fn constant(value: f32) -> Self {
        Self::linear(value, value)
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        lerp(self.min_value, self.max_value, self.shape(t))
    }

    /// Normalized curve value at `t`, before remapping.
    pub fn shape(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if t.is_nan() || t <= first[0] {
            return first[1];
        }
        if t >= last[0] {
            return last[1];
        }
        for pair in self.keys.windows(2) {
            let [t0, v0] = pair[0];
            let [t1, v1] = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                if span <= 0.0 {
                    return v1;
                }
                return lerp(v0, v1, (t - t0) / span);
            }
        }
        last[1]
    }

    /// Smallest and largest value the curve can produce.
    pub fn output_range(&self) -> (f32, f32) {
        self.keys
            .iter()
            .map(|k| lerp(self.min_value, self.max_value, k[1]))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }

    /// Checks key ordering and range; returns a human-readable reason on failure.
    pub fn check(&self) -> Result<(), String> {
        if self.keys.is_empty() {
            return Err("curve has no keys".to_string());
        }
        if !self.min_value.is_finite() || !self.max_value.is_finite() {
            return Err("curve bounds must be finite".to_string());
        }
        for k in &self.keys {
            if !k[0].is_finite() || !(0.0..=1.0).contains(&k[1]) {
                return Err(format!("key {:?} must have finite t and v in [0, 1]", k));
            }
        }
        for pair in self.keys.windows(2) {
            if pair[1][0] <= pair[0][0] {
                return Err(format!(
                    "key times must be strictly increasing ({} then {})",
                    pair[0][0], pair[1][0]
                ));
            }
        }
        Ok(())
    }
}
