//! Bounded, smoothly converging difficulty parameter

use crate::core::error::{DdaError, Result};
use crate::difficulty::factor::{DifficultyFactor, Direction};

/// Gaps at or below this size are treated as converged
pub const CONVERGENCE_EPSILON: f64 = 0.01;

/// A single tunable number held inside `[min_value, max_value]`
///
/// The decision step only ever moves `target_value`; `current_value`
/// follows it through `tick`, closing `adjustment_rate` of the remaining
/// gap per second.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedParameter {
    factor: DifficultyFactor,
    direction: Direction,
    base_value: f64,
    current_value: f64,
    min_value: f64,
    max_value: f64,
    adjustment_rate: f64,
    target_value: Option<f64>,
}

impl BoundedParameter {
    /// Build a parameter, clamping `current` into bounds
    pub fn new(
        factor: DifficultyFactor,
        base: f64,
        current: f64,
        min: f64,
        max: f64,
        adjustment_rate: f64,
    ) -> Result<Self> {
        let invalid = |reason: &str| DdaError::InvalidParameter {
            name: factor.as_str().to_string(),
            reason: reason.to_string(),
        };

        if [base, current, min, max, adjustment_rate].iter().any(|v| !v.is_finite()) {
            return Err(invalid("values must be finite"));
        }
        if base == 0.0 {
            return Err(invalid("base value must be non-zero"));
        }
        if min > max {
            return Err(invalid("min value exceeds max value"));
        }
        if adjustment_rate < 0.0 {
            return Err(invalid("adjustment rate must be non-negative"));
        }

        Ok(Self::builtin(factor, base, current, min, max, adjustment_rate))
    }

    /// Constructor for the static tables, whose values are known-good
    pub(crate) fn builtin(
        factor: DifficultyFactor,
        base: f64,
        current: f64,
        min: f64,
        max: f64,
        adjustment_rate: f64,
    ) -> Self {
        debug_assert!(base != 0.0 && min <= max);
        Self {
            factor,
            direction: factor.direction(),
            base_value: base,
            current_value: current.clamp(min, max),
            min_value: min,
            max_value: max,
            adjustment_rate,
            target_value: None,
        }
    }

    pub fn factor(&self) -> DifficultyFactor {
        self.factor
    }

    pub fn name(&self) -> &'static str {
        self.factor.as_str()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn adjustment_rate(&self) -> f64 {
        self.adjustment_rate
    }

    pub fn target_value(&self) -> Option<f64> {
        self.target_value
    }

    /// Store the aim point as given; clamping happens in `tick`
    pub fn set_target(&mut self, target: f64) {
        self.target_value = Some(target);
    }

    pub fn clear_target(&mut self) {
        self.target_value = None;
    }

    /// Replace the bounds, pulling the current value back inside
    ///
    /// A target set earlier outside the old bounds becomes reachable
    /// without being re-issued.
    pub fn set_bounds(&mut self, min: f64, max: f64) -> Result<()> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(DdaError::InvalidParameter {
                name: self.name().to_string(),
                reason: format!("invalid bounds [{}, {}]", min, max),
            });
        }
        self.min_value = min;
        self.max_value = max;
        self.current_value = self.current_value.clamp(min, max);
        Ok(())
    }

    /// Advance one smoothing step of `dt` seconds
    pub fn tick(&mut self, dt: f64) {
        let Some(target) = self.target_value else {
            return;
        };

        let delta = target - self.current_value;
        if delta.abs() <= CONVERGENCE_EPSILON {
            return;
        }

        // A long frame may close the gap but never overshoot it
        let step = (self.adjustment_rate * dt).min(1.0);
        let next = self.current_value + delta * step;
        self.current_value = next.clamp(self.min_value, self.max_value);
    }

    /// Value gameplay multiplies its own stats by
    pub fn multiplier(&self) -> f64 {
        self.current_value / self.base_value
    }

    /// Return to the base value (held inside bounds) and drop any target
    pub fn reset(&mut self) {
        self.current_value = self.base_value.clamp(self.min_value, self.max_value);
        self.clear_target();
    }
}
