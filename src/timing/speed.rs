//! Playback speed control.
//!
//! Converts the speed slider position into a percentage and a rate
//! multiplier. The mapping is non-linear: the bottom of the slider still
//! yields 10%, the top reaches 300%, and the default position 31 lands on
//! exactly 100%.

use log::{debug, warn};

/// Slider position that maps to 100% speed.
pub const DEFAULT_SPEED_VALUE: f64 = 31.0;

/// Lowest percentage ever published. Anything below is clamped so that
/// rate calculations never divide by zero or run backwards.
pub const MIN_SPEED_PERCENT: i64 = 1;

/// Map a slider position to a speed percentage.
///
/// `pct = round(3v + 10(1 - v/100))`. Inputs outside 0..=100 are not
/// rejected; they produce whatever the formula gives.
pub fn speed_percent(value: f64) -> i64 {
    (value * 3.0 + 10.0 * (1.0 - value / 100.0)).round() as i64
}

/// The shared rate multiplier.
///
/// Every write bumps `version` so readers can tell a fresh value from the
/// one they sampled on a previous frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedMultiplier {
    value: f64,
    version: u64,
}

impl SpeedMultiplier {
    /// Nominal speed (1.0) at version 0.
    pub const NOMINAL: Self = Self {
        value: 1.0,
        version: 0,
    };

    /// Multiplier as a fraction of the nominal rate.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of writes that produced this value.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for SpeedMultiplier {
    fn default() -> Self {
        Self::NOMINAL
    }
}

/// Owns the speed slider value and the multiplier derived from it.
///
/// This is the only writer of [`SpeedMultiplier`]. Animation tasks receive
/// a copy through their frame context and never hold on to it longer than
/// one frame, except for predictive glides which freeze it at creation.
#[derive(Clone, Debug)]
pub struct SpeedController {
    value: f64,
    percent: i64,
    multiplier: SpeedMultiplier,
}

impl SpeedController {
    /// Create a controller positioned at `value`.
    pub fn new(value: f64) -> Self {
        let mut controller = Self {
            value: DEFAULT_SPEED_VALUE,
            percent: 100,
            multiplier: SpeedMultiplier::NOMINAL,
        };
        controller.set_value(value);
        controller
    }

    /// Move the slider. Returns true when a new multiplier was published.
    pub fn set_value(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            warn!("Ignoring non-finite speed value {}", value);
            return false;
        }

        self.value = value;
        let mut percent = speed_percent(value);
        if percent < MIN_SPEED_PERCENT {
            debug!(
                "Speed value {} maps to {}%, clamping to {}%",
                value, percent, MIN_SPEED_PERCENT
            );
            percent = MIN_SPEED_PERCENT;
        }

        if percent == self.percent && self.multiplier.version > 0 {
            return false;
        }

        self.percent = percent;
        self.multiplier = SpeedMultiplier {
            value: percent as f64 / 100.0,
            version: self.multiplier.version + 1,
        };
        debug!("Speed set to {}% (v{})", percent, self.multiplier.version);
        true
    }

    /// Current slider position.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Current percentage.
    pub fn percent(&self) -> i64 {
        self.percent
    }

    /// Sample the current multiplier.
    #[inline]
    pub fn multiplier(&self) -> SpeedMultiplier {
        self.multiplier
    }
}

impl Default for SpeedController {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_VALUE)
    }
}
