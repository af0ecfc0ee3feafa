//! Shared timing math for beams and playback triggers.
//!
//! The predictive glide and the playback trigger must agree on when a beam
//! reaches the touch line, so both take their numbers from [`BeamTiming`].

/// Default nominal beam speed in pixels per second at 100% speed.
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 200.0;

/// Convert an elapsed frame time into a pixel distance at the given rate.
#[inline]
pub fn pixels_for_elapsed(elapsed_ms: f64, pixels_per_second: f64) -> f64 {
    if elapsed_ms <= 0.0 {
        return 0.0;
    }
    elapsed_ms / 1000.0 * pixels_per_second
}

/// Timing derived for one predictive note at the moment it is scheduled.
///
/// Once computed the values never change, even if the speed slider moves
/// before the note sounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamTiming {
    /// Effective rate: nominal rate times the multiplier at creation.
    pub pixels_per_second: f64,
    /// Distance the beam travels to reach the touch line.
    pub distance_px: f64,
    /// Beam height corresponding to the note's remaining time.
    pub height_at_arrival_px: f64,
    /// Delay until the beam reaches the touch line. The glide duration and
    /// the playback trigger delay are both this value.
    pub touch_delay_ms: f64,
}

impl BeamTiming {
    /// Compute timing for a note `time_length_ms` away.
    ///
    /// * `nominal_pps` - beam speed at 100%
    /// * `multiplier` - current speed multiplier
    /// * `distance_px` - distance from the predictive start line to the touch line
    pub fn compute(nominal_pps: f64, multiplier: f64, distance_px: f64, time_length_ms: f64) -> Self {
        let pixels_per_second = nominal_pps * multiplier;
        let distance_px = distance_px.max(0.0);
        let time_length_ms = if time_length_ms.is_finite() {
            time_length_ms.max(0.0)
        } else {
            0.0
        };

        let touch_delay_ms = if pixels_per_second > 0.0 {
            distance_px / pixels_per_second * 1000.0
        } else {
            0.0
        };

        Self {
            pixels_per_second,
            distance_px,
            height_at_arrival_px: time_length_ms * pixels_per_second / 1000.0,
            touch_delay_ms,
        }
    }

    /// Glide duration for the release phase of a predictive beam.
    #[inline]
    pub fn glide_duration_ms(&self) -> f64 {
        self.touch_delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_for_elapsed() {
        assert!((pixels_for_elapsed(1000.0, 200.0) - 200.0).abs() < 1e-9);
        assert!((pixels_for_elapsed(16.0, 200.0) - 3.2).abs() < 1e-9);
        assert_eq!(pixels_for_elapsed(-5.0, 200.0), 0.0);
    }

    #[test]
    fn test_nominal_height_at_arrival() {
        let timing = BeamTiming::compute(DEFAULT_PIXELS_PER_SECOND, 1.0, 600.0, 500.0);
        // 500ms at 200px/s
        assert!((timing.height_at_arrival_px - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_touch_delay_scales_with_multiplier() {
        let nominal = BeamTiming::compute(200.0, 1.0, 600.0, 500.0);
        let double = BeamTiming::compute(200.0, 2.0, 600.0, 500.0);

        assert!((nominal.touch_delay_ms - 3000.0).abs() < 1e-9);
        assert!((double.touch_delay_ms - 1500.0).abs() < 1e-9);
        assert_eq!(nominal.glide_duration_ms(), nominal.touch_delay_ms);
    }

    #[test]
    fn test_degenerate_inputs() {
        let timing = BeamTiming::compute(200.0, 1.0, -10.0, f64::NAN);
        assert_eq!(timing.distance_px, 0.0);
        assert_eq!(timing.touch_delay_ms, 0.0);
        assert_eq!(timing.height_at_arrival_px, 0.0);

        let stopped = BeamTiming::compute(200.0, 0.0, 600.0, 500.0);
        assert_eq!(stopped.touch_delay_ms, 0.0);
    }
}
