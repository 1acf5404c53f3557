// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Numerical defaults shared across the flagging pipeline.

These are the values the default strategies are tuned against; individual
actions expose setters for the ones that are worth overriding per telescope.
 */

use lazy_static::lazy_static;

/// Number of f32 lanes image rows are padded to. Rows are padded so that a
/// row start is always vector aligned; no algorithm depends on the value.
pub const VECTOR_LANES: usize = 8;

/// The window lengths tried by the SumThreshold detector, shortest first.
/// Each length sees the flags produced by the shorter ones.
pub const SUM_THRESHOLD_LENGTHS: [usize; 9] = [1, 2, 4, 8, 16, 32, 64, 128, 256];

/// Per-length threshold shrink factor: the threshold for a window of length
/// L is `firstThreshold * SHRINK^(-log2 L)`.
pub const DEFAULT_SHRINK_FACTOR: f64 = 1.5;

/// First threshold of the SumThreshold sequence, in units of the Winsorized
/// standard deviation of the residual. Tuned for a Rayleigh-distributed
/// amplitude background.
pub const DEFAULT_FIRST_THRESHOLD: f64 = 6.0;

/// Fraction trimmed from each tail when Winsorizing a sample.
pub const WINSORIZE_FRACTION: f64 = 0.1;

/// SIR operator aggressiveness used by the statistical flagger, time
/// direction. An interval whose good fraction drops to this value or below
/// is wholly flagged.
pub const DEFAULT_MIN_GOOD_TIME_RATIO: f64 = 0.2;
/// As above, frequency direction.
pub const DEFAULT_MIN_GOOD_FREQUENCY_RATIO: f64 = 0.2;

/// How far above the population of line means a whole time step or channel
/// must sit before the selection actions reject it, in Winsorized standard
/// deviations.
pub const SELECTION_SIGMA: f64 = 3.0;

/// Number of channel blocks used by the passband calibration action.
pub const DEFAULT_PASSBAND_STEPS: usize = 48;

lazy_static! {
    /// `SHRINK^(-log2 L)` for every entry of [`SUM_THRESHOLD_LENGTHS`],
    /// precomputed for the default shrink factor.
    pub static ref DEFAULT_THRESHOLD_FACTORS: [f64; 9] = {
        let mut factors = [0.0; 9];
        for (f, length) in factors.iter_mut().zip(SUM_THRESHOLD_LENGTHS) {
            *f = DEFAULT_SHRINK_FACTOR.powf(-(length as f64).log2());
        }
        factors
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    #[test]
    fn threshold_factors_follow_the_lengths() {
        assert_abs_diff_eq!(DEFAULT_THRESHOLD_FACTORS[0], 1.0);
        assert_abs_diff_eq!(DEFAULT_THRESHOLD_FACTORS[1], 1.0 / 1.5);
        assert_abs_diff_eq!(DEFAULT_THRESHOLD_FACTORS[2], 1.0 / (1.5 * 1.5));
        // Longer windows need dimmer means.
        for w in DEFAULT_THRESHOLD_FACTORS.windows(2) {
            assert!(w[1] < w[0]);
        }
    }
}
