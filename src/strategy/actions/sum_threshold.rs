// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::trace;

use crate::{
    artifacts::ArtifactSet,
    constants::{DEFAULT_FIRST_THRESHOLD, DEFAULT_SHRINK_FACTOR},
    stats,
    strategy::ActionError,
    sumthreshold,
};

/// Run the SumThreshold detector on `contaminated - revised`, centred on
/// its Winsorized mean. The centring matters on the first iteration, when
/// the background is still all-zero: without it, the positive offset of raw
/// amplitudes trips every long window.
///
/// The base threshold is `first_threshold * base_sensitivity *
/// winsorized_stddev(residual) * artifact sensitivity`, so the same action
/// gets progressively more sensitive as an iteration block winds down.
#[derive(Clone, Debug)]
pub struct SumThresholdAction {
    pub base_sensitivity: f64,
    pub first_threshold: f64,
    pub shrink_factor: f64,
    pub time_direction_flagging: bool,
    pub frequency_direction_flagging: bool,
}

impl Default for SumThresholdAction {
    fn default() -> SumThresholdAction {
        SumThresholdAction {
            base_sensitivity: 1.0,
            first_threshold: DEFAULT_FIRST_THRESHOLD,
            shrink_factor: DEFAULT_SHRINK_FACTOR,
            time_direction_flagging: true,
            frequency_direction_flagging: true,
        }
    }
}

impl SumThresholdAction {
    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        let mut residual = artifacts
            .contaminated()
            .single_image()
            .subtract(&artifacts.revised().single_image());
        let mut mask = artifacts.contaminated().single_mask();

        let (mean, stddev) = stats::winsorized_mean_and_std_dev(&residual, &mask);
        if !mean.is_finite() || !stddev.is_finite() {
            return Err(ActionError::NonFinite {
                action: "SumThreshold",
            });
        }
        if mean != 0.0 {
            for y in 0..residual.height() {
                for x in 0..residual.width() {
                    residual.set_value(x, y, residual.value(x, y) - mean as f32);
                }
            }
        }
        let threshold =
            self.first_threshold * self.base_sensitivity * stddev * artifacts.sensitivity();
        trace!(
            "SumThreshold: stddev {stddev}, sensitivity {}, base threshold {threshold}",
            artifacts.sensitivity()
        );

        sumthreshold::flag_image(
            &residual,
            &mut mask,
            threshold,
            self.shrink_factor,
            self.time_direction_flagging,
            self.frequency_direction_flagging,
        );
        artifacts.contaminated_mut().set_global_mask(mask);
        Ok(())
    }
}
