// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    artifacts::ArtifactSet,
    constants::{DEFAULT_MIN_GOOD_FREQUENCY_RATIO, DEFAULT_MIN_GOOD_TIME_RATIO},
    morphology, sir,
    strategy::ActionError,
};

/// Finalize a mask morphologically: an optional box dilation, then the SIR
/// operator along time and along frequency. Intervals whose good fraction
/// falls below the minimum ratios are flagged whole.
#[derive(Clone, Debug)]
pub struct StatisticalFlagAction {
    pub enlarge_time: usize,
    pub enlarge_frequency: usize,
    pub minimum_good_time_ratio: f64,
    pub minimum_good_frequency_ratio: f64,
}

impl Default for StatisticalFlagAction {
    fn default() -> StatisticalFlagAction {
        StatisticalFlagAction {
            enlarge_time: 0,
            enlarge_frequency: 0,
            minimum_good_time_ratio: DEFAULT_MIN_GOOD_TIME_RATIO,
            minimum_good_frequency_ratio: DEFAULT_MIN_GOOD_FREQUENCY_RATIO,
        }
    }
}

impl StatisticalFlagAction {
    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        let mut mask = artifacts.contaminated().single_mask();
        morphology::dilate_flags(&mut mask, self.enlarge_time, self.enlarge_frequency);
        sir::operate_horizontally(&mut mask, self.minimum_good_time_ratio);
        sir::operate_vertically(&mut mask, self.minimum_good_frequency_ratio);
        artifacts.contaminated_mut().set_global_mask(mask);
        Ok(())
    }
}
