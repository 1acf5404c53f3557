// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{artifacts::ArtifactSet, constants::SELECTION_SIGMA, morphology, strategy::ActionError};

/// Reject whole channels (rows) whose mean stands out of the per-channel
/// mean population.
#[derive(Clone, Debug)]
pub struct FrequencySelectionAction {
    pub sigma: f64,
}

impl Default for FrequencySelectionAction {
    fn default() -> FrequencySelectionAction {
        FrequencySelectionAction {
            sigma: SELECTION_SIGMA,
        }
    }
}

impl FrequencySelectionAction {
    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        let image = artifacts.contaminated().single_image();
        let mut mask = artifacts.contaminated().single_mask();
        morphology::frequency_selection(&image, &mut mask, self.sigma);
        artifacts.contaminated_mut().set_global_mask(mask);
        Ok(())
    }
}

/// Reject whole time steps (columns) whose mean stands out of the
/// per-time-step mean population. Disabled by transient-friendly
/// strategies, which must keep broadband bursts.
#[derive(Clone, Debug)]
pub struct TimeSelectionAction {
    pub sigma: f64,
}

impl Default for TimeSelectionAction {
    fn default() -> TimeSelectionAction {
        TimeSelectionAction {
            sigma: SELECTION_SIGMA,
        }
    }
}

impl TimeSelectionAction {
    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        let image = artifacts.contaminated().single_image();
        let mut mask = artifacts.contaminated().single_mask();
        morphology::time_selection(&image, &mut mask, self.sigma);
        artifacts.contaminated_mut().set_global_mask(mask);
        Ok(())
    }
}
