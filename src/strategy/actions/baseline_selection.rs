// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::debug;

use crate::{
    artifacts::{ArtifactSet, BaselineFlagSummary},
    strategy::ActionError,
};

/// Record this baseline's flag summary in the shared accumulator, so that a
/// driver running many baselines can afterwards reject the ones that stand
/// out. The core only performs the preparation step; the cross-baseline
/// selection itself belongs to the driver that saw every baseline.
#[derive(Clone, Debug)]
pub struct BaselineSelectionAction {
    pub preparation_step: bool,
}

impl Default for BaselineSelectionAction {
    fn default() -> BaselineSelectionAction {
        BaselineSelectionAction {
            preparation_step: true,
        }
    }
}

impl BaselineSelectionAction {
    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        if !self.preparation_step {
            debug!("baseline selection is driver work; nothing to do per baseline");
            return Ok(());
        }
        let mask = artifacts.contaminated().single_mask();
        let summary = BaselineFlagSummary {
            sample_count: (mask.width() * mask.height()) as u64,
            flagged_count: mask.count_flagged() as u64,
        };
        debug!("baseline flag ratio: {:.4}", summary.flag_ratio());
        let shared = artifacts.shared().clone();
        shared
            .lock()
            .expect("another run panicked holding the observables lock")
            .baseline_summaries
            .push(summary);
        Ok(())
    }
}
