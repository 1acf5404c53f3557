// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{artifacts::ArtifactSet, strategy::ActionError};

/// What [SetFlaggingAction] replaces the contaminated masks with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NewFlagging {
    /// Clear every flag.
    None,
    /// OR the masks over all polarisations and give every polarisation the
    /// combined mask.
    PolarisationsEqual,
    /// OR the contaminated masks with the original's masks, so flags the
    /// caller passed in survive the run.
    OrOriginal,
}

#[derive(Clone, Debug)]
pub struct SetFlaggingAction {
    pub new_flagging: NewFlagging,
}

impl Default for SetFlaggingAction {
    fn default() -> SetFlaggingAction {
        SetFlaggingAction {
            new_flagging: NewFlagging::None,
        }
    }
}

impl SetFlaggingAction {
    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        match self.new_flagging {
            NewFlagging::None => artifacts.contaminated_mut().clear_masks(),
            NewFlagging::PolarisationsEqual => {
                let combined = artifacts.contaminated().single_mask();
                artifacts.contaminated_mut().set_global_mask(combined);
            }
            NewFlagging::OrOriginal => {
                let original = artifacts.original().clone();
                artifacts.contaminated_mut().or_masks_with(&original);
            }
        }
        Ok(())
    }
}
