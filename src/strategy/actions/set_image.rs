// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{artifacts::ArtifactSet, strategy::ActionError};

/// Where [SetImageAction] takes its pixels from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetImageSource {
    FromOriginal,
    FromRevised,
}

/// Overwrite the contaminated images, keeping the contaminated masks. Used
/// to restore the raw data before refitting the background, and by
/// GUI-friendly strategies to leave the display in a sane state.
#[derive(Clone, Debug)]
pub struct SetImageAction {
    pub source: SetImageSource,
}

impl Default for SetImageAction {
    fn default() -> SetImageAction {
        SetImageAction {
            source: SetImageSource::FromOriginal,
        }
    }
}

impl SetImageAction {
    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        let source = match self.source {
            SetImageSource::FromOriginal => artifacts.original().clone(),
            SetImageSource::FromRevised => artifacts.revised().clone(),
        };
        let contaminated = artifacts.contaminated_mut();
        for i in 0..contaminated.image_count() {
            contaminated.set_image(i, source.image(i).clone());
        }
        Ok(())
    }
}
