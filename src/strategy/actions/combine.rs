// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    artifacts::ArtifactSet,
    progress::ProgressListener,
    strategy::{ActionBlock, ActionError},
};

/// Run every child against the flags as they were on entry and OR all the
/// results together, so the children cannot see (or suppress) each other's
/// detections.
#[derive(Clone, Debug, Default)]
pub struct CombineFlagResults {
    pub children: ActionBlock,
}

impl CombineFlagResults {
    pub fn perform(
        &self,
        artifacts: &mut ArtifactSet,
        progress: &dyn ProgressListener,
    ) -> Result<(), ActionError> {
        if self.children.children().len() <= 1 {
            return self.children.perform_children(artifacts, progress);
        }

        let entry = artifacts.contaminated().clone();
        let mut combined = entry.single_mask();
        for child in self.children.children() {
            if progress.is_cancelled() {
                return Err(ActionError::Cancelled);
            }
            artifacts.set_contaminated(entry.clone());
            progress.on_action_start(child.name());
            let result = child.perform(artifacts, progress);
            progress.on_action_end();
            result?;
            combined.or_with(&artifacts.contaminated().single_mask());
        }

        let mut result = entry;
        result.set_global_mask(combined);
        artifacts.set_contaminated(result);
        Ok(())
    }
}
