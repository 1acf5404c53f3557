// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    artifacts::ArtifactSet,
    progress::ProgressListener,
    strategy::{ActionBlock, ActionError},
};

/// Run the children once per polarisation pair, with the pair exposed as
/// the active data. Image and mask changes are written back into the pair's
/// slots when its run completes.
#[derive(Clone, Debug, Default)]
pub struct ForEachPolarisationBlock {
    pub children: ActionBlock,
}

impl ForEachPolarisationBlock {
    pub fn perform(
        &self,
        artifacts: &mut ArtifactSet,
        progress: &dyn ProgressListener,
    ) -> Result<(), ActionError> {
        let polarisation_count = artifacts.contaminated().polarisation_count();
        if polarisation_count == 1 {
            return self.children.perform_children(artifacts, progress);
        }

        for p in 0..polarisation_count {
            if progress.is_cancelled() {
                return Err(ActionError::Cancelled);
            }
            let mut sub = artifacts.child(
                artifacts.original().polarisation_data(p),
                artifacts.contaminated().polarisation_data(p),
                artifacts.revised().polarisation_data(p),
            );
            self.children.perform_children(&mut sub, progress)?;

            let contaminated = sub.contaminated().clone();
            let revised = sub.revised().clone();
            artifacts
                .contaminated_mut()
                .set_polarisation_data(p, &contaminated);
            artifacts.revised_mut().set_polarisation_data(p, &revised);
            artifacts.set_sensitivity(sub.sensitivity());
            progress.on_progress(p + 1, polarisation_count);
        }
        Ok(())
    }
}
