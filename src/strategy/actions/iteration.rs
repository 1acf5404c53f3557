// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::debug;

use crate::{
    artifacts::ArtifactSet,
    progress::ProgressListener,
    strategy::{ActionBlock, ActionError},
};

/// Run the children `iteration_count` times with halving sensitivity:
/// iteration `i` runs at `sensitivity_start * 2^-i`. The sensitivity
/// multiplies the detector thresholds, so early iterations only catch the
/// brightest interference; each pass improves the background fit, which
/// lets the next, more sensitive pass dig deeper. On exit the artifact's
/// sensitivity is back at 1.0.
#[derive(Clone, Debug)]
pub struct IterationBlock {
    pub iteration_count: usize,
    pub sensitivity_start: f64,
    pub children: ActionBlock,
}

impl Default for IterationBlock {
    fn default() -> IterationBlock {
        IterationBlock {
            iteration_count: 2,
            sensitivity_start: 4.0,
            children: ActionBlock::new(),
        }
    }
}

impl IterationBlock {
    pub fn perform(
        &self,
        artifacts: &mut ArtifactSet,
        progress: &dyn ProgressListener,
    ) -> Result<(), ActionError> {
        for i in 0..self.iteration_count {
            if progress.is_cancelled() {
                return Err(ActionError::Cancelled);
            }
            let sensitivity = self.sensitivity_start * 2.0_f64.powi(-(i as i32));
            artifacts.set_sensitivity(sensitivity);
            debug!("iteration {i}: sensitivity {sensitivity}");
            self.children.perform_children(artifacts, progress)?;
            progress.on_progress(i + 1, self.iteration_count);
        }
        artifacts.set_sensitivity(1.0);
        Ok(())
    }
}
