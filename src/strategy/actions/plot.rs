// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    artifacts::{ArtifactSet, PolarisationFlagCounts},
    strategy::ActionError,
};

/// Which accumulator a [PlotAction] feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlotKind {
    PolarisationStatistics,
}

/// Accumulate plot input under the shared mutex. The drawing itself is a
/// GUI concern; the core only counts.
#[derive(Clone, Debug)]
pub struct PlotAction {
    pub kind: PlotKind,
}

impl Default for PlotAction {
    fn default() -> PlotAction {
        PlotAction {
            kind: PlotKind::PolarisationStatistics,
        }
    }
}

impl PlotAction {
    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        match self.kind {
            PlotKind::PolarisationStatistics => {
                let contaminated = artifacts.contaminated();
                let polarisation_count = contaminated.polarisation_count();
                let samples = (contaminated.width() * contaminated.height()) as u64;
                let counts: Vec<u64> = (0..polarisation_count)
                    .map(|p| contaminated.mask_for_polarisation(p).count_flagged() as u64)
                    .collect();

                let shared = artifacts.shared().clone();
                let mut observables = shared
                    .lock()
                    .expect("another run panicked holding the observables lock");
                if observables.polarisation_statistics.len() < polarisation_count {
                    observables
                        .polarisation_statistics
                        .resize_with(polarisation_count, PolarisationFlagCounts::default);
                }
                for (p, flagged) in counts.into_iter().enumerate() {
                    let stats = &mut observables.polarisation_statistics[p];
                    stats.total_samples += samples;
                    stats.flagged_samples += flagged;
                }
            }
        }
        Ok(())
    }
}
