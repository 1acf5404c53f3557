// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The mutable state one flagging run operates on.

An [ArtifactSet] is created per baseline and threaded through the action
tree by mutable reference. It carries three data slots: the *original*
(never written after creation), the *contaminated* copy (whose mask is the
evolving answer) and the *revised* background estimate. Block actions build
temporary child sets for polarisation, component and resolution views and
write the results back when the block closes.

Side outputs that survive the run (plot accumulators, baseline summaries)
live behind a shared mutex so that runs on different baselines can feed the
same collectors.
 */

use std::sync::{Arc, Mutex};

use crate::timefreq::TimeFrequencyData;

/// Flag counts of one polarisation, accumulated across baselines.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolarisationFlagCounts {
    pub total_samples: u64,
    pub flagged_samples: u64,
}

/// What the baseline-selection preparation step records per baseline.
#[derive(Clone, Copy, Debug)]
pub struct BaselineFlagSummary {
    pub sample_count: u64,
    pub flagged_count: u64,
}

impl BaselineFlagSummary {
    pub fn flag_ratio(&self) -> f64 {
        if self.sample_count == 0 {
            0.0
        } else {
            self.flagged_count as f64 / self.sample_count as f64
        }
    }
}

/// Accumulators shared between concurrent runs; always locked via
/// [ArtifactSet::shared].
#[derive(Debug, Default)]
pub struct SharedObservables {
    pub polarisation_statistics: Vec<PolarisationFlagCounts>,
    pub baseline_summaries: Vec<BaselineFlagSummary>,
}

#[derive(Clone, Debug)]
pub struct ArtifactSet {
    original: TimeFrequencyData,
    contaminated: TimeFrequencyData,
    revised: TimeFrequencyData,
    sensitivity: f64,
    shared: Arc<Mutex<SharedObservables>>,
}

impl ArtifactSet {
    /// Start a run: the contaminated slot references the original's buffers
    /// (copy-on-write) and the revised slot is zeroed.
    pub fn new(original: TimeFrequencyData) -> ArtifactSet {
        let contaminated = original.clone();
        let revised = original.zeroed_copy();
        ArtifactSet {
            original,
            contaminated,
            revised,
            sensitivity: 1.0,
            shared: Arc::new(Mutex::new(SharedObservables::default())),
        }
    }

    /// A child set for a block that swaps in restricted data views. The
    /// sensitivity and the shared accumulators are carried over.
    pub fn child(
        &self,
        original: TimeFrequencyData,
        contaminated: TimeFrequencyData,
        revised: TimeFrequencyData,
    ) -> ArtifactSet {
        ArtifactSet {
            original,
            contaminated,
            revised,
            sensitivity: self.sensitivity,
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn original(&self) -> &TimeFrequencyData {
        &self.original
    }

    pub fn contaminated(&self) -> &TimeFrequencyData {
        &self.contaminated
    }

    pub fn contaminated_mut(&mut self) -> &mut TimeFrequencyData {
        &mut self.contaminated
    }

    pub fn set_contaminated(&mut self, data: TimeFrequencyData) {
        self.contaminated = data;
    }

    pub fn revised(&self) -> &TimeFrequencyData {
        &self.revised
    }

    pub fn revised_mut(&mut self) -> &mut TimeFrequencyData {
        &mut self.revised
    }

    pub fn set_revised(&mut self, data: TimeFrequencyData) {
        self.revised = data;
    }

    /// The current threshold multiplier; 1.0 outside an iteration block.
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.sensitivity = sensitivity;
    }

    /// The accumulators shared across baselines.
    pub fn shared(&self) -> &Arc<Mutex<SharedObservables>> {
        &self.shared
    }
}
