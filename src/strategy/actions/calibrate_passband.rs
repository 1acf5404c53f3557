// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{artifacts::ArtifactSet, constants::DEFAULT_PASSBAND_STEPS, strategy::ActionError};

/// Flatten the passband: the channels are divided into `steps` blocks, and
/// every sample is divided by its block's unmasked median. Instruments with
/// a strong frequency-dependent gain would otherwise hand the detector a
/// residual dominated by the passband shape instead of by interference.
#[derive(Clone, Debug)]
pub struct CalibratePassbandAction {
    pub steps: usize,
}

impl Default for CalibratePassbandAction {
    fn default() -> CalibratePassbandAction {
        CalibratePassbandAction {
            steps: DEFAULT_PASSBAND_STEPS,
        }
    }
}

impl CalibratePassbandAction {
    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        let mut data = artifacts.contaminated().clone();
        let height = data.height();
        let width = data.width();
        let steps = self.steps.clamp(1, height.max(1));
        let images_per_polarisation = data.image_count() / data.polarisation_count();

        for step in 0..steps {
            let row_begin = height * step / steps;
            let row_end = height * (step + 1) / steps;

            let mut values = Vec::new();
            for (i, image) in data.images().iter().enumerate() {
                let mask = data.mask_for_polarisation(i / images_per_polarisation);
                for y in row_begin..row_end {
                    for x in 0..width {
                        if !mask.value(x, y) {
                            values.push(image.value(x, y).abs());
                        }
                    }
                }
            }
            let median = match median(&mut values) {
                Some(m) if m > 0.0 && m.is_finite() => m,
                _ => continue,
            };

            let factor = 1.0 / median;
            for i in 0..data.image_count() {
                let mut image = data.image(i).clone();
                for y in row_begin..row_end {
                    for x in 0..width {
                        image.set_value(x, y, image.value(x, y) * factor);
                    }
                }
                data.set_image(i, image);
            }
        }

        artifacts.set_contaminated(data);
        Ok(())
    }
}

fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f32::total_cmp);
    Some(values[values.len() / 2])
}
