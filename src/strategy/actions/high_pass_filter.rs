// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    artifacts::ArtifactSet,
    filter::GaussianBackgroundFit,
    image::Image2D,
    strategy::ActionError,
};

/// Where [HighPassFilterAction] puts its results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    /// `revised <- background`; the contaminated images are untouched.
    StoreRevised,
    /// `contaminated <- contaminated - background` (the high-passed
    /// residual) and `revised <- background`.
    StoreContaminated,
}

/// Fit a smooth background to every contaminated image, masked by the
/// current flags.
#[derive(Clone, Debug)]
pub struct HighPassFilterAction {
    pub window_width: usize,
    pub window_height: usize,
    pub horizontal_sigma_sq: f64,
    pub vertical_sigma_sq: f64,
    pub mode: FilterMode,
}

impl Default for HighPassFilterAction {
    fn default() -> HighPassFilterAction {
        HighPassFilterAction {
            window_width: 21,
            window_height: 31,
            horizontal_sigma_sq: 2.5,
            vertical_sigma_sq: 5.0,
            mode: FilterMode::StoreRevised,
        }
    }
}

impl HighPassFilterAction {
    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        let fit = GaussianBackgroundFit {
            window_width: self.window_width,
            window_height: self.window_height,
            horizontal_sigma_sq: self.horizontal_sigma_sq,
            vertical_sigma_sq: self.vertical_sigma_sq,
        };

        let contaminated = artifacts.contaminated().clone();
        let images_per_polarisation =
            contaminated.image_count() / contaminated.polarisation_count();
        let backgrounds: Vec<Image2D> = contaminated
            .images()
            .iter()
            .enumerate()
            .map(|(i, image)| {
                let mask = contaminated.mask_for_polarisation(i / images_per_polarisation);
                fit.background(image, mask)
            })
            .collect();

        let mut revised = contaminated.clone();
        for (i, background) in backgrounds.iter().enumerate() {
            revised.set_image(i, background.clone());
        }

        match self.mode {
            FilterMode::StoreRevised => artifacts.set_revised(revised),
            FilterMode::StoreContaminated => {
                let mut residual = contaminated.clone();
                for (i, background) in backgrounds.iter().enumerate() {
                    residual.set_image(i, contaminated.image(i).subtract(background));
                }
                artifacts.set_contaminated(residual);
                artifacts.set_revised(revised);
            }
        }
        Ok(())
    }
}
