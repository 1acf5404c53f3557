// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    artifacts::ArtifactSet,
    image::{Image2D, Mask2D},
    progress::ProgressListener,
    strategy::{ActionBlock, ActionError},
    timefreq::TimeFrequencyData,
};

/// Run the children on a downsampled copy of the artifact, then bring the
/// results back up. The default strategies wrap the background fit in this:
/// a factor-3 reduction makes the Gaussian window fit 9x cheaper and the
/// fit itself smoother.
///
/// Only the slots named by the `restore_*` options flow back; by default
/// that is the revised background alone.
#[derive(Clone, Debug)]
pub struct ChangeResolutionAction {
    pub time_decrease_factor: usize,
    pub frequency_decrease_factor: usize,
    pub restore_revised: bool,
    pub restore_contaminated: bool,
    pub restore_masks: bool,
    pub children: ActionBlock,
}

impl Default for ChangeResolutionAction {
    fn default() -> ChangeResolutionAction {
        ChangeResolutionAction {
            time_decrease_factor: 3,
            frequency_decrease_factor: 3,
            restore_revised: true,
            restore_contaminated: false,
            restore_masks: false,
            children: ActionBlock::new(),
        }
    }
}

impl ChangeResolutionAction {
    pub fn perform(
        &self,
        artifacts: &mut ArtifactSet,
        progress: &dyn ProgressListener,
    ) -> Result<(), ActionError> {
        let tf = self.time_decrease_factor.max(1);
        let ff = self.frequency_decrease_factor.max(1);
        if tf == 1 && ff == 1 {
            return self.children.perform_children(artifacts, progress);
        }

        let width = artifacts.contaminated().width();
        let height = artifacts.contaminated().height();
        let mut sub = artifacts.child(
            shrink(artifacts.original(), tf, ff),
            shrink(artifacts.contaminated(), tf, ff),
            shrink(artifacts.revised(), tf, ff),
        );
        self.children.perform_children(&mut sub, progress)?;

        if self.restore_revised {
            let mut revised = artifacts.revised().clone();
            for i in 0..revised.image_count() {
                let image = sub
                    .revised()
                    .image(i)
                    .enlarge_horizontally(tf, width)
                    .enlarge_vertically(ff, height);
                revised.set_image(i, image);
            }
            artifacts.set_revised(revised);
        }
        if self.restore_contaminated {
            let mut contaminated = artifacts.contaminated().clone();
            for i in 0..contaminated.image_count() {
                let image = sub
                    .contaminated()
                    .image(i)
                    .enlarge_horizontally(tf, width)
                    .enlarge_vertically(ff, height);
                contaminated.set_image(i, image);
            }
            artifacts.set_contaminated(contaminated);
        }
        if self.restore_masks {
            let enlarged = sub
                .contaminated()
                .single_mask()
                .enlarge_horizontally(tf, width)
                .enlarge_vertically(ff, height);
            let mut mask = artifacts.contaminated().single_mask();
            mask.or_with(&enlarged);
            artifacts.contaminated_mut().set_global_mask(mask);
        }
        artifacts.set_sensitivity(sub.sensitivity());
        Ok(())
    }
}

/// A reduced-resolution copy. Images average the *unmasked* samples of
/// each block, so flagged interference cannot leak into the background fit
/// at the lower resolution; masks keep a flag only for blocks that were
/// flagged whole.
fn shrink(data: &TimeFrequencyData, tf: usize, ff: usize) -> TimeFrequencyData {
    let images_per_polarisation = data.image_count() / data.polarisation_count();
    let images = data
        .images()
        .iter()
        .enumerate()
        .map(|(i, image)| {
            shrink_image(
                image,
                data.mask_for_polarisation(i / images_per_polarisation),
                tf,
                ff,
            )
        })
        .collect();
    let mut out = TimeFrequencyData::new(data.kind(), images);
    let shrink_mask =
        |mask: &Mask2D| -> Mask2D { mask.shrink_horizontally(tf).shrink_vertically(ff) };
    if data.mask_count() == 1 {
        out.set_global_mask(shrink_mask(&data.single_mask()));
    } else {
        let masks = (0..data.polarisation_count())
            .map(|p| shrink_mask(data.mask_for_polarisation(p)))
            .collect();
        out.set_polarisation_masks(masks);
    }
    out
}

/// Block-average `image` over `tf x ff` blocks, skipping masked samples. A
/// fully masked block falls back to the plain block average.
fn shrink_image(image: &Image2D, mask: &Mask2D, tf: usize, ff: usize) -> Image2D {
    let new_width = (image.width() + tf - 1) / tf;
    let new_height = (image.height() + ff - 1) / ff;
    let mut out = Image2D::new_zero(new_width, new_height);
    for new_y in 0..new_height {
        let y_end = ((new_y + 1) * ff).min(image.height());
        for new_x in 0..new_width {
            let x_end = ((new_x + 1) * tf).min(image.width());
            let mut sum = 0.0f32;
            let mut count = 0u32;
            let mut total = 0.0f32;
            let mut samples = 0u32;
            for y in new_y * ff..y_end {
                for x in new_x * tf..x_end {
                    total += image.value(x, y);
                    samples += 1;
                    if !mask.value(x, y) {
                        sum += image.value(x, y);
                        count += 1;
                    }
                }
            }
            let value = if count > 0 {
                sum / count as f32
            } else {
                total / samples as f32
            };
            out.set_value(new_x, new_y, value);
        }
    }
    out
}
