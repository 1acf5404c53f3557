// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Bundles of images and masks for one correlated baseline.

A [TimeFrequencyData] owns the images of one baseline in one of four layouts
(see [DataKind]) together with either a single global mask or one mask per
polarisation pair. The block actions of the strategy tree carve these bundles
into per-polarisation and per-component views and write the results back.
 */


use num_complex::Complex32;
use vec1::Vec1;

use crate::image::{Image2D, Mask2D};

/// The interpretation of the image list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataKind {
    /// One image: amplitudes of a single polarisation.
    Amplitude,
    /// Two images: real and imaginary parts of a single polarisation.
    Complex,
    /// Four images: real and imaginary parts of two polarisations.
    Dipole2Pol,
    /// Eight images: real and imaginary parts of four polarisations.
    Dipole4Pol,
}

impl DataKind {
    pub fn image_count(self) -> usize {
        match self {
            DataKind::Amplitude => 1,
            DataKind::Complex => 2,
            DataKind::Dipole2Pol => 4,
            DataKind::Dipole4Pol => 8,
        }
    }

    pub fn polarisation_count(self) -> usize {
        match self {
            DataKind::Amplitude | DataKind::Complex => 1,
            DataKind::Dipole2Pol => 2,
            DataKind::Dipole4Pol => 4,
        }
    }
}

/// Either one mask for all polarisations, or one per polarisation pair.
#[derive(Clone, Debug)]
enum MaskSet {
    Global(Mask2D),
    PerPolarisation(Vec<Mask2D>),
}

#[derive(Clone, Debug)]
pub struct TimeFrequencyData {
    kind: DataKind,
    images: Vec1<Image2D>,
    masks: MaskSet,
}

impl TimeFrequencyData {
    /// Bundle `images` under `kind` with a fresh all-false global mask.
    ///
    /// Panics when the image count does not match the kind or the images
    /// disagree on size; both are programming errors in the caller.
    pub fn new(kind: DataKind, images: Vec<Image2D>) -> TimeFrequencyData {
        assert_eq!(
            images.len(),
            kind.image_count(),
            "image count does not match data kind"
        );
        assert!(
            images.windows(2).all(|w| w[0].is_same_size(&w[1])),
            "images in a bundle must have identical sizes"
        );
        let mask = Mask2D::new_false(images[0].width(), images[0].height());
        TimeFrequencyData {
            kind,
            images: Vec1::try_from_vec(images).expect("image count checked above"),
            masks: MaskSet::Global(mask),
        }
    }

    /// A bundle of the same kind and size whose images are all zero and
    /// whose mask is a copy of this bundle's masks.
    pub fn zeroed_copy(&self) -> TimeFrequencyData {
        let zero = Image2D::new_zero(self.width(), self.height());
        TimeFrequencyData {
            kind: self.kind,
            images: self.images.mapped_ref(|_| zero.clone()),
            masks: self.masks.clone(),
        }
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn width(&self) -> usize {
        self.images.first().width()
    }

    pub fn height(&self) -> usize {
        self.images.first().height()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn polarisation_count(&self) -> usize {
        self.kind.polarisation_count()
    }

    pub fn image(&self, i: usize) -> &Image2D {
        &self.images[i]
    }

    pub fn images(&self) -> &[Image2D] {
        self.images.as_slice()
    }

    pub fn set_image(&mut self, i: usize, image: Image2D) {
        assert!(image.is_same_size(self.images.first()));
        self.images[i] = image;
    }

    /// How many masks this bundle currently holds (1, or one per
    /// polarisation pair).
    pub fn mask_count(&self) -> usize {
        match &self.masks {
            MaskSet::Global(_) => 1,
            MaskSet::PerPolarisation(masks) => masks.len(),
        }
    }

    /// The mask that applies to polarisation `p`.
    pub fn mask_for_polarisation(&self, p: usize) -> &Mask2D {
        match &self.masks {
            MaskSet::Global(mask) => mask,
            MaskSet::PerPolarisation(masks) => &masks[p],
        }
    }

    /// One mask describing every flagged sample: the global mask, or the OR
    /// over the per-polarisation masks.
    pub fn single_mask(&self) -> Mask2D {
        match &self.masks {
            MaskSet::Global(mask) => mask.clone(),
            MaskSet::PerPolarisation(masks) => {
                let mut combined = masks[0].clone();
                for mask in &masks[1..] {
                    combined.or_with(mask);
                }
                combined
            }
        }
    }

    /// Replace all masks with one global mask.
    pub fn set_global_mask(&mut self, mask: Mask2D) {
        assert_eq!(mask.width(), self.width());
        assert_eq!(mask.height(), self.height());
        self.masks = MaskSet::Global(mask);
    }

    /// Give every polarisation pair its own mask. The mask count must be
    /// half the image count.
    pub fn set_polarisation_masks(&mut self, masks: Vec<Mask2D>) {
        assert_eq!(masks.len(), self.polarisation_count());
        assert!(masks
            .iter()
            .all(|m| m.width() == self.width() && m.height() == self.height()));
        self.masks = MaskSet::PerPolarisation(masks);
    }

    /// Unflag everything.
    pub fn clear_masks(&mut self) {
        match &mut self.masks {
            MaskSet::Global(mask) => mask.set_all(false),
            MaskSet::PerPolarisation(masks) => {
                for mask in masks {
                    mask.set_all(false);
                }
            }
        }
    }

    /// OR every mask of this bundle with the corresponding mask of `other`.
    pub fn or_masks_with(&mut self, other: &TimeFrequencyData) {
        match &mut self.masks {
            MaskSet::Global(mask) => mask.or_with(&other.single_mask()),
            MaskSet::PerPolarisation(masks) => {
                for (p, mask) in masks.iter_mut().enumerate() {
                    let q = p.min(other.polarisation_count() - 1);
                    mask.or_with(other.mask_for_polarisation(q));
                }
            }
        }
    }

    /// The single-polarisation view of polarisation `p`: a [DataKind::Complex]
    /// bundle for dipole data, a clone for data that already has one
    /// polarisation. The view's global mask is a copy of `p`'s mask.
    pub fn polarisation_data(&self, p: usize) -> TimeFrequencyData {
        if self.polarisation_count() == 1 {
            return self.clone();
        }
        let mut data = TimeFrequencyData::new(
            DataKind::Complex,
            vec![self.images[2 * p].clone(), self.images[2 * p + 1].clone()],
        );
        data.set_global_mask(self.mask_for_polarisation(p).clone());
        data
    }

    /// Write a single-polarisation view produced by [Self::polarisation_data]
    /// back into slot `p`.
    pub fn set_polarisation_data(&mut self, p: usize, data: &TimeFrequencyData) {
        if self.polarisation_count() == 1 {
            *self = data.clone();
            return;
        }
        assert_eq!(data.image_count(), 2);
        self.images[2 * p] = data.image(0).clone();
        self.images[2 * p + 1] = data.image(1).clone();
        // Splitting a global mask per polarisation keeps the old global
        // flags on the untouched pairs. Mask clones are handle copies.
        let mut masks: Vec<Mask2D> = (0..self.kind.polarisation_count())
            .map(|q| self.mask_for_polarisation(q).clone())
            .collect();
        masks[p] = data.single_mask();
        self.masks = MaskSet::PerPolarisation(masks);
    }

    /// The amplitude view of a single-polarisation bundle, sharing this
    /// bundle's flags. `None` when the amplitude cannot be derived.
    pub fn amplitude_part(&self) -> Option<TimeFrequencyData> {
        match self.kind {
            DataKind::Amplitude => Some(self.clone()),
            DataKind::Complex => Some(self.derived_part(|c| c.norm())),
            _ => None,
        }
    }

    /// The phase view of a single-polarisation complex bundle.
    pub fn phase_part(&self) -> Option<TimeFrequencyData> {
        match self.kind {
            DataKind::Complex => Some(self.derived_part(|c| c.arg())),
            _ => None,
        }
    }

    /// The real view of a single-polarisation complex bundle.
    pub fn real_part(&self) -> Option<TimeFrequencyData> {
        match self.kind {
            DataKind::Complex => Some(self.derived_part(|c| c.re)),
            _ => None,
        }
    }

    /// The imaginary view of a single-polarisation complex bundle.
    pub fn imaginary_part(&self) -> Option<TimeFrequencyData> {
        match self.kind {
            DataKind::Complex => Some(self.derived_part(|c| c.im)),
            _ => None,
        }
    }

    fn derived_part(&self, f: impl Fn(Complex32) -> f32) -> TimeFrequencyData {
        let (re, im) = (&self.images[0], &self.images[1]);
        let mut image = Image2D::new_zero(self.width(), self.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                image.set_value(x, y, f(Complex32::new(re.value(x, y), im.value(x, y))));
            }
        }
        let mut data = TimeFrequencyData::new(DataKind::Amplitude, vec![image]);
        data.set_global_mask(self.single_mask());
        data
    }

    /// Rescale a complex bundle so its amplitude becomes `amplitude`,
    /// keeping phases. Samples with zero amplitude are left untouched.
    pub fn scale_to_amplitude(&mut self, amplitude: &Image2D) {
        assert_eq!(self.kind, DataKind::Complex);
        let mut re = self.images[0].clone();
        let mut im = self.images[1].clone();
        for y in 0..self.height() {
            for x in 0..self.width() {
                let old = Complex32::new(re.value(x, y), im.value(x, y));
                let norm = old.norm();
                if norm > 0.0 {
                    let scale = amplitude.value(x, y) / norm;
                    re.set_value(x, y, old.re * scale);
                    im.set_value(x, y, old.im * scale);
                }
            }
        }
        self.images[0] = re;
        self.images[1] = im;
    }

    /// One image describing the whole bundle: the image itself for
    /// amplitude data, the amplitude for complex data, and the mean of the
    /// per-polarisation amplitudes for dipole data.
    pub fn single_image(&self) -> Image2D {
        match self.kind {
            DataKind::Amplitude => self.images.first().clone(),
            DataKind::Complex => {
                let amplitude = self.derived_part(|c| c.norm());
                amplitude.images.first().clone()
            }
            DataKind::Dipole2Pol | DataKind::Dipole4Pol => {
                let n = self.polarisation_count();
                let mut out = Image2D::new_zero(self.width(), self.height());
                for p in 0..n {
                    let pol = self.polarisation_data(p).single_image();
                    for y in 0..self.height() {
                        for x in 0..self.width() {
                            let v = out.value(x, y) + pol.value(x, y) / n as f32;
                            out.set_value(x, y, v);
                        }
                    }
                }
                out
            }
        }
    }
}
