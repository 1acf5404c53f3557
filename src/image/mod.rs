// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Two-dimensional time-frequency buffers.

An [Image2D] is a `width x height` grid of f32 with time on the x axis and
frequency on the y axis. Rows are padded to [crate::constants::VECTOR_LANES]
floats so that every row starts vector aligned; the padded row length is the
*stride*. A [Mask2D] is the same model over bool, where `true` marks a
contaminated sample.

Both types are backed by [ndarray::ArcArray2]: cloning a buffer only clones a
reference, and the first write through a shared handle copies the pixels.
Actions that declare "writes image" therefore pay for a copy exactly once.
 */


use ndarray::{ArcArray2, ArrayView1};

use crate::constants::VECTOR_LANES;

/// The padded row length for an image of the given width.
pub fn stride_for_width(width: usize) -> usize {
    match width % VECTOR_LANES {
        0 => width,
        r => width + VECTOR_LANES - r,
    }
}

/// A strided 2-D grid of f32 samples with cheap, copy-on-write clones.
#[derive(Clone, Debug, PartialEq)]
pub struct Image2D {
    width: usize,
    height: usize,
    /// Shape `(height, stride)`; only the first `width` entries of each row
    /// are image samples, the rest is alignment padding.
    buf: ArcArray2<f32>,
}

impl Image2D {
    /// A new image with all samples zero.
    pub fn new_zero(width: usize, height: usize) -> Image2D {
        Image2D {
            width,
            height,
            buf: ArcArray2::zeros((height, stride_for_width(width))),
        }
    }

    /// A new image with all samples set to `value`. The padding is zeroed,
    /// not set, so that buffer contents don't depend on the stride.
    pub fn new_set(width: usize, height: usize, value: f32) -> Image2D {
        let mut image = Image2D::new_zero(width, height);
        for y in 0..height {
            for x in 0..width {
                image.buf[[y, x]] = value;
            }
        }
        image
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.buf.ncols()
    }

    #[inline]
    pub fn value(&self, x: usize, y: usize) -> f32 {
        self.buf[[y, x]]
    }

    #[inline]
    pub fn set_value(&mut self, x: usize, y: usize, value: f32) {
        self.buf[[y, x]] = value;
    }

    /// The padded row `y`, including alignment padding.
    pub fn padded_row(&self, y: usize) -> ArrayView1<f32> {
        self.buf.row(y)
    }

    /// The whole padded buffer, row-major, `height * stride` floats.
    pub fn as_slice(&self) -> &[f32] {
        self.buf
            .as_slice()
            .expect("image buffers are contiguous row-major")
    }

    /// Mutable access to the whole padded buffer. Copies the pixels first if
    /// the storage is shared with another handle.
    pub fn as_slice_mut(&mut self) -> &mut [f32] {
        self.buf
            .as_slice_mut()
            .expect("image buffers are contiguous row-major")
    }

    pub fn is_same_size(&self, other: &Image2D) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// `self - other`, sample by sample.
    pub fn subtract(&self, other: &Image2D) -> Image2D {
        assert!(self.is_same_size(other));
        let mut out = Image2D::new_zero(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.buf[[y, x]] = self.buf[[y, x]] - other.buf[[y, x]];
            }
        }
        out
    }

    /// Do any samples hold a non-finite value?
    pub fn contains_non_finite(&self) -> bool {
        (0..self.height).any(|y| (0..self.width).any(|x| !self.buf[[y, x]].is_finite()))
    }

    /// Downsample by averaging blocks of `factor` columns. The last block
    /// averages whatever columns remain.
    pub fn shrink_horizontally(&self, factor: usize) -> Image2D {
        assert!(factor > 0);
        let new_width = (self.width + factor - 1) / factor;
        let mut out = Image2D::new_zero(new_width, self.height);
        for y in 0..self.height {
            for new_x in 0..new_width {
                let begin = new_x * factor;
                let end = (begin + factor).min(self.width);
                let sum: f32 = (begin..end).map(|x| self.buf[[y, x]]).sum();
                out.buf[[y, new_x]] = sum / (end - begin) as f32;
            }
        }
        out
    }

    /// Downsample by averaging blocks of `factor` rows.
    pub fn shrink_vertically(&self, factor: usize) -> Image2D {
        assert!(factor > 0);
        let new_height = (self.height + factor - 1) / factor;
        let mut out = Image2D::new_zero(self.width, new_height);
        for new_y in 0..new_height {
            let begin = new_y * factor;
            let end = (begin + factor).min(self.height);
            for x in 0..self.width {
                let sum: f32 = (begin..end).map(|y| self.buf[[y, x]]).sum();
                out.buf[[new_y, x]] = sum / (end - begin) as f32;
            }
        }
        out
    }

    /// Upsample back to `target_width` columns by duplicating each column
    /// `factor` times.
    pub fn enlarge_horizontally(&self, factor: usize, target_width: usize) -> Image2D {
        assert!(factor > 0);
        let mut out = Image2D::new_zero(target_width, self.height);
        for y in 0..self.height {
            for x in 0..target_width {
                out.buf[[y, x]] = self.buf[[y, (x / factor).min(self.width - 1)]];
            }
        }
        out
    }

    /// Upsample back to `target_height` rows by duplicating each row
    /// `factor` times.
    pub fn enlarge_vertically(&self, factor: usize, target_height: usize) -> Image2D {
        assert!(factor > 0);
        let mut out = Image2D::new_zero(self.width, target_height);
        for y in 0..target_height {
            let src_y = (y / factor).min(self.height - 1);
            for x in 0..self.width {
                out.buf[[y, x]] = self.buf[[src_y, x]];
            }
        }
        out
    }
}

/// A strided 2-D grid of flags; `true` marks a contaminated sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask2D {
    width: usize,
    height: usize,
    buf: ArcArray2<bool>,
}

impl Mask2D {
    /// A new mask with all samples unflagged.
    pub fn new_false(width: usize, height: usize) -> Mask2D {
        Mask2D {
            width,
            height,
            buf: ArcArray2::from_elem((height, stride_for_width(width)), false),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.buf.ncols()
    }

    #[inline]
    pub fn value(&self, x: usize, y: usize) -> bool {
        self.buf[[y, x]]
    }

    #[inline]
    pub fn set_value(&mut self, x: usize, y: usize, value: bool) {
        self.buf[[y, x]] = value;
    }

    /// The whole padded buffer, row-major, `height * stride` bools.
    pub fn as_slice(&self) -> &[bool] {
        self.buf
            .as_slice()
            .expect("mask buffers are contiguous row-major")
    }

    pub fn is_same_size(&self, other: &Mask2D) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn set_all(&mut self, value: bool) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.buf[[y, x]] = value;
            }
        }
    }

    /// Flag every sample that `other` flags.
    pub fn or_with(&mut self, other: &Mask2D) {
        assert!(self.is_same_size(other));
        for y in 0..self.height {
            for x in 0..self.width {
                if other.buf[[y, x]] {
                    self.buf[[y, x]] = true;
                }
            }
        }
    }

    pub fn count_flagged(&self) -> usize {
        (0..self.height)
            .map(|y| (0..self.width).filter(|&x| self.buf[[y, x]]).count())
            .sum()
    }

    /// Is `other` flagged everywhere this mask is flagged?
    pub fn is_subset_of(&self, other: &Mask2D) -> bool {
        assert!(self.is_same_size(other));
        (0..self.height).all(|y| (0..self.width).all(|x| !self.buf[[y, x]] || other.buf[[y, x]]))
    }

    /// Downsample blocks of `factor` columns. A downsampled flag is set only
    /// when *all* contributing flags are set, so that partially good blocks
    /// keep contributing data at the reduced resolution.
    pub fn shrink_horizontally(&self, factor: usize) -> Mask2D {
        assert!(factor > 0);
        let new_width = (self.width + factor - 1) / factor;
        let mut out = Mask2D::new_false(new_width, self.height);
        for y in 0..self.height {
            for new_x in 0..new_width {
                let begin = new_x * factor;
                let end = (begin + factor).min(self.width);
                out.buf[[y, new_x]] = (begin..end).all(|x| self.buf[[y, x]]);
            }
        }
        out
    }

    /// Downsample blocks of `factor` rows; all-flagged blocks stay flagged.
    pub fn shrink_vertically(&self, factor: usize) -> Mask2D {
        assert!(factor > 0);
        let new_height = (self.height + factor - 1) / factor;
        let mut out = Mask2D::new_false(self.width, new_height);
        for new_y in 0..new_height {
            let begin = new_y * factor;
            let end = (begin + factor).min(self.height);
            for x in 0..self.width {
                out.buf[[new_y, x]] = (begin..end).all(|y| self.buf[[y, x]]);
            }
        }
        out
    }

    /// Upsample back to `target_width` columns by duplication.
    pub fn enlarge_horizontally(&self, factor: usize, target_width: usize) -> Mask2D {
        assert!(factor > 0);
        let mut out = Mask2D::new_false(target_width, self.height);
        for y in 0..self.height {
            for x in 0..target_width {
                out.buf[[y, x]] = self.buf[[y, (x / factor).min(self.width - 1)]];
            }
        }
        out
    }

    /// Upsample back to `target_height` rows by duplication.
    pub fn enlarge_vertically(&self, factor: usize, target_height: usize) -> Mask2D {
        assert!(factor > 0);
        let mut out = Mask2D::new_false(self.width, target_height);
        for y in 0..target_height {
            let src_y = (y / factor).min(self.height - 1);
            for x in 0..self.width {
                out.buf[[y, x]] = self.buf[[src_y, x]];
            }
        }
        out
    }
}
