// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Weighted Gaussian background estimation.

The "revised" image of an artifact set is a smooth background fit: at every
sample, a Gaussian-weighted mean of the unmasked neighbourhood. The weighted
mean is computed separably (a horizontal then a vertical pass over both the
weighted-data plane and the weight plane), which turns the `O(W_t * W_f)`
per-pixel window into two 1-D convolutions. Windows are clipped at the image
edges; nothing is reflected.

The detector never looks at the background itself, only at
`contaminated - revised`.
 */

#[cfg(test)]
mod tests;

use crate::{
    image::{Image2D, Mask2D},
    stats,
};

/// Configuration of one background fit.
#[derive(Clone, Debug)]
pub struct GaussianBackgroundFit {
    /// Horizontal (time direction) window size; odd.
    pub window_width: usize,
    /// Vertical (frequency direction) window size; odd.
    pub window_height: usize,
    /// Variance of the horizontal kernel.
    pub horizontal_sigma_sq: f64,
    /// Variance of the vertical kernel.
    pub vertical_sigma_sq: f64,
}

impl GaussianBackgroundFit {
    /// The background estimate. Samples whose whole neighbourhood is masked
    /// take the unmasked mean of the image, or 0 for a fully masked image.
    pub fn background(&self, image: &Image2D, mask: &Mask2D) -> Image2D {
        let width = image.width();
        let height = image.height();
        let h_kernel = kernel(self.window_width, self.horizontal_sigma_sq);
        let v_kernel = kernel(self.window_height, self.vertical_sigma_sq);

        // Weighted-data and weight planes, convolved horizontally then
        // vertically. f64 keeps long kernel sums well conditioned.
        let mut data = vec![0.0f64; width * height];
        let mut weight = vec![0.0f64; width * height];
        for y in 0..height {
            for x in 0..width {
                if !mask.value(x, y) {
                    data[y * width + x] = image.value(x, y) as f64;
                    weight[y * width + x] = 1.0;
                }
            }
        }
        let data = convolve_rows(&convolve_columns(&data, width, height, &v_kernel), width, &h_kernel);
        let weight =
            convolve_rows(&convolve_columns(&weight, width, height, &v_kernel), width, &h_kernel);

        let fallback = stats::unmasked_mean(image, mask) as f32;
        let mut out = Image2D::new_zero(width, height);
        for y in 0..height {
            for x in 0..width {
                let w = weight[y * width + x];
                let value = if w > 1.0e-9 {
                    (data[y * width + x] / w) as f32
                } else {
                    fallback
                };
                out.set_value(x, y, value);
            }
        }
        out
    }

    /// `image - background(image)`.
    pub fn residual(&self, image: &Image2D, mask: &Mask2D) -> Image2D {
        image.subtract(&self.background(image, mask))
    }
}

/// A truncated Gaussian of `size` taps (odd), `exp(-d^2 / (2 sigma^2))`. A
/// non-positive variance degenerates to the central tap only.
fn kernel(size: usize, sigma_sq: f64) -> Vec<f64> {
    assert!(size % 2 == 1, "kernel windows must be odd-sized");
    let half = (size / 2) as i64;
    (-half..=half)
        .map(|d| {
            if d == 0 {
                1.0
            } else if sigma_sq > 0.0 {
                (-(d * d) as f64 / (2.0 * sigma_sq)).exp()
            } else {
                0.0
            }
        })
        .collect()
}

/// Convolve every row with `kernel`, clipping at the edges.
fn convolve_rows(plane: &[f64], width: usize, kernel: &[f64]) -> Vec<f64> {
    if kernel.len() == 1 {
        return plane.to_vec();
    }
    let height = if width == 0 { 0 } else { plane.len() / width };
    let half = kernel.len() as i64 / 2;
    let mut out = vec![0.0f64; plane.len()];
    for y in 0..height {
        let row = &plane[y * width..(y + 1) * width];
        for x in 0..width {
            let mut sum = 0.0;
            for (k, &w) in kernel.iter().enumerate() {
                let sx = x as i64 + k as i64 - half;
                if (0..width as i64).contains(&sx) {
                    sum += w * row[sx as usize];
                }
            }
            out[y * width + x] = sum;
        }
    }
    out
}

/// Convolve every column with `kernel`, clipping at the edges.
fn convolve_columns(plane: &[f64], width: usize, height: usize, kernel: &[f64]) -> Vec<f64> {
    if kernel.len() == 1 {
        return plane.to_vec();
    }
    let half = kernel.len() as i64 / 2;
    let mut out = vec![0.0f64; plane.len()];
    for x in 0..width {
        for y in 0..height {
            let mut sum = 0.0;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = y as i64 + k as i64 - half;
                if (0..height as i64).contains(&sy) {
                    sum += w * plane[sy as usize * width + x];
                }
            }
            out[y * width + x] = sum;
        }
    }
    out
}
