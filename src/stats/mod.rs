// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Masked and Winsorized image statistics.

The detector thresholds are scaled by the Winsorized standard deviation of
the residual: the extreme tails (which contain exactly the RFI we are trying
to find) are clipped to the 10th/90th percentile values before the moments
are taken, so that strong interference cannot inflate its own threshold.
 */

#[cfg(test)]
mod tests;

use crate::{
    constants::WINSORIZE_FRACTION,
    image::{Image2D, Mask2D},
};

/// The smallest unmasked sample, or 0 when everything is masked.
pub fn min_value(image: &Image2D, mask: &Mask2D) -> f32 {
    let mut min = None;
    for y in 0..image.height() {
        for x in 0..image.width() {
            if !mask.value(x, y) {
                let v = image.value(x, y);
                min = Some(match min {
                    Some(m) if m <= v => m,
                    _ => v,
                });
            }
        }
    }
    min.unwrap_or(0.0)
}

/// The largest unmasked sample, or 0 when everything is masked.
pub fn max_value(image: &Image2D, mask: &Mask2D) -> f32 {
    let mut max = None;
    for y in 0..image.height() {
        for x in 0..image.width() {
            if !mask.value(x, y) {
                let v = image.value(x, y);
                max = Some(match max {
                    Some(m) if m >= v => m,
                    _ => v,
                });
            }
        }
    }
    max.unwrap_or(0.0)
}

/// The plain mean over unmasked samples, or 0 when everything is masked.
pub fn unmasked_mean(image: &Image2D, mask: &Mask2D) -> f64 {
    let mut sum = 0.0;
    let mut count = 0u64;
    for y in 0..image.height() {
        for x in 0..image.width() {
            if !mask.value(x, y) {
                sum += image.value(x, y) as f64;
                count += 1;
            }
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Winsorized mean and population standard deviation over the unmasked
/// samples of `image`. An empty sample yields (0, 0).
pub fn winsorized_mean_and_std_dev(image: &Image2D, mask: &Mask2D) -> (f64, f64) {
    let mut values = Vec::with_capacity(image.width() * image.height());
    for y in 0..image.height() {
        for x in 0..image.width() {
            if !mask.value(x, y) {
                values.push(image.value(x, y) as f64);
            }
        }
    }
    winsorized_mean_and_std_dev_of(&mut values)
}

/// Winsorized mean and population standard deviation of a sample. The slice
/// is sorted in place to find the percentile bounds.
pub fn winsorized_mean_and_std_dev_of(values: &mut [f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    values.sort_unstable_by(f64::total_cmp);

    let low_index = (WINSORIZE_FRACTION * n as f64).floor() as usize;
    let high_index = (((1.0 - WINSORIZE_FRACTION) * n as f64).ceil() as usize)
        .saturating_sub(1)
        .max(low_index);
    let low = values[low_index];
    let high = values[high_index];

    let clipped = |v: f64| v.clamp(low, high);
    let mean = values.iter().map(|&v| clipped(v)).sum::<f64>() / n as f64;
    let variance = values
        .iter()
        .map(|&v| {
            let d = clipped(v) - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64;
    (mean, variance.sqrt())
}
