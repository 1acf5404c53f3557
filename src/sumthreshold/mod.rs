// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The SumThreshold detector.

A combinatorial threshold: windows of length 1, 2, 4, ... slide over each
strip, and a window whose mean magnitude exceeds the length's threshold is
flagged whole. Longer windows get lower thresholds (`tau_L = tau *
chi^(-log2 L)`), so broad, dim interference is caught by the long windows
while bright spikes fall to the short ones.

Samples that were already flagged when the detector was invoked are excluded
from every window. Samples flagged *during* the run, by a shorter length,
keep contributing, but with their value clipped to the current length's
threshold; this stops one bright spike from flagging arbitrarily long
windows on its own while still letting its dim wings accumulate.

The 2-D detector runs the strip detector over every row (time direction) and
every column (frequency direction) independently, from the same entry mask,
and ORs both results into the mask.
 */

#[cfg(test)]
mod tests;

use crate::{
    constants::{DEFAULT_SHRINK_FACTOR, DEFAULT_THRESHOLD_FACTORS, SUM_THRESHOLD_LENGTHS},
    image::{Image2D, Mask2D},
};

/// The per-length thresholds for a base threshold and shrink factor, over
/// the standard window lengths. The default shrink factor uses the
/// precomputed [DEFAULT_THRESHOLD_FACTORS] table.
pub fn threshold_sequence(base_threshold: f64, shrink_factor: f64) -> Vec<(usize, f64)> {
    if shrink_factor == DEFAULT_SHRINK_FACTOR {
        return SUM_THRESHOLD_LENGTHS
            .iter()
            .zip(DEFAULT_THRESHOLD_FACTORS.iter())
            .map(|(&length, &factor)| (length, base_threshold * factor))
            .collect();
    }
    SUM_THRESHOLD_LENGTHS
        .iter()
        .map(|&length| {
            (
                length,
                base_threshold * shrink_factor.powf(-(length as f64).log2()),
            )
        })
        .collect()
}

/// Run the detector over one strip with an explicit `(length, threshold)`
/// sequence. Shorter lengths must come first; an infinite threshold disables
/// its length. `mask` is extended in place and is never unflagged.
pub fn flag_strip_with_lengths(values: &[f32], mask: &mut [bool], lengths: &[(usize, f64)]) {
    assert_eq!(values.len(), mask.len());
    let n = values.len();
    let entry: Vec<bool> = mask.to_vec();
    let mut current: Vec<bool> = mask.to_vec();

    for &(length, threshold) in lengths {
        if length > n || !threshold.is_finite() {
            continue;
        }

        // Per-sample contribution for this pass. `current` only changes
        // between passes, so this is fixed while the window slides.
        let contribution = |i: usize| -> Option<f64> {
            if entry[i] {
                None
            } else if current[i] {
                let v = values[i] as f64;
                Some(v.clamp(-threshold, threshold))
            } else {
                Some(values[i] as f64)
            }
        };

        let mut scratch = current.clone();
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for i in 0..length {
            if let Some(v) = contribution(i) {
                sum += v;
                count += 1;
            }
        }
        let mut left = 0;
        loop {
            if count > 0 && sum.abs() > threshold * count as f64 {
                for flag in &mut scratch[left..left + length] {
                    *flag = true;
                }
            }
            if left + length == n {
                break;
            }
            if let Some(v) = contribution(left) {
                sum -= v;
                count -= 1;
            }
            if let Some(v) = contribution(left + length) {
                sum += v;
                count += 1;
            }
            left += 1;
        }
        current = scratch;
    }

    mask.copy_from_slice(&current);
}

/// Run the detector over one strip with the standard lengths.
pub fn flag_strip(values: &[f32], mask: &mut [bool], base_threshold: f64, shrink_factor: f64) {
    flag_strip_with_lengths(values, mask, &threshold_sequence(base_threshold, shrink_factor));
}

/// The 2-D detector: strip detection per row and/or per column, each pass
/// starting from the entry mask, results ORed into `mask`.
pub fn flag_image(
    image: &Image2D,
    mask: &mut Mask2D,
    base_threshold: f64,
    shrink_factor: f64,
    time_direction: bool,
    frequency_direction: bool,
) {
    let width = image.width();
    let height = image.height();
    let lengths = threshold_sequence(base_threshold, shrink_factor);
    let entry = mask.clone();

    if time_direction {
        let mut values = vec![0.0f32; width];
        let mut strip = vec![false; width];
        for y in 0..height {
            for x in 0..width {
                values[x] = image.value(x, y);
                strip[x] = entry.value(x, y);
            }
            flag_strip_with_lengths(&values, &mut strip, &lengths);
            for x in 0..width {
                if strip[x] {
                    mask.set_value(x, y, true);
                }
            }
        }
    }

    if frequency_direction {
        let mut values = vec![0.0f32; height];
        let mut strip = vec![false; height];
        for x in 0..width {
            for y in 0..height {
                values[y] = image.value(x, y);
                strip[y] = entry.value(x, y);
            }
            flag_strip_with_lengths(&values, &mut strip, &lengths);
            for y in 0..height {
                if strip[y] {
                    mask.set_value(x, y, true);
                }
            }
        }
    }
}
