// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Mask post-processing: box dilation and whole-line rejection.

The selection functions reject entire time steps (columns) or channels
(rows) whose unmasked mean sits far above the population of line means;
"far" is measured in Winsorized standard deviations so that lines already
contaminated do not lift the bar for the others.
 */

#[cfg(test)]
mod tests;

use crate::{
    image::{Image2D, Mask2D},
    stats,
};

/// Flag every sample within `enlarge_time` columns and `enlarge_frequency`
/// rows of a flagged sample. The box dilation is separable, so this is a
/// horizontal pass followed by a vertical one.
pub fn dilate_flags(mask: &mut Mask2D, enlarge_time: usize, enlarge_frequency: usize) {
    let width = mask.width();
    let height = mask.height();
    if enlarge_time > 0 {
        let input = mask.clone();
        for y in 0..height {
            for x in 0..width {
                if input.value(x, y) {
                    let begin = x.saturating_sub(enlarge_time);
                    let end = (x + enlarge_time + 1).min(width);
                    for dx in begin..end {
                        mask.set_value(dx, y, true);
                    }
                }
            }
        }
    }
    if enlarge_frequency > 0 {
        let input = mask.clone();
        for y in 0..height {
            for x in 0..width {
                if input.value(x, y) {
                    let begin = y.saturating_sub(enlarge_frequency);
                    let end = (y + enlarge_frequency + 1).min(height);
                    for dy in begin..end {
                        mask.set_value(x, dy, true);
                    }
                }
            }
        }
    }
}

/// The unmasked mean of every column; `None` for fully masked columns.
fn column_means(image: &Image2D, mask: &Mask2D) -> Vec<Option<f64>> {
    (0..image.width())
        .map(|x| {
            let mut sum = 0.0;
            let mut count = 0u32;
            for y in 0..image.height() {
                if !mask.value(x, y) {
                    sum += image.value(x, y) as f64;
                    count += 1;
                }
            }
            (count > 0).then(|| sum / f64::from(count))
        })
        .collect()
}

/// The unmasked mean of every row; `None` for fully masked rows.
fn row_means(image: &Image2D, mask: &Mask2D) -> Vec<Option<f64>> {
    (0..image.height())
        .map(|y| {
            let mut sum = 0.0;
            let mut count = 0u32;
            for x in 0..image.width() {
                if !mask.value(x, y) {
                    sum += image.value(x, y) as f64;
                    count += 1;
                }
            }
            (count > 0).then(|| sum / f64::from(count))
        })
        .collect()
}

/// The rejection bar for a population of line means: Winsorized mean plus
/// `sigma` Winsorized standard deviations. `None` when no line has data.
fn selection_threshold(means: &[Option<f64>], sigma: f64) -> Option<f64> {
    let mut present: Vec<f64> = means.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    let (mean, stddev) = stats::winsorized_mean_and_std_dev_of(&mut present);
    Some(mean + sigma * stddev)
}

/// Flag whole time steps (columns) that stand out of the per-column mean
/// population by more than `sigma` Winsorized standard deviations.
pub fn time_selection(image: &Image2D, mask: &mut Mask2D, sigma: f64) {
    let means = column_means(image, mask);
    let threshold = match selection_threshold(&means, sigma) {
        Some(t) => t,
        None => return,
    };
    for (x, mean) in means.into_iter().enumerate() {
        if matches!(mean, Some(m) if m > threshold) {
            for y in 0..mask.height() {
                mask.set_value(x, y, true);
            }
        }
    }
}

/// Flag whole channels (rows) that stand out of the per-row mean population
/// by more than `sigma` Winsorized standard deviations.
pub fn frequency_selection(image: &Image2D, mask: &mut Mask2D, sigma: f64) {
    let means = row_means(image, mask);
    let threshold = match selection_threshold(&means, sigma) {
        Some(t) => t,
        None => return,
    };
    for (y, mean) in means.into_iter().enumerate() {
        if matches!(mean, Some(m) if m > threshold) {
            for x in 0..mask.width() {
                mask.set_value(x, y, true);
            }
        }
    }
}
