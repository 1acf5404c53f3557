// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

fn ramp_image() -> (Image2D, Mask2D) {
    let mut image = Image2D::new_zero(5, 2);
    for y in 0..2 {
        for x in 0..5 {
            image.set_value(x, y, (y * 5 + x) as f32);
        }
    }
    (image, Mask2D::new_false(5, 2))
}

#[test]
fn min_max_respect_the_mask() {
    let (image, mut mask) = ramp_image();
    assert_abs_diff_eq!(min_value(&image, &mask), 0.0);
    assert_abs_diff_eq!(max_value(&image, &mask), 9.0);

    mask.set_value(0, 0, true);
    mask.set_value(4, 1, true);
    assert_abs_diff_eq!(min_value(&image, &mask), 1.0);
    assert_abs_diff_eq!(max_value(&image, &mask), 8.0);
}

#[test]
fn fully_masked_reductions_are_zero() {
    let (image, mut mask) = ramp_image();
    mask.set_all(true);
    assert_abs_diff_eq!(min_value(&image, &mask), 0.0);
    assert_abs_diff_eq!(max_value(&image, &mask), 0.0);
    assert_abs_diff_eq!(unmasked_mean(&image, &mask), 0.0);
    let (mean, stddev) = winsorized_mean_and_std_dev(&image, &mask);
    assert_abs_diff_eq!(mean, 0.0);
    assert_abs_diff_eq!(stddev, 0.0);
}

#[test]
fn winsorized_moments_of_a_uniform_sample() {
    let mut values: Vec<f64> = (0..10).map(f64::from).collect();
    let (mean, stddev) = winsorized_mean_and_std_dev_of(&mut values);
    // low bound = sorted[1] = 1, high bound = sorted[8] = 8: 0 is pulled up
    // to 1 and 9 down to 8.
    let clipped: Vec<f64> = vec![1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 8.0];
    let expected_mean = clipped.iter().sum::<f64>() / 10.0;
    let expected_var = clipped
        .iter()
        .map(|v| (v - expected_mean) * (v - expected_mean))
        .sum::<f64>()
        / 10.0;
    assert_abs_diff_eq!(mean, expected_mean);
    assert_abs_diff_eq!(stddev, expected_var.sqrt());
}

#[test]
fn winsorization_ignores_a_strong_outlier() {
    // 99 quiet samples and one monster: the clip bounds come from the quiet
    // population, so the outlier contributes a bounded value.
    let mut values = vec![1.0; 99];
    values.push(1.0e6);
    let (mean, stddev) = winsorized_mean_and_std_dev_of(&mut values);
    assert_abs_diff_eq!(mean, 1.0);
    assert_abs_diff_eq!(stddev, 0.0);
}

#[test]
fn single_sample_is_its_own_mean() {
    let mut values = vec![3.5];
    let (mean, stddev) = winsorized_mean_and_std_dev_of(&mut values);
    assert_abs_diff_eq!(mean, 3.5);
    assert_abs_diff_eq!(stddev, 0.0);
}

#[test]
fn masked_spike_does_not_reach_the_moments() {
    let (mut image, mut mask) = ramp_image();
    image.set_value(2, 0, 1000.0);
    mask.set_value(2, 0, true);
    let (_, stddev) = winsorized_mean_and_std_dev(&image, &mask);
    assert!(stddev < 10.0);
}
