// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

fn default_fit() -> GaussianBackgroundFit {
    GaussianBackgroundFit {
        window_width: 21,
        window_height: 31,
        horizontal_sigma_sq: 2.5,
        vertical_sigma_sq: 5.0,
    }
}

#[test]
fn constant_image_is_its_own_background() {
    let image = Image2D::new_set(40, 30, 3.25);
    let mask = Mask2D::new_false(40, 30);
    let background = default_fit().background(&image, &mask);
    for y in 0..30 {
        for x in 0..40 {
            // A normalized weighted mean of a constant is that constant,
            // including at the clipped edges.
            assert_abs_diff_eq!(background.value(x, y), 3.25, epsilon = 1.0e-5);
        }
    }
}

#[test]
fn residual_of_a_constant_image_is_zero() {
    let image = Image2D::new_set(16, 16, 7.0);
    let mask = Mask2D::new_false(16, 16);
    let residual = default_fit().residual(&image, &mask);
    for y in 0..16 {
        for x in 0..16 {
            assert_abs_diff_eq!(residual.value(x, y), 0.0, epsilon = 1.0e-5);
        }
    }
}

#[test]
fn masked_spike_does_not_leak_into_the_background() {
    let mut image = Image2D::new_set(32, 32, 1.0);
    image.set_value(16, 16, 1000.0);
    let mut mask = Mask2D::new_false(32, 32);
    mask.set_value(16, 16, true);
    let background = default_fit().background(&image, &mask);
    for y in 0..32 {
        for x in 0..32 {
            assert_abs_diff_eq!(background.value(x, y), 1.0, epsilon = 1.0e-4);
        }
    }
}

#[test]
fn unmasked_spike_is_smeared_not_copied() {
    let mut image = Image2D::new_zero(32, 32);
    image.set_value(16, 16, 100.0);
    let mask = Mask2D::new_false(32, 32);
    let background = default_fit().background(&image, &mask);
    let at_spike = background.value(16, 16);
    assert!(at_spike > 0.0);
    assert!(at_spike < 100.0);
    // The neighbour picks up less than the centre.
    assert!(background.value(17, 16) <= at_spike);
}

#[test]
fn fully_masked_image_falls_back_to_zero() {
    let image = Image2D::new_set(8, 8, 42.0);
    let mut mask = Mask2D::new_false(8, 8);
    mask.set_all(true);
    let background = default_fit().background(&image, &mask);
    for y in 0..8 {
        for x in 0..8 {
            assert_abs_diff_eq!(background.value(x, y), 0.0);
        }
    }
}

#[test]
fn masked_region_takes_the_surrounding_mean() {
    // A window-width 1 fit cannot see past a fully masked column, so those
    // samples take the image-wide unmasked mean.
    let fit = GaussianBackgroundFit {
        window_width: 1,
        window_height: 1,
        horizontal_sigma_sq: 0.0,
        vertical_sigma_sq: 0.0,
    };
    let image = Image2D::new_set(4, 4, 2.0);
    let mut mask = Mask2D::new_false(4, 4);
    for y in 0..4 {
        mask.set_value(2, y, true);
    }
    let background = fit.background(&image, &mask);
    assert_abs_diff_eq!(background.value(2, 0), 2.0);
    assert_abs_diff_eq!(background.value(0, 0), 2.0);
}

#[test]
fn window_width_one_ignores_the_time_direction() {
    let mut image = Image2D::new_zero(8, 8);
    for y in 0..8 {
        image.set_value(3, y, 10.0);
    }
    let fit = GaussianBackgroundFit {
        window_width: 1,
        window_height: 31,
        horizontal_sigma_sq: 2.5,
        vertical_sigma_sq: 5.0,
    };
    let background = fit.background(&image, &Mask2D::new_false(8, 8));
    // Column 3 is constant along frequency, so it keeps its value; the
    // neighbouring columns never see it.
    assert_abs_diff_eq!(background.value(3, 4), 10.0, epsilon = 1.0e-5);
    assert_abs_diff_eq!(background.value(2, 4), 0.0);
}
