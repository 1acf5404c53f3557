// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;

#[test]
fn dilation_grows_a_box() {
    let mut mask = Mask2D::new_false(9, 9);
    mask.set_value(4, 4, true);
    dilate_flags(&mut mask, 2, 1);
    for y in 0..9 {
        for x in 0..9 {
            let expect = (2..=6).contains(&x) && (3..=5).contains(&y);
            assert_eq!(mask.value(x, y), expect, "at ({x}, {y})");
        }
    }
}

#[test]
fn dilation_clips_at_the_edges() {
    let mut mask = Mask2D::new_false(4, 4);
    mask.set_value(0, 0, true);
    dilate_flags(&mut mask, 2, 2);
    assert!(mask.value(2, 2));
    assert!(!mask.value(3, 3));
}

#[test]
fn zero_dilation_is_a_no_op() {
    let mut mask = Mask2D::new_false(4, 4);
    mask.set_value(1, 2, true);
    let before = mask.clone();
    dilate_flags(&mut mask, 0, 0);
    assert_eq!(mask, before);
}

#[test]
fn time_selection_rejects_a_hot_column() {
    let mut image = Image2D::new_zero(16, 8);
    for y in 0..8 {
        image.set_value(10, y, 100.0);
    }
    let mut mask = Mask2D::new_false(16, 8);
    time_selection(&image, &mut mask, 3.0);
    for y in 0..8 {
        assert!(mask.value(10, y));
    }
    assert_eq!(mask.count_flagged(), 8);
}

#[test]
fn frequency_selection_rejects_a_hot_row() {
    let mut image = Image2D::new_zero(16, 8);
    for x in 0..16 {
        image.set_value(x, 3, 100.0);
    }
    let mut mask = Mask2D::new_false(16, 8);
    frequency_selection(&image, &mut mask, 3.0);
    for x in 0..16 {
        assert!(mask.value(x, 3));
    }
    assert_eq!(mask.count_flagged(), 16);
}

#[test]
fn fully_masked_lines_are_left_alone() {
    // Column 10 is hot but already fully masked: it contributes no mean and
    // must not be re-selected, nor poison the threshold for the rest.
    let mut image = Image2D::new_zero(16, 8);
    for y in 0..8 {
        image.set_value(10, y, 100.0);
    }
    let mut mask = Mask2D::new_false(16, 8);
    for y in 0..8 {
        mask.set_value(10, y, true);
    }
    let before = mask.clone();
    time_selection(&image, &mut mask, 3.0);
    assert_eq!(mask, before);
}

#[test]
fn uniform_images_select_nothing() {
    let image = Image2D::new_set(12, 12, 5.0);
    let mut mask = Mask2D::new_false(12, 12);
    time_selection(&image, &mut mask, 3.0);
    frequency_selection(&image, &mut mask, 3.0);
    assert_eq!(mask.count_flagged(), 0);
}

#[test]
fn selection_only_adds_flags() {
    let mut image = Image2D::new_zero(8, 8);
    for y in 0..8 {
        image.set_value(2, y, 50.0);
    }
    let mut mask = Mask2D::new_false(8, 8);
    mask.set_value(5, 5, true);
    let before = mask.clone();
    time_selection(&image, &mut mask, 3.0);
    assert!(before.is_subset_of(&mask));
}
