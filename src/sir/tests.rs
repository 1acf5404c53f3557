// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;

/// O(n^2) reading of the contract: sample `i` is flagged iff some interval
/// containing it has a flagged fraction of at least `1 - eta`.
fn reference(mask: &[bool], eta: f64) -> Vec<bool> {
    let n = mask.len();
    (0..n)
        .map(|i| {
            (0..=i).any(|a| {
                (i..n).any(|b| {
                    let len = b - a + 1;
                    let count = mask[a..=b].iter().filter(|&&f| f).count();
                    // Score form, identical to the implementation's
                    // arithmetic so boundary intervals agree bit for bit.
                    let sum = count as f64 * eta + (len - count) as f64 * (eta - 1.0);
                    sum >= 0.0
                })
            })
        })
        .collect()
}

/// A deterministic pseudo-random strip; avoids pulling in an RNG crate for
/// one test.
fn lcg_strip(seed: u64, len: usize, fill: u64) -> Vec<bool> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) % 100 < fill
        })
        .collect()
}

#[test]
fn eta_zero_reproduces_the_input() {
    let mut mask = vec![false, true, false, true, true, false];
    let input = mask.clone();
    operate_strip(&mut mask, 0.0);
    assert_eq!(mask, input);
}

#[test]
fn eta_one_floods_the_strip() {
    let mut mask = vec![false, false, true, false];
    operate_strip(&mut mask, 1.0);
    assert_eq!(mask, vec![true, true, true, true]);
}

#[test]
fn isolated_flag_does_not_dilate_at_low_eta() {
    // An interval covering the flag and one neighbour has a flagged
    // fraction of 1/2 < 0.8, so nothing spreads.
    let mut mask = vec![false; 9];
    mask[4] = true;
    operate_strip(&mut mask, 0.2);
    let expected: Vec<bool> = (0..9).map(|i| i == 4).collect();
    assert_eq!(mask, expected);
}

#[test]
fn a_long_run_grows_proportionally() {
    // 16 flagged samples, eta = 0.5: each side can extend until it has as
    // many unflagged as flagged samples, i.e. by the run length.
    let mut mask = vec![false; 64];
    for flag in mask.iter_mut().skip(20).take(16) {
        *flag = true;
    }
    operate_strip(&mut mask, 0.5);
    let flagged: Vec<usize> = (0..64).filter(|&i| mask[i]).collect();
    assert_eq!(flagged.first(), Some(&4));
    assert_eq!(flagged.last(), Some(&51));
    assert_eq!(flagged.len(), 48);
}

#[test]
fn output_contains_the_input() {
    for seed in 0..16 {
        let input = lcg_strip(seed, 40, 30);
        let mut output = input.clone();
        operate_strip(&mut output, 0.2);
        for i in 0..input.len() {
            assert!(!input[i] || output[i], "seed {seed}: sample {i} was unflagged");
        }
    }
}

#[test]
fn matches_the_quadratic_reference() {
    // Dyadic eta values keep every score sum exact in binary, so the
    // boundary intervals of the two computations agree.
    for seed in 0..24 {
        for &eta in &[0.125, 0.25, 0.5, 0.75] {
            let input = lcg_strip(seed, 31, 25);
            let mut fast = input.clone();
            operate_strip(&mut fast, eta);
            assert_eq!(fast, reference(&input, eta), "seed {seed}, eta {eta}");
        }
    }
}

#[test]
fn raising_eta_never_removes_flags() {
    for seed in 0..16 {
        let input = lcg_strip(seed, 40, 20);
        let mut low = input.clone();
        let mut high = input.clone();
        operate_strip(&mut low, 0.1);
        operate_strip(&mut high, 0.3);
        for i in 0..input.len() {
            assert!(!low[i] || high[i], "seed {seed}: eta 0.3 lost sample {i}");
        }
    }
}

#[test]
fn empty_and_degenerate_strips() {
    let mut empty: Vec<bool> = Vec::new();
    operate_strip(&mut empty, 0.2);
    assert!(empty.is_empty());

    let mut single = vec![true];
    operate_strip(&mut single, 0.2);
    assert_eq!(single, vec![true]);

    let mut none = vec![false; 8];
    operate_strip(&mut none, 0.2);
    assert_eq!(none, vec![false; 8]);
}

#[test]
fn two_dimensional_passes_work_per_line() {
    let mut mask = Mask2D::new_false(8, 8);
    for x in 2..6 {
        mask.set_value(x, 3, true);
    }
    // eta 0.5 doubles the run along the row.
    operate_horizontally(&mut mask, 0.5);
    let row: Vec<bool> = (0..8).map(|x| mask.value(x, 3)).collect();
    assert_eq!(row.iter().filter(|&&f| f).count(), 8);
    // Other rows stay clean.
    assert_eq!(mask.count_flagged(), 8);

    // The vertical pass then dilates each flagged column.
    operate_vertically(&mut mask, 0.5);
    assert!(mask.value(2, 3));
    assert!(mask.count_flagged() > 8);
}
