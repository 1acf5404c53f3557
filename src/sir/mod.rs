// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The scale-invariant rank (SIR) operator.

A morphological dilation of a flag strip, parameterized by an aggressiveness
`eta` in [0, 1]: an output sample is flagged exactly when it lies inside some
interval whose flagged fraction is at least `1 - eta`. Equivalently, giving
every flagged input sample the score `eta` and every unflagged sample
`eta - 1`, a sample is flagged when the best-scoring interval containing it
is non-negative. `eta = 0` reproduces the input; `eta = 1` flags the whole
strip.

The interval formulation admits an O(n) implementation: with prefix sums
`P`, the best interval containing `i` scores `max(P[i+1..]) - min(P[..=i])`,
and both extrema are running scans.
 */

#[cfg(test)]
mod tests;

use crate::image::Mask2D;

/// Apply the operator to one strip, in place.
pub fn operate_strip(mask: &mut [bool], eta: f64) {
    let n = mask.len();
    if n == 0 {
        return;
    }

    // P[i] = sum of scores of samples [0, i).
    let mut prefix = vec![0.0f64; n + 1];
    for i in 0..n {
        let score = if mask[i] { eta } else { eta - 1.0 };
        prefix[i + 1] = prefix[i] + score;
    }

    // min_left[i] = min(P[0..=i]); max_right[i] = max(P[i+1..=n]).
    let mut min_left = vec![0.0f64; n];
    let mut running = prefix[0];
    for i in 0..n {
        running = running.min(prefix[i]);
        min_left[i] = running;
    }
    let mut max_right = vec![0.0f64; n];
    running = prefix[n];
    for i in (0..n).rev() {
        running = running.max(prefix[i + 1]);
        max_right[i] = running;
    }

    for i in 0..n {
        mask[i] = max_right[i] - min_left[i] >= 0.0;
    }
}

/// Apply the operator to every row of a mask (time direction).
pub fn operate_horizontally(mask: &mut Mask2D, eta: f64) {
    let width = mask.width();
    let mut strip = vec![false; width];
    for y in 0..mask.height() {
        for x in 0..width {
            strip[x] = mask.value(x, y);
        }
        operate_strip(&mut strip, eta);
        for x in 0..width {
            mask.set_value(x, y, strip[x]);
        }
    }
}

/// Apply the operator to every column of a mask (frequency direction).
pub fn operate_vertically(mask: &mut Mask2D, eta: f64) {
    let height = mask.height();
    let mut strip = vec![false; height];
    for x in 0..mask.width() {
        for y in 0..height {
            strip[y] = mask.value(x, y);
        }
        operate_strip(&mut strip, eta);
        for y in 0..height {
            mask.set_value(x, y, strip[y]);
        }
    }
}
