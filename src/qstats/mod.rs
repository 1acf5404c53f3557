// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Online quality statistics.

Flagging is the one place where all the data of an observation streams
through memory at full resolution, so it is also the cheapest place to
collect per-channel statistics. A [QualityStatistics] accumulates sample
counts, RFI counts and first/second moments per (polarisation, channel);
worker threads each fill their own instance and merge them with `+=` when
they are done. The merged table can be written as TSV.
 */


use std::{
    fs::File,
    io::{BufWriter, Write},
    ops::AddAssign,
    path::Path,
};

use num_complex::Complex64;

use crate::image::{Image2D, Mask2D};

/// Moments of one (polarisation, channel) cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChannelStatistics {
    /// Unflagged samples.
    pub count: u64,
    /// Samples flagged as RFI (and not already flagged by the correlator).
    pub rfi_count: u64,
    /// Sum of unflagged visibilities.
    pub sum: Complex64,
    /// Sum of |v|^2 over unflagged visibilities.
    pub sum_sq: f64,
}

impl ChannelStatistics {
    pub fn mean(&self) -> Complex64 {
        if self.count == 0 {
            Complex64::default()
        } else {
            self.sum / self.count as f64
        }
    }

    /// Population standard deviation of |v|.
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean_sq = self.sum_sq / self.count as f64;
        let mean_norm = self.mean().norm();
        (mean_sq - mean_norm * mean_norm).max(0.0).sqrt()
    }

    pub fn rfi_fraction(&self) -> f64 {
        let total = self.count + self.rfi_count;
        if total == 0 {
            0.0
        } else {
            self.rfi_count as f64 / total as f64
        }
    }
}

#[derive(Clone, Debug)]
pub struct QualityStatistics {
    scan_times: Vec<f64>,
    channel_frequencies: Vec<f64>,
    polarisation_count: usize,
    /// Indexed `pol * channel_count + channel`.
    statistics: Vec<ChannelStatistics>,
    baseline_count: u64,
}

impl QualityStatistics {
    pub fn new(
        scan_times: &[f64],
        channel_frequencies: &[f64],
        polarisation_count: usize,
    ) -> QualityStatistics {
        QualityStatistics {
            scan_times: scan_times.to_vec(),
            channel_frequencies: channel_frequencies.to_vec(),
            polarisation_count,
            statistics: vec![
                ChannelStatistics::default();
                polarisation_count * channel_frequencies.len()
            ],
            baseline_count: 0,
        }
    }

    pub fn polarisation_count(&self) -> usize {
        self.polarisation_count
    }

    pub fn scan_times(&self) -> &[f64] {
        &self.scan_times
    }

    pub fn channel_count(&self) -> usize {
        self.channel_frequencies.len()
    }

    pub fn baseline_count(&self) -> u64 {
        self.baseline_count
    }

    pub fn cell(&self, polarisation: usize, channel: usize) -> &ChannelStatistics {
        &self.statistics[polarisation * self.channel_count() + channel]
    }

    /// Accumulate one baseline. `images` follows the ImageSet layout (1
    /// amplitude image, or real/imaginary pairs); samples flagged by the
    /// correlator are ignored, samples flagged as RFI are counted but do not
    /// enter the moments.
    pub fn collect(&mut self, images: &[Image2D], rfi_flags: &Mask2D, correlator_flags: &Mask2D) {
        let pairs: Vec<(Option<&Image2D>, &Image2D)> = if images.len() == 1 {
            vec![(None, &images[0])]
        } else {
            images.chunks(2).map(|pair| (Some(&pair[0]), &pair[1])).collect()
        };
        let channels = self.channel_count().min(images[0].height());
        let width = images[0].width();

        for (p, (re, im)) in pairs.into_iter().enumerate().take(self.polarisation_count) {
            for y in 0..channels {
                let cell = &mut self.statistics[p * self.channel_frequencies.len() + y];
                for x in 0..width {
                    if correlator_flags.value(x, y) {
                        continue;
                    }
                    if rfi_flags.value(x, y) {
                        cell.rfi_count += 1;
                        continue;
                    }
                    // A single-image set holds amplitudes; treat them as
                    // purely real visibilities.
                    let value = match re {
                        Some(re) => {
                            Complex64::new(re.value(x, y) as f64, im.value(x, y) as f64)
                        }
                        None => Complex64::new(im.value(x, y) as f64, 0.0),
                    };
                    cell.count += 1;
                    cell.sum += value;
                    cell.sum_sq += value.norm_sqr();
                }
            }
        }
        self.baseline_count += 1;
    }

    /// Write the accumulated table as tab-separated values.
    pub fn write_tsv<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(
            out,
            "polarisation\tchannel\tfrequency_hz\tcount\trfi_count\trfi_fraction\tmean_re\tmean_im\tstd_dev"
        )?;
        for p in 0..self.polarisation_count {
            for (y, &freq) in self.channel_frequencies.iter().enumerate() {
                let cell = self.cell(p, y);
                let mean = cell.mean();
                writeln!(
                    out,
                    "{p}\t{y}\t{freq}\t{count}\t{rfi}\t{fraction}\t{re}\t{im}\t{stddev}",
                    count = cell.count,
                    rfi = cell.rfi_count,
                    fraction = cell.rfi_fraction(),
                    re = mean.re,
                    im = mean.im,
                    stddev = cell.std_dev(),
                )?;
            }
        }
        Ok(())
    }
}

impl AddAssign<&QualityStatistics> for QualityStatistics {
    /// Merge another collection into this one, cell by cell. This is the
    /// only cross-thread write path on statistics; the metadata of `self`
    /// wins where the two disagree.
    fn add_assign(&mut self, rhs: &QualityStatistics) {
        if self.statistics.len() < rhs.statistics.len() {
            self.statistics
                .resize(rhs.statistics.len(), ChannelStatistics::default());
        }
        for (cell, other) in self.statistics.iter_mut().zip(&rhs.statistics) {
            cell.count += other.count;
            cell.rfi_count += other.rfi_count;
            cell.sum += other.sum;
            cell.sum_sq += other.sum_sq;
        }
        self.baseline_count += rhs.baseline_count;
    }
}
